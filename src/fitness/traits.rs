//! Fitness traits
//!
//! This module defines how chromosomes are decoded into phenotypes and how
//! phenotypes are scored. Both traits are implemented for plain closures, so
//! most callers never name them.

use crate::chromosome::bit_string::BitString;

/// Fitness function over a decoded phenotype
///
/// Higher values are fitter. Implementations must be thread-safe since
/// fitness is evaluated on worker threads.
pub trait FitnessFunction<P>: Send + Sync {
    /// Score a phenotype
    fn compute(&self, phenotype: &P) -> f64;
}

impl<P, F> FitnessFunction<P> for F
where
    F: Fn(&P) -> f64 + Send + Sync,
{
    fn compute(&self, phenotype: &P) -> f64 {
        self(phenotype)
    }
}

/// Decoder from a binary encoding to a phenotype
pub trait Decoder<P>: Send + Sync {
    /// Decode an encoding into its phenotype
    fn decode(&self, encoding: &BitString) -> P;
}

impl<P, F> Decoder<P> for F
where
    F: Fn(&BitString) -> P + Send + Sync,
{
    fn decode(&self, encoding: &BitString) -> P {
        self(encoding)
    }
}

/// A wrapper to negate a fitness function (for minimization problems)
#[derive(Clone, Debug)]
pub struct MinimizeFitness<F> {
    inner: F,
}

impl<F> MinimizeFitness<F> {
    /// Create a minimization wrapper around a fitness function
    pub fn new(fitness: F) -> Self {
        Self { inner: fitness }
    }
}

impl<P, F: FitnessFunction<P>> FitnessFunction<P> for MinimizeFitness<F> {
    fn compute(&self, phenotype: &P) -> f64 {
        -self.inner.compute(phenotype)
    }
}
