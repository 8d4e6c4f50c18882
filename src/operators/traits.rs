//! Operator traits
//!
//! This module defines the core operator traits for the genetic algorithm.
//! Every operator is stateless per call and builds new chromosomes instead
//! of modifying its inputs, so one operator value can be shared by all
//! worker tasks of a generation.

use rand::Rng;

use crate::chromosome::chromosome::Chromosome;
use crate::chromosome::pair::ChromosomePair;
use crate::error::EvoResult;
use crate::population::population::Population;

/// Selection policy trait
///
/// Chooses two parents from a population.
pub trait SelectionPolicy<P>: Send + Sync {
    /// Select a pair of (possibly identical) parents
    fn select<R: Rng + ?Sized>(
        &self,
        population: &Population<P>,
        rng: &mut R,
    ) -> EvoResult<ChromosomePair<P>>;

    /// Check that the policy can run against populations of the given size
    ///
    /// Called once before the first generation, so a configuration error is
    /// reported before any evolution takes place.
    fn validate(&self, _population_size: usize) -> EvoResult<()> {
        Ok(())
    }
}

/// Crossover policy trait
///
/// Combines a pair of parents into a pair of children.
pub trait CrossoverPolicy<P>: Send + Sync {
    /// Apply crossover with probability `rate`
    ///
    /// When crossover is not applied the children are copies of the parents.
    fn crossover<R: Rng + ?Sized>(
        &self,
        parents: &ChromosomePair<P>,
        rate: f64,
        rng: &mut R,
    ) -> EvoResult<ChromosomePair<P>>;
}

/// Mutation policy trait
///
/// Perturbs a single chromosome.
pub trait MutationPolicy<P>: Send + Sync {
    /// Return a mutated copy of `chromosome`, perturbed according to `rate`
    fn mutate<R: Rng + ?Sized>(
        &self,
        chromosome: &Chromosome<P>,
        rate: f64,
        rng: &mut R,
    ) -> EvoResult<Chromosome<P>>;
}
