//! Crossover operators
//!
//! This module provides one-point and uniform crossover for binary encodings.

use rand::Rng;
use tracing::instrument;

use crate::chromosome::bit_string::BitString;
use crate::chromosome::chromosome::Chromosome;
use crate::chromosome::pair::ChromosomePair;
use crate::error::{check_probability, ChromosomeError, EvoResult, EvolutionError};
use crate::operators::traits::CrossoverPolicy;

/// Parents must have equal encoding lengths
fn check_parents<P>(parents: &ChromosomePair<P>) -> Result<usize, ChromosomeError> {
    let expected = parents.first().len();
    let actual = parents.second().len();
    if expected != actual {
        return Err(ChromosomeError::LengthMismatch { expected, actual });
    }
    Ok(expected)
}

/// Copies of the parents, used when crossover is not applied
fn copy_parents<P>(parents: &ChromosomePair<P>) -> ChromosomePair<P> {
    ChromosomePair::from_owned(
        Chromosome::clone(parents.first()),
        Chromosome::clone(parents.second()),
    )
}

/// One-point crossover for binary encodings
///
/// A cut index `k` is drawn uniformly from `1..length`. The first child takes
/// bits `[0, k)` from the first parent and the rest from the second; the
/// second child is the mirror image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OnePointBinaryCrossover;

impl OnePointBinaryCrossover {
    /// Create a new one-point crossover
    pub fn new() -> Self {
        Self
    }

    /// Recombine the parents at a fixed cut index
    pub fn mate_at<P: 'static>(
        &self,
        parents: &ChromosomePair<P>,
        cut: usize,
    ) -> EvoResult<ChromosomePair<P>> {
        check_parents(parents)?;
        let first = parents.first();
        let second = parents.second();

        let child1 = first.encoding().splice(second.encoding(), cut)?;
        let child2 = second.encoding().splice(first.encoding(), cut)?;

        Ok(ChromosomePair::from_owned(
            first.with_encoding(child1)?,
            second.with_encoding(child2)?,
        ))
    }
}

impl<P: 'static> CrossoverPolicy<P> for OnePointBinaryCrossover {
    #[instrument(level = "trace", skip_all, fields(rate = rate))]
    fn crossover<R: Rng + ?Sized>(
        &self,
        parents: &ChromosomePair<P>,
        rate: f64,
        rng: &mut R,
    ) -> EvoResult<ChromosomePair<P>> {
        check_probability("crossover rate", rate)?;
        let length = check_parents(parents)?;

        // A single bit has no interior cut point
        if length < 2 || rng.gen::<f64>() >= rate {
            return Ok(copy_parents(parents));
        }

        let cut = rng.gen_range(1..length);
        self.mate_at(parents, cut)
    }
}

/// Uniform crossover for binary encodings
///
/// Each bit position is swapped between the parents independently with
/// probability `ratio`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformBinaryCrossover {
    ratio: f64,
}

impl UniformBinaryCrossover {
    /// Create a uniform crossover with the given per-bit swap ratio
    pub fn new(ratio: f64) -> EvoResult<Self> {
        check_probability("uniform crossover ratio", ratio)?;
        Ok(Self { ratio })
    }

    /// Per-bit swap ratio
    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl Default for UniformBinaryCrossover {
    fn default() -> Self {
        Self { ratio: 0.5 }
    }
}

impl<P: 'static> CrossoverPolicy<P> for UniformBinaryCrossover {
    #[instrument(level = "trace", skip_all, fields(rate = rate, ratio = self.ratio))]
    fn crossover<R: Rng + ?Sized>(
        &self,
        parents: &ChromosomePair<P>,
        rate: f64,
        rng: &mut R,
    ) -> EvoResult<ChromosomePair<P>> {
        check_probability("crossover rate", rate)?;
        let length = check_parents(parents)?;

        if rng.gen::<f64>() >= rate {
            return Ok(copy_parents(parents));
        }

        let mask = BitString::random_mask(length, self.ratio, rng).ok_or_else(|| {
            EvolutionError::InvalidParameter(format!(
                "uniform crossover ratio must be in [0, 1], got {}",
                self.ratio
            ))
        })?;
        let first = parents.first();
        let second = parents.second();
        let child1 = first.encoding().select_from(second.encoding(), &mask)?;
        let child2 = second.encoding().select_from(first.encoding(), &mask)?;

        Ok(ChromosomePair::from_owned(
            first.with_encoding(child1)?,
            second.with_encoding(child2)?,
        ))
    }
}
