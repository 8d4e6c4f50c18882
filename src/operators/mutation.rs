//! Mutation operators
//!
//! This module provides bit-flip mutation for binary encodings.

use rand::Rng;
use tracing::instrument;

use crate::chromosome::bit_string::BitString;
use crate::chromosome::chromosome::Chromosome;
use crate::error::{check_probability, EvoResult, EvolutionError};
use crate::operators::traits::MutationPolicy;

/// Bit-flip mutation
///
/// Every bit is flipped independently with probability `rate`. The result is
/// always a new chromosome with an empty fitness cache, even when no bit
/// was flipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BinaryMutation;

impl BinaryMutation {
    /// Create a new bit-flip mutation
    pub fn new() -> Self {
        Self
    }
}

impl<P: 'static> MutationPolicy<P> for BinaryMutation {
    #[instrument(level = "trace", skip_all, fields(rate = rate))]
    fn mutate<R: Rng + ?Sized>(
        &self,
        chromosome: &Chromosome<P>,
        rate: f64,
        rng: &mut R,
    ) -> EvoResult<Chromosome<P>> {
        check_probability("mutation rate", rate)?;
        let flips = BitString::random_mask(chromosome.len(), rate, rng).ok_or_else(|| {
            EvolutionError::InvalidParameter(format!("mutation rate must be in [0, 1], got {rate}"))
        })?;
        let encoding = chromosome.encoding().xor(&flips)?;
        Ok(chromosome.with_encoding(encoding)?)
    }
}
