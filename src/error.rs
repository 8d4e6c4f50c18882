//! Error types for evolve-ga
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for chromosome encodings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChromosomeError {
    /// The encoding cannot back a chromosome (zero length, malformed text)
    #[error("Invalid chromosome: {0}")]
    InvalidChromosome(String),

    /// Two encodings that must line up have different lengths
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A bit range does not fit the encoding or a 64-bit integer
    #[error("Bit range [{start}, {end}) is invalid for an encoding of length {length}")]
    BitRange {
        start: usize,
        end: usize,
        length: usize,
    },
}

/// Top-level error type for evolution operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvolutionError {
    /// A rate, size or count is outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Chromosome error
    #[error("Chromosome error: {0}")]
    Chromosome(#[from] ChromosomeError),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,

    /// The population has reached its capacity
    #[error("Population is full (capacity {capacity})")]
    PopulationFull { capacity: usize },

    /// The worker pool could not be created
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl EvolutionError {
    /// Shorthand for an [`EvolutionError::InvalidParameter`]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

/// Check that `value` is a probability in `[0, 1]`.
pub(crate) fn check_probability(name: &str, value: f64) -> EvoResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EvolutionError::InvalidParameter(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}
