//! Operator rate generators
//!
//! A rate generator supplies the probability with which crossover or mutation
//! is applied. It may vary the probability by generation, by population
//! statistics or by the relative rank of the parents being recombined.

use serde::{Deserialize, Serialize};

use crate::diagnostics::PopulationStatisticalSummary;
use crate::error::{check_probability, EvoResult, EvolutionError};

/// Rate generator trait
pub trait RateGenerator: Send + Sync {
    /// Probability in `[0, 1]` for the current operator invocation
    ///
    /// `statistics` summarizes the parent population and `normalized_rank`
    /// is the fraction of that population ranked strictly below the
    /// individual (or pair) being operated on.
    fn rate(
        &self,
        generation: usize,
        statistics: &PopulationStatisticalSummary,
        normalized_rank: f64,
    ) -> f64;
}

/// A fixed rate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConstantRate")]
pub struct ConstantRate {
    value: f64,
}

#[derive(Deserialize)]
struct RawConstantRate {
    value: f64,
}

impl TryFrom<RawConstantRate> for ConstantRate {
    type Error = EvolutionError;

    fn try_from(raw: RawConstantRate) -> EvoResult<Self> {
        Self::new(raw.value)
    }
}

impl ConstantRate {
    /// Create a constant rate; fails if `value` is not in `[0, 1]`
    pub fn new(value: f64) -> EvoResult<Self> {
        check_probability("rate", value)?;
        Ok(Self { value })
    }

    /// The constant value
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl RateGenerator for ConstantRate {
    fn rate(&self, _: usize, _: &PopulationStatisticalSummary, _: f64) -> f64 {
        self.value
    }
}

/// Linear interpolation by rank: `min + (max - min) * normalized_rank`
///
/// Construction fails when `min > max`. A higher-ranked (fitter)
/// individual gets a rate closer to `max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRankLinearRate")]
pub struct RankLinearRate {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawRankLinearRate {
    min: f64,
    max: f64,
}

impl TryFrom<RawRankLinearRate> for RankLinearRate {
    type Error = EvolutionError;

    fn try_from(raw: RawRankLinearRate) -> EvoResult<Self> {
        Self::new(raw.min, raw.max)
    }
}

impl RankLinearRate {
    /// Create a rank-linear rate between `min` and `max`
    pub fn new(min: f64, max: f64) -> EvoResult<Self> {
        check_probability("minimum rate", min)?;
        check_probability("maximum rate", max)?;
        if min > max {
            return Err(EvolutionError::InvalidParameter(format!(
                "minimum rate {min} exceeds maximum rate {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Lower bound
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl RateGenerator for RankLinearRate {
    fn rate(&self, _: usize, _: &PopulationStatisticalSummary, normalized_rank: f64) -> f64 {
        let rank = normalized_rank.clamp(0.0, 1.0);
        self.min + (self.max - self.min) * rank
    }
}

pub mod prelude {
    pub use super::{ConstantRate, RankLinearRate, RateGenerator};
}
