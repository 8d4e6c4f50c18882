//! Run configuration
//!
//! Plain configuration values a driver supplies to set up and launch a run.

use serde::{Deserialize, Serialize};

use crate::algorithms::genetic_algorithm::{GeneticAlgorithm, GeneticAlgorithmBuilder};
use crate::error::{check_probability, EvoResult, EvolutionError};
use crate::fitness::benchmarks::CoordinateDecoder;
use crate::operators::crossover::OnePointBinaryCrossover;
use crate::operators::mutation::BinaryMutation;
use crate::operators::selection::TournamentSelection;
use crate::termination::UnchangedBestFitness;

/// Engine type built from a [`RunConfig`]
pub type BinaryGeneticAlgorithm<P> =
    GeneticAlgorithm<P, TournamentSelection, OnePointBinaryCrossover, BinaryMutation>;

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Configuration for a binary-encoded coordinate optimization run
///
/// Missing fields take their default values when deserializing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of coordinates
    pub dimension: usize,
    /// Bits encoding each coordinate
    pub bits_per_dimension: usize,
    /// Divisor mapping a coordinate's integer value to its real value
    pub scale: f64,
    /// Population size
    pub population_size: usize,
    /// Probability of recombining a selected pair
    pub crossover_rate: f64,
    /// Per-bit mutation probability
    pub mutation_rate: f64,
    /// Fraction of the population carried over unchanged
    pub elitism_rate: f64,
    /// Tournament size for selection
    pub tournament_size: usize,
    /// Generations without improvement before stopping
    pub unchanged_generations: usize,
    /// Worker threads for offspring production and evaluation
    pub parallelism: usize,
    /// Random seed (None for a fresh seed every run)
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dimension: 2,
            bits_per_dimension: 12,
            scale: 100.0,
            population_size: 50,
            crossover_rate: 0.9,
            mutation_rate: 0.02,
            elitism_rate: 0.1,
            tournament_size: 5,
            unchanged_generations: 20,
            parallelism: available_parallelism(),
            seed: None,
        }
    }
}

impl RunConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> EvoResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EvolutionError::InvalidParameter(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check every value, reporting the first one out of range
    pub fn validate(&self) -> EvoResult<()> {
        self.decoder()?;
        if self.population_size == 0 {
            return Err(EvolutionError::invalid_parameter(
                "population size must be at least 1",
            ));
        }
        check_probability("crossover rate", self.crossover_rate)?;
        check_probability("mutation rate", self.mutation_rate)?;
        check_probability("elitism rate", self.elitism_rate)?;
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(EvolutionError::InvalidParameter(format!(
                "tournament size must be in [1, {}], got {}",
                self.population_size, self.tournament_size
            )));
        }
        if self.unchanged_generations == 0 {
            return Err(EvolutionError::invalid_parameter(
                "unchanged generations must be at least 1",
            ));
        }
        if self.parallelism == 0 {
            return Err(EvolutionError::invalid_parameter(
                "parallelism must be at least 1",
            ));
        }
        Ok(())
    }

    /// Total encoding length
    pub fn encoding_length(&self) -> usize {
        self.dimension * self.bits_per_dimension
    }

    /// Decoder mapping encodings to coordinates
    pub fn decoder(&self) -> EvoResult<CoordinateDecoder> {
        CoordinateDecoder::new(self.dimension, self.bits_per_dimension, self.scale)
    }

    /// Stopping condition for the configured number of unchanged generations
    pub fn stopping_condition(&self) -> EvoResult<UnchangedBestFitness> {
        UnchangedBestFitness::new(self.unchanged_generations)
    }

    /// Builder preloaded with the configured operators and rates
    pub fn builder<P: 'static>(
        &self,
    ) -> EvoResult<GeneticAlgorithmBuilder<P, TournamentSelection, OnePointBinaryCrossover, BinaryMutation>>
    {
        let builder = GeneticAlgorithmBuilder::new()
            .selection(TournamentSelection::new(self.tournament_size)?)
            .crossover(OnePointBinaryCrossover::new())
            .mutation(BinaryMutation::new())
            .crossover_rate(self.crossover_rate)
            .mutation_rate(self.mutation_rate)
            .elitism_rate(self.elitism_rate);
        Ok(match self.seed {
            Some(seed) => builder.seed(seed),
            None => builder,
        })
    }

    /// Build an engine with the configured operators and rates
    pub fn build_engine<P: 'static>(&self) -> EvoResult<BinaryGeneticAlgorithm<P>> {
        self.validate()?;
        self.builder()?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.bits_per_dimension, 12);
        assert_eq!(config.population_size, 50);
        assert_eq!(config.tournament_size, 5);
        assert!(config.parallelism >= 1);
        assert!(config.validate().is_ok());
        assert_eq!(config.encoding_length(), 24);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = RunConfig::from_json(r#"{"dimension": 3, "seed": 7}"#).unwrap();
        assert_eq!(config.dimension, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.crossover_rate, 0.9);
        assert_eq!(config.encoding_length(), 36);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(RunConfig::from_json(r#"{"mutation_rate": 2.0}"#).is_err());
        assert!(RunConfig::from_json(r#"{"tournament_size": 100}"#).is_err());
        assert!(RunConfig::from_json(r#"{"parallelism": 0}"#).is_err());
        assert!(RunConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_validate_reports_first_error() {
        let config = RunConfig {
            population_size: 0,
            crossover_rate: 5.0,
            ..RunConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("population size"));
    }

    #[test]
    fn test_json_round_trip() {
        let config = RunConfig {
            seed: Some(11),
            parallelism: 2,
            ..RunConfig::default()
        };
        let restored = RunConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_build_engine() {
        let config = RunConfig {
            seed: Some(1),
            ..RunConfig::default()
        };
        let engine: BinaryGeneticAlgorithm<u64> = config.build_engine().unwrap();
        assert_eq!(engine.selection().tournament_size(), 5);
        assert_eq!(engine.elitism_rate(), 0.1);
        assert_eq!(config.stopping_condition().unwrap().unchanged_generations(), 0);
    }
}
