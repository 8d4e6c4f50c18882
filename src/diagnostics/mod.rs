//! Diagnostics and statistics
//!
//! This module provides the per-generation population statistics and the
//! convergence listeners that observe them.

pub mod convergence;

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::population::population::{ranking_fitness, Population};

/// Aggregate fitness measures over one population snapshot
///
/// The variance is the population variance (mean squared deviation from the
/// mean), not the sample variance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationStatisticalSummary {
    /// Arithmetic mean of all fitness values
    pub mean_fitness: f64,
    /// Greatest fitness
    pub max_fitness: f64,
    /// Smallest fitness
    pub min_fitness: f64,
    /// Population variance of the fitness values
    pub fitness_variance: f64,
    /// Number of chromosomes summarized
    pub size: usize,
    /// Fitness values in ascending order, NaN ranked lowest
    #[serde(skip)]
    sorted: Vec<f64>,
}

impl PopulationStatisticalSummary {
    /// Summarize a population, computing any fitness not yet cached
    pub fn from_population<P>(population: &Population<P>) -> EvoResult<Self> {
        Self::from_fitnesses(&population.fitnesses())
    }

    /// Summarize raw fitness values
    pub fn from_fitnesses(fitnesses: &[f64]) -> EvoResult<Self> {
        if fitnesses.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        let n = fitnesses.len() as f64;
        let mean = fitnesses.iter().sum::<f64>() / n;

        // Corrected two-pass algorithm
        let (sum_sq, sum) = fitnesses.iter().fold((0.0, 0.0), |(sq, s), &f| {
            let d = f - mean;
            (sq + d * d, s + d)
        });
        let variance = ((sum_sq - sum * sum / n) / n).max(0.0);

        let mut sorted: Vec<f64> = fitnesses.iter().map(|&f| ranking_fitness(f)).collect();
        sorted.sort_by(f64::total_cmp);

        Ok(Self {
            mean_fitness: mean,
            max_fitness: sorted[sorted.len() - 1],
            min_fitness: sorted[0],
            fitness_variance: variance,
            size: fitnesses.len(),
            sorted,
        })
    }

    /// Mean fitness
    pub fn mean_fitness(&self) -> f64 {
        self.mean_fitness
    }

    /// Max fitness
    pub fn max_fitness(&self) -> f64 {
        self.max_fitness
    }

    /// Min fitness
    pub fn min_fitness(&self) -> f64 {
        self.min_fitness
    }

    /// Fitness variance
    pub fn fitness_variance(&self) -> f64 {
        self.fitness_variance
    }

    /// Fitness standard deviation
    pub fn fitness_std(&self) -> f64 {
        self.fitness_variance.sqrt()
    }

    /// Population size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fraction of the population with strictly lower fitness, in `[0, 1]`
    ///
    /// Returns 0 for a summary restored by deserialization, which does not
    /// carry the individual fitness values.
    pub fn normalized_rank(&self, fitness: f64) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        let fitness = ranking_fitness(fitness);
        let below = self.sorted.partition_point(|&f| f < fitness);
        below as f64 / self.sorted.len() as f64
    }
}

pub mod prelude {
    pub use super::convergence::*;
    pub use super::PopulationStatisticalSummary;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::bit_string::BitString;
    use crate::chromosome::chromosome::Chromosome;

    fn value(bits: &BitString) -> u64 {
        bits.substring_value(0, bits.len()).unwrap()
    }

    #[test]
    fn test_summary_basic() {
        let summary = PopulationStatisticalSummary::from_fitnesses(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(summary.mean_fitness(), 2.5);
        assert_eq!(summary.max_fitness(), 4.0);
        assert_eq!(summary.min_fitness(), 1.0);
        assert!((summary.fitness_variance() - 1.25).abs() < 1e-12);
        assert_eq!(summary.size(), 4);
    }

    #[test]
    fn test_variance_is_population_variance() {
        let summary = PopulationStatisticalSummary::from_fitnesses(&[2.0, 4.0]).unwrap();
        assert_eq!(summary.fitness_variance(), 1.0);

        let single = PopulationStatisticalSummary::from_fitnesses(&[7.0]).unwrap();
        assert_eq!(single.fitness_variance(), 0.0);
    }

    #[test]
    fn test_variance_large_offset() {
        let base = 1.0e9;
        let values: Vec<f64> = [4.0, 7.0, 13.0, 16.0].iter().map(|v| base + v).collect();
        let summary = PopulationStatisticalSummary::from_fitnesses(&values).unwrap();
        assert!((summary.fitness_variance() - 22.5).abs() < 1e-6);
    }

    #[test]
    fn test_summary_empty_rejected() {
        assert_eq!(
            PopulationStatisticalSummary::from_fitnesses(&[]).unwrap_err(),
            EvolutionError::EmptyPopulation
        );
    }

    #[test]
    fn test_normalized_rank() {
        let summary =
            PopulationStatisticalSummary::from_fitnesses(&[5.0, 1.0, 3.0, 3.0]).unwrap();
        assert_eq!(summary.normalized_rank(1.0), 0.0);
        assert_eq!(summary.normalized_rank(3.0), 0.25);
        assert_eq!(summary.normalized_rank(5.0), 0.75);
        assert_eq!(summary.normalized_rank(10.0), 1.0);
    }

    #[test]
    fn test_summary_from_population() {
        let chromosomes = ["0001", "0011", "0111"]
            .into_iter()
            .map(|bits| Chromosome::new(bits.parse().unwrap(), |v: &u64| *v as f64, value).unwrap())
            .collect();
        let population = Population::from_chromosomes(chromosomes, 3).unwrap();

        let summary = PopulationStatisticalSummary::from_population(&population).unwrap();
        assert!((summary.mean_fitness() - 11.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.max_fitness(), 7.0);
        assert!(population.all_evaluated());
    }

    #[test]
    fn test_summary_serialization() {
        let summary = PopulationStatisticalSummary::from_fitnesses(&[1.0, 3.0]).unwrap();
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"mean_fitness\":2.0"));

        let restored: PopulationStatisticalSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.max_fitness(), 3.0);
        assert_eq!(restored.normalized_rank(3.0), 0.0);
    }
}
