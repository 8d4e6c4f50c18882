//! Convergence listeners
//!
//! A convergence listener observes every generation of a run, including the
//! initial population as generation 0. Listeners receive read-only views and
//! cannot influence the engine's control flow.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diagnostics::PopulationStatisticalSummary;
use crate::population::population::Population;

/// Per-generation observer of an evolution run
///
/// Listeners are invoked synchronously in registration order after the
/// generation's fitness evaluation has completed.
pub trait ConvergenceListener<P>: Send {
    /// Observe one generation
    fn notify(
        &mut self,
        generation: usize,
        population: &Population<P>,
        statistics: &PopulationStatisticalSummary,
    );
}

impl<P, F> ConvergenceListener<P> for F
where
    F: FnMut(usize, &Population<P>, &PopulationStatisticalSummary) + Send,
{
    fn notify(
        &mut self,
        generation: usize,
        population: &Population<P>,
        statistics: &PopulationStatisticalSummary,
    ) {
        self(generation, population, statistics)
    }
}

/// Logs mean fitness, max fitness and fitness variance every generation
#[derive(Clone, Debug)]
pub struct PopulationStatisticsLogger {
    every: usize,
}

impl PopulationStatisticsLogger {
    /// Log every generation
    pub fn new() -> Self {
        Self { every: 1 }
    }

    /// Log only every `every`-th generation (0 is treated as 1)
    pub fn every(every: usize) -> Self {
        Self { every: every.max(1) }
    }
}

impl Default for PopulationStatisticsLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ConvergenceListener<P> for PopulationStatisticsLogger {
    fn notify(
        &mut self,
        generation: usize,
        population: &Population<P>,
        statistics: &PopulationStatisticalSummary,
    ) {
        if generation % self.every != 0 {
            return;
        }
        info!(
            generation,
            size = population.len(),
            mean_fitness = statistics.mean_fitness(),
            max_fitness = statistics.max_fitness(),
            fitness_variance = statistics.fitness_variance(),
            "population statistics"
        );
    }
}

/// Statistics recorded for one generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation index
    pub generation: usize,
    /// Summary of the generation's population
    pub statistics: PopulationStatisticalSummary,
}

/// Records the statistical summary of every generation
///
/// Clones share the same history, so a clone can be registered with the
/// engine while the original is kept to read the history after the run.
#[derive(Clone, Debug, Default)]
pub struct StatisticsRecorder {
    records: Arc<Mutex<Vec<GenerationRecord>>>,
}

impl StatisticsRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<GenerationRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All records in generation order
    pub fn records(&self) -> Vec<GenerationRecord> {
        self.lock().clone()
    }

    /// Number of generations recorded
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The most recent record
    pub fn last(&self) -> Option<GenerationRecord> {
        self.lock().last().cloned()
    }

    /// Max fitness of every generation
    pub fn best_history(&self) -> Vec<f64> {
        self.lock()
            .iter()
            .map(|r| r.statistics.max_fitness())
            .collect()
    }

    /// Mean fitness of every generation
    pub fn mean_history(&self) -> Vec<f64> {
        self.lock()
            .iter()
            .map(|r| r.statistics.mean_fitness())
            .collect()
    }

    /// Serialize the history as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.lock())
    }

    /// Forget all records
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<P> ConvergenceListener<P> for StatisticsRecorder {
    fn notify(
        &mut self,
        generation: usize,
        _population: &Population<P>,
        statistics: &PopulationStatisticalSummary,
    ) {
        self.lock().push(GenerationRecord {
            generation,
            statistics: statistics.clone(),
        });
    }
}
