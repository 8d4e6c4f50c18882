//! Stopping conditions
//!
//! This module provides the conditions that decide when an evolution run
//! terminates. Conditions are checked once per generation, starting with the
//! initial population as generation 0, and may keep state across checks.

use std::time::{Duration, Instant};

use crate::error::{EvoResult, EvolutionError};
use crate::population::population::{ranking_fitness, Population};

/// Stopping condition trait
pub trait StoppingCondition<P>: Send {
    /// Check whether evolution should stop after `generation`
    fn is_satisfied(&mut self, generation: usize, population: &Population<P>) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

impl<P, F> StoppingCondition<P> for F
where
    F: FnMut(usize, &Population<P>) -> bool + Send,
{
    fn is_satisfied(&mut self, generation: usize, population: &Population<P>) -> bool {
        self(generation, population)
    }

    fn reason(&self) -> &'static str {
        "Custom stopping condition satisfied"
    }
}

fn check_generations(generations: usize) -> EvoResult<()> {
    if generations == 0 {
        return Err(EvolutionError::invalid_parameter(
            "generation count must be at least 1",
        ));
    }
    Ok(())
}

fn max_fitness<P>(population: &Population<P>) -> f64 {
    population
        .fittest()
        .map(|c| ranking_fitness(c.fitness()))
        .unwrap_or(f64::NEG_INFINITY)
}

/// Stop when the best fitness has not strictly improved for `k` generations
#[derive(Clone, Debug)]
pub struct UnchangedBestFitness {
    max_unchanged: usize,
    best_fitness: f64,
    unchanged: usize,
}

impl UnchangedBestFitness {
    /// Create a new condition; `max_unchanged` must be at least 1
    pub fn new(max_unchanged: usize) -> EvoResult<Self> {
        check_generations(max_unchanged)?;
        Ok(Self {
            max_unchanged,
            best_fitness: f64::NEG_INFINITY,
            unchanged: 0,
        })
    }

    /// Best fitness seen so far
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Generations since the best fitness last improved
    pub fn unchanged_generations(&self) -> usize {
        self.unchanged
    }
}

impl<P> StoppingCondition<P> for UnchangedBestFitness {
    fn is_satisfied(&mut self, _generation: usize, population: &Population<P>) -> bool {
        let best = max_fitness(population);
        if best > self.best_fitness {
            self.best_fitness = best;
            self.unchanged = 0;
        } else {
            self.unchanged += 1;
        }
        self.unchanged >= self.max_unchanged
    }

    fn reason(&self) -> &'static str {
        "Best fitness unchanged"
    }
}

/// Stop when the mean fitness has not strictly improved for `k` generations
#[derive(Clone, Debug)]
pub struct UnchangedMeanFitness {
    max_unchanged: usize,
    mean_fitness: f64,
    unchanged: usize,
}

impl UnchangedMeanFitness {
    /// Create a new condition; `max_unchanged` must be at least 1
    pub fn new(max_unchanged: usize) -> EvoResult<Self> {
        check_generations(max_unchanged)?;
        Ok(Self {
            max_unchanged,
            mean_fitness: f64::NEG_INFINITY,
            unchanged: 0,
        })
    }
}

impl<P> StoppingCondition<P> for UnchangedMeanFitness {
    fn is_satisfied(&mut self, _generation: usize, population: &Population<P>) -> bool {
        let mean = if population.is_empty() {
            f64::NEG_INFINITY
        } else {
            population.iter().map(|c| c.fitness()).sum::<f64>() / population.len() as f64
        };
        if mean > self.mean_fitness {
            self.mean_fitness = mean;
            self.unchanged = 0;
        } else {
            self.unchanged += 1;
        }
        self.unchanged >= self.max_unchanged
    }

    fn reason(&self) -> &'static str {
        "Mean fitness unchanged"
    }
}

/// Stop once `n` generations have been evolved after the initial population
#[derive(Clone, Debug)]
pub struct FixedGenerationCount(usize);

impl FixedGenerationCount {
    /// Create a new fixed generation count; `generations` must be at least 1
    pub fn new(generations: usize) -> EvoResult<Self> {
        check_generations(generations)?;
        Ok(Self(generations))
    }
}

impl<P> StoppingCondition<P> for FixedGenerationCount {
    fn is_satisfied(&mut self, generation: usize, _population: &Population<P>) -> bool {
        generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Stop once a wall-clock budget has elapsed
///
/// The clock starts at the first check, i.e. with the initial population.
#[derive(Clone, Debug)]
pub struct FixedElapsedTime {
    limit: Duration,
    started: Option<Instant>,
}

impl FixedElapsedTime {
    /// Create a new time budget
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: None,
        }
    }
}

impl<P> StoppingCondition<P> for FixedElapsedTime {
    fn is_satisfied(&mut self, _generation: usize, _population: &Population<P>) -> bool {
        let started = *self.started.get_or_insert_with(Instant::now);
        started.elapsed() >= self.limit
    }

    fn reason(&self) -> &'static str {
        "Time budget exhausted"
    }
}

/// Combine conditions: stop when any is satisfied
///
/// Every condition is checked each generation so stateful conditions stay
/// up to date.
pub struct AnyOf<P> {
    conditions: Vec<Box<dyn StoppingCondition<P>>>,
    triggered: Option<usize>,
}

impl<P> AnyOf<P> {
    /// Create from a list of conditions
    pub fn new(conditions: Vec<Box<dyn StoppingCondition<P>>>) -> Self {
        Self {
            conditions,
            triggered: None,
        }
    }

    /// Add a condition
    pub fn with<C: StoppingCondition<P> + 'static>(mut self, condition: C) -> Self {
        self.conditions.push(Box::new(condition));
        self
    }
}

impl<P> Default for AnyOf<P> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<P> StoppingCondition<P> for AnyOf<P> {
    fn is_satisfied(&mut self, generation: usize, population: &Population<P>) -> bool {
        let mut triggered = None;
        for (i, condition) in self.conditions.iter_mut().enumerate() {
            if condition.is_satisfied(generation, population) && triggered.is_none() {
                triggered = Some(i);
            }
        }
        self.triggered = triggered;
        triggered.is_some()
    }

    fn reason(&self) -> &'static str {
        self.triggered
            .and_then(|i| self.conditions.get(i))
            .map(|c| c.reason())
            .unwrap_or("One of multiple criteria satisfied")
    }
}

pub mod prelude {
    pub use super::{
        AnyOf, FixedElapsedTime, FixedGenerationCount, StoppingCondition, UnchangedBestFitness,
        UnchangedMeanFitness,
    };
}
