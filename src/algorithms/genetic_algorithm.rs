//! Generational genetic algorithm
//!
//! This module implements the evolution engine: a generational GA with
//! elitism whose offspring production and fitness evaluation run on a
//! bounded worker pool.

use std::panic::{self, AssertUnwindSafe};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::chromosome::chromosome::Chromosome;
use crate::diagnostics::convergence::ConvergenceListener;
use crate::diagnostics::PopulationStatisticalSummary;
use crate::error::{check_probability, EvoResult, EvolutionError};
use crate::operators::traits::{CrossoverPolicy, MutationPolicy, SelectionPolicy};
use crate::population::population::Population;
use crate::rate::{ConstantRate, RateGenerator};
use crate::termination::StoppingCondition;

use super::executor::Executor;

/// Default probability of applying crossover to a selected pair
pub const DEFAULT_CROSSOVER_RATE: f64 = 0.9;
/// Default per-bit mutation probability
pub const DEFAULT_MUTATION_RATE: f64 = 0.02;
/// Default fraction of the population carried over unchanged
pub const DEFAULT_ELITISM_RATE: f64 = 0.1;

/// Lifecycle of the engine
///
/// `Converged` and `Error` are terminal for a run; a new call to
/// [`GeneticAlgorithm::evolve`] starts over from `Running`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Built, never run
    Initialized,
    /// A run is in progress
    Running,
    /// The stopping condition was satisfied
    Converged,
    /// The last run failed
    Error,
}

/// Seed for offspring task `task` of a generation
fn task_seed(generation_seed: u64, task: usize) -> u64 {
    generation_seed.wrapping_add((task as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Sample a rate generator at the extremes and midpoint of the rank range
/// and reject it if any value falls outside `[0, 1]`
fn check_rate_generator(name: &str, generator: &dyn RateGenerator) -> EvoResult<()> {
    let neutral = PopulationStatisticalSummary::from_fitnesses(&[0.0])?;
    for rank in [0.0, 0.5, 1.0] {
        check_probability(name, generator.rate(0, &neutral, rank))?;
    }
    Ok(())
}

/// Builder for GeneticAlgorithm
pub struct GeneticAlgorithmBuilder<P, S, C, M> {
    selection: Option<S>,
    crossover: Option<C>,
    mutation: Option<M>,
    crossover_rate: Option<Box<dyn RateGenerator>>,
    mutation_rate: Option<Box<dyn RateGenerator>>,
    crossover_probability: f64,
    mutation_probability: f64,
    elitism_rate: f64,
    seed: Option<u64>,
    listeners: Vec<Box<dyn ConvergenceListener<P>>>,
}

impl<P> GeneticAlgorithmBuilder<P, (), (), ()> {
    /// Create a builder with default rates and no operators
    pub fn new() -> Self {
        Self {
            selection: None,
            crossover: None,
            mutation: None,
            crossover_rate: None,
            mutation_rate: None,
            crossover_probability: DEFAULT_CROSSOVER_RATE,
            mutation_probability: DEFAULT_MUTATION_RATE,
            elitism_rate: DEFAULT_ELITISM_RATE,
            seed: None,
            listeners: Vec::new(),
        }
    }
}

impl<P> Default for GeneticAlgorithmBuilder<P, (), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, S, C, M> GeneticAlgorithmBuilder<P, S, C, M> {
    /// Set a constant crossover rate
    pub fn crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_probability = rate;
        self.crossover_rate = None;
        self
    }

    /// Set a crossover rate generator
    pub fn crossover_rate_generator<G: RateGenerator + 'static>(mut self, generator: G) -> Self {
        self.crossover_rate = Some(Box::new(generator));
        self
    }

    /// Set a constant per-bit mutation rate
    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_probability = rate;
        self.mutation_rate = None;
        self
    }

    /// Set a mutation rate generator
    pub fn mutation_rate_generator<G: RateGenerator + 'static>(mut self, generator: G) -> Self {
        self.mutation_rate = Some(Box::new(generator));
        self
    }

    /// Set the fraction of the population carried over unchanged
    pub fn elitism_rate(mut self, rate: f64) -> Self {
        self.elitism_rate = rate;
        self
    }

    /// Seed the engine's random source for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Register a convergence listener; listeners run in registration order
    pub fn listener<L: ConvergenceListener<P> + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Set the selection policy
    pub fn selection<NewS>(self, selection: NewS) -> GeneticAlgorithmBuilder<P, NewS, C, M>
    where
        NewS: SelectionPolicy<P>,
    {
        GeneticAlgorithmBuilder {
            selection: Some(selection),
            crossover: self.crossover,
            mutation: self.mutation,
            crossover_rate: self.crossover_rate,
            mutation_rate: self.mutation_rate,
            crossover_probability: self.crossover_probability,
            mutation_probability: self.mutation_probability,
            elitism_rate: self.elitism_rate,
            seed: self.seed,
            listeners: self.listeners,
        }
    }

    /// Set the crossover policy
    pub fn crossover<NewC>(self, crossover: NewC) -> GeneticAlgorithmBuilder<P, S, NewC, M>
    where
        NewC: CrossoverPolicy<P>,
    {
        GeneticAlgorithmBuilder {
            selection: self.selection,
            crossover: Some(crossover),
            mutation: self.mutation,
            crossover_rate: self.crossover_rate,
            mutation_rate: self.mutation_rate,
            crossover_probability: self.crossover_probability,
            mutation_probability: self.mutation_probability,
            elitism_rate: self.elitism_rate,
            seed: self.seed,
            listeners: self.listeners,
        }
    }

    /// Set the mutation policy
    pub fn mutation<NewM>(self, mutation: NewM) -> GeneticAlgorithmBuilder<P, S, C, NewM>
    where
        NewM: MutationPolicy<P>,
    {
        GeneticAlgorithmBuilder {
            selection: self.selection,
            crossover: self.crossover,
            mutation: Some(mutation),
            crossover_rate: self.crossover_rate,
            mutation_rate: self.mutation_rate,
            crossover_probability: self.crossover_probability,
            mutation_probability: self.mutation_probability,
            elitism_rate: self.elitism_rate,
            seed: self.seed,
            listeners: self.listeners,
        }
    }
}

impl<P, S, C, M> GeneticAlgorithmBuilder<P, S, C, M>
where
    P: 'static,
    S: SelectionPolicy<P>,
    C: CrossoverPolicy<P>,
    M: MutationPolicy<P>,
{
    /// Build the GeneticAlgorithm instance
    pub fn build(self) -> EvoResult<GeneticAlgorithm<P, S, C, M>> {
        let selection = self.selection.ok_or_else(|| {
            EvolutionError::invalid_parameter("Selection policy must be specified")
        })?;
        let crossover = self.crossover.ok_or_else(|| {
            EvolutionError::invalid_parameter("Crossover policy must be specified")
        })?;
        let mutation = self.mutation.ok_or_else(|| {
            EvolutionError::invalid_parameter("Mutation policy must be specified")
        })?;
        check_probability("elitism rate", self.elitism_rate)?;

        let crossover_rate = match self.crossover_rate {
            Some(generator) => generator,
            None => Box::new(ConstantRate::new(self.crossover_probability)?),
        };
        let mutation_rate = match self.mutation_rate {
            Some(generator) => generator,
            None => Box::new(ConstantRate::new(self.mutation_probability)?),
        };
        check_rate_generator("crossover rate", crossover_rate.as_ref())?;
        check_rate_generator("mutation rate", mutation_rate.as_ref())?;

        Ok(GeneticAlgorithm {
            selection,
            crossover,
            mutation,
            crossover_rate,
            mutation_rate,
            elitism_rate: self.elitism_rate,
            seed: self.seed,
            listeners: self.listeners,
            state: EngineState::Initialized,
            generations_evolved: 0,
            termination_reason: None,
        })
    }
}

/// Everything one offspring task reads; shared immutably by all workers
struct Breeding<'a, P, S, C, M> {
    selection: &'a S,
    crossover: &'a C,
    mutation: &'a M,
    crossover_rate: &'a dyn RateGenerator,
    mutation_rate: &'a dyn RateGenerator,
    parents: &'a Population<P>,
    statistics: &'a PopulationStatisticalSummary,
    generation: usize,
}

impl<P, S, C, M> Breeding<'_, P, S, C, M>
where
    S: SelectionPolicy<P>,
    C: CrossoverPolicy<P>,
    M: MutationPolicy<P>,
{
    /// Selection, crossover and mutation for one pair of children
    fn breed<R: Rng + ?Sized>(&self, rng: &mut R) -> EvoResult<[Chromosome<P>; 2]> {
        let pair = self.selection.select(self.parents, rng)?;
        let rank = (self.statistics.normalized_rank(pair.first().fitness())
            + self.statistics.normalized_rank(pair.second().fitness()))
            / 2.0;

        let crossover_rate = self
            .crossover_rate
            .rate(self.generation, self.statistics, rank);
        let (first, second) = self
            .crossover
            .crossover(&pair, crossover_rate, rng)?
            .into_parts();

        let mutation_rate = self.mutation_rate.rate(self.generation, self.statistics, rank);
        Ok([
            self.mutation.mutate(&first, mutation_rate, rng)?,
            self.mutation.mutate(&second, mutation_rate, rng)?,
        ])
    }
}

/// Generational genetic algorithm
///
/// Each generation carries the `floor(elitism_rate * n)` fittest chromosomes
/// over unchanged, fills the rest of the population with offspring, evaluates
/// them, notifies the listeners and checks the stopping condition.
pub struct GeneticAlgorithm<P, S, C, M> {
    selection: S,
    crossover: C,
    mutation: M,
    crossover_rate: Box<dyn RateGenerator>,
    mutation_rate: Box<dyn RateGenerator>,
    elitism_rate: f64,
    seed: Option<u64>,
    listeners: Vec<Box<dyn ConvergenceListener<P>>>,
    state: EngineState,
    generations_evolved: usize,
    termination_reason: Option<&'static str>,
}

impl<P> GeneticAlgorithm<P, (), (), ()> {
    /// Create a builder for GeneticAlgorithm
    pub fn builder() -> GeneticAlgorithmBuilder<P, (), (), ()> {
        GeneticAlgorithmBuilder::new()
    }
}

impl<P, S, C, M> GeneticAlgorithm<P, S, C, M> {
    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Generations evolved by the last run, not counting the initial population
    pub fn generations_evolved(&self) -> usize {
        self.generations_evolved
    }

    /// Reason reported by the stopping condition of the last converged run
    pub fn termination_reason(&self) -> Option<&'static str> {
        self.termination_reason
    }

    /// Fraction of the population carried over unchanged
    pub fn elitism_rate(&self) -> f64 {
        self.elitism_rate
    }

    /// The selection policy
    pub fn selection(&self) -> &S {
        &self.selection
    }

    /// The crossover policy
    pub fn crossover(&self) -> &C {
        &self.crossover
    }

    /// The mutation policy
    pub fn mutation(&self) -> &M {
        &self.mutation
    }

    /// Register another convergence listener
    pub fn add_listener<L: ConvergenceListener<P> + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(
        &mut self,
        generation: usize,
        population: &Population<P>,
        statistics: &PopulationStatisticalSummary,
    ) {
        for listener in &mut self.listeners {
            listener.notify(generation, population, statistics);
        }
    }
}

impl<P, S, C, M> GeneticAlgorithm<P, S, C, M>
where
    P: 'static,
    S: SelectionPolicy<P>,
    C: CrossoverPolicy<P>,
    M: MutationPolicy<P>,
{
    /// Evolve `initial` until `stopping_condition` is satisfied
    ///
    /// The initial population is generation 0: it is evaluated, reported to
    /// the listeners and checked against the stopping condition before any
    /// offspring are produced. Returns the final population, which has the
    /// same size as `initial`.
    ///
    /// Fails with [`EvolutionError::InvalidParameter`] if `initial` is empty
    /// or `parallelism` is 0. Any operator failure aborts the run and is
    /// returned as is. A panic in a fitness function, decoder or operator
    /// leaves the engine in [`EngineState::Error`] and is propagated.
    #[instrument(level = "debug", skip_all, fields(parallelism = parallelism))]
    pub fn evolve<T>(
        &mut self,
        initial: Population<P>,
        stopping_condition: &mut T,
        parallelism: usize,
    ) -> EvoResult<Population<P>>
    where
        T: StoppingCondition<P> + ?Sized,
    {
        self.generations_evolved = 0;
        self.termination_reason = None;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run(initial, stopping_condition, parallelism)
        }));
        match outcome {
            Ok(Ok(population)) => {
                self.state = EngineState::Converged;
                Ok(population)
            }
            Ok(Err(e)) => {
                self.state = EngineState::Error;
                warn!(error = %e, generation = self.generations_evolved, "evolution failed");
                Err(e)
            }
            Err(payload) => {
                self.state = EngineState::Error;
                warn!(generation = self.generations_evolved, "evolution panicked");
                panic::resume_unwind(payload)
            }
        }
    }

    fn run<T>(
        &mut self,
        initial: Population<P>,
        stopping_condition: &mut T,
        parallelism: usize,
    ) -> EvoResult<Population<P>>
    where
        T: StoppingCondition<P> + ?Sized,
    {
        if initial.is_empty() {
            return Err(EvolutionError::invalid_parameter(
                "initial population must not be empty",
            ));
        }
        let executor = Executor::new(parallelism)?;
        self.selection.validate(initial.len())?;

        let population_size = initial.len();
        let elite_count = ((self.elitism_rate * population_size as f64).floor() as usize)
            .min(population_size);
        let mut controller = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        self.state = EngineState::Running;
        info!(
            population_size,
            elite_count,
            parallelism = executor.parallelism(),
            seed = ?self.seed,
            "starting evolution"
        );

        let mut generation = 0;
        let mut population = initial;
        executor.evaluate(&population);
        let mut statistics = PopulationStatisticalSummary::from_population(&population)?;
        self.notify(generation, &population, &statistics);

        while !stopping_condition.is_satisfied(generation, &population) {
            let next = self.next_generation(
                &executor,
                &population,
                &statistics,
                generation,
                elite_count,
                controller.gen(),
            )?;
            generation += 1;
            population = next;

            executor.evaluate(&population);
            statistics = PopulationStatisticalSummary::from_population(&population)?;
            self.generations_evolved = generation;
            debug!(
                generation,
                max_fitness = statistics.max_fitness(),
                mean_fitness = statistics.mean_fitness(),
                offspring = population_size - elite_count,
                "generation evolved"
            );
            self.notify(generation, &population, &statistics);
        }

        let reason = stopping_condition.reason();
        self.termination_reason = Some(reason);
        info!(
            generations = generation,
            max_fitness = statistics.max_fitness(),
            mean_fitness = statistics.mean_fitness(),
            reason,
            "evolution converged"
        );
        Ok(population)
    }

    /// Produce the next generation: elites first, then offspring in task order
    fn next_generation(
        &self,
        executor: &Executor,
        parents: &Population<P>,
        statistics: &PopulationStatisticalSummary,
        generation: usize,
        elite_count: usize,
        generation_seed: u64,
    ) -> EvoResult<Population<P>> {
        let mut next = parents.next_generation();
        for elite in parents.elite(elite_count) {
            next.add_shared(elite)?;
        }

        let needed = parents.len() - elite_count;
        let breeding = Breeding {
            selection: &self.selection,
            crossover: &self.crossover,
            mutation: &self.mutation,
            crossover_rate: self.crossover_rate.as_ref(),
            mutation_rate: self.mutation_rate.as_ref(),
            parents,
            statistics,
            generation,
        };
        let offspring = executor.try_map(needed.div_ceil(2), |task| {
            let mut rng = StdRng::seed_from_u64(task_seed(generation_seed, task));
            breeding.breed(&mut rng)
        })?;

        for child in offspring.into_iter().flatten().take(needed) {
            next.add(child)?;
        }
        Ok(next)
    }
}
