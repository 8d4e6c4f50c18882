//! Population type
//!
//! This module provides the Population container type.

use std::cmp::Ordering;
use std::sync::Arc;

use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::chromosome::chromosome::Chromosome;
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::{Decoder, FitnessFunction};

/// Fitness used for ranking: NaN ranks below every number
pub(crate) fn ranking_fitness(fitness: f64) -> f64 {
    if fitness.is_nan() {
        f64::NEG_INFINITY
    } else {
        fitness
    }
}

/// Descending order by ranking fitness
fn fitter_first<P>(a: &Arc<Chromosome<P>>, b: &Arc<Chromosome<P>>) -> Ordering {
    ranking_fitness(b.fitness()).total_cmp(&ranking_fitness(a.fitness()))
}

/// A capped, insertion-ordered collection of chromosomes
///
/// Chromosomes are held behind `Arc` so elites can be carried into the next
/// generation, and handed to selection, without copying.
pub struct Population<P> {
    chromosomes: Vec<Arc<Chromosome<P>>>,
    capacity: usize,
}

impl<P> Population<P> {
    /// Create an empty population holding at most `capacity` chromosomes
    pub fn new(capacity: usize) -> EvoResult<Self> {
        if capacity == 0 {
            return Err(EvolutionError::invalid_parameter(
                "population capacity must be at least 1",
            ));
        }
        Ok(Self {
            chromosomes: Vec::with_capacity(capacity),
            capacity,
        })
    }

    /// Create a population from existing chromosomes
    pub fn from_chromosomes(chromosomes: Vec<Chromosome<P>>, capacity: usize) -> EvoResult<Self> {
        let mut population = Self::new(capacity)?;
        for chromosome in chromosomes {
            population.add(chromosome)?;
        }
        Ok(population)
    }

    /// An empty population with the same capacity, to hold the next generation
    pub fn next_generation(&self) -> Self {
        Self {
            chromosomes: Vec::with_capacity(self.capacity),
            capacity: self.capacity,
        }
    }

    /// Add a chromosome
    pub fn add(&mut self, chromosome: Chromosome<P>) -> EvoResult<()> {
        self.add_shared(Arc::new(chromosome))
    }

    /// Add a chromosome that may also be referenced elsewhere
    pub fn add_shared(&mut self, chromosome: Arc<Chromosome<P>>) -> EvoResult<()> {
        if self.chromosomes.len() >= self.capacity {
            return Err(EvolutionError::PopulationFull {
                capacity: self.capacity,
            });
        }
        self.chromosomes.push(chromosome);
        Ok(())
    }

    /// Append every chromosome of `other`, sharing rather than copying them
    ///
    /// Fails without modifying `self` if the result would exceed capacity.
    pub fn merge(&mut self, other: &Population<P>) -> EvoResult<()> {
        if self.chromosomes.len() + other.len() > self.capacity {
            return Err(EvolutionError::PopulationFull {
                capacity: self.capacity,
            });
        }
        self.chromosomes.extend(other.iter().cloned());
        Ok(())
    }

    /// Replace the chromosome at `index`, returning the one it displaced
    pub fn replace(
        &mut self,
        index: usize,
        chromosome: Chromosome<P>,
    ) -> EvoResult<Arc<Chromosome<P>>> {
        let len = self.chromosomes.len();
        let slot = self.chromosomes.get_mut(index).ok_or_else(|| {
            EvolutionError::InvalidParameter(format!(
                "index {index} out of range for population of size {len}"
            ))
        })?;
        Ok(std::mem::replace(slot, Arc::new(chromosome)))
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Maximum number of chromosomes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get a chromosome by index
    pub fn get(&self, index: usize) -> Option<&Arc<Chromosome<P>>> {
        self.chromosomes.get(index)
    }

    /// Get an iterator over the chromosomes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Chromosome<P>>> {
        self.chromosomes.iter()
    }

    /// Get the underlying chromosomes
    pub fn chromosomes(&self) -> &[Arc<Chromosome<P>>] {
        &self.chromosomes
    }

    /// Get the fittest chromosome
    ///
    /// Ties go to the chromosome inserted first. NaN fitness ranks below
    /// every number.
    pub fn fittest(&self) -> Option<&Arc<Chromosome<P>>> {
        let mut chromosomes = self.chromosomes.iter();
        let first = chromosomes.next()?;
        Some(chromosomes.fold(first, |best, candidate| {
            if ranking_fitness(candidate.fitness()) > ranking_fitness(best.fitness()) {
                candidate
            } else {
                best
            }
        }))
    }

    /// The `count` fittest chromosomes, best first
    ///
    /// The sort is stable, so chromosomes with equal fitness keep their
    /// insertion order.
    pub fn elite(&self, count: usize) -> Vec<Arc<Chromosome<P>>> {
        let mut sorted = self.chromosomes.clone();
        sorted.sort_by(fitter_first);
        sorted.truncate(count);
        sorted
    }

    /// Fitness of every chromosome, in insertion order
    pub fn fitnesses(&self) -> Vec<f64> {
        self.chromosomes.iter().map(|c| c.fitness()).collect()
    }

    /// Count the chromosomes whose fitness has been computed
    pub fn count_evaluated(&self) -> usize {
        self.chromosomes.iter().filter(|c| c.is_evaluated()).count()
    }

    /// Check if all chromosomes have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.chromosomes.iter().all(|c| c.is_evaluated())
    }

    /// Compute the fitness of every chromosome (sequential)
    pub fn evaluate(&self) {
        for chromosome in &self.chromosomes {
            chromosome.fitness();
        }
    }
}

impl<P: 'static> Population<P> {
    /// Create a population filled with random chromosomes
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        length: usize,
        fitness_function: Arc<dyn FitnessFunction<P>>,
        decoder: Arc<dyn Decoder<P>>,
        rng: &mut R,
    ) -> EvoResult<Self> {
        let mut population = Self::new(size)?;
        for _ in 0..size {
            population.add(Chromosome::random(
                length,
                Arc::clone(&fitness_function),
                Arc::clone(&decoder),
                rng,
            )?)?;
        }
        Ok(population)
    }
}

/// Parallel evaluation support (requires `parallel` feature)
#[cfg(feature = "parallel")]
impl<P> Population<P> {
    /// Compute the fitness of every chromosome (parallel)
    ///
    /// Runs on the rayon pool the caller is installed in, or the global pool.
    pub fn evaluate_parallel(&self) {
        self.chromosomes.par_iter().for_each(|chromosome| {
            chromosome.fitness();
        });
    }
}

/// Sequential fallback for parallel evaluation (when `parallel` feature is disabled)
#[cfg(not(feature = "parallel"))]
impl<P> Population<P> {
    /// Compute the fitness of every chromosome (sequential fallback)
    pub fn evaluate_parallel(&self) {
        self.evaluate();
    }
}

impl<P> Clone for Population<P> {
    fn clone(&self) -> Self {
        Self {
            chromosomes: self.chromosomes.clone(),
            capacity: self.capacity,
        }
    }
}

impl<P> std::fmt::Debug for Population<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Population")
            .field("capacity", &self.capacity)
            .field("chromosomes", &self.chromosomes)
            .finish()
    }
}

impl<P> std::ops::Index<usize> for Population<P> {
    type Output = Arc<Chromosome<P>>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.chromosomes[index]
    }
}

impl<'a, P> IntoIterator for &'a Population<P> {
    type Item = &'a Arc<Chromosome<P>>;
    type IntoIter = std::slice::Iter<'a, Arc<Chromosome<P>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.chromosomes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::bit_string::BitString;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn value(bits: &BitString) -> u64 {
        bits.substring_value(0, bits.len()).unwrap()
    }

    fn chromosome(bits: &str) -> Chromosome<u64> {
        Chromosome::new(bits.parse().unwrap(), |v: &u64| *v as f64, value).unwrap()
    }

    fn create_test_population() -> Population<u64> {
        let chromosomes = ["001", "011", "101", "010", "100"]
            .into_iter()
            .map(chromosome)
            .collect();
        Population::from_chromosomes(chromosomes, 5).unwrap()
    }

    #[test]
    fn test_population_new() {
        let pop: Population<u64> = Population::new(10).unwrap();
        assert!(pop.is_empty());
        assert_eq!(pop.capacity(), 10);
        assert!(Population::<u64>::new(0).is_err());
    }

    #[test]
    fn test_population_capacity_enforced() {
        let mut pop = Population::new(2).unwrap();
        pop.add(chromosome("01")).unwrap();
        pop.add(chromosome("10")).unwrap();
        let err = pop.add(chromosome("11")).unwrap_err();
        assert_eq!(err, EvolutionError::PopulationFull { capacity: 2 });
        assert_eq!(pop.len(), 2);
    }

    #[test]
    fn test_population_fittest() {
        let pop = create_test_population();
        assert_eq!(pop.fittest().unwrap().fitness(), 5.0);
    }

    #[test]
    fn test_fittest_tie_goes_to_first_inserted() {
        let a = Arc::new(chromosome("110"));
        let b = Arc::new(chromosome("110"));
        let mut pop = Population::new(3).unwrap();
        pop.add(chromosome("001")).unwrap();
        pop.add_shared(Arc::clone(&a)).unwrap();
        pop.add_shared(Arc::clone(&b)).unwrap();

        assert!(Arc::ptr_eq(pop.fittest().unwrap(), &a));
    }

    #[test]
    fn test_fittest_ignores_nan() {
        let nan = Chromosome::new("1".parse().unwrap(), |_: &u64| f64::NAN, value).unwrap();
        let mut pop = Population::new(2).unwrap();
        pop.add(nan).unwrap();
        pop.add(chromosome("0")).unwrap();
        assert_eq!(pop.fittest().unwrap().fitness(), 0.0);
    }

    #[test]
    fn test_population_elite() {
        let pop = create_test_population();
        let elite: Vec<f64> = pop.elite(3).iter().map(|c| c.fitness()).collect();
        assert_eq!(elite, vec![5.0, 4.0, 3.0]);
        assert!(pop.elite(0).is_empty());
        assert_eq!(pop.elite(10).len(), 5);
    }

    #[test]
    fn test_elite_is_stable_for_ties() {
        let first = Arc::new(chromosome("11"));
        let second = Arc::new(chromosome("11"));
        let mut pop = Population::new(3).unwrap();
        pop.add(chromosome("00")).unwrap();
        pop.add_shared(Arc::clone(&first)).unwrap();
        pop.add_shared(Arc::clone(&second)).unwrap();

        let elite = pop.elite(2);
        assert!(Arc::ptr_eq(&elite[0], &first));
        assert!(Arc::ptr_eq(&elite[1], &second));
    }

    #[test]
    fn test_population_random() {
        let mut rng = StdRng::seed_from_u64(11);
        let fitness: Arc<dyn FitnessFunction<u64>> = Arc::new(|v: &u64| *v as f64);
        let decoder: Arc<dyn Decoder<u64>> = Arc::new(value);
        let pop = Population::random(10, 8, fitness, decoder, &mut rng).unwrap();

        assert_eq!(pop.len(), 10);
        assert_eq!(pop.capacity(), 10);
        assert!(pop.iter().all(|c| c.len() == 8));
        assert!(!pop.all_evaluated());
    }

    #[test]
    fn test_population_evaluate() {
        let pop = create_test_population();
        assert_eq!(pop.count_evaluated(), 0);
        pop.evaluate();
        assert!(pop.all_evaluated());
    }

    #[test]
    fn test_population_evaluate_parallel() {
        let mut rng = StdRng::seed_from_u64(5);
        let fitness: Arc<dyn FitnessFunction<u64>> = Arc::new(|v: &u64| *v as f64);
        let decoder: Arc<dyn Decoder<u64>> = Arc::new(value);
        let pop = Population::random(100, 16, fitness, decoder, &mut rng).unwrap();

        pop.evaluate_parallel();
        assert!(pop.all_evaluated());
        assert_eq!(pop.count_evaluated(), 100);
    }

    #[test]
    fn test_population_merge() {
        let mut pop = Population::new(6).unwrap();
        pop.add(chromosome("111")).unwrap();
        let other = create_test_population();

        pop.merge(&other).unwrap();
        assert_eq!(pop.len(), 6);
        assert!(Arc::ptr_eq(&pop[1], &other[0]));
        assert_eq!(pop.fittest().unwrap().fitness(), 7.0);

        let err = pop.merge(&other).unwrap_err();
        assert_eq!(err, EvolutionError::PopulationFull { capacity: 6 });
        assert_eq!(pop.len(), 6);
    }

    #[test]
    fn test_population_replace() {
        let mut pop = create_test_population();
        let displaced = pop.replace(2, chromosome("111")).unwrap();
        assert_eq!(displaced.fitness(), 5.0);
        assert_eq!(pop[2].fitness(), 7.0);
        assert_eq!(pop.len(), 5);
        assert!(pop.replace(5, chromosome("000")).is_err());
    }

    #[test]
    fn test_next_generation_keeps_capacity() {
        let pop = create_test_population();
        let next = pop.next_generation();
        assert!(next.is_empty());
        assert_eq!(next.capacity(), pop.capacity());
    }

    #[test]
    fn test_population_indexing_and_fitnesses() {
        let pop = create_test_population();
        assert_eq!(pop[0].fitness(), 1.0);
        assert_eq!(pop.fitnesses(), vec![1.0, 3.0, 5.0, 2.0, 4.0]);
        assert_eq!((&pop).into_iter().count(), 5);
    }
}
