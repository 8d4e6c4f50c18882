//! Chromosome type
//!
//! A chromosome couples an immutable binary encoding with the functions that
//! decode and score it, and memoizes its fitness.

use std::fmt;
use std::sync::{Arc, OnceLock};

use rand::Rng;

use crate::chromosome::bit_string::BitString;
use crate::error::ChromosomeError;
use crate::fitness::traits::{Decoder, FitnessFunction};

/// One candidate solution
///
/// The encoding never changes after construction, so the fitness is computed
/// at most once per chromosome and cached. Genetic operators always build new
/// chromosomes instead of editing existing ones.
pub struct Chromosome<P> {
    encoding: BitString,
    fitness_function: Arc<dyn FitnessFunction<P>>,
    decoder: Arc<dyn Decoder<P>>,
    fitness: OnceLock<f64>,
}

impl<P: 'static> Chromosome<P> {
    /// Create a chromosome from an encoding and its decode/fitness functions
    pub fn new<F, D>(
        encoding: BitString,
        fitness_function: F,
        decoder: D,
    ) -> Result<Self, ChromosomeError>
    where
        F: FitnessFunction<P> + 'static,
        D: Decoder<P> + 'static,
    {
        Self::from_shared(encoding, Arc::new(fitness_function), Arc::new(decoder))
    }

    /// Create a chromosome sharing already reference-counted functions
    pub fn from_shared(
        encoding: BitString,
        fitness_function: Arc<dyn FitnessFunction<P>>,
        decoder: Arc<dyn Decoder<P>>,
    ) -> Result<Self, ChromosomeError> {
        if encoding.is_empty() {
            return Err(ChromosomeError::InvalidChromosome(
                "encoding length must be positive".to_string(),
            ));
        }
        Ok(Self {
            encoding,
            fitness_function,
            decoder,
            fitness: OnceLock::new(),
        })
    }

    /// Create a chromosome with a uniformly random encoding
    pub fn random<R: Rng + ?Sized>(
        length: usize,
        fitness_function: Arc<dyn FitnessFunction<P>>,
        decoder: Arc<dyn Decoder<P>>,
        rng: &mut R,
    ) -> Result<Self, ChromosomeError> {
        Self::from_shared(BitString::random(length, rng), fitness_function, decoder)
    }

    /// Create a new chromosome with a different encoding and the same
    /// decode/fitness functions
    ///
    /// The new chromosome starts with an empty fitness cache.
    pub fn with_encoding(&self, encoding: BitString) -> Result<Self, ChromosomeError> {
        Self::from_shared(
            encoding,
            Arc::clone(&self.fitness_function),
            Arc::clone(&self.decoder),
        )
    }
}

impl<P> Chromosome<P> {
    /// The binary encoding
    pub fn encoding(&self) -> &BitString {
        &self.encoding
    }

    /// Length of the encoding
    pub fn len(&self) -> usize {
        self.encoding.len()
    }

    /// Always false: zero-length chromosomes cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.encoding.is_empty()
    }

    /// Decode the encoding into its phenotype
    pub fn decode(&self) -> P {
        self.decoder.decode(&self.encoding)
    }

    /// The fitness, computed on first access and cached afterwards
    pub fn fitness(&self) -> f64 {
        *self
            .fitness
            .get_or_init(|| self.fitness_function.compute(&self.decode()))
    }

    /// Check if the fitness has already been computed
    pub fn is_evaluated(&self) -> bool {
        self.fitness.get().is_some()
    }

    /// Two chromosomes are the same iff their encodings are bit-identical
    pub fn is_same(&self, other: &Self) -> bool {
        self.encoding == other.encoding
    }

    /// Check if this chromosome is strictly fitter than another
    pub fn is_fitter_than(&self, other: &Self) -> bool {
        self.fitness() > other.fitness()
    }

    /// The shared fitness function
    pub fn fitness_function(&self) -> &Arc<dyn FitnessFunction<P>> {
        &self.fitness_function
    }

    /// The shared decoder
    pub fn decoder(&self) -> &Arc<dyn Decoder<P>> {
        &self.decoder
    }
}

impl<P> Clone for Chromosome<P> {
    /// Copies the encoding into an independent chromosome; an already computed
    /// fitness is carried over into the copy's own cache.
    fn clone(&self) -> Self {
        let fitness = OnceLock::new();
        if let Some(&value) = self.fitness.get() {
            let _ = fitness.set(value);
        }
        Self {
            encoding: self.encoding.clone(),
            fitness_function: Arc::clone(&self.fitness_function),
            decoder: Arc::clone(&self.decoder),
            fitness,
        }
    }
}

impl<P> fmt::Debug for Chromosome<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chromosome")
            .field("encoding", &self.encoding.to_string())
            .field("fitness", &self.fitness.get())
            .finish()
    }
}

impl<P> fmt::Display for Chromosome<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(f={} {})", self.fitness(), self.encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ones_count(bits: &BitString) -> usize {
        bits.count_ones()
    }

    fn score(ones: &usize) -> f64 {
        *ones as f64
    }

    fn make(bits: &str) -> Chromosome<usize> {
        Chromosome::new(bits.parse().unwrap(), score, ones_count).unwrap()
    }

    #[test]
    fn test_chromosome_new() {
        let chromosome = make("1101");
        assert_eq!(chromosome.len(), 4);
        assert!(!chromosome.is_evaluated());
        assert_eq!(chromosome.decode(), 3);
        assert_eq!(chromosome.fitness(), 3.0);
        assert!(chromosome.is_evaluated());
    }

    #[test]
    fn test_chromosome_zero_length_rejected() {
        let result = Chromosome::<usize>::new(BitString::zeros(0), score, ones_count);
        assert!(matches!(result, Err(ChromosomeError::InvalidChromosome(_))));

        let mut rng = StdRng::seed_from_u64(1);
        let result =
            Chromosome::<usize>::random(0, Arc::new(score), Arc::new(ones_count), &mut rng);
        assert!(result.is_err());
    }

    #[test]
    fn test_fitness_is_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fitness = move |ones: &usize| {
            counter.fetch_add(1, Ordering::SeqCst);
            *ones as f64
        };
        let chromosome =
            Chromosome::<usize>::new("111".parse().unwrap(), fitness, ones_count).unwrap();

        let first = chromosome.fitness();
        let second = chromosome.fitness();
        let third = chromosome.fitness();
        assert_eq!(first, 3.0);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(second.to_bits(), third.to_bits());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_with_encoding_starts_unevaluated() {
        let parent = make("111");
        parent.fitness();

        let child = parent.with_encoding("100".parse().unwrap()).unwrap();
        assert!(!child.is_evaluated());
        assert_eq!(child.fitness(), 1.0);
        assert!(Arc::ptr_eq(child.decoder(), parent.decoder()));
    }

    #[test]
    fn test_clone_is_independent_copy() {
        let original = make("1010");
        let copy = original.clone();
        assert!(copy.is_same(&original));
        assert!(!copy.is_evaluated());

        original.fitness();
        assert!(!copy.is_evaluated());
        assert!(original.clone().is_evaluated());
    }

    #[test]
    fn test_is_same_and_is_fitter_than() {
        let a = make("110");
        let b = make("110");
        let c = make("100");

        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
        assert!(a.is_fitter_than(&c));
        assert!(!a.is_fitter_than(&b));
    }

    #[test]
    fn test_chromosome_display() {
        let chromosome = make("101");
        assert_eq!(chromosome.to_string(), "(f=2 101)");
    }

    #[test]
    fn test_random_chromosome_length() {
        let mut rng = StdRng::seed_from_u64(3);
        let chromosome =
            Chromosome::<usize>::random(36, Arc::new(score), Arc::new(ones_count), &mut rng)
                .unwrap();
        assert_eq!(chromosome.len(), 36);
    }
}
