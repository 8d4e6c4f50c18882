//! Property-based tests for evolve-ga
//!
//! Uses proptest to verify invariants and properties of the library.

use std::sync::Arc;

use evolve_ga::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn ones(bits: &BitString) -> usize {
    bits.count_ones()
}

fn chromosome(bits: Vec<bool>) -> Chromosome<usize> {
    Chromosome::new(BitString::from_bools(&bits), |n: &usize| *n as f64, ones).unwrap()
}

fn equal_length_parents() -> impl Strategy<Value = (Vec<bool>, Vec<bool>)> {
    (2usize..200).prop_flat_map(|len| {
        (
            prop::collection::vec(any::<bool>(), len),
            prop::collection::vec(any::<bool>(), len),
        )
    })
}

proptest! {
    // ==================== BitString Properties ====================

    #[test]
    fn bit_string_text_roundtrip(bits in prop::collection::vec(any::<bool>(), 0..300)) {
        let original = BitString::from_bools(&bits);
        let parsed: BitString = original.to_string().parse().unwrap();
        prop_assert_eq!(&original, &parsed);
        prop_assert_eq!(original.iter().collect::<Vec<_>>(), bits);
    }

    #[test]
    fn bit_string_complement_counts(bits in prop::collection::vec(any::<bool>(), 0..300)) {
        let original = BitString::from_bools(&bits);
        let complement = original.complement();
        prop_assert_eq!(complement.count_ones(), original.count_zeros());
        prop_assert_eq!(original.hamming_distance(&complement).unwrap(), bits.len());
    }

    #[test]
    fn substring_value_matches_bits(
        bits in prop::collection::vec(any::<bool>(), 1..64),
        start_frac in 0.0f64..1.0,
    ) {
        let encoding = BitString::from_bools(&bits);
        let start = ((bits.len() as f64) * start_frac) as usize;
        let expected = bits[start..]
            .iter()
            .fold(0u64, |acc, &b| (acc << 1) | u64::from(b));
        prop_assert_eq!(encoding.substring_value(start, bits.len()).unwrap(), expected);
    }

    // ==================== Chromosome Properties ====================

    #[test]
    fn fitness_is_idempotent(bits in prop::collection::vec(any::<bool>(), 1..100)) {
        let c = chromosome(bits);
        let first = c.fitness();
        prop_assert_eq!(first.to_bits(), c.fitness().to_bits());
        prop_assert_eq!(first.to_bits(), c.fitness().to_bits());
    }

    // ==================== Crossover Properties ====================

    #[test]
    fn one_point_crossover_structure(
        (p1, p2) in equal_length_parents(),
        cut_frac in 0.0f64..1.0,
    ) {
        let len = p1.len();
        let cut = 1 + ((len - 1) as f64 * cut_frac) as usize;
        let cut = cut.min(len - 1);
        let parents = ChromosomePair::from_owned(chromosome(p1.clone()), chromosome(p2.clone()));

        let children = OnePointBinaryCrossover::new().mate_at(&parents, cut).unwrap();
        let a: Vec<bool> = children.first().encoding().iter().collect();
        let b: Vec<bool> = children.second().encoding().iter().collect();

        prop_assert_eq!(&a[..cut], &p1[..cut]);
        prop_assert_eq!(&a[cut..], &p2[cut..]);
        prop_assert_eq!(&b[..cut], &p2[..cut]);
        prop_assert_eq!(&b[cut..], &p1[cut..]);
    }

    #[test]
    fn crossover_preserves_length(
        (p1, p2) in equal_length_parents(),
        seed in any::<u64>(),
        rate in 0.0f64..=1.0,
    ) {
        let len = p1.len();
        let parents = ChromosomePair::from_owned(chromosome(p1), chromosome(p2));
        let mut rng = StdRng::seed_from_u64(seed);

        let children = OnePointBinaryCrossover.crossover(&parents, rate, &mut rng).unwrap();
        prop_assert_eq!(children.first().len(), len);
        prop_assert_eq!(children.second().len(), len);

        let children = UniformBinaryCrossover::default()
            .crossover(&parents, rate, &mut rng)
            .unwrap();
        prop_assert_eq!(
            children.first().encoding().count_ones() + children.second().encoding().count_ones(),
            parents.first().encoding().count_ones() + parents.second().encoding().count_ones()
        );
    }

    // ==================== Mutation Properties ====================

    #[test]
    fn mutation_rate_zero_is_identity(
        bits in prop::collection::vec(any::<bool>(), 1..200),
        seed in any::<u64>(),
    ) {
        let original = chromosome(bits);
        let mut rng = StdRng::seed_from_u64(seed);
        let mutated = BinaryMutation.mutate(&original, 0.0, &mut rng).unwrap();
        prop_assert!(mutated.is_same(&original));
    }

    #[test]
    fn mutation_rate_one_is_complement(
        bits in prop::collection::vec(any::<bool>(), 1..200),
        seed in any::<u64>(),
    ) {
        let original = chromosome(bits);
        let mut rng = StdRng::seed_from_u64(seed);
        let mutated = BinaryMutation.mutate(&original, 1.0, &mut rng).unwrap();
        prop_assert_eq!(mutated.encoding(), &original.encoding().complement());
    }

    // ==================== Statistics Properties ====================

    #[test]
    fn variance_non_negative(values in prop::collection::vec(-1e6f64..1e6, 1..100)) {
        let summary = PopulationStatisticalSummary::from_fitnesses(&values).unwrap();
        prop_assert!(summary.fitness_variance() >= 0.0);
        prop_assert!(summary.min_fitness() <= summary.mean_fitness() + 1e-6);
        prop_assert!(summary.mean_fitness() <= summary.max_fitness() + 1e-6);
    }

    #[test]
    fn normalized_rank_in_unit_interval(
        values in prop::collection::vec(-100.0f64..100.0, 1..50),
        probe in -200.0f64..200.0,
    ) {
        let summary = PopulationStatisticalSummary::from_fitnesses(&values).unwrap();
        let rank = summary.normalized_rank(probe);
        prop_assert!((0.0..=1.0).contains(&rank));
    }

    // ==================== Engine Properties ====================

    #[test]
    fn population_size_invariant(
        size in 2usize..30,
        elitism in 0.0f64..=1.0,
        generations in 1usize..6,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let fitness: Arc<dyn FitnessFunction<usize>> = Arc::new(|n: &usize| *n as f64);
        let decoder: Arc<dyn Decoder<usize>> = Arc::new(ones);
        let initial = Population::random(size, 16, fitness, decoder, &mut rng).unwrap();

        let sizes = StatisticsRecorder::new();
        let mut ga = GeneticAlgorithmBuilder::new()
            .selection(TournamentSelection::binary())
            .crossover(OnePointBinaryCrossover::new())
            .mutation(BinaryMutation::new())
            .elitism_rate(elitism)
            .seed(seed)
            .listener(sizes.clone())
            .build()
            .unwrap();
        let mut stop = FixedGenerationCount::new(generations).unwrap();

        let result = ga.evolve(initial, &mut stop, 1).unwrap();
        prop_assert_eq!(result.len(), size);
        prop_assert_eq!(sizes.len(), generations + 1);
        prop_assert!(sizes.records().iter().all(|r| r.statistics.size() == size));
    }
}
