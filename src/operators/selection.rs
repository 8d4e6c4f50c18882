//! Selection operators
//!
//! This module provides tournament selection.

use std::sync::Arc;

use rand::seq::index;
use rand::Rng;
use tracing::instrument;

use crate::chromosome::chromosome::Chromosome;
use crate::chromosome::pair::ChromosomePair;
use crate::error::{EvoResult, EvolutionError};
use crate::operators::traits::SelectionPolicy;
use crate::population::population::{ranking_fitness, Population};

/// Tournament selection operator
///
/// Each parent is the fittest of `tournament_size` distinct members drawn
/// uniformly at random. The two parents are drawn independently, so they may
/// be the same chromosome.
///
/// Members are sampled without replacement within one tournament, so a
/// tournament as large as the population always picks the fittest member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TournamentSelection {
    tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> EvoResult<Self> {
        if tournament_size == 0 {
            return Err(EvolutionError::invalid_parameter(
                "tournament size must be at least 1",
            ));
        }
        Ok(Self { tournament_size })
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self { tournament_size: 2 }
    }

    /// Number of chromosomes competing in each tournament
    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Run one tournament and return the winner
    ///
    /// Equal fitness goes to the member with the lower population index, so
    /// a tournament over the whole population returns
    /// [`Population::fittest`].
    fn tournament<'a, P, R: Rng + ?Sized>(
        &self,
        population: &'a Population<P>,
        rng: &mut R,
    ) -> EvoResult<&'a Arc<Chromosome<P>>> {
        SelectionPolicy::<P>::validate(self, population.len())?;
        let members = population.chromosomes();
        let winner = index::sample(rng, members.len(), self.tournament_size)
            .iter()
            .min_by(|&a, &b| {
                ranking_fitness(members[b].fitness())
                    .total_cmp(&ranking_fitness(members[a].fitness()))
                    .then(a.cmp(&b))
            })
            .ok_or(EvolutionError::EmptyPopulation)?;
        Ok(&members[winner])
    }
}

impl<P> SelectionPolicy<P> for TournamentSelection {
    #[instrument(level = "trace", skip_all, fields(tournament_size = self.tournament_size))]
    fn select<R: Rng + ?Sized>(
        &self,
        population: &Population<P>,
        rng: &mut R,
    ) -> EvoResult<ChromosomePair<P>> {
        let first = Arc::clone(self.tournament(population, rng)?);
        let second = Arc::clone(self.tournament(population, rng)?);
        Ok(ChromosomePair::new(first, second))
    }

    fn validate(&self, population_size: usize) -> EvoResult<()> {
        if population_size == 0 {
            return Err(EvolutionError::EmptyPopulation);
        }
        if self.tournament_size > population_size {
            return Err(EvolutionError::InvalidParameter(format!(
                "tournament size {} exceeds population size {}",
                self.tournament_size, population_size
            )));
        }
        Ok(())
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

    fn create_population(values: &[u64]) -> Population<u64> {
        let chromosomes = values
            .iter()
            .map(|&v| {
                Chromosome::new(
                    BitString::from_u64(v, 8).unwrap(),
                    |x: &u64| *x as f64,
                    value,
                )
                .unwrap()
            })
            .collect();
        Population::from_chromosomes(chromosomes, values.len()).unwrap()
    }

    #[test]
    fn test_tournament_size_validation() {
        assert!(TournamentSelection::new(0).is_err());
        let selection = TournamentSelection::new(6).unwrap();
        let population = create_population(&[1, 2, 3, 4, 5]);
        let mut rng = StdRng::seed_from_u64(42);

        assert!(SelectionPolicy::<u64>::validate(&selection, 5).is_err());
        assert!(matches!(
            selection.select(&population, &mut rng),
            Err(EvolutionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_full_tournament_returns_fittest() {
        let population = create_population(&[12, 200, 7, 99, 150, 3]);
        let selection = TournamentSelection::new(population.len()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let pair = selection.select(&population, &mut rng).unwrap();
            assert_eq!(pair.first().fitness(), 200.0);
            assert_eq!(pair.second().fitness(), 200.0);
            assert!(Arc::ptr_eq(pair.first(), population.fittest().unwrap()));
        }
    }

    #[test]
    fn test_full_tournament_tie_matches_fittest() {
        let population = create_population(&[9, 40, 40, 1]);
        let selection = TournamentSelection::new(4).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let pair = selection.select(&population, &mut rng).unwrap();
        assert!(Arc::ptr_eq(pair.first(), population.fittest().unwrap()));
        assert!(Arc::ptr_eq(pair.first(), &population[1]));
    }

    #[test]
    fn test_tournament_selection_pressure() {
        let values: Vec<u64> = (0..20).collect();
        let population = create_population(&values);
        let selection = TournamentSelection::new(5).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let mut total = 0.0;
        let draws = 500;
        for _ in 0..draws {
            let pair = selection.select(&population, &mut rng).unwrap();
            total += pair.first().fitness() + pair.second().fitness();
        }
        let mean = total / (2 * draws) as f64;

        // The population mean is 9.5; tournaments of 5 favour the top.
        assert!(mean > 13.0, "mean selected fitness was {mean}");
    }

    #[test]
    fn test_single_member_population() {
        let population = create_population(&[5]);
        let selection = TournamentSelection::new(1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let pair = selection.select(&population, &mut rng).unwrap();
        assert!(Arc::ptr_eq(pair.first(), pair.second()));
    }

    #[test]
    fn test_empty_population_rejected() {
        let population: Population<u64> = Population::new(4).unwrap();
        let selection = TournamentSelection::binary();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            selection.select(&population, &mut rng).unwrap_err(),
            EvolutionError::EmptyPopulation
        );
    }
}
