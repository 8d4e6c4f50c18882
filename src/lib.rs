//! # evolve-ga
//!
//! A generic genetic algorithm engine for binary-encoded search spaces.
//!
//! Callers supply a decoder from bit strings to a phenotype and a fitness
//! function over that phenotype. The engine evolves a population with
//! tournament selection, crossover, bit-flip mutation and elitism until a
//! stopping condition is met, evaluating fitness on a bounded worker pool.
//!
//! ## Core Concepts
//!
//! - **Immutable chromosomes**: operators always build new chromosomes, so
//!   fitness is memoized per chromosome and populations share members freely
//! - **Pluggable policies**: selection, crossover, mutation, rate generation
//!   and stopping are traits with built-in implementations
//! - **Reproducible parallelism**: with a seed, results do not depend on the
//!   number of worker threads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evolve_ga::prelude::*;
//! use rand::SeedableRng;
//! use std::sync::Arc;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let decoder = CoordinateDecoder::new(2, 12, 100.0)?;
//! let length = decoder.encoding_length();
//! let initial = Population::random(
//!     50,
//!     length,
//!     Arc::new(Quadratic::new(10.0)),
//!     Arc::new(decoder),
//!     &mut rng,
//! )?;
//!
//! let mut ga = GeneticAlgorithm::builder()
//!     .selection(TournamentSelection::new(5)?)
//!     .crossover(OnePointBinaryCrossover::new())
//!     .mutation(BinaryMutation::new())
//!     .listener(PopulationStatisticsLogger::new())
//!     .build()?;
//!
//! let mut stop = UnchangedBestFitness::new(20)?;
//! let result = ga.evolve(initial, &mut stop, 4)?;
//! println!("{}", result.fittest().unwrap().decode());
//! ```

pub mod algorithms;
pub mod chromosome;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod operators;
pub mod population;
pub mod rate;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::chromosome::prelude::*;
    pub use crate::config::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::rate::prelude::*;
    pub use crate::termination::prelude::*;
}
