//! Evolutionary algorithms
//!
//! This module provides the generational genetic algorithm and the worker
//! pool it runs on.

pub mod executor;
pub mod genetic_algorithm;

pub mod prelude {
    pub use super::executor::*;
    pub use super::genetic_algorithm::*;
}
