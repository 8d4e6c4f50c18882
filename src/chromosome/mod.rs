//! Chromosome representation
//!
//! This module provides the packed binary encoding, the chromosome wrapper
//! with memoized fitness, and the chromosome pair.

pub mod bit_string;
#[allow(clippy::module_inception)]
pub mod chromosome;
pub mod pair;

pub mod prelude {
    pub use super::bit_string::*;
    pub use super::chromosome::*;
    pub use super::pair::*;
}
