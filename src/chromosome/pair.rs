//! Chromosome pair
//!
//! The unit that selection produces and crossover consumes.

use std::fmt;
use std::sync::Arc;

use crate::chromosome::chromosome::Chromosome;

/// An ordered pair of chromosomes
///
/// A pair only holds shared references: the same chromosome may appear in
/// several pairs and populations at once.
pub struct ChromosomePair<P> {
    first: Arc<Chromosome<P>>,
    second: Arc<Chromosome<P>>,
}

impl<P> ChromosomePair<P> {
    /// Create a pair from two shared chromosomes
    pub fn new(first: Arc<Chromosome<P>>, second: Arc<Chromosome<P>>) -> Self {
        Self { first, second }
    }

    /// Create a pair taking ownership of two chromosomes
    pub fn from_owned(first: Chromosome<P>, second: Chromosome<P>) -> Self {
        Self::new(Arc::new(first), Arc::new(second))
    }

    /// The first chromosome
    pub fn first(&self) -> &Arc<Chromosome<P>> {
        &self.first
    }

    /// The second chromosome
    pub fn second(&self) -> &Arc<Chromosome<P>> {
        &self.second
    }

    /// Split the pair into its two chromosomes
    pub fn into_parts(self) -> (Arc<Chromosome<P>>, Arc<Chromosome<P>>) {
        (self.first, self.second)
    }
}

impl<P> Clone for ChromosomePair<P> {
    fn clone(&self) -> Self {
        Self {
            first: Arc::clone(&self.first),
            second: Arc::clone(&self.second),
        }
    }
}

impl<P> fmt::Debug for ChromosomePair<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChromosomePair")
            .field(&self.first)
            .field(&self.second)
            .finish()
    }
}

impl<P> fmt::Display for ChromosomePair<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.first, self.second)
    }
}
