//! Bit string encoding
//!
//! This module provides the fixed-length binary encoding carried by every
//! chromosome. Bits are packed into `u64` words so that crossover, mutation
//! masks and comparisons operate a word at a time.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};

use crate::error::ChromosomeError;

const WORD_BITS: usize = 64;

/// Number of words needed to hold `length` bits
fn word_count(length: usize) -> usize {
    length.div_ceil(WORD_BITS)
}

/// Mask of the bits of the last word that belong to an encoding of `length` bits
fn tail_mask(length: usize) -> u64 {
    match length % WORD_BITS {
        0 => u64::MAX,
        used => (1u64 << used) - 1,
    }
}

/// Fixed-length bit string
///
/// Bit `i` lives in word `i / 64` at bit position `i % 64`. Bits past the
/// end of the encoding are always zero, so derived equality and hashing
/// compare encodings bit for bit.
///
/// Serializes as `"0101"` text and is parsed back through [`FromStr`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BitString {
    words: Vec<u64>,
    length: usize,
}

impl BitString {
    fn from_words(mut words: Vec<u64>, length: usize) -> Self {
        if let Some(last) = words.last_mut() {
            *last &= tail_mask(length);
        }
        Self { words, length }
    }

    /// Create an all-zeros bit string of the given length
    pub fn zeros(length: usize) -> Self {
        Self {
            words: vec![0; word_count(length)],
            length,
        }
    }

    /// Create an all-ones bit string of the given length
    pub fn ones(length: usize) -> Self {
        Self::from_words(vec![u64::MAX; word_count(length)], length)
    }

    /// Create a bit string from individual bits
    pub fn from_bools(bits: &[bool]) -> Self {
        let mut words = vec![0u64; word_count(bits.len())];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
            }
        }
        Self {
            words,
            length: bits.len(),
        }
    }

    /// Create a bit string holding the binary representation of `value`,
    /// most significant bit first
    pub fn from_u64(value: u64, length: usize) -> Result<Self, ChromosomeError> {
        if length > WORD_BITS || (length < WORD_BITS && value >> length != 0) {
            return Err(ChromosomeError::BitRange {
                start: 0,
                end: length,
                length,
            });
        }
        let bits: Vec<bool> = (0..length)
            .map(|i| (value >> (length - 1 - i)) & 1 == 1)
            .collect();
        Ok(Self::from_bools(&bits))
    }

    /// Create a uniformly random bit string
    pub fn random<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Self {
        let words = (0..word_count(length)).map(|_| rng.gen::<u64>()).collect();
        Self::from_words(words, length)
    }

    /// Create a random mask in which every bit is set independently with
    /// the given probability
    ///
    /// Returns `None` if `probability` is not in `[0, 1]`.
    pub fn random_mask<R: Rng + ?Sized>(
        length: usize,
        probability: f64,
        rng: &mut R,
    ) -> Option<Self> {
        let bernoulli = Bernoulli::new(probability).ok()?;
        if probability <= 0.0 {
            return Some(Self::zeros(length));
        }
        if probability >= 1.0 {
            return Some(Self::ones(length));
        }
        let mut words = vec![0u64; word_count(length)];
        for i in 0..length {
            if bernoulli.sample(rng) {
                words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
            }
        }
        Some(Self { words, length })
    }

    /// Get the length of the bit string
    pub fn len(&self) -> usize {
        self.length
    }

    /// Check if the bit string is empty
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Get a specific bit
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.length {
            return None;
        }
        Some((self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1)
    }

    /// Iterate over the bits in order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.length).map(move |i| (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1)
    }

    /// Count the number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Count the number of unset bits
    pub fn count_zeros(&self) -> usize {
        self.length - self.count_ones()
    }

    fn check_same_length(&self, other: &Self) -> Result<(), ChromosomeError> {
        if self.length != other.length {
            return Err(ChromosomeError::LengthMismatch {
                expected: self.length,
                actual: other.length,
            });
        }
        Ok(())
    }

    /// Hamming distance to another bit string
    pub fn hamming_distance(&self, other: &Self) -> Result<usize, ChromosomeError> {
        self.check_same_length(other)?;
        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum())
    }

    /// Get the complement (all bits flipped)
    pub fn complement(&self) -> Self {
        Self::from_words(self.words.iter().map(|w| !w).collect(), self.length)
    }

    /// Bitwise XOR with another bit string
    pub fn xor(&self, other: &Self) -> Result<Self, ChromosomeError> {
        self.check_same_length(other)?;
        Ok(Self {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a ^ b)
                .collect(),
            length: self.length,
        })
    }

    /// Take bits from `other` wherever `mask` is set and from `self` elsewhere
    pub fn select_from(&self, other: &Self, mask: &Self) -> Result<Self, ChromosomeError> {
        self.check_same_length(other)?;
        self.check_same_length(mask)?;
        Ok(Self {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .zip(&mask.words)
                .map(|((a, b), m)| (a & !m) | (b & m))
                .collect(),
            length: self.length,
        })
    }

    /// The first `cut` bits of `self` followed by the remaining bits of `other`
    pub fn splice(&self, other: &Self, cut: usize) -> Result<Self, ChromosomeError> {
        self.check_same_length(other)?;
        if cut > self.length {
            return Err(ChromosomeError::BitRange {
                start: 0,
                end: cut,
                length: self.length,
            });
        }
        let full_words = cut / WORD_BITS;
        let mut words = Vec::with_capacity(self.words.len());
        words.extend_from_slice(&self.words[..full_words]);
        if full_words < self.words.len() {
            let low = (1u64 << (cut % WORD_BITS)) - 1;
            words.push((self.words[full_words] & low) | (other.words[full_words] & !low));
            words.extend_from_slice(&other.words[full_words + 1..]);
        }
        Ok(Self {
            words,
            length: self.length,
        })
    }

    /// Interpret the bits in `[start, end)` as an unsigned binary integer,
    /// most significant bit first
    pub fn substring_value(&self, start: usize, end: usize) -> Result<u64, ChromosomeError> {
        if start > end || end > self.length || end - start > WORD_BITS {
            return Err(ChromosomeError::BitRange {
                start,
                end,
                length: self.length,
            });
        }
        Ok((start..end).fold(0u64, |acc, i| {
            (acc << 1) | ((self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1)
        }))
    }
}

impl FromStr for BitString {
    type Err = ChromosomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(ChromosomeError::InvalidChromosome(format!(
                    "unexpected character {other:?} in bit string"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_bools(&bits))
    }
}

impl TryFrom<String> for BitString {
    type Error = ChromosomeError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<BitString> for String {
    fn from(bits: BitString) -> Self {
        bits.to_string()
    }
}

impl From<&[bool]> for BitString {
    fn from(bits: &[bool]) -> Self {
        Self::from_bools(bits)
    }
}

impl<const N: usize> From<[bool; N]> for BitString {
    fn from(arr: [bool; N]) -> Self {
        Self::from_bools(&arr)
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}
