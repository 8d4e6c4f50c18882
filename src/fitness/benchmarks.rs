//! Benchmark landscapes and coordinate decoding
//!
//! This module provides a real-vector phenotype decoded from fixed-width
//! binary fields, plus a few landscapes with a known global maximum for
//! exercising the engine.

use serde::{Deserialize, Serialize};

use crate::chromosome::bit_string::BitString;
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::{Decoder, FitnessFunction};

/// A point in real coordinate space
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    values: Vec<f64>,
}

impl Coordinates {
    /// Create coordinates from raw values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Coordinate values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of dimensions
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Euclidean distance to a point given as a slice
    pub fn distance_to(&self, point: &[f64]) -> f64 {
        self.values
            .iter()
            .zip(point)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

/// Decodes consecutive fixed-width binary fields into [`Coordinates`]
///
/// Field `j` spans bits `[j * bits_per_dimension, (j + 1) * bits_per_dimension)`,
/// is read as an unsigned integer (most significant bit first) and divided
/// by `scale`. Bits missing from a short encoding read as zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinateDecoder {
    dimension: usize,
    bits_per_dimension: usize,
    scale: f64,
}

impl CoordinateDecoder {
    /// Create a decoder
    pub fn new(dimension: usize, bits_per_dimension: usize, scale: f64) -> EvoResult<Self> {
        if dimension == 0 {
            return Err(EvolutionError::invalid_parameter(
                "dimension must be at least 1",
            ));
        }
        if !(1..=64).contains(&bits_per_dimension) {
            return Err(EvolutionError::InvalidParameter(format!(
                "bits per dimension must be in [1, 64], got {bits_per_dimension}"
            )));
        }
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(EvolutionError::InvalidParameter(format!(
                "scale must be positive and finite, got {scale}"
            )));
        }
        Ok(Self {
            dimension,
            bits_per_dimension,
            scale,
        })
    }

    /// Encoding length needed to hold every field
    pub fn encoding_length(&self) -> usize {
        self.dimension * self.bits_per_dimension
    }

    /// Largest value a single field can decode to
    pub fn max_value(&self) -> f64 {
        let max_field = u64::MAX >> (64 - self.bits_per_dimension);
        max_field as f64 / self.scale
    }
}

impl Decoder<Coordinates> for CoordinateDecoder {
    fn decode(&self, encoding: &BitString) -> Coordinates {
        let length = encoding.len();
        let values = (0..self.dimension)
            .map(|j| {
                let start = (j * self.bits_per_dimension).min(length);
                let end = ((j + 1) * self.bits_per_dimension).min(length);
                let missing = self.bits_per_dimension - (end - start);
                let raw = encoding
                    .substring_value(start, end)
                    .unwrap_or(0)
                    .checked_shl(missing as u32)
                    .unwrap_or(0);
                raw as f64 / self.scale
            })
            .collect();
        Coordinates::new(values)
    }
}

/// Inverted paraboloid: `f(x) = -Σ(xᵢ - t)²`
///
/// Unimodal with its maximum of 0 at `x = (t, ..., t)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quadratic {
    target: f64,
}

impl Quadratic {
    /// Create a paraboloid peaking at `target` in every coordinate
    pub fn new(target: f64) -> Self {
        Self { target }
    }

    /// Location of the optimum in every coordinate
    pub fn target(&self) -> f64 {
        self.target
    }
}

impl FitnessFunction<Coordinates> for Quadratic {
    fn compute(&self, phenotype: &Coordinates) -> f64 {
        -phenotype
            .values()
            .iter()
            .map(|x| (x - self.target).powi(2))
            .sum::<f64>()
    }
}

/// Rippled peak: `f(x) = -s^0.25 · (sin²(50 · s^0.1) + 1)` with `s = Σ(xᵢ - t)²`
///
/// Highly multimodal, with concentric ripples around a single global
/// maximum of 0 at `x = (t, ..., t)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RippledPeak {
    target: f64,
}

impl RippledPeak {
    /// Create a rippled landscape peaking at `target` in every coordinate
    pub fn new(target: f64) -> Self {
        Self { target }
    }

    /// Location of the optimum in every coordinate
    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Default for RippledPeak {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl FitnessFunction<Coordinates> for RippledPeak {
    fn compute(&self, phenotype: &Coordinates) -> f64 {
        let sum_of_squares: f64 = phenotype
            .values()
            .iter()
            .map(|x| (x - self.target).powi(2))
            .sum();
        -sum_of_squares.powf(0.25) * ((50.0 * sum_of_squares.powf(0.1)).sin().powi(2) + 1.0)
    }
}
