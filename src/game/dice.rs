//! Weighted dice.

use rand::Rng;

use crate::error::{ConfigError, GameError};

/// Faces the dice renderer has artwork for.
pub const RENDERABLE_FACES: std::ops::RangeInclusive<u32> = 1..=6;

/// Picks the first value whose cumulative weight reaches a single uniform draw in `[0, 1)`.
/// Falls back to `values[0]` when rounding leaves the draw above the last cumulative sum.
pub fn weighted_choice<T: Copy, R: Rng + ?Sized>(values: &[T], weights: &[f64], rng: &mut R) -> T {
  let draw: f64 = rng.gen();
  let mut cdf = 0.0;
  for (value, weight) in values.iter().zip(weights) {
    cdf += weight;
    if draw <= cdf {
      return *value;
    }
  }
  values[0]
}

#[derive(Debug, Clone)]
pub struct Dice {
  faces: Vec<u32>,
  weights: Vec<f64>,
}

impl Dice {
  pub fn new(faces: Vec<u32>, weights: Vec<f64>) -> Result<Self, ConfigError> {
    if faces.is_empty() {
      return Err(ConfigError::NoFaces);
    }
    if faces.len() != weights.len() {
      return Err(ConfigError::WeightMismatch { faces: faces.len(), weights: weights.len() });
    }
    if let Some(&value) = faces.iter().find(|f| !RENDERABLE_FACES.contains(f)) {
      return Err(GameError::InvalidFace { value }.into());
    }
    Ok(Self { faces, weights })
  }

  #[cfg(test)]
  pub fn standard() -> Self {
    Self { faces: vec![1, 2, 3, 4, 5, 6], weights: vec![1.0 / 6.0; 6] }
  }

  pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
    weighted_choice(&self.faces, &self.weights, rng)
  }
}
