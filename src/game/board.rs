//! Snake-layout board generation.

use rand::Rng;
use serde::Serialize;

use crate::config::BoardConfig;
use crate::error::ConfigError;
use crate::protocol::SquareOut;

use super::dice::weighted_choice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SquareKind {
  Basic = 0,
  Quiz = 1,
  Lab = 2,
}

impl SquareKind {
  pub const ALL: [SquareKind; 3] = [SquareKind::Basic, SquareKind::Quiz, SquareKind::Lab];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  pub x: f64,
  pub y: f64,
  pub w: f64,
  pub h: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Square {
  pub index: usize,
  pub kind: SquareKind,
  pub rect: Rect,
}

impl Square {
  /// 1-based label drawn on the square.
  pub fn number(&self) -> usize {
    self.index + 1
  }

  pub fn to_out(&self) -> SquareOut {
    SquareOut {
      number: self.number(),
      kind: self.kind,
      x: self.rect.x,
      y: self.rect.y,
      w: self.rect.w,
      h: self.rect.h,
    }
  }
}

/// Grid cells of a snake path: a row left to right, one connector cell down
/// the right edge, a row right to left, one connector down the left edge, and so on.
pub fn snake(count: usize, width: usize) -> Vec<(usize, usize)> {
  let width = width.max(1);
  let mut cells = Vec::with_capacity(count + 2 * width + 2);
  let mut level = 0;
  while cells.len() < count {
    cells.extend((0..width).map(|x| (x, level)));
    cells.push((width - 1, level + 1));
    level += 2;
    cells.extend((0..width).rev().map(|x| (x, level)));
    cells.push((0, level + 1));
    level += 2;
  }
  cells.truncate(count);
  cells
}

#[derive(Debug, Clone)]
pub struct Board {
  squares: Vec<Square>,
  width: f64,
  height: f64,
}

impl Board {
  /// Lays out `kinds` along the snake. The first square is whatever `kinds[0]` is.
  pub fn from_kinds(kinds: &[SquareKind], width: usize, resolution: f64) -> Self {
    let squares: Vec<Square> = snake(kinds.len(), width)
      .into_iter()
      .zip(kinds)
      .enumerate()
      .map(|(index, ((x, y), kind))| Square {
        index,
        kind: *kind,
        rect: Rect { x: x as f64 * resolution, y: y as f64 * resolution, w: resolution, h: resolution },
      })
      .collect();

    let width = squares.iter().map(|s| s.rect.x + s.rect.w).fold(0.0, f64::max);
    let height = squares.iter().map(|s| s.rect.y + s.rect.h).fold(0.0, f64::max);
    Self { squares, width, height }
  }

  /// Random board: square 0 is Basic, the rest follow the configured weights.
  pub fn generate<R: Rng + ?Sized>(cfg: &BoardConfig, rng: &mut R) -> Result<Self, ConfigError> {
    if cfg.size < 2 {
      return Err(ConfigError::BoardTooSmall(cfg.size));
    }
    if cfg.weights.len() != SquareKind::ALL.len() {
      return Err(ConfigError::SquareWeights(cfg.weights.len()));
    }
    let kinds: Vec<SquareKind> = std::iter::once(SquareKind::Basic)
      .chain((1..cfg.size).map(|_| weighted_choice(&SquareKind::ALL, &cfg.weights, rng)))
      .collect();
    Ok(Self::from_kinds(&kinds, cfg.width, cfg.resolution))
  }

  pub fn squares(&self) -> &[Square] {
    &self.squares
  }

  pub fn len(&self) -> usize {
    self.squares.len()
  }

  pub fn last_index(&self) -> usize {
    self.squares.len().saturating_sub(1)
  }

  pub fn square(&self, index: usize) -> Option<&Square> {
    self.squares.get(index)
  }

  /// Overall extent in board units.
  pub fn dimensions(&self) -> (f64, f64) {
    (self.width, self.height)
  }
}
