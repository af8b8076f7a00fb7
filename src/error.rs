//! Error types shared across the template engine, the proxy client and the game loop.
//!
//! Template and configuration errors are fatal at startup; everything else is
//! reported to the player whose turn produced it.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
  /// A variable spec, expression or name in a template could not be understood.
  #[error("parse error in template {template}: {message}")]
  Parse { template: usize, message: String },
  /// A block did not decompose into the three template lines.
  #[error("template {template} has {lines} lines; expected exactly 3")]
  Syntax { template: usize, lines: usize },
  #[error("evaluation error: {0}")]
  Eval(String),
}

impl TemplateError {
  pub fn parse(template: usize, message: impl ToString) -> Self {
    Self::Parse { template, message: message.to_string() }
  }

  pub fn eval(message: impl ToString) -> Self {
    Self::Eval(message.to_string())
  }
}

#[derive(Error, Debug)]
pub enum ProxyError {
  #[error("request to question proxy failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("question proxy answered HTTP {status}: {body}")]
  Status { status: u16, body: String },
  #[error("no question proxy configured")]
  NotConfigured,
}

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("dice needs at least one face")]
  NoFaces,
  #[error("dice has {faces} faces but {weights} weights")]
  WeightMismatch { faces: usize, weights: usize },
  #[error("board needs at least 2 squares, got {0}")]
  BoardTooSmall(usize),
  #[error("squares of size {resolution} fit {capacity} players; need room for {players}")]
  SquareTooSmall { resolution: f64, capacity: usize, players: usize },
  #[error("square weights must list Basic, Quiz and Lab (got {0} values)")]
  SquareWeights(usize),
  #[error("could not read template bank {path}: {source}")]
  BankFile { path: String, source: std::io::Error },
  #[error(transparent)]
  Face(#[from] GameError),
  #[error(transparent)]
  Template(#[from] TemplateError),
}

#[derive(Error, Debug)]
pub enum GameError {
  #[error("player input closed")]
  Disconnected,
  #[error("{value} could not be rendered by dice")]
  InvalidFace { value: u32 },
  #[error("too many players in square {square}; capacity is {capacity}")]
  TooManyOccupants { square: usize, capacity: usize },
  #[error(transparent)]
  Template(#[from] TemplateError),
  #[error(transparent)]
  Proxy(#[from] ProxyError),
}
