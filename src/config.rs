//! Loading game configuration (board, dice, timings, question sources) from TOML.
//!
//! Every field has a default, so an empty file or no file at all yields the
//! standard 49-square game. See `GameConfig` for the schema.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::ConfigError;
use crate::game::board::{Rect, SquareKind};
use crate::game::dice::Dice;
use crate::game::player::{grid_slots, MAX_PLAYERS};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameConfig {
  pub board: BoardConfig,
  pub dice: DiceConfig,
  /// Squares a player moves back after failing both the question and the element challenge.
  pub penalty_squares: usize,
  pub default_players: usize,
  pub challenge: ChallengeConfig,
  pub timing: TimingConfig,
  pub questions: QuestionsConfig,
  pub proxy: ProxyConfig,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      board: BoardConfig::default(),
      dice: DiceConfig::default(),
      penalty_squares: 5,
      default_players: 4,
      challenge: ChallengeConfig::default(),
      timing: TimingConfig::default(),
      questions: QuestionsConfig::default(),
      proxy: ProxyConfig::default(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
  pub size: usize,
  /// Squares per row of the snake.
  pub width: usize,
  /// Side length of one square in board units.
  pub resolution: f64,
  /// Basic, Quiz, Lab.
  pub weights: Vec<f64>,
}

impl Default for BoardConfig {
  fn default() -> Self {
    Self { size: 49, width: 9, resolution: 100.0, weights: vec![0.2, 0.4, 0.4] }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DiceConfig {
  pub faces: Vec<u32>,
  pub weights: Vec<f64>,
}

impl Default for DiceConfig {
  fn default() -> Self {
    Self { faces: vec![1, 2, 3, 4, 5, 6], weights: vec![1.0 / 6.0; 6] }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
  pub elements_to_name: usize,
  pub seconds: u64,
}

impl Default for ChallengeConfig {
  fn default() -> Self {
    Self { elements_to_name: 5, seconds: 60 }
  }
}

/// Artificial delays, in milliseconds. Tests set them all to zero.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
  pub dice_rolls: u32,
  pub dice_tick_ms: u64,
  pub after_roll_ms: u64,
  pub move_step_ms: u64,
  pub after_move_ms: u64,
  pub after_square_ms: u64,
  pub incorrect_feedback_ms: u64,
}

impl Default for TimingConfig {
  fn default() -> Self {
    Self {
      dice_rolls: 10,
      dice_tick_ms: 100,
      after_roll_ms: 500,
      move_step_ms: 400,
      after_move_ms: 250,
      after_square_ms: 250,
      incorrect_feedback_ms: 1000,
    }
  }
}

impl TimingConfig {
  #[cfg(test)]
  pub fn instant() -> Self {
    Self {
      dice_rolls: 10,
      dice_tick_ms: 0,
      after_roll_ms: 0,
      move_step_ms: 0,
      after_move_ms: 0,
      after_square_ms: 0,
      incorrect_feedback_ms: 0,
    }
  }
}

/// Where a square kind gets its questions from.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionSource {
  Templates,
  Remote,
  RemoteSimple,
}

impl QuestionSource {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Templates => "templates",
      Self::Remote => "remote",
      Self::RemoteSimple => "remote-simple",
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuestionsConfig {
  pub quiz: QuestionSource,
  pub lab: QuestionSource,
  /// Replaces the built-in quiz bank when set.
  pub quiz_bank: Option<PathBuf>,
  pub lab_bank: Option<PathBuf>,
}

impl Default for QuestionsConfig {
  fn default() -> Self {
    Self { quiz: QuestionSource::Templates, lab: QuestionSource::Templates, quiz_bank: None, lab_bank: None }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
  pub url: Option<String>,
  pub timeout_secs: u64,
}

impl Default for ProxyConfig {
  fn default() -> Self {
    Self { url: None, timeout_secs: 20 }
  }
}

impl GameConfig {
  /// Rejects configurations the game cannot run with.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.board.size < 2 {
      return Err(ConfigError::BoardTooSmall(self.board.size));
    }
    if self.board.weights.len() != SquareKind::ALL.len() {
      return Err(ConfigError::SquareWeights(self.board.weights.len()));
    }
    let resolution = self.board.resolution;
    let capacity = if resolution.is_finite() {
      // Slots only grow with the square, so a bounded side is enough to measure.
      let side = resolution.min(1000.0);
      grid_slots(&Rect { x: 0.0, y: 0.0, w: side, h: side }).len()
    } else {
      0
    };
    // Every player starts on the first square.
    if capacity < MAX_PLAYERS {
      return Err(ConfigError::SquareTooSmall { resolution, capacity, players: MAX_PLAYERS });
    }
    Dice::new(self.dice.faces.clone(), self.dice.weights.clone())?;
    Ok(())
  }
}

/// Load `GameConfig` from GAME_CONFIG_PATH, falling back to defaults on any IO/parse error.
/// PROXY_URL, when set, overrides `proxy.url`.
pub fn load_game_config_from_env() -> GameConfig {
  let mut cfg = match std::env::var("GAME_CONFIG_PATH") {
    Ok(path) => match std::fs::read_to_string(&path) {
      Ok(s) => match toml::from_str::<GameConfig>(&s) {
        Ok(cfg) => {
          info!(target: "chemboard", %path, "Loaded game config (TOML)");
          cfg
        }
        Err(e) => {
          error!(target: "chemboard", %path, error = %e, "Failed to parse TOML config; using defaults");
          GameConfig::default()
        }
      },
      Err(e) => {
        error!(target: "chemboard", %path, error = %e, "Failed to read TOML config file; using defaults");
        GameConfig::default()
      }
    },
    Err(_) => GameConfig::default(),
  };

  if let Ok(url) = std::env::var("PROXY_URL") {
    if !url.trim().is_empty() {
      cfg.proxy.url = Some(url.trim().to_string());
    }
  }
  cfg
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_toml_gives_defaults() {
    let cfg: GameConfig = toml::from_str("").unwrap();
    assert_eq!(cfg.board.size, 49);
    assert_eq!(cfg.dice.faces, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(cfg.penalty_squares, 5);
    assert_eq!(cfg.challenge.elements_to_name, 5);
    assert_eq!(cfg.questions.quiz, QuestionSource::Templates);
    assert!(cfg.validate().is_ok());
  }

  #[test]
  fn partial_tables_keep_other_defaults() {
    let cfg: GameConfig = toml::from_str(
      r#"
        penalty_squares = 3
        [board]
        size = 20
        [questions]
        lab = "remote-simple"
        [timing]
        move_step_ms = 0
      "#,
    )
    .unwrap();
    assert_eq!(cfg.penalty_squares, 3);
    assert_eq!(cfg.board.size, 20);
    assert_eq!(cfg.board.width, 9);
    assert_eq!(cfg.questions.lab, QuestionSource::RemoteSimple);
    assert_eq!(cfg.timing.move_step_ms, 0);
    assert_eq!(cfg.timing.dice_tick_ms, 100);
  }

  #[test]
  fn validation_catches_bad_dice_and_boards() {
    let mut cfg = GameConfig::default();
    cfg.dice.faces = vec![1, 7];
    cfg.dice.weights = vec![0.5, 0.5];
    assert!(matches!(cfg.validate(), Err(ConfigError::Face(_))));

    let mut cfg = GameConfig::default();
    cfg.dice.weights.pop();
    assert!(matches!(cfg.validate(), Err(ConfigError::WeightMismatch { faces: 6, weights: 5 })));

    let mut cfg = GameConfig::default();
    cfg.board.size = 1;
    assert!(matches!(cfg.validate(), Err(ConfigError::BoardTooSmall(1))));

    let mut cfg = GameConfig::default();
    cfg.board.weights = vec![1.0];
    assert!(matches!(cfg.validate(), Err(ConfigError::SquareWeights(1))));
  }

  #[test]
  fn validation_requires_room_for_every_player_on_one_square() {
    let mut cfg = GameConfig::default();
    cfg.board.resolution = 50.0;
    assert!(matches!(
      cfg.validate(),
      Err(ConfigError::SquareTooSmall { capacity: 1, players: MAX_PLAYERS, .. })
    ));

    cfg.board.resolution = f64::INFINITY;
    assert!(matches!(cfg.validate(), Err(ConfigError::SquareTooSmall { capacity: 0, .. })));

    // Slots at 20 and 43 on each axis, both short of 70 - 20.
    cfg.board.resolution = 70.0;
    assert!(cfg.validate().is_ok());

    cfg.board.resolution = 1e12;
    assert!(cfg.validate().is_ok());
  }
}
