//! Application state: game configuration, parsed template banks, and the optional proxy client.
//!
//! This module owns:
//!   - the validated `GameConfig` (from TOML or defaults)
//!   - the evaluation scope shared by every template
//!   - the quiz and lab template banks, parsed once at startup
//!   - optional question proxy client
//!
//! Sessions are not stored here; each WebSocket connection owns its own game.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument, warn};

use crate::config::{load_game_config_from_env, GameConfig, QuestionSource};
use crate::error::ConfigError;
use crate::game::io::{EventSink, PlayerInput};
use crate::game::questions::{QuestionDeck, QuestionKind};
use crate::game::GameSession;
use crate::protocol::BankOut;
use crate::proxy::QuestionProxy;
use crate::template::eval::EvalScope;
use crate::template::QuestionBanks;

pub struct AppState {
    pub config: GameConfig,
    pub scope: Arc<EvalScope>,
    pub banks: Arc<QuestionBanks>,
    pub proxy: Option<QuestionProxy>,
}

impl AppState {
    /// Build state from env: load config, validate it, parse banks, init the proxy client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(load_game_config_from_env())
    }

    pub fn from_config(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let scope = Arc::new(EvalScope::default());
        info!(target: "chemboard", compounds = scope.compounds.len(), "Evaluation scope ready");

        let banks = QuestionBanks::load(
            config.questions.quiz_bank.as_deref(),
            config.questions.lab_bank.as_deref(),
            Arc::clone(&scope),
        )?;
        for bank in banks.iter().filter(|b| b.is_empty()) {
            warn!(target: "chemboard", bank = bank.name(), "Template bank is empty; its squares will report an error.");
        }

        let proxy = QuestionProxy::from_config(&config.proxy);
        if let Some(p) = &proxy {
            info!(target: "chemboard", base_url = %p.base_url, "Question proxy enabled.");
        } else {
            info!(target: "chemboard", "Question proxy disabled (no PROXY_URL). Using template banks.");
        }
        info!(
            target: "chemboard",
            quiz = config.questions.quiz.as_str(),
            lab = config.questions.lab.as_str(),
            "Question sources"
        );

        Ok(Self { config, scope, banks: Arc::new(banks), proxy })
    }

    pub fn deck(&self) -> QuestionDeck {
        QuestionDeck::new(Arc::clone(&self.banks), self.proxy.clone(), &self.config.questions)
    }

    /// A fresh game for one connection. Missing or zero player counts use the configured default.
    #[instrument(level = "info", skip(self, input, events))]
    pub fn new_session<I, E>(&self, players: Option<usize>, input: I, events: E) -> Result<GameSession<I, E, StdRng>, ConfigError>
    where
        I: PlayerInput,
        E: EventSink,
    {
        let players = players.filter(|n| *n > 0).unwrap_or(self.config.default_players);
        GameSession::new(
            self.config.clone(),
            players,
            self.deck(),
            &self.scope.table,
            StdRng::from_entropy(),
            input,
            events,
        )
    }

    /// Bank inventory for the HTTP API.
    pub fn bank_summary(&self) -> Vec<BankOut> {
        let questions = &self.config.questions;
        let deck = self.deck();
        let sources = [
            (QuestionKind::Quiz, questions.quiz_bank.as_deref()),
            (QuestionKind::Lab, questions.lab_bank.as_deref()),
        ];
        self.banks
            .iter()
            .zip(sources)
            .map(|(bank, (kind, path))| BankOut {
                name: bank.name().to_string(),
                templates: bank.len(),
                source: match deck.source(kind) {
                    QuestionSource::Templates => path.map_or_else(|| "builtin".to_string(), |p| p.display().to_string()),
                    other => other.as_str().to_string(),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuestionsConfig;

    #[test]
    fn default_state_loads_builtin_banks() {
        let state = AppState::from_config(GameConfig::default()).unwrap();
        let summary = state.bank_summary();
        assert_eq!(summary[0].name, "quiz");
        assert_eq!(summary[0].templates, 10);
        assert_eq!(summary[0].source, "builtin");
        assert_eq!(summary[1].templates, 3);
        assert!(state.proxy.is_none());
    }

    #[test]
    fn remote_sources_are_reported() {
        let mut cfg = GameConfig::default();
        cfg.questions = QuestionsConfig { lab: QuestionSource::RemoteSimple, ..QuestionsConfig::default() };
        let state = AppState::from_config(cfg).unwrap();
        assert_eq!(state.bank_summary()[1].source, "remote-simple");
    }

    #[test]
    fn invalid_config_is_fatal() {
        let mut cfg = GameConfig::default();
        cfg.dice.faces = vec![9; 6];
        assert!(AppState::from_config(cfg).is_err());

        let mut cfg = GameConfig::default();
        cfg.board.resolution = 50.0;
        assert!(matches!(AppState::from_config(cfg), Err(ConfigError::SquareTooSmall { .. })));
    }

    #[tokio::test]
    async fn sessions_use_the_default_player_count() {
        let state = AppState::from_config(GameConfig::default()).unwrap();
        let (_tx, rx) = tokio::sync::mpsc::unbounded_channel::<crate::game::io::PlayerAction>();
        let (etx, _erx) = tokio::sync::mpsc::unbounded_channel::<crate::protocol::ServerWsMessage>();
        let session = state.new_session(Some(0), rx, etx).unwrap();
        assert_eq!(session.board().len(), 49);
    }
}
