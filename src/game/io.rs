//! Seams between the turn loop and whoever is playing.
//!
//! The loop only ever waits on [`PlayerInput`] and only ever writes to an
//! [`EventSink`]; the WebSocket route backs both with tokio channels.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::GameError;
use crate::protocol::ServerWsMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
  Roll,
  Answer(String),
}

#[async_trait]
pub trait PlayerInput: Send {
  /// `None` once the player side has gone away.
  async fn next_action(&mut self) -> Option<PlayerAction>;
}

#[async_trait]
impl PlayerInput for mpsc::Receiver<PlayerAction> {
  async fn next_action(&mut self) -> Option<PlayerAction> {
    self.recv().await
  }
}

#[async_trait]
impl PlayerInput for mpsc::UnboundedReceiver<PlayerAction> {
  async fn next_action(&mut self) -> Option<PlayerAction> {
    self.recv().await
  }
}

/// Waits for a roll, dropping any answers sent out of turn.
pub async fn await_roll<I: PlayerInput + ?Sized>(input: &mut I) -> Result<(), GameError> {
  loop {
    match input.next_action().await {
      Some(PlayerAction::Roll) => return Ok(()),
      Some(PlayerAction::Answer(_)) => debug!(target: "game", "ignoring answer while waiting for a roll"),
      None => return Err(GameError::Disconnected),
    }
  }
}

/// Waits for an answer, dropping any rolls sent out of turn.
pub async fn await_answer<I: PlayerInput + ?Sized>(input: &mut I) -> Result<String, GameError> {
  loop {
    match input.next_action().await {
      Some(PlayerAction::Answer(text)) => return Ok(text),
      Some(PlayerAction::Roll) => debug!(target: "game", "ignoring roll while waiting for an answer"),
      None => return Err(GameError::Disconnected),
    }
  }
}

/// Fire-and-forget output.
pub trait EventSink: Send + Sync {
  fn emit(&self, event: ServerWsMessage);
}

impl EventSink for mpsc::UnboundedSender<ServerWsMessage> {
  fn emit(&self, event: ServerWsMessage) {
    // A closed receiver means the socket is gone; the next input read will notice.
    let _ = self.send(event);
  }
}

/// Shows question text and resolves to the raw answer.
#[async_trait]
pub trait QuestionDisplay: Send {
  async fn prompt(&mut self, text: &str) -> Result<String, GameError>;
}

/// Question display for one player: a `prompt` event out, an answer in.
pub struct PlayerConsole<'a> {
  pub player: usize,
  pub input: &'a mut dyn PlayerInput,
  pub events: &'a dyn EventSink,
}

#[async_trait]
impl<'a> QuestionDisplay for PlayerConsole<'a> {
  async fn prompt(&mut self, text: &str) -> Result<String, GameError> {
    self.events.emit(ServerWsMessage::Prompt { player: self.player, text: text.to_string() });
    await_answer(&mut *self.input).await
  }
}
