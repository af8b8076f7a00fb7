//! One game from start to winner: the turn loop.
//!
//! Each turn runs `AwaitingRoll -> Moving -> SquareEvent -> (QuestionPending ->
//! QuestionResult)? -> TurnComplete`. Reaching the last square while moving
//! ends the game at once; the final square's event never runs.

use std::time::Duration;

use rand::Rng;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{info, instrument, warn};

use crate::chem::PeriodicTable;
use crate::config::GameConfig;
use crate::error::{ConfigError, GameError};
use crate::protocol::{ServerWsMessage, Tone, TurnPhase};

use super::board::Board;
use super::dice::Dice;
use super::elements::{ChallengeOutcome, ElementPool};
use super::io::{await_answer, await_roll, EventSink, PlayerConsole, PlayerInput};
use super::player::PlayerRoster;
use super::questions::{QuestionDeck, QuestionKind};

pub struct GameSession<I, E, R> {
  config: GameConfig,
  board: Board,
  roster: PlayerRoster,
  dice: Dice,
  pool: ElementPool,
  deck: QuestionDeck,
  rng: R,
  input: I,
  events: E,
}

impl<I, E, R> GameSession<I, E, R>
where
  I: PlayerInput,
  E: EventSink,
  R: Rng + Send,
{
  /// Sets up a fresh board, roster, dice and element pool.
  pub fn new(
    config: GameConfig,
    players: usize,
    deck: QuestionDeck,
    table: &PeriodicTable,
    mut rng: R,
    input: I,
    events: E,
  ) -> Result<Self, ConfigError> {
    let board = Board::generate(&config.board, &mut rng)?;
    let dice = Dice::new(config.dice.faces.clone(), config.dice.weights.clone())?;
    Ok(Self {
      board,
      roster: PlayerRoster::new(players),
      dice,
      pool: ElementPool::new(table),
      deck,
      rng,
      input,
      events,
      config,
    })
  }

  /// Replaces the generated board.
  #[cfg(test)]
  pub fn with_board(mut self, board: Board) -> Self {
    self.board = board;
    self
  }

  #[cfg(test)]
  pub fn board(&self) -> &Board {
    &self.board
  }

  /// Plays turns until someone wins. Returns the winner's index.
  #[instrument(level = "info", target = "game", skip(self), fields(players = self.roster.len(), squares = self.board.len()))]
  pub async fn run(mut self) -> Result<usize, GameError> {
    let (width, height) = self.board.dimensions();
    self.events.emit(ServerWsMessage::Board {
      squares: self.board.squares().iter().map(|s| s.to_out()).collect(),
      width,
      height,
      players: self.roster.len(),
    });
    self.emit_positions()?;
    info!(target: "game", "game started");

    loop {
      if let Some(winner) = self.play_turn().await? {
        info!(target: "game", winner, "game over");
        return Ok(winner);
      }
    }
  }

  /// One full turn for the current player. `Some(winner)` ends the game.
  async fn play_turn(&mut self) -> Result<Option<usize>, GameError> {
    let player = self.roster.current();
    self.events.emit(ServerWsMessage::TurnStarted { player });
    self.events.emit(ServerWsMessage::Cleared { player });

    self.phase(TurnPhase::AwaitingRoll);
    await_roll(&mut self.input).await?;
    let distance = self.roll_dice().await;
    pause(self.config.timing.after_roll_ms).await;

    self.phase(TurnPhase::Moving);
    let won = self.advance(distance).await?;
    pause(self.config.timing.after_move_ms).await;
    if won {
      self.phase(TurnPhase::GameOver);
      self.events.emit(ServerWsMessage::GameOver { winner: player });
      return Ok(Some(player));
    }

    self.phase(TurnPhase::SquareEvent);
    let position = self.roster.current_position();
    let kind = self.board.square(position).map(|s| s.kind);
    info!(target: "game", player, position, ?kind, distance, "landed");
    if let Some(kind) = kind.and_then(QuestionKind::for_square) {
      self.ask_then_penalize(kind).await?;
    }
    pause(self.config.timing.after_square_ms).await;

    self.phase(TurnPhase::TurnComplete);
    self.roster.next_turn();
    self.emit_positions()?;
    Ok(None)
  }

  /// Shows every intermediate face and keeps the last one.
  async fn roll_dice(&mut self) -> u32 {
    let rolls = self.config.timing.dice_rolls.max(1);
    let mut face = 0;
    for i in 0..rolls {
      face = self.dice.roll(&mut self.rng);
      let is_final = i + 1 == rolls;
      self.events.emit(ServerWsMessage::DiceFace { face, is_final });
      if !is_final {
        pause(self.config.timing.dice_tick_ms).await;
      }
    }
    face
  }

  /// Steps forward one square at a time; true as soon as the last square is reached.
  async fn advance(&mut self, distance: u32) -> Result<bool, GameError> {
    let last = self.board.last_index();
    for _ in 0..distance {
      let position = self.roster.step_forward();
      self.emit_positions()?;
      pause(self.config.timing.move_step_ms).await;
      if position >= last {
        return Ok(true);
      }
    }
    Ok(false)
  }

  /// Shared Quiz/Lab behaviour: ask, and on a miss offer the element challenge
  /// before applying the penalty.
  #[instrument(level = "info", target = "game", skip(self), fields(player = self.roster.current()))]
  async fn ask_then_penalize(&mut self, kind: QuestionKind) -> Result<(), GameError> {
    let player = self.roster.current();
    self.events.emit(ServerWsMessage::Cleared { player });
    self.message(kind.title(self.config.penalty_squares), Tone::Info);
    self.phase(TurnPhase::QuestionPending);

    let passed = match self.pose_question(kind).await {
      Ok(passed) => passed,
      Err(e @ (GameError::Template(_) | GameError::Proxy(_))) => {
        warn!(target: "game", player, error = %e, "question failed; no penalty");
        self.events.emit(ServerWsMessage::Error { message: e.to_string() });
        let text = match &e {
          GameError::Proxy(_) => format!("Failed to fetch question: {e}"),
          _ => format!("This question could not be checked: {e}"),
        };
        self.message(text, Tone::Error);
        return Ok(());
      }
      Err(e) => return Err(e),
    };
    self.phase(TurnPhase::QuestionResult);
    info!(target: "game", player, passed, "question answered");

    if passed {
      self.show_result(true);
      return Ok(());
    }
    self.show_result(false);
    pause(self.config.timing.incorrect_feedback_ms).await;
    self.events.emit(ServerWsMessage::Cleared { player });

    let outcome = self.element_challenge().await?;
    info!(target: "game", player, success = outcome.success, remaining = self.pool.remaining(), "element challenge finished");
    if outcome.success {
      self.show_result(true);
    } else {
      self.show_result(false);
      self.message(outcome.feedback, Tone::Incorrect);
      self.punish().await?;
    }
    Ok(())
  }

  async fn pose_question(&mut self, kind: QuestionKind) -> Result<bool, GameError> {
    let question = self.deck.draw(kind, &mut self.rng).await?;
    let mut console = PlayerConsole { player: self.roster.current(), input: &mut self.input, events: &self.events };
    question.ask(&mut console).await
  }

  async fn element_challenge(&mut self) -> Result<ChallengeOutcome, GameError> {
    let player = self.roster.current();
    let required = self.config.challenge.elements_to_name;
    self.message(
      format!(
        "You failed the question. In order to avoid a penalization, you must name {required} real elements that haven't been named yet by other players."
      ),
      Tone::Info,
    );
    self.events.emit(ServerWsMessage::Prompt {
      player,
      text: "Separate the elements with commas. Use their full names.".into(),
    });
    let answer = self.timed_answer(self.config.challenge.seconds).await?;
    Ok(self.pool.check_named(&answer, required))
  }

  /// Waits for an answer while counting down once a second. Timing out submits an empty answer.
  async fn timed_answer(&mut self, seconds: u64) -> Result<String, GameError> {
    let player = self.roster.current();
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut left = seconds;
    loop {
      tokio::select! {
        answer = await_answer(&mut self.input) => return answer,
        _ = ticker.tick() => {
          if left == 0 {
            info!(target: "game", player, "element challenge timed out");
            return Ok(String::new());
          }
          self.events.emit(ServerWsMessage::Countdown { player, seconds_left: left });
          left -= 1;
        }
      }
    }
  }

  /// Moves the current player back by the penalty, one square at a time, stopping at the start.
  async fn punish(&mut self) -> Result<(), GameError> {
    let steps = self.config.penalty_squares.min(self.roster.current_position());
    for _ in 0..steps {
      self.roster.step_back();
      self.emit_positions()?;
      pause(self.config.timing.move_step_ms).await;
    }
    info!(target: "game", player = self.roster.current(), steps, "penalty applied");
    Ok(())
  }

  fn emit_positions(&self) -> Result<(), GameError> {
    let players = self.roster.placements(&self.board)?;
    self.events.emit(ServerWsMessage::Positions { players });
    Ok(())
  }

  fn phase(&self, phase: TurnPhase) {
    self.events.emit(ServerWsMessage::Phase { player: self.roster.current(), phase });
  }

  fn message(&self, text: impl Into<String>, tone: Tone) {
    self.events.emit(ServerWsMessage::Message { player: self.roster.current(), text: text.into(), tone });
  }

  fn show_result(&self, correct: bool) {
    if correct {
      self.message("Correct!", Tone::Correct);
    } else {
      self.message("Incorrect!", Tone::Incorrect);
    }
  }
}

async fn pause(ms: u64) {
  if ms > 0 {
    sleep(Duration::from_millis(ms)).await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use tokio::sync::mpsc;

  use crate::config::{ProxyConfig, QuestionSource, QuestionsConfig, TimingConfig};
  use crate::game::board::SquareKind;
  use crate::game::io::PlayerAction;
  use crate::proxy::QuestionProxy;
  use crate::template::eval::EvalScope;
  use crate::template::bank::TemplateBank;
  use crate::template::QuestionBanks;

  const ONE_PLUS_ONE: &str = "!\nWhat is 1 + 1?\nanswer == 2";

  fn config(face: u32) -> GameConfig {
    let mut cfg = GameConfig::default();
    cfg.timing = TimingConfig::instant();
    cfg.dice.faces = vec![face];
    cfg.dice.weights = vec![1.0];
    cfg
  }

  fn banks(quiz: &str) -> Arc<QuestionBanks> {
    let scope = Arc::new(EvalScope::default());
    Arc::new(QuestionBanks {
      quiz: TemplateBank::parse("quiz", quiz, Arc::clone(&scope)).unwrap(),
      lab: TemplateBank::parse("lab", ONE_PLUS_ONE, scope).unwrap(),
    })
  }

  struct Harness {
    tx: mpsc::UnboundedSender<PlayerAction>,
    events: mpsc::UnboundedReceiver<ServerWsMessage>,
    session: GameSession<mpsc::UnboundedReceiver<PlayerAction>, mpsc::UnboundedSender<ServerWsMessage>, StdRng>,
  }

  fn harness(cfg: GameConfig, kinds: &[SquareKind], deck: QuestionDeck) -> Harness {
    let (tx, rx) = mpsc::unbounded_channel();
    let (etx, erx) = mpsc::unbounded_channel();
    let session = GameSession::new(cfg, 2, deck, &PeriodicTable::default(), StdRng::seed_from_u64(1), rx, etx)
      .unwrap()
      .with_board(Board::from_kinds(kinds, 9, 100.0));
    Harness { tx, events: erx, session }
  }

  fn template_deck(quiz: &str) -> QuestionDeck {
    QuestionDeck::new(banks(quiz), None, &QuestionsConfig::default())
  }

  fn drain(rx: &mut mpsc::UnboundedReceiver<ServerWsMessage>) -> Vec<ServerWsMessage> {
    let mut out = Vec::new();
    while let Ok(e) = rx.try_recv() {
      out.push(e);
    }
    out
  }

  fn last_position(events: &[ServerWsMessage], player: usize) -> usize {
    events
      .iter()
      .rev()
      .find_map(|e| match e {
        ServerWsMessage::Positions { players } => Some(players[player].position),
        _ => None,
      })
      .unwrap()
  }

  fn messages(events: &[ServerWsMessage]) -> Vec<(String, Tone)> {
    events
      .iter()
      .filter_map(|e| match e {
        ServerWsMessage::Message { text, tone, .. } => Some((text.clone(), *tone)),
        _ => None,
      })
      .collect()
  }

  #[tokio::test]
  async fn landing_on_the_last_square_wins_without_its_event() {
    use SquareKind::*;
    let mut h = harness(config(3), &[Basic, Quiz, Quiz, Quiz], template_deck(ONE_PLUS_ONE));
    h.tx.send(PlayerAction::Roll).unwrap();

    assert_eq!(h.session.run().await.unwrap(), 0);
    let events = drain(&mut h.events);
    assert_eq!(events.last(), Some(&ServerWsMessage::GameOver { winner: 0 }));
    assert!(!events.iter().any(|e| matches!(e, ServerWsMessage::Prompt { .. })));
    assert!(!events.iter().any(|e| matches!(e, ServerWsMessage::Phase { phase: TurnPhase::SquareEvent, .. })));
    assert_eq!(last_position(&events, 0), 3);
    assert_eq!(events.iter().filter(|e| matches!(e, ServerWsMessage::DiceFace { .. })).count(), 10);
  }

  #[tokio::test]
  async fn overshooting_stops_on_the_last_square() {
    use SquareKind::*;
    let mut h = harness(config(6), &[Basic, Basic, Basic], template_deck(ONE_PLUS_ONE));
    h.tx.send(PlayerAction::Roll).unwrap();
    assert_eq!(h.session.run().await.unwrap(), 0);
    assert_eq!(last_position(&drain(&mut h.events), 0), 2);
  }

  #[tokio::test]
  async fn turns_alternate_and_correct_answers_keep_position() {
    use SquareKind::*;
    let mut h = harness(config(1), &[Basic, Quiz, Basic, Basic, Basic, Basic], template_deck(ONE_PLUS_ONE));
    h.tx.send(PlayerAction::Answer("stray".into())).unwrap();
    h.tx.send(PlayerAction::Roll).unwrap();
    h.tx.send(PlayerAction::Answer("2".into())).unwrap();
    h.tx.send(PlayerAction::Roll).unwrap();
    h.tx.send(PlayerAction::Answer("2".into())).unwrap();
    drop(h.tx);

    assert!(matches!(h.session.run().await, Err(GameError::Disconnected)));
    let events = drain(&mut h.events);
    let turns: Vec<usize> = events
      .iter()
      .filter_map(|e| match e {
        ServerWsMessage::TurnStarted { player } => Some(*player),
        _ => None,
      })
      .collect();
    assert_eq!(turns, vec![0, 1, 0]);
    assert!(events.contains(&ServerWsMessage::Prompt { player: 0, text: "What is 1 + 1?".into() }));
    assert!(messages(&events).contains(&("Correct!".into(), Tone::Correct)));
    assert!(messages(&events).contains(&("Quiz: Answer correctly or you'll be moved back 5 squares.".into(), Tone::Info)));
    assert_eq!(last_position(&events, 0), 1);
    assert_eq!(last_position(&events, 1), 1);
  }

  #[tokio::test]
  async fn naming_elements_saves_the_player() {
    use SquareKind::*;
    let mut h = harness(config(1), &[Basic, Quiz, Basic, Basic], template_deck(ONE_PLUS_ONE));
    h.tx.send(PlayerAction::Roll).unwrap();
    h.tx.send(PlayerAction::Answer("3".into())).unwrap();
    h.tx.send(PlayerAction::Answer("hydrogen, helium, lithium, beryllium, boron".into())).unwrap();
    drop(h.tx);

    assert!(matches!(h.session.run().await, Err(GameError::Disconnected)));
    let events = drain(&mut h.events);
    let msgs = messages(&events);
    let incorrect = msgs.iter().position(|m| m.0 == "Incorrect!").unwrap();
    assert!(msgs[incorrect..].iter().any(|m| m.0 == "Correct!"));
    assert_eq!(last_position(&events, 0), 1);
  }

  #[tokio::test]
  async fn failing_both_moves_the_player_back() {
    use SquareKind::*;
    let mut kinds = vec![Basic; 12];
    kinds[6] = Quiz;
    let mut h = harness(config(6), &kinds, template_deck(ONE_PLUS_ONE));
    h.tx.send(PlayerAction::Roll).unwrap();
    h.tx.send(PlayerAction::Answer("3".into())).unwrap();
    h.tx.send(PlayerAction::Answer("gold, gold, irn, tin, leed".into())).unwrap();
    drop(h.tx);

    assert!(matches!(h.session.run().await, Err(GameError::Disconnected)));
    let events = drain(&mut h.events);
    assert_eq!(last_position(&events, 0), 1);
    assert!(messages(&events).iter().any(|(text, tone)| *tone == Tone::Incorrect && text.ends_with("gold, irn, and leed")));
  }

  #[tokio::test]
  async fn penalty_never_goes_below_the_start() {
    use SquareKind::*;
    let mut h = harness(config(2), &[Basic, Basic, Lab, Basic, Basic, Basic], template_deck(ONE_PLUS_ONE));
    h.tx.send(PlayerAction::Roll).unwrap();
    h.tx.send(PlayerAction::Answer("5".into())).unwrap();
    h.tx.send(PlayerAction::Answer("carbon".into())).unwrap();
    drop(h.tx);

    assert!(matches!(h.session.run().await, Err(GameError::Disconnected)));
    let events = drain(&mut h.events);
    assert!(messages(&events).contains(&("Not enough elements named.".into(), Tone::Incorrect)));
    assert_eq!(last_position(&events, 0), 0);
  }

  #[tokio::test]
  async fn challenge_timeout_counts_as_an_empty_answer() {
    use SquareKind::*;
    let mut cfg = config(1);
    cfg.challenge.seconds = 0;
    let mut h = harness(cfg, &[Basic, Quiz, Basic, Basic], template_deck(ONE_PLUS_ONE));
    h.tx.send(PlayerAction::Roll).unwrap();
    h.tx.send(PlayerAction::Answer("3".into())).unwrap();

    // Keep the sender alive so the challenge can only end by timing out.
    let tx = h.tx.clone();
    let run = tokio::spawn(h.session.run());
    let mut events = Vec::new();
    while let Some(e) = h.events.recv().await {
      let done = matches!(&e, ServerWsMessage::Phase { phase: TurnPhase::TurnComplete, .. });
      events.push(e);
      if done {
        break;
      }
    }
    drop(tx);
    drop(h.tx);
    assert!(matches!(run.await.unwrap(), Err(GameError::Disconnected)));
    assert!(messages(&events).contains(&("Not enough elements named.".into(), Tone::Incorrect)));
    assert_eq!(last_position(&events, 0), 0);
  }

  #[tokio::test]
  async fn broken_templates_are_reported_without_penalty() {
    use SquareKind::*;
    let mut h = harness(config(1), &[Basic, Quiz, Basic, Basic], template_deck("!\nBoom?\nanswer == shapes[20]"));
    h.tx.send(PlayerAction::Roll).unwrap();
    h.tx.send(PlayerAction::Answer("x".into())).unwrap();
    drop(h.tx);

    assert!(matches!(h.session.run().await, Err(GameError::Disconnected)));
    let events = drain(&mut h.events);
    assert!(events.iter().any(|e| matches!(e, ServerWsMessage::Error { .. })));
    assert!(!messages(&events).iter().any(|m| m.0 == "Incorrect!"));
    assert_eq!(last_position(&events, 0), 1);
  }

  #[tokio::test]
  async fn unreachable_proxy_is_reported_without_penalty() {
    use SquareKind::*;
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let proxy = QuestionProxy::from_config(&ProxyConfig { url: Some(format!("http://{addr}")), timeout_secs: 2 });
    let sources = QuestionsConfig { quiz: QuestionSource::Remote, ..QuestionsConfig::default() };
    let deck = QuestionDeck::new(banks(ONE_PLUS_ONE), proxy, &sources);

    let mut h = harness(config(1), &[Basic, Quiz, Basic, Basic], deck);
    h.tx.send(PlayerAction::Roll).unwrap();
    drop(h.tx);

    assert!(matches!(h.session.run().await, Err(GameError::Disconnected)));
    let events = drain(&mut h.events);
    assert!(events.iter().any(|e| matches!(e, ServerWsMessage::Error { .. })));
    assert!(!events.iter().any(|e| matches!(e, ServerWsMessage::Prompt { .. })));
    assert_eq!(last_position(&events, 0), 1);
  }
}
