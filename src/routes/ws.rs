//! WebSocket upgrade + message loop. One connection drives one game at a time:
//! `start` spawns a session, `roll` and `answer` are forwarded to it as player
//! actions, and every game event is relayed back as a JSON message.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use tokio::sync::mpsc::{self, error::TrySendError, Sender, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::game::io::PlayerAction;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!(target: "chemboard", "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut conn = Connection::new(state);
    info!(target: "chemboard", session = %conn.id, "WebSocket connected");

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(msg)) = incoming else { break };
                match msg {
                    Message::Text(txt) => {
                        let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
                            Ok(incoming) => {
                                debug!(target: "chemboard", session = %conn.id, "WS received: {:?}", &incoming);
                                conn.handle(incoming)
                            }
                            Err(e) => Some(ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }),
                        };
                        if let Some(reply) = reply {
                            if !send_json(&mut socket, &reply).await {
                                break;
                            }
                        }
                    }
                    Message::Ping(payload) => {
                        let _ = socket.send(Message::Pong(payload)).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            event = conn.next_event() => {
                if !send_json(&mut socket, &event).await {
                    break;
                }
            }
        }
    }
    info!(target: "chemboard", session = %conn.id, "WebSocket disconnected");
}

async fn send_json(socket: &mut WebSocket, msg: &ServerWsMessage) -> bool {
    let out = serde_json::to_string(msg).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = socket.send(Message::Text(out)).await {
        error!(target: "chemboard", error = %e, "WS send error");
        return false;
    }
    true
}

/// Per-socket game bookkeeping. Dropping it stops the running game.
///
/// Each game gets its own event channel, so nothing a replaced game queued
/// can reach the client after a restart.
struct Connection {
    id: Uuid,
    state: Arc<AppState>,
    events: Option<UnboundedReceiver<ServerWsMessage>>,
    actions: Option<Sender<PlayerAction>>,
    game: Option<JoinHandle<()>>,
}

impl Connection {
    fn new(state: Arc<AppState>) -> Self {
        Self { id: Uuid::new_v4(), state, events: None, actions: None, game: None }
    }

    /// Next event of the current game. Pends while no game is producing events.
    async fn next_event(&mut self) -> ServerWsMessage {
        loop {
            match self.events.as_mut() {
                Some(rx) => match rx.recv().await {
                    Some(event) => return event,
                    None => self.events = None,
                },
                None => std::future::pending::<()>().await,
            }
        }
    }

    /// Applies one client message. Returns an immediate reply, if any; game
    /// output arrives on the event channel instead.
    fn handle(&mut self, msg: ClientWsMessage) -> Option<ServerWsMessage> {
        match msg {
            ClientWsMessage::Ping => Some(ServerWsMessage::Pong),
            ClientWsMessage::Start { players } => self.start(players),
            ClientWsMessage::Roll => self.forward(PlayerAction::Roll),
            ClientWsMessage::Answer { text } => self.forward(PlayerAction::Answer(text)),
        }
    }

    /// Starts a new game, replacing any game already in progress.
    fn start(&mut self, players: Option<usize>) -> Option<ServerWsMessage> {
        self.stop();
        let (action_tx, action_rx) = mpsc::channel(1);
        let (event_tx, event_rx) = mpsc::unbounded_channel::<ServerWsMessage>();
        let session = match self.state.new_session(players, action_rx, event_tx.clone()) {
            Ok(s) => s,
            Err(e) => {
                error!(target: "game", session = %self.id, error = %e, "could not start game");
                return Some(ServerWsMessage::Error { message: e.to_string() });
            }
        };

        let id = self.id;
        self.game = Some(tokio::spawn(async move {
            match session.run().await {
                Ok(winner) => info!(target: "game", session = %id, winner, "game finished"),
                Err(e) => {
                    warn!(target: "game", session = %id, error = %e, "game aborted");
                    let _ = event_tx.send(ServerWsMessage::Error { message: e.to_string() });
                }
            }
        }));
        self.actions = Some(action_tx);
        self.events = Some(event_rx);
        info!(target: "game", session = %self.id, ?players, "game started");
        None
    }

    fn forward(&mut self, action: PlayerAction) -> Option<ServerWsMessage> {
        let Some(tx) = &self.actions else {
            return Some(ServerWsMessage::Error { message: "No game in progress. Send start first.".into() });
        };
        match tx.try_send(action) {
            Ok(()) => None,
            // The game has not consumed the previous action yet.
            Err(TrySendError::Full(_)) => {
                debug!(target: "game", session = %self.id, "action dropped; one already pending");
                None
            }
            Err(TrySendError::Closed(_)) => {
                Some(ServerWsMessage::Error { message: "No game in progress. Send start first.".into() })
            }
        }
    }

    fn stop(&mut self) {
        self.actions = None;
        self.events = None;
        if let Some(game) = self.game.take() {
            game.abort();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.stop();
    }
}
