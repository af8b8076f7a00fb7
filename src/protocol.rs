//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::game::board::SquareKind;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Start {
        #[serde(default)]
        players: Option<usize>,
    },
    Roll,
    Answer {
        text: String,
    },
}

/// Where the current turn is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingRoll,
    Moving,
    SquareEvent,
    QuestionPending,
    QuestionResult,
    TurnComplete,
    GameOver,
}

/// How the frontend should style a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Info,
    Correct,
    Incorrect,
    Error,
}

/// Messages the server sends back over WebSocket. Everything except `Pong`
/// originates from the game session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Board {
        squares: Vec<SquareOut>,
        width: f64,
        height: f64,
        players: usize,
    },
    TurnStarted {
        player: usize,
    },
    /// The player's interaction panel should be emptied.
    Cleared {
        player: usize,
    },
    Phase {
        player: usize,
        phase: TurnPhase,
    },
    DiceFace {
        face: u32,
        #[serde(rename = "final")]
        is_final: bool,
    },
    Positions {
        players: Vec<PlayerOut>,
    },
    Message {
        player: usize,
        text: String,
        tone: Tone,
    },
    Prompt {
        player: usize,
        text: String,
    },
    Countdown {
        player: usize,
        seconds_left: u64,
    },
    GameOver {
        winner: usize,
    },
    Error {
        message: String,
    },
}

/// One board square as the renderer needs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquareOut {
    pub number: usize,
    pub kind: SquareKind,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// One player token, already placed inside its square.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerOut {
    pub player: usize,
    pub position: usize,
    pub highlighted: bool,
    pub color: &'static str,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct BankOut {
    pub name: String,
    pub templates: usize,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct BanksOut {
    pub banks: Vec<BankOut>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_parse() {
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"start","players":3}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Start { players: Some(3) }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Start { players: None }));
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"answer","text":"carbon"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Answer { text } if text == "carbon"));
        assert!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"fly"}"#).is_err());
    }

    #[test]
    fn server_messages_are_tagged() {
        let v = serde_json::to_value(ServerWsMessage::Phase { player: 1, phase: TurnPhase::AwaitingRoll }).unwrap();
        assert_eq!(v, json!({"type": "phase", "player": 1, "phase": "awaiting_roll"}));
        let v = serde_json::to_value(ServerWsMessage::DiceFace { face: 4, is_final: true }).unwrap();
        assert_eq!(v, json!({"type": "dice_face", "face": 4, "final": true}));
        let v = serde_json::to_value(ServerWsMessage::Pong).unwrap();
        assert_eq!(v, json!({"type": "pong"}));
    }
}
