//! Messages exchanged between the match server and its clients.
//!
//! Every message is a JSON object whose `type` field names the kind, e.g.
//! `{"type":"FIRE","target":"B7"}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{MatchId, PlayerId};
use crate::model::{Coordinate, Orientation, ShipClass, ShotOutcome};

/// Version string announced in `CONNECTED` and `CONNECT`.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bad request or an action the match does not allow right now.
pub const BAD_REQUEST: u16 = 400;
/// No session: `CONNECT` was not sent first.
pub const UNAUTHORIZED: u16 = 401;
/// The session is not part of a live match.
pub const NOT_FOUND: u16 = 404;
/// The opponent left while ships were being placed. Terminal for the client.
pub const OPPONENT_GONE: u16 = 410;

/// Every message kind, in wire spelling.
pub const KNOWN_KINDS: [&str; 13] = [
    "CONNECT",
    "FIND_GAME",
    "PLACE_SHIP",
    "READY",
    "FIRE",
    "SURRENDER",
    "CONNECTED",
    "GAME_FOUND",
    "SHIP_PLACED",
    "GAME_START",
    "SHOT_RESULT",
    "GAME_OVER",
    "ERROR",
];

/// Matchmaking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Against another connected human.
    #[serde(rename = "PVP")]
    Pvp,
    /// Against the server's automated opponent.
    #[serde(rename = "PVE")]
    Pve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    // client -> server
    Connect {
        player_name: String,
        client_version: String,
    },
    FindGame {
        mode: GameMode,
    },
    PlaceShip {
        ship: ShipClass,
        start: Coordinate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        orientation: Option<Orientation>,
    },
    Ready,
    Fire {
        target: Coordinate,
    },
    Surrender,

    // server -> client
    Connected {
        player_id: PlayerId,
        server_version: String,
    },
    GameFound {
        game_id: MatchId,
        opponent: String,
    },
    ShipPlaced {
        success: bool,
        message: String,
    },
    GameStart {
        your_turn: bool,
    },
    ShotResult {
        /// Display name of the participant who fired.
        shooter: String,
        target: Coordinate,
        result: ShotOutcome,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sunk_ship: Option<ShipClass>,
        your_turn: bool,
    },
    GameOver {
        winner: String,
        you_won: bool,
        reason: String,
        /// Shots fired by the recipient.
        total_shots: usize,
        /// Recipient's shots that struck a ship.
        hits: usize,
    },
    Error {
        code: u16,
        message: String,
    },
}

impl Message {
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Message::Error {
            code,
            message: message.into(),
        }
    }

    /// Wire name of the message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Connect { .. } => "CONNECT",
            Message::FindGame { .. } => "FIND_GAME",
            Message::PlaceShip { .. } => "PLACE_SHIP",
            Message::Ready => "READY",
            Message::Fire { .. } => "FIRE",
            Message::Surrender => "SURRENDER",
            Message::Connected { .. } => "CONNECTED",
            Message::GameFound { .. } => "GAME_FOUND",
            Message::ShipPlaced { .. } => "SHIP_PLACED",
            Message::GameStart { .. } => "GAME_START",
            Message::ShotResult { .. } => "SHOT_RESULT",
            Message::GameOver { .. } => "GAME_OVER",
            Message::Error { .. } => "ERROR",
        }
    }
}

/// Errors raised while encoding or decoding messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not JSON, missing `type`, or fields that do not fit the kind.
    Malformed(String),
    /// Well-formed message of a kind nobody handles.
    UnknownKind(String),
    /// Frame larger than the configured limit.
    TooLarge { len: usize, max: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(reason) => write!(f, "Malformed message: {}", reason),
            ProtocolError::UnknownKind(kind) => write!(f, "Unknown message type: {}", kind),
            ProtocolError::TooLarge { len, max } => {
                write!(f, "Message too large: {} bytes (max: {})", len, max)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

pub fn encode(msg: &Message) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(msg).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<Message, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ProtocolError::Malformed("missing \"type\" field".to_string()))?;
    if !KNOWN_KINDS.contains(&kind) {
        return Err(ProtocolError::UnknownKind(kind.to_string()));
    }
    serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
}
