#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod ai;
pub mod model;
pub mod player;

#[cfg(feature = "std")]
pub mod client;
#[cfg(feature = "std")]
pub mod config;
#[cfg(feature = "std")]
pub mod directory;
#[cfg(feature = "std")]
pub mod game;
#[cfg(feature = "std")]
pub mod local;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

pub use ai::{choose_target, hunt_candidates, is_valid_target};
pub use model::{
    BitBoard, BitBoardError, Board, BoardError, CellState, Coordinate, Mask, Orientation, Ship,
    ShipClass, ShotOutcome, ShotResult, BOARD_SIZE, FLEET, TOTAL_SHIPS, TOTAL_SHIP_CELLS,
};
pub use player::{AiPlayer, Player};

#[cfg(feature = "std")]
pub use client::{BotClient, BotOutcome, MatchSummary, OpponentView};
#[cfg(feature = "std")]
pub use config::ServerConfig;
#[cfg(feature = "std")]
pub use directory::{MatchDirectory, MatchResult, Opponent};
#[cfg(feature = "std")]
pub use game::{
    EngineConfig, FinishReason, FireReport, GameEngine, GameState, GameStatus, MatchId, PlayerId,
    Rejection,
};
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use protocol::{GameMode, Message, ProtocolError, PROTOCOL_VERSION};
#[cfg(feature = "std")]
pub use server::Server;
#[cfg(feature = "std")]
pub use session::SessionManager;
#[cfg(feature = "std")]
pub use transport::{InMemoryTransport, TcpTransport, Transport};
