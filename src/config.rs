//! Runtime configuration of the match server.

use std::net::SocketAddr;
use std::time::Duration;

use crate::game::EngineConfig;
use crate::model::{AI_MOVE_DELAY, TURN_TIMEOUT};
use crate::transport::tcp::MAX_MESSAGE_SIZE;

/// Default listening address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// A turn held longer than this loses the match on the next shot.
    pub turn_timeout: Duration,
    /// Pause before the automated opponent fires.
    pub ai_move_delay: Duration,
    /// Largest accepted frame payload, in bytes.
    pub max_message_size: usize,
}

impl ServerConfig {
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            turn_timeout: self.turn_timeout,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            turn_timeout: TURN_TIMEOUT,
            ai_move_delay: AI_MOVE_DELAY,
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}
