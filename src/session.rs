//! Connected participants and their outbound channels.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use tokio::sync::mpsc::UnboundedSender;

use crate::game::{MatchId, PlayerId};
use crate::protocol::Message;

/// One connected participant.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    pub id: PlayerId,
    pub name: String,
    pub current_game: Option<MatchId>,
    outbox: UnboundedSender<Message>,
}

impl PlayerSession {
    pub fn in_game(&self) -> bool {
        self.current_game.is_some()
    }
}

#[derive(Default)]
pub struct SessionManager {
    sessions: Mutex<HashMap<PlayerId, PlayerSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PlayerId, PlayerSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new participant. Messages for it are pushed into `outbox`.
    pub fn connect(&self, name: &str, outbox: UnboundedSender<Message>) -> PlayerId {
        let id = PlayerId::random();
        self.lock().insert(
            id,
            PlayerSession {
                id,
                name: name.to_string(),
                current_game: None,
                outbox,
            },
        );
        info!("Session created for {} ({})", name, id);
        id
    }

    pub fn get(&self, id: PlayerId) -> Option<PlayerSession> {
        self.lock().get(&id).cloned()
    }

    pub fn name(&self, id: PlayerId) -> Option<String> {
        self.lock().get(&id).map(|s| s.name.clone())
    }

    pub fn current_game(&self, id: PlayerId) -> Option<MatchId> {
        self.lock().get(&id).and_then(|s| s.current_game)
    }

    pub fn set_current_game(&self, id: PlayerId, game: Option<MatchId>) {
        if let Some(session) = self.lock().get_mut(&id) {
            session.current_game = game;
        }
    }

    /// Queue `msg` for `id`. Returns `false` when there is no such session
    /// or its connection is gone.
    pub fn send(&self, id: PlayerId, msg: Message) -> bool {
        let outbox = match self.lock().get(&id) {
            Some(session) => session.outbox.clone(),
            None => return false,
        };
        let kind = msg.kind();
        let delivered = outbox.send(msg).is_ok();
        if !delivered {
            debug!("Dropping {} for {}: connection closed", kind, id);
        }
        delivered
    }

    pub fn remove(&self, id: PlayerId) -> Option<PlayerSession> {
        let removed = self.lock().remove(&id);
        if let Some(session) = &removed {
            info!("Session removed for {} ({})", session.name, id);
        }
        removed
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }
}
