//! Live matches and the PvP waiting queue.
//!
//! Lock order is queue, then games. Neither lock is held while an engine's
//! own lock is taken.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::info;

use crate::game::{EngineConfig, GameEngine, MatchId, PlayerId};
use crate::protocol::GameMode;

/// Who a newly created match is against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opponent {
    Human(PlayerId),
    /// Automated participant created for this match.
    Ai(PlayerId),
}

impl Opponent {
    pub fn id(self) -> PlayerId {
        match self {
            Opponent::Human(id) | Opponent::Ai(id) => id,
        }
    }
}

pub enum MatchResult {
    /// Queued until another participant looks for a PvP match.
    Waiting,
    Found {
        game: Arc<GameEngine>,
        opponent: Opponent,
    },
}

#[derive(Default)]
pub struct MatchDirectory {
    queue: Mutex<VecDeque<PlayerId>>,
    games: Mutex<HashMap<MatchId, Arc<GameEngine>>>,
    engine_config: EngineConfig,
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MatchDirectory {
    pub fn new(engine_config: EngineConfig) -> Self {
        Self {
            engine_config,
            ..Self::default()
        }
    }

    /// Enter matchmaking. The caller becomes participant 1 of any match
    /// created here and therefore moves first.
    pub fn find_game(&self, player: PlayerId, mode: GameMode) -> MatchResult {
        match mode {
            GameMode::Pvp => self.find_pvp(player),
            GameMode::Pve => {
                self.cancel_search(player);
                let ai = PlayerId::random();
                let game = self.create(player, ai);
                info!("PvE game {} created for {}", game.id(), player);
                MatchResult::Found {
                    game,
                    opponent: Opponent::Ai(ai),
                }
            }
        }
    }

    fn find_pvp(&self, player: PlayerId) -> MatchResult {
        let mut queue = relock(&self.queue);
        let Some(pos) = queue.iter().position(|waiting| *waiting != player) else {
            if !queue.contains(&player) {
                queue.push_back(player);
                info!("Player {} queued for PvP", player);
            }
            return MatchResult::Waiting;
        };
        let Some(opponent) = queue.remove(pos) else {
            return MatchResult::Waiting;
        };
        queue.retain(|waiting| *waiting != player);
        let game = self.create(player, opponent);
        info!("PvP game {} created between {} and {}", game.id(), player, opponent);
        MatchResult::Found {
            game,
            opponent: Opponent::Human(opponent),
        }
    }

    fn create(&self, player1: PlayerId, player2: PlayerId) -> Arc<GameEngine> {
        let id = MatchId::random();
        let game = Arc::new(GameEngine::with_config(id, player1, player2, self.engine_config));
        relock(&self.games).insert(id, Arc::clone(&game));
        game
    }

    pub fn game(&self, id: MatchId) -> Option<Arc<GameEngine>> {
        relock(&self.games).get(&id).cloned()
    }

    pub fn remove_game(&self, id: MatchId) -> Option<Arc<GameEngine>> {
        let removed = relock(&self.games).remove(&id);
        if removed.is_some() {
            info!("Game {} removed", id);
        }
        removed
    }

    /// Leave the PvP queue. Returns `true` if the player was waiting.
    pub fn cancel_search(&self, player: PlayerId) -> bool {
        let mut queue = relock(&self.queue);
        let before = queue.len();
        queue.retain(|waiting| *waiting != player);
        let cancelled = queue.len() != before;
        if cancelled {
            info!("Player {} left the PvP queue", player);
        }
        cancelled
    }

    pub fn active_games(&self) -> usize {
        relock(&self.games).len()
    }

    pub fn queue_len(&self) -> usize {
        relock(&self.queue).len()
    }
}
