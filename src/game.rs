//! Per-match engine: setup, turn order, timeouts and win detection.
//!
//! Every mutation and the checks guarding it run under the engine's mutex,
//! so two callers can never both act on the same turn. Engines are shared
//! as `Arc<GameEngine>`; separate matches never contend.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::model::{
    Board, BoardError, CellState, Coordinate, Orientation, Ship, ShipClass, ShotOutcome,
    ShotResult, TURN_TIMEOUT,
};

/// Identity of a connected participant, human or automated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub uuid::Uuid);

impl PlayerId {
    pub fn random() -> Self {
        PlayerId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub uuid::Uuid);

impl MatchId {
    pub fn random() -> Self {
        MatchId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a match. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Setup,
    InProgress,
    Finished,
}

/// Why a match finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// The loser's whole fleet was sunk.
    FleetDestroyed,
    Surrender,
    /// The loser's connection went away mid-match.
    Disconnect,
    /// The loser held the turn for longer than the turn timeout.
    TurnTimeout,
}

impl FinishReason {
    pub fn describe(self) -> &'static str {
        match self {
            FinishReason::FleetDestroyed => "Fleet destroyed",
            FinishReason::Surrender => "Surrender",
            FinishReason::Disconnect => "Player disconnected",
            FinishReason::TurnTimeout => "Turn time limit exceeded",
        }
    }
}

/// An action the engine refused. No state changed, except for
/// [`Rejection::TurnTimedOut`] which finishes the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotInSetup,
    NotInProgress,
    NotYourTurn,
    TurnTimedOut,
    UnknownPlayer(PlayerId),
    /// Overlapping or touching another ship.
    InvalidPlacement,
    ShipOffBoard(BoardError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotInSetup => write!(f, "Game has already started"),
            Rejection::NotInProgress => write!(f, "Game is not in progress"),
            Rejection::NotYourTurn => write!(f, "Not your turn"),
            Rejection::TurnTimedOut => write!(f, "Turn time limit exceeded, game over"),
            Rejection::UnknownPlayer(id) => write!(f, "Player {} is not part of this game", id),
            Rejection::InvalidPlacement => {
                write!(f, "Cannot place ship here: it overlaps or touches another ship")
            }
            Rejection::ShipOffBoard(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Rejection {}

/// Runtime knobs of an engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub turn_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_timeout: TURN_TIMEOUT,
        }
    }
}

/// Full state of one match. Participant 1 sits at index 0.
#[derive(Debug, Clone)]
pub struct GameState {
    pub id: MatchId,
    pub players: [PlayerId; 2],
    pub boards: [Board; 2],
    pub current_turn: PlayerId,
    pub status: GameStatus,
    pub winner: Option<PlayerId>,
    pub finish_reason: Option<FinishReason>,
    pub turn_started: Instant,
}

impl GameState {
    fn new(id: MatchId, player1: PlayerId, player2: PlayerId) -> Self {
        Self {
            id,
            players: [player1, player2],
            boards: [Board::new(), Board::new()],
            current_turn: player1,
            status: GameStatus::Setup,
            winner: None,
            finish_reason: None,
            turn_started: Instant::now(),
        }
    }

    fn seat(&self, player: PlayerId) -> Result<usize, Rejection> {
        self.players
            .iter()
            .position(|p| *p == player)
            .ok_or(Rejection::UnknownPlayer(player))
    }

    fn finish(&mut self, winner: PlayerId, reason: FinishReason) {
        self.status = GameStatus::Finished;
        self.winner = Some(winner);
        self.finish_reason = Some(reason);
    }

    fn switch_turn(&mut self) {
        let seat = usize::from(self.current_turn == self.players[0]);
        self.current_turn = self.players[seat];
        self.turn_started = Instant::now();
    }
}

/// What a successful [`GameEngine::fire`] did, read under the same lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireReport {
    pub shot: ShotResult,
    /// Turn holder after the shot.
    pub current_turn: PlayerId,
    pub status: GameStatus,
}

impl FireReport {
    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }
}

pub struct GameEngine {
    id: MatchId,
    state: Mutex<GameState>,
    config: EngineConfig,
}

impl GameEngine {
    pub fn new(id: MatchId, player1: PlayerId, player2: PlayerId) -> Self {
        Self::with_config(id, player1, player2, EngineConfig::default())
    }

    pub fn with_config(
        id: MatchId,
        player1: PlayerId,
        player2: PlayerId,
        config: EngineConfig,
    ) -> Self {
        info!("Game {} created between {} and {}", id, player1, player2);
        Self {
            id,
            state: Mutex::new(GameState::new(id, player1, player2)),
            config,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Place a ship on `player`'s board during setup. Single-cell ships are
    /// always horizontal.
    pub fn place_ship(
        &self,
        player: PlayerId,
        class: ShipClass,
        anchor: Coordinate,
        orientation: Orientation,
    ) -> Result<(), Rejection> {
        let mut state = self.lock();
        if state.status != GameStatus::Setup {
            return Err(Rejection::NotInSetup);
        }
        let seat = state.seat(player)?;
        let orientation = if class.length() == 1 {
            Orientation::Horizontal
        } else {
            orientation
        };
        let ship = Ship::new(class, anchor, orientation).map_err(Rejection::ShipOffBoard)?;
        if !state.boards[seat].place_ship(ship) {
            return Err(Rejection::InvalidPlacement);
        }
        debug!("Player {} placed {} at {}", player, class.name(), anchor);
        Ok(())
    }

    /// Whether `player` has placed exactly the standard fleet.
    pub fn check_ready(&self, player: PlayerId) -> bool {
        let state = self.lock();
        state
            .seat(player)
            .map(|seat| state.boards[seat].fleet_complete())
            .unwrap_or(false)
    }

    /// Move from setup to play once both fleets are complete. Participant 1
    /// moves first and the turn timer starts now.
    pub fn start_game(&self) -> bool {
        let mut state = self.lock();
        if state.status != GameStatus::Setup {
            return false;
        }
        if !state.boards.iter().all(Board::fleet_complete) {
            return false;
        }
        state.status = GameStatus::InProgress;
        state.current_turn = state.players[0];
        state.turn_started = Instant::now();
        info!("Game {} started", state.id);
        true
    }

    /// Fire at the opponent of `shooter`.
    ///
    /// An `AlreadyShot` outcome changes nothing, the turn included.
    pub fn fire(&self, shooter: PlayerId, target: Coordinate) -> Result<FireReport, Rejection> {
        let mut state = self.lock();
        if state.status != GameStatus::InProgress {
            return Err(Rejection::NotInProgress);
        }
        let seat = state.seat(shooter)?;
        if state.current_turn != shooter {
            return Err(Rejection::NotYourTurn);
        }
        if state.turn_started.elapsed() > self.config.turn_timeout {
            let opponent = state.players[1 - seat];
            state.finish(opponent, FinishReason::TurnTimeout);
            warn!(
                "Game {} ended on turn timeout, winner {}",
                state.id, opponent
            );
            return Err(Rejection::TurnTimedOut);
        }

        let board = &mut state.boards[1 - seat];
        let shot = board.shoot(target);
        let fleet_destroyed = board.all_ships_sunk();
        match shot.outcome {
            ShotOutcome::AlreadyShot => {}
            _ if fleet_destroyed => {
                state.finish(shooter, FinishReason::FleetDestroyed);
                info!("Game {} finished, winner {}", state.id, shooter);
            }
            ShotOutcome::Miss => state.switch_turn(),
            ShotOutcome::Hit | ShotOutcome::Sunk => state.turn_started = Instant::now(),
        }
        debug!("Game {}: {} fired at {} -> {:?}", state.id, shooter, target, shot.outcome);

        Ok(FireReport {
            shot,
            current_turn: state.current_turn,
            status: state.status,
        })
    }

    /// Concede the match. Returns `Ok(false)` if it was already finished.
    pub fn surrender(&self, player: PlayerId) -> Result<bool, Rejection> {
        self.resign(player, FinishReason::Surrender)
    }

    /// Concede on behalf of a participant whose connection dropped.
    pub fn abandon(&self, player: PlayerId) -> Result<bool, Rejection> {
        self.resign(player, FinishReason::Disconnect)
    }

    fn resign(&self, player: PlayerId, reason: FinishReason) -> Result<bool, Rejection> {
        let mut state = self.lock();
        let seat = state.seat(player)?;
        if state.status == GameStatus::Finished {
            return Ok(false);
        }
        let opponent = state.players[1 - seat];
        state.finish(opponent, reason);
        info!("Player {} resigned game {} ({:?})", player, state.id, reason);
        Ok(true)
    }

    pub fn status(&self) -> GameStatus {
        self.lock().status
    }

    pub fn current_turn(&self) -> PlayerId {
        self.lock().current_turn
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.lock().winner
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.lock().finish_reason
    }

    pub fn players(&self) -> [PlayerId; 2] {
        self.lock().players
    }

    pub fn is_turn(&self, player: PlayerId) -> bool {
        let state = self.lock();
        state.status == GameStatus::InProgress && state.current_turn == player
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        let state = self.lock();
        let seat = state.seat(player).ok()?;
        Some(state.players[1 - seat])
    }

    /// Consistent copy of the whole match state.
    pub fn snapshot(&self) -> GameState {
        self.lock().clone()
    }

    /// `player`'s own board.
    pub fn board_of(&self, player: PlayerId) -> Result<Board, Rejection> {
        let state = self.lock();
        let seat = state.seat(player)?;
        Ok(state.boards[seat].clone())
    }

    /// What `player` may know about the opponent's board.
    pub fn opponent_view(&self, player: PlayerId) -> Result<Board, Rejection> {
        let state = self.lock();
        let seat = state.seat(player)?;
        Ok(state.boards[1 - seat].observed())
    }

    /// Shots fired by `player` and how many of them struck a ship.
    pub fn shot_stats(&self, player: PlayerId) -> Result<(usize, usize), Rejection> {
        let state = self.lock();
        let seat = state.seat(player)?;
        let target = &state.boards[1 - seat];
        let hits = target
            .shot_coordinates()
            .filter(|c| matches!(target.cell_state(*c), CellState::Hit | CellState::Sunk))
            .count();
        Ok((target.shots().count(), hits))
    }
}
