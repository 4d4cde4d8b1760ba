//! Headless bot client: plays one whole match over any transport.

use log::{debug, info, warn};
use rand::rngs::SmallRng;

use crate::model::{Board, CellState, Coordinate, ShotOutcome};
use crate::player::{AiPlayer, Player};
use crate::protocol::{GameMode, Message, OPPONENT_GONE, PROTOCOL_VERSION};
use crate::transport::Transport;

/// The opponent's board as learned from shot results.
#[derive(Debug, Clone, Default)]
pub struct OpponentView {
    board: Board,
}

impl OpponentView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Apply a reported outcome of our own shot at `target`.
    pub fn record(&mut self, target: Coordinate, outcome: ShotOutcome) {
        match outcome {
            ShotOutcome::AlreadyShot => {}
            ShotOutcome::Miss => self.board.set_cell_state(target, CellState::Miss),
            ShotOutcome::Hit => self.board.set_cell_state(target, CellState::Hit),
            ShotOutcome::Sunk => self.mark_sunk(target),
        }
    }

    /// Turn the run of struck cells through `target` into `Sunk`. Ships
    /// never touch, so every struck cell reachable along a row or column
    /// belongs to the same ship.
    fn mark_sunk(&mut self, target: Coordinate) {
        self.board.set_cell_state(target, CellState::Sunk);
        for (dc, dr) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            let mut next = target.offset(dc, dr);
            while let Some(c) = next {
                if !matches!(self.board.cell_state(c), CellState::Hit | CellState::Sunk) {
                    break;
                }
                self.board.set_cell_state(c, CellState::Sunk);
                next = c.offset(dc, dr);
            }
        }
    }
}

/// How a match ended for the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub won: bool,
    pub winner: String,
    pub reason: String,
    pub shots: usize,
    pub hits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotOutcome {
    Finished(MatchSummary),
    /// The server called the match off, e.g. the opponent left during setup.
    Cancelled(String),
}

pub struct BotClient<T: Transport> {
    transport: T,
    name: String,
    mode: GameMode,
    rng: SmallRng,
    player: AiPlayer,
    own: Board,
    view: OpponentView,
    pending_shot: Option<Coordinate>,
}

impl<T: Transport> BotClient<T> {
    pub fn new(transport: T, name: impl Into<String>, mode: GameMode, rng: SmallRng) -> Self {
        Self {
            transport,
            name: name.into(),
            mode,
            rng,
            player: AiPlayer::new(),
            own: Board::new(),
            view: OpponentView::new(),
            pending_shot: None,
        }
    }

    pub fn own_board(&self) -> &Board {
        &self.own
    }

    pub fn view(&self) -> &OpponentView {
        &self.view
    }

    pub async fn run(&mut self) -> anyhow::Result<BotOutcome> {
        self.transport
            .send(Message::Connect {
                player_name: self.name.clone(),
                client_version: PROTOCOL_VERSION.to_string(),
            })
            .await?;
        match self.transport.recv().await? {
            Message::Connected { player_id, .. } => info!("{} connected as {}", self.name, player_id),
            other => anyhow::bail!("Expected CONNECTED, got {}", other.kind()),
        }
        self.transport.send(Message::FindGame { mode: self.mode }).await?;

        loop {
            match self.transport.recv().await? {
                Message::GameFound { game_id, opponent } => {
                    info!("{} joined game {} against {}", self.name, game_id, opponent);
                    self.place_fleet().await?;
                }
                Message::ShipPlaced { success: false, message } => {
                    anyhow::bail!("Ship placement rejected: {}", message);
                }
                Message::ShipPlaced { .. } => {}
                Message::GameStart { your_turn } => {
                    if your_turn {
                        self.fire().await?;
                    }
                }
                Message::ShotResult {
                    shooter,
                    target,
                    result,
                    your_turn,
                    ..
                } => {
                    // Our own result always arrives while a shot is pending, so
                    // an opponent sharing our name is still told apart.
                    if shooter == self.name && self.pending_shot.is_some() {
                        self.pending_shot = None;
                        self.view.record(target, result);
                    } else {
                        self.own.shoot(target);
                    }
                    if your_turn {
                        self.fire().await?;
                    }
                }
                Message::GameOver {
                    winner,
                    you_won,
                    reason,
                    total_shots,
                    hits,
                } => {
                    return Ok(BotOutcome::Finished(MatchSummary {
                        won: you_won,
                        winner,
                        reason,
                        shots: total_shots,
                        hits,
                    }));
                }
                Message::Error { code, message } if code == OPPONENT_GONE => {
                    return Ok(BotOutcome::Cancelled(message));
                }
                Message::Error { code, message } => {
                    warn!("{} got error {}: {}", self.name, code, message);
                    self.pending_shot = None;
                }
                other => debug!("{} ignoring {}", self.name, other.kind()),
            }
        }
    }

    async fn place_fleet(&mut self) -> anyhow::Result<()> {
        self.own = Board::new();
        self.player
            .place_ships(&mut self.rng, &mut self.own)
            .map_err(|e| anyhow::anyhow!(e))?;
        for ship in self.own.ships().to_vec() {
            self.transport
                .send(Message::PlaceShip {
                    ship: ship.class(),
                    start: ship.anchor(),
                    orientation: Some(ship.orientation()),
                })
                .await?;
        }
        self.transport.send(Message::Ready).await
    }

    async fn fire(&mut self) -> anyhow::Result<()> {
        let target = self
            .player
            .select_target(&mut self.rng, self.view.board())
            .map_err(|e| anyhow::anyhow!(e))?;
        self.pending_shot = Some(target);
        self.transport.send(Message::Fire { target }).await
    }
}
