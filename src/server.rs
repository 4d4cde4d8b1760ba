//! Match server: one task per connection relaying messages to the engines.
//!
//! Each connection runs a `select!` loop over its inbound messages and its
//! session's outbox. Everything a participant receives, replies included,
//! goes through that outbox, so notifications keep their order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::AbortHandle;

use crate::config::ServerConfig;
use crate::directory::{MatchDirectory, MatchResult, Opponent};
use crate::game::{FireReport, GameEngine, GameStatus, MatchId, PlayerId, Rejection};
use crate::model::{Board, BoardError, Coordinate, ShotOutcome};
use crate::player::{AiPlayer, Player};
use crate::protocol::{
    GameMode, Message, ProtocolError, BAD_REQUEST, NOT_FOUND, OPPONENT_GONE, PROTOCOL_VERSION,
    UNAUTHORIZED,
};
use crate::session::SessionManager;
use crate::transport::tcp::DEFAULT_TIMEOUT;
use crate::transport::{TcpTransport, Transport};

/// Display name of the server's automated opponent.
pub const AI_NAME: &str = "AI";

/// Pause after a failed `accept`, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

struct AiSeat {
    player: AiPlayer,
    rng: SmallRng,
    game: MatchId,
}

/// Automated participants and their pending delayed turns.
pub struct AiService {
    seats: Mutex<HashMap<PlayerId, AiSeat>>,
    pending: Mutex<HashMap<MatchId, AbortHandle>>,
    rng: Mutex<SmallRng>,
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AiService {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Self {
            seats: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Seat an automated participant in `game` and place its fleet through
    /// the engine.
    pub fn create(&self, id: PlayerId, game: &GameEngine) -> Result<(), BoardError> {
        let mut rng = SmallRng::from_rng(&mut *relock(&self.rng));
        let mut player = AiPlayer::new();
        let mut board = Board::new();
        player.place_ships(&mut rng, &mut board)?;
        for ship in board.ships() {
            if let Err(rejection) =
                game.place_ship(id, ship.class(), ship.anchor(), ship.orientation())
            {
                error!("AI {} could not place {:?}: {}", id, ship, rejection);
            }
        }
        relock(&self.seats).insert(
            id,
            AiSeat {
                player,
                rng,
                game: game.id(),
            },
        );
        info!("AI {} seated in game {}", id, game.id());
        Ok(())
    }

    pub fn is_ai(&self, id: PlayerId) -> bool {
        relock(&self.seats).contains_key(&id)
    }

    /// Next shot of `id` against `view`; `Ok(None)` if `id` is not seated.
    pub fn choose(&self, id: PlayerId, view: &Board) -> Result<Option<Coordinate>, BoardError> {
        let mut seats = relock(&self.seats);
        let Some(seat) = seats.get_mut(&id) else {
            return Ok(None);
        };
        let AiSeat { player, rng, .. } = seat;
        player.select_target(rng, view).map(Some)
    }

    fn set_pending(&self, game: MatchId, handle: AbortHandle) {
        if let Some(previous) = relock(&self.pending).insert(game, handle) {
            previous.abort();
        }
    }

    /// Drop the seats of `game` and cancel its delayed turn.
    pub fn end_match(&self, game: MatchId) {
        if let Some(handle) = relock(&self.pending).remove(&game) {
            handle.abort();
        }
        relock(&self.seats).retain(|id, seat| {
            let keep = seat.game != game;
            if !keep {
                debug!("AI {} removed", id);
            }
            keep
        });
    }

    pub fn seated(&self) -> usize {
        relock(&self.seats).len()
    }
}

pub struct Server {
    config: ServerConfig,
    sessions: SessionManager,
    directory: MatchDirectory,
    ai: AiService,
}

impl Server {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Self::with_seed(config, None)
    }

    /// Server whose automated opponents draw from a fixed seed.
    pub fn with_seed(config: ServerConfig, seed: Option<u64>) -> Arc<Self> {
        Arc::new(Self {
            directory: MatchDirectory::new(config.engine()),
            sessions: SessionManager::new(),
            ai: AiService::new(seed),
            config,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn directory(&self) -> &MatchDirectory {
        &self.directory
    }

    pub fn ai(&self) -> &AiService {
        &self.ai
    }

    /// Accept TCP connections forever.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> anyhow::Result<()> {
        info!("Listening on {}", listener.local_addr()?);
        loop {
            let (stream, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            debug!("Connection from {}", addr);
            let transport =
                TcpTransport::with_config(stream, DEFAULT_TIMEOUT, self.config.max_message_size);
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = server.handle_connection(transport).await {
                    warn!("Connection {} ended with an error: {}", addr, e);
                }
            });
        }
    }

    /// Serve one connection until it closes, then clean up after it.
    pub async fn handle_connection<T: Transport>(self: &Arc<Self>, mut transport: T) -> anyhow::Result<()> {
        let mut player = None;
        let result = self.session_loop(&mut transport, &mut player).await;
        if let Some(id) = player {
            self.disconnect(id);
        }
        result
    }

    async fn session_loop<T: Transport>(
        self: &Arc<Self>,
        transport: &mut T,
        player: &mut Option<PlayerId>,
    ) -> anyhow::Result<()> {
        let (outbox, mut inbox) = mpsc::unbounded_channel();
        loop {
            tokio::select! {
                inbound = transport.recv() => match inbound {
                    Ok(msg) => self.dispatch(player, &outbox, msg),
                    Err(err) => match err.downcast_ref::<ProtocolError>() {
                        Some(ProtocolError::Malformed(_) | ProtocolError::UnknownKind(_)) => {
                            debug!("Rejected inbound message: {}", err);
                            transport.send(Message::error(BAD_REQUEST, err.to_string())).await?;
                        }
                        Some(ProtocolError::TooLarge { .. }) => return Err(err),
                        None => {
                            debug!("Connection closed: {}", err);
                            return Ok(());
                        }
                    },
                },
                Some(out) = inbox.recv() => transport.send(out).await?,
            }
        }
    }

    fn dispatch(self: &Arc<Self>, player: &mut Option<PlayerId>, reply: &UnboundedSender<Message>, msg: Message) {
        let kind = msg.kind();
        let outcome = match (msg, *player) {
            (Message::Connect { player_name, .. }, None) => {
                let id = self.sessions.connect(&player_name, reply.clone());
                *player = Some(id);
                Ok(Some(Message::Connected {
                    player_id: id,
                    server_version: PROTOCOL_VERSION.to_string(),
                }))
            }
            (Message::Connect { .. }, Some(_)) => {
                Err(Message::error(BAD_REQUEST, "Already connected"))
            }
            (_, None) => Err(Message::error(UNAUTHORIZED, "Session not found")),
            (Message::FindGame { mode }, Some(id)) => self.find_game(id, mode),
            (
                Message::PlaceShip {
                    ship,
                    start,
                    orientation,
                },
                Some(id),
            ) => self.current_game(id).map(|game| {
                let placed =
                    game.place_ship(id, ship, start, orientation.unwrap_or_default());
                Some(Message::ShipPlaced {
                    success: placed.is_ok(),
                    message: match placed {
                        Ok(()) => "Ship placed".to_string(),
                        Err(rejection) => rejection.to_string(),
                    },
                })
            }),
            (Message::Ready, Some(id)) => self.ready(id),
            (Message::Fire { target }, Some(id)) => self.fire(id, target),
            (Message::Surrender, Some(id)) => self.surrender(id),
            (_, Some(_)) => Err(Message::error(
                BAD_REQUEST,
                format!("{} is not a client message", kind),
            )),
        };
        let out = match outcome {
            Ok(Some(msg)) => msg,
            Ok(None) => return,
            Err(err) => err,
        };
        if reply.send(out).is_err() {
            debug!("Reply to {} dropped: connection closed", kind);
        }
    }

    fn current_game(&self, id: PlayerId) -> Result<Arc<GameEngine>, Message> {
        let game_id = self
            .sessions
            .current_game(id)
            .ok_or_else(|| Message::error(BAD_REQUEST, "You are not in a game"))?;
        self.directory
            .game(game_id)
            .ok_or_else(|| Message::error(NOT_FOUND, "Game not found"))
    }

    fn display_name(&self, id: PlayerId) -> String {
        match self.sessions.name(id) {
            Some(name) => name,
            None if self.ai.is_ai(id) => AI_NAME.to_string(),
            None => id.to_string(),
        }
    }

    fn find_game(&self, id: PlayerId, mode: GameMode) -> Result<Option<Message>, Message> {
        if self.sessions.current_game(id).is_some() {
            return Err(Message::error(BAD_REQUEST, "Already in a game"));
        }
        let (game, opponent) = match self.directory.find_game(id, mode) {
            MatchResult::Waiting => return Ok(None),
            MatchResult::Found { game, opponent } => (game, opponent),
        };
        self.sessions.set_current_game(id, Some(game.id()));
        let opponent_name = match opponent {
            Opponent::Human(other) => {
                self.sessions.set_current_game(other, Some(game.id()));
                self.sessions.send(
                    other,
                    Message::GameFound {
                        game_id: game.id(),
                        opponent: self.display_name(id),
                    },
                );
                self.display_name(other)
            }
            Opponent::Ai(ai) => {
                if let Err(e) = self.ai.create(ai, &game) {
                    error!("Could not set up AI for game {}: {}", game.id(), e);
                }
                AI_NAME.to_string()
            }
        };
        Ok(Some(Message::GameFound {
            game_id: game.id(),
            opponent: opponent_name,
        }))
    }

    fn ready(self: &Arc<Self>, id: PlayerId) -> Result<Option<Message>, Message> {
        let game = self.current_game(id)?;
        if !game.check_ready(id) {
            return Err(Message::error(BAD_REQUEST, "Not all ships are placed"));
        }
        if game.start_game() {
            let first = game.current_turn();
            for player in game.players() {
                self.sessions.send(
                    player,
                    Message::GameStart {
                        your_turn: player == first,
                    },
                );
            }
            self.schedule_ai_turn(&game);
        }
        Ok(None)
    }

    fn fire(self: &Arc<Self>, id: PlayerId, target: Coordinate) -> Result<Option<Message>, Message> {
        let game = self.current_game(id)?;
        match game.fire(id, target) {
            Ok(report) => {
                self.broadcast_shot(&game, id, target, &report);
                if report.is_finished() {
                    self.game_over(&game);
                } else {
                    self.schedule_ai_turn(&game);
                }
                Ok(None)
            }
            Err(Rejection::TurnTimedOut) => {
                self.sessions.send(
                    id,
                    Message::error(BAD_REQUEST, Rejection::TurnTimedOut.to_string()),
                );
                self.game_over(&game);
                Ok(None)
            }
            Err(rejection) => Err(Message::error(BAD_REQUEST, rejection.to_string())),
        }
    }

    fn surrender(&self, id: PlayerId) -> Result<Option<Message>, Message> {
        let game = self.current_game(id)?;
        match game.surrender(id) {
            Ok(_) => {
                self.game_over(&game);
                Ok(None)
            }
            Err(rejection) => Err(Message::error(BAD_REQUEST, rejection.to_string())),
        }
    }

    /// Report a shot. `ALREADY_SHOT` only goes back to the shooter.
    fn broadcast_shot(&self, game: &GameEngine, shooter: PlayerId, target: Coordinate, report: &FireReport) {
        let shooter_name = self.display_name(shooter);
        let recipients = match report.shot.outcome {
            ShotOutcome::AlreadyShot => vec![shooter],
            _ => game.players().to_vec(),
        };
        for recipient in recipients {
            self.sessions.send(
                recipient,
                Message::ShotResult {
                    shooter: shooter_name.clone(),
                    target,
                    result: report.shot.outcome,
                    sunk_ship: report.shot.sunk_class(),
                    your_turn: report.status == GameStatus::InProgress
                        && report.current_turn == recipient,
                },
            );
        }
    }

    /// Notify both participants and tear the match down. Runs once per match.
    fn game_over(&self, game: &GameEngine) {
        if self.directory.remove_game(game.id()).is_none() {
            return;
        }
        let state = game.snapshot();
        let winner = state.winner.map(|w| self.display_name(w)).unwrap_or_default();
        let reason = state
            .finish_reason
            .map(|r| r.describe())
            .unwrap_or("Game over");
        for player in state.players {
            let (total_shots, hits) = game.shot_stats(player).unwrap_or((0, 0));
            self.sessions.send(
                player,
                Message::GameOver {
                    winner: winner.clone(),
                    you_won: state.winner == Some(player),
                    reason: reason.to_string(),
                    total_shots,
                    hits,
                },
            );
            self.sessions.set_current_game(player, None);
        }
        self.ai.end_match(game.id());
        info!("Game {} over, winner {}", game.id(), winner);
    }

    /// Start the delayed automated turn if the AI holds the turn.
    fn schedule_ai_turn(self: &Arc<Self>, game: &Arc<GameEngine>) {
        if game.status() != GameStatus::InProgress {
            return;
        }
        let ai = game.current_turn();
        if !self.ai.is_ai(ai) {
            return;
        }
        let server = Arc::clone(self);
        let task_game = Arc::clone(game);
        let handle = tokio::spawn(async move { server.play_ai_turns(task_game, ai).await });
        self.ai.set_pending(game.id(), handle.abort_handle());
    }

    /// Fire for `ai` until it loses the turn or the match ends.
    async fn play_ai_turns(self: Arc<Self>, game: Arc<GameEngine>, ai: PlayerId) {
        loop {
            tokio::time::sleep(self.config.ai_move_delay).await;
            let view = match game.opponent_view(ai) {
                Ok(view) => view,
                Err(rejection) => {
                    warn!("AI {} has no view of game {}: {}", ai, game.id(), rejection);
                    return;
                }
            };
            let target = match self.ai.choose(ai, &view) {
                Ok(Some(target)) => target,
                Ok(None) => {
                    debug!("AI {} is no longer seated", ai);
                    return;
                }
                Err(e) => {
                    error!("AI {} could not choose a move in game {}: {}", ai, game.id(), e);
                    return;
                }
            };
            match game.fire(ai, target) {
                Ok(report) => {
                    self.broadcast_shot(&game, ai, target, &report);
                    if report.is_finished() {
                        self.game_over(&game);
                        return;
                    }
                    if report.current_turn != ai {
                        return;
                    }
                }
                Err(Rejection::TurnTimedOut) => {
                    self.game_over(&game);
                    return;
                }
                Err(rejection) => {
                    debug!("AI {} shot rejected: {}", ai, rejection);
                    return;
                }
            }
        }
    }

    /// Clean up after a connection that went away.
    fn disconnect(&self, id: PlayerId) {
        let Some(session) = self.sessions.remove(id) else {
            return;
        };
        let Some(game_id) = session.current_game else {
            self.directory.cancel_search(id);
            return;
        };
        let Some(game) = self.directory.game(game_id) else {
            return;
        };
        match game.status() {
            GameStatus::InProgress => {
                info!("{} disconnected during game {}", session.name, game_id);
                if let Err(rejection) = game.abandon(id) {
                    warn!("Could not resign {} from {}: {}", id, game_id, rejection);
                }
                self.game_over(&game);
            }
            GameStatus::Setup => {
                info!("{} disconnected during setup of game {}", session.name, game_id);
                if let Some(opponent) = game.opponent_of(id) {
                    self.sessions.send(
                        opponent,
                        Message::error(
                            OPPONENT_GONE,
                            "Opponent disconnected during ship placement. Game cancelled.",
                        ),
                    );
                    self.sessions.set_current_game(opponent, None);
                }
                self.directory.remove_game(game_id);
                self.ai.end_match(game_id);
            }
            GameStatus::Finished => {
                self.directory.remove_game(game_id);
                self.ai.end_match(game_id);
            }
        }
    }
}
