//! In-process AI versus AI matches on a single engine.

use rand::rngs::SmallRng;

use crate::game::{GameEngine, GameStatus, MatchId, PlayerId};
use crate::model::{Board, TOTAL_SHIP_CELLS};
use crate::player::{AiPlayer, Player};

/// Upper bound on shots in one match; a board has only 100 cells per side.
const MAX_SHOTS: usize = 2 * 100;

/// Result of [`play_ai_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalResult {
    /// 0 for the first mover, 1 for the second.
    pub winner: usize,
    pub shots: [usize; 2],
    pub hits: [usize; 2],
}

/// Play a whole match between two automated players, each with its own RNG.
pub fn play_ai_match(first: &mut SmallRng, second: &mut SmallRng) -> anyhow::Result<LocalResult> {
    let ids = [PlayerId::random(), PlayerId::random()];
    let engine = GameEngine::new(MatchId::random(), ids[0], ids[1]);
    let mut players = [AiPlayer::new(), AiPlayer::new()];
    let mut rngs = [first, second];

    for seat in 0..2 {
        let mut board = Board::new();
        players[seat]
            .place_ships(&mut *rngs[seat], &mut board)
            .map_err(|e| anyhow::anyhow!(e))?;
        for ship in board.ships() {
            engine.place_ship(ids[seat], ship.class(), ship.anchor(), ship.orientation())?;
        }
    }
    anyhow::ensure!(engine.start_game(), "fleets incomplete, game did not start");

    for _ in 0..MAX_SHOTS {
        if engine.status() == GameStatus::Finished {
            break;
        }
        let shooter = engine.current_turn();
        let seat = usize::from(shooter == ids[1]);
        let view = engine.opponent_view(shooter)?;
        let target = players[seat]
            .select_target(&mut *rngs[seat], &view)
            .map_err(|e| anyhow::anyhow!(e))?;
        engine.fire(shooter, target)?;
    }

    let winner = engine
        .winner()
        .ok_or_else(|| anyhow::anyhow!("no winner after {} shots", MAX_SHOTS))?;
    let (shots0, hits0) = engine.shot_stats(ids[0])?;
    let (shots1, hits1) = engine.shot_stats(ids[1])?;
    let result = LocalResult {
        winner: usize::from(winner == ids[1]),
        shots: [shots0, shots1],
        hits: [hits0, hits1],
    };
    debug_assert_eq!(result.hits[result.winner], TOTAL_SHIP_CELLS);
    Ok(result)
}
