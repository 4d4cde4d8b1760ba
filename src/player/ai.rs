use rand::rngs::SmallRng;

use crate::ai;
use crate::model::{Board, BoardError, Coordinate};

use super::Player;

/// Automated player: random fleet, hunt/target shots.
#[derive(Debug, Default, Clone, Copy)]
pub struct AiPlayer;

impl AiPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Player for AiPlayer {
    fn place_ships(&mut self, rng: &mut SmallRng, board: &mut Board) -> Result<(), BoardError> {
        *board = Board::random_fleet(rng)?;
        Ok(())
    }

    fn select_target(&mut self, rng: &mut SmallRng, view: &Board) -> Result<Coordinate, BoardError> {
        ai::choose_target(view, rng)
    }
}
