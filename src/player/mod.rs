//! Player trait and the automated implementation.
//!
//! A player places its fleet and picks shots. It never owns the board it
//! shoots at: targeting always works on an observed view.

use rand::rngs::SmallRng;

use crate::model::{Board, BoardError, Coordinate};

/// Interface implemented by the different player types.
pub trait Player: Send {
    /// Place the whole fleet onto the provided board.
    fn place_ships(&mut self, rng: &mut SmallRng, board: &mut Board) -> Result<(), BoardError>;

    /// Choose the next target given what is known about the opponent's board.
    fn select_target(&mut self, rng: &mut SmallRng, view: &Board) -> Result<Coordinate, BoardError>;
}

pub mod ai;
pub use ai::AiPlayer;
