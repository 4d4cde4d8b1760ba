//! Grid model: coordinates, ships, boards and the fleet rules.
//!
//! Everything here builds without `std`; serde support is enabled with the
//! `std` feature.

pub mod bitboard;
pub mod board;
pub mod common;
pub mod config;
pub mod coordinate;
pub mod ship;

pub use bitboard::{BitBoard, BitBoardError};
pub use board::{Board, Cells};
pub use common::{BoardError, CellState, ShotOutcome, ShotResult};
pub use config::*;
pub use coordinate::Coordinate;
pub use ship::{Mask, Orientation, Ship, ShipClass};
