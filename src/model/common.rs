//! Common types for the grid model: board errors, cell states and shot results.

use alloc::string::String;

use super::bitboard::BitBoardError;
use super::coordinate::Coordinate;
use super::ship::{Orientation, Ship, ShipClass};

/// What a cell of a board currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CellState {
    #[default]
    Empty,
    Ship,
    Miss,
    Hit,
    Sunk,
}

/// Outcome of a single shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ShotOutcome {
    /// The coordinate had been fired upon before; nothing changed.
    AlreadyShot,
    Miss,
    /// A ship segment was struck and the ship is still afloat.
    Hit,
    /// The shot completed a ship.
    Sunk,
}

impl ShotOutcome {
    /// Whether the shot struck a ship.
    pub fn is_hit(self) -> bool {
        matches!(self, ShotOutcome::Hit | ShotOutcome::Sunk)
    }
}

/// Result of [`Board::shoot`](super::board::Board::shoot).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotResult {
    pub outcome: ShotOutcome,
    /// Copy of the struck ship on `Hit`/`Sunk`.
    pub ship: Option<Ship>,
}

impl ShotResult {
    pub(crate) fn without_ship(outcome: ShotOutcome) -> Self {
        Self {
            outcome,
            ship: None,
        }
    }

    /// Class of the ship sunk by this shot, if any.
    pub fn sunk_class(&self) -> Option<ShipClass> {
        match self.outcome {
            ShotOutcome::Sunk => self.ship.map(|s| s.class()),
            _ => None,
        }
    }
}

/// Errors returned by the grid model and the targeting agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Underlying bitboard error.
    BitBoard(BitBoardError),
    /// Coordinate outside the board.
    OutOfBounds { col: usize, row: usize },
    /// Text that is not a coordinate.
    Format(String),
    /// Ship would leave the board.
    Placement {
        class: ShipClass,
        anchor: Coordinate,
        orientation: Orientation,
    },
    /// Random placement gave up.
    UnableToPlaceShip,
    /// No coordinate is left to fire at.
    NoValidMove,
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        BoardError::BitBoard(err)
    }
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::BitBoard(e) => write!(f, "BitBoard error: {}", e),
            BoardError::OutOfBounds { col, row } => {
                write!(f, "Coordinate (col={}, row={}) is outside the board", col, row)
            }
            BoardError::Format(input) => write!(f, "Invalid coordinate format: {:?}", input),
            BoardError::Placement {
                class,
                anchor,
                orientation,
            } => write!(
                f,
                "{} at {} ({:?}) does not fit on the board",
                class.name(),
                anchor,
                orientation
            ),
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
            BoardError::NoValidMove => write!(f, "No valid moves left"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}
