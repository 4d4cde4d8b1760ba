//! Ship classes and placed ships.

use core::fmt;

use super::bitboard::BitBoard;
use super::common::BoardError;
use super::config::BOARD_SIZE;
use super::coordinate::Coordinate;

/// Cell mask sized for the standard board.
pub type Mask = BitBoard<u128, { BOARD_SIZE as usize }>;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Ship classes of the standard fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ShipClass {
    Battleship,
    Cruiser,
    Destroyer,
    Boat,
}

impl ShipClass {
    pub const fn length(self) -> usize {
        match self {
            ShipClass::Battleship => 4,
            ShipClass::Cruiser => 3,
            ShipClass::Destroyer => 2,
            ShipClass::Boat => 1,
        }
    }

    /// How many ships of this class a fleet holds.
    pub const fn count(self) -> usize {
        match self {
            ShipClass::Battleship => 1,
            ShipClass::Cruiser => 2,
            ShipClass::Destroyer => 3,
            ShipClass::Boat => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShipClass::Battleship => "Battleship",
            ShipClass::Cruiser => "Cruiser",
            ShipClass::Destroyer => "Destroyer",
            ShipClass::Boat => "Boat",
        }
    }
}

/// A ship placed on the board. Its cells never change after construction;
/// only the per-segment hit bits do.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    class: ShipClass,
    anchor: Coordinate,
    orientation: Orientation,
    mask: Mask,
    /// Bit `i` set once segment `i` (counted from the anchor) is hit.
    hits: u8,
}

impl Ship {
    /// Build a ship starting at `anchor` and extending right (horizontal) or
    /// down (vertical). Fails if any segment would leave the board.
    pub fn new(
        class: ShipClass,
        anchor: Coordinate,
        orientation: Orientation,
    ) -> Result<Self, BoardError> {
        let mut mask = Mask::new();
        for i in 0..class.length() {
            let cell = Self::segment_at(anchor, orientation, i).ok_or(BoardError::Placement {
                class,
                anchor,
                orientation,
            })?;
            mask.insert(cell.col(), cell.row())?;
        }
        Ok(Ship {
            class,
            anchor,
            orientation,
            mask,
            hits: 0,
        })
    }

    fn segment_at(anchor: Coordinate, orientation: Orientation, i: usize) -> Option<Coordinate> {
        let step = i as isize;
        match orientation {
            Orientation::Horizontal => anchor.offset(step, 0),
            Orientation::Vertical => anchor.offset(0, step),
        }
    }

    /// Segment index of `coord` on this ship.
    fn segment_of(&self, coord: Coordinate) -> Option<usize> {
        if !self.occupies(coord) {
            return None;
        }
        Some(match self.orientation {
            Orientation::Horizontal => coord.col() - self.anchor.col(),
            Orientation::Vertical => coord.row() - self.anchor.row(),
        })
    }

    /// Record a hit at `coord`. Returns `false` if the ship is not there.
    pub fn hit(&mut self, coord: Coordinate) -> bool {
        match self.segment_of(coord) {
            Some(i) => {
                self.hits |= 1 << i;
                true
            }
            None => false,
        }
    }

    /// All segments hit.
    pub fn is_sunk(&self) -> bool {
        self.hits.count_ones() as usize == self.class.length()
    }

    pub fn occupies(&self, coord: Coordinate) -> bool {
        self.mask.contains(coord.col(), coord.row())
    }

    /// Occupied cells, starting at the anchor.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.class.length())
            .filter_map(move |i| Self::segment_at(self.anchor, self.orientation, i))
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    pub fn anchor(&self) -> Coordinate {
        self.anchor
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Occupancy mask of the ship.
    pub fn mask(&self) -> Mask {
        self.mask
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ class: {}, anchor: {}, orientation: {:?}, hits: {:0width$b} }}",
            self.class.name(),
            self.anchor,
            self.orientation,
            self.hits,
            width = self.class.length(),
        )
    }
}
