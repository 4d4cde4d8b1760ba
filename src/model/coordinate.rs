//! Board coordinates and their `A5` text form.

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use super::common::BoardError;
use super::config::BOARD_SIZE;

const SIZE: usize = BOARD_SIZE as usize;

/// A cell on the board: column `A..J` and zero-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    col: u8,
    row: u8,
}

impl Coordinate {
    /// Validated constructor.
    pub fn new(col: usize, row: usize) -> Result<Self, BoardError> {
        if col >= SIZE || row >= SIZE {
            return Err(BoardError::OutOfBounds { col, row });
        }
        Ok(Self {
            col: col as u8,
            row: row as u8,
        })
    }

    #[inline]
    pub fn col(self) -> usize {
        self.col as usize
    }

    #[inline]
    pub fn row(self) -> usize {
        self.row as usize
    }

    /// Row-major cell index.
    pub fn index(self) -> usize {
        self.row() * SIZE + self.col()
    }

    pub fn from_index(index: usize) -> Result<Self, BoardError> {
        Self::new(index % SIZE, index / SIZE)
    }

    /// The coordinate `dc` columns and `dr` rows away, if still on the board.
    pub fn offset(self, dc: isize, dr: isize) -> Option<Self> {
        let col = self.col as isize + dc;
        let row = self.row as isize + dr;
        if col < 0 || row < 0 {
            return None;
        }
        Self::new(col as usize, row as usize).ok()
    }

    /// Edge neighbours in the fixed probing order: up, down, left, right.
    pub fn orthogonal(self) -> impl Iterator<Item = Coordinate> {
        [(0, -1), (0, 1), (-1, 0), (1, 0)]
            .into_iter()
            .filter_map(move |(dc, dr)| self.offset(dc, dr))
    }

    /// All in-bounds cells touching this one, with a flag telling whether the
    /// neighbour is diagonal.
    pub fn neighbors(self) -> impl Iterator<Item = (Coordinate, bool)> {
        (-1isize..=1)
            .flat_map(|dr| (-1isize..=1).map(move |dc| (dc, dr)))
            .filter(|&(dc, dr)| dc != 0 || dr != 0)
            .filter_map(move |(dc, dr)| self.offset(dc, dr).map(|c| (c, dc != 0 && dr != 0)))
    }

    /// Every cell of the board in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..SIZE).flat_map(|row| {
            (0..SIZE).map(move |col| Coordinate {
                col: col as u8,
                row: row as u8,
            })
        })
    }

    /// Checkerboard colour used by hunt mode.
    pub fn is_even_parity(self) -> bool {
        (self.col() + self.row()) % 2 == 0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row)
    }
}

impl FromStr for Coordinate {
    type Err = BoardError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut chars = input.chars();
        let letter = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => return Err(BoardError::Format(input.to_string())),
        };
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BoardError::Format(input.to_string()));
        }
        let col = (letter as u8 - b'A') as usize;
        if col >= SIZE {
            return Err(BoardError::Format(input.to_string()));
        }
        // Saturate absurdly long rows so they still report as out of bounds.
        let row = digits.parse::<usize>().unwrap_or(usize::MAX);
        Self::new(col, row)
    }
}

#[cfg(feature = "std")]
impl serde::Serialize for Coordinate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "std")]
impl<'de> serde::Deserialize<'de> for Coordinate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <std::string::String as serde::Deserialize>::deserialize(deserializer)?;
        text.parse::<Coordinate>()
            .map_err(<D::Error as serde::de::Error>::custom)
    }
}
