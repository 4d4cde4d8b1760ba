//! A fixed-size cell set packed into an unsigned integer.
//!
//! Boards are `N×N` grids stored row-major in `T` (bit `row * N + col`).
//! The type is `no_std` friendly and never allocates; the board uses it for
//! ship occupancy and for the set of coordinates already fired upon.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use core::{fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};

/// Errors returned by bitboard operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitBoardError {
    /// Requested board size N*N exceeds capacity of `T::BITS`.
    SizeTooLarge { n: usize, capacity: usize },
    /// Column or row index is out of bounds [0..N).
    IndexOutOfBounds { col: usize, row: usize },
}

impl fmt::Display for BitBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitBoardError::SizeTooLarge { n, capacity } => {
                write!(f, "board of {}x{} cells exceeds {} bits", n, n, capacity)
            }
            BitBoardError::IndexOutOfBounds { col, row } => {
                write!(f, "cell (col={}, row={}) is outside the board", col, row)
            }
        }
    }
}

/// An `N×N` set of cells stored in the unsigned integer `T`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitBoard<T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T, const N: usize> BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    const CELLS: usize = N * N;

    #[inline]
    fn board_mask() -> T {
        if Self::CELLS == mem::size_of::<T>() * 8 {
            !T::zero()
        } else {
            (T::one() << Self::CELLS) - T::one()
        }
    }

    fn column_mask(col: usize) -> T {
        let mut mask = T::zero();
        for row in 0..N {
            mask = mask | (T::one() << (row * N + col));
        }
        mask
    }

    #[inline]
    fn bit(col: usize, row: usize) -> T {
        T::one() << (row * N + col)
    }

    /// Empty set.
    #[inline]
    pub fn new() -> Self {
        BitBoard { bits: T::zero() }
    }

    /// Fallible constructor: returns `Err(SizeTooLarge)` if N*N > T::BITS.
    pub fn try_new() -> Result<Self, BitBoardError> {
        let capacity = mem::size_of::<T>() * 8;
        if Self::CELLS > capacity {
            Err(BitBoardError::SizeTooLarge { n: N, capacity })
        } else {
            Ok(Self::new())
        }
    }

    /// Number of cells in the set.
    pub fn count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    /// Whether (`col`, `row`) is in the set. Out-of-range cells never are.
    #[inline]
    pub fn contains(&self, col: usize, row: usize) -> bool {
        col < N && row < N && (self.bits & Self::bit(col, row)) != T::zero()
    }

    /// Adds (`col`, `row`); returns `Ok(false)` if it was already present.
    pub fn insert(&mut self, col: usize, row: usize) -> Result<bool, BitBoardError> {
        self.check_bounds(col, row)?;
        let fresh = !self.contains(col, row);
        self.bits = self.bits | Self::bit(col, row);
        Ok(fresh)
    }

    /// Removes (`col`, `row`); returns `Ok(true)` if it was present.
    pub fn remove(&mut self, col: usize, row: usize) -> Result<bool, BitBoardError> {
        self.check_bounds(col, row)?;
        let present = self.contains(col, row);
        self.bits = self.bits & !Self::bit(col, row);
        Ok(present)
    }

    /// Cells of the set together with every cell touching one of them,
    /// edges and corners included.
    pub fn dilate(&self) -> Self {
        if N == 0 {
            return *self;
        }
        let board = Self::board_mask();
        let not_first_col = board & !Self::column_mask(0);
        let not_last_col = board & !Self::column_mask(N - 1);

        let east = (self.bits << 1) & not_first_col;
        let west = (self.bits >> 1) & not_last_col;
        let row_spread = self.bits | east | west;
        Self::from_raw(row_spread | (row_spread << N) | (row_spread >> N))
    }

    #[inline]
    fn check_bounds(&self, col: usize, row: usize) -> Result<(), BitBoardError> {
        if col >= N || row >= N {
            Err(BitBoardError::IndexOutOfBounds { col, row })
        } else {
            Ok(())
        }
    }

    /// Builds a set from the raw integer, dropping bits beyond the board.
    #[inline]
    pub fn from_raw(raw: T) -> Self {
        BitBoard {
            bits: raw & Self::board_mask(),
        }
    }

    /// Iterator over the `(col, row)` cells of the set in row-major order.
    #[inline]
    pub fn iter(&self) -> Cells<'_, T, N> {
        Cells {
            board: self,
            idx: 0,
        }
    }
}

impl<T, const N: usize> Default for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> FromIterator<(usize, usize)> for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    /// Out-of-range cells are skipped.
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut board = Self::new();
        for (col, row) in iter {
            let _ = board.insert(col, row);
        }
        board
    }
}

impl<T, const N: usize> fmt::Debug for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitBoard<{}>:", N)?;
        for row in 0..N {
            for col in 0..N {
                let cell = if self.contains(col, row) { '■' } else { '□' };
                write!(f, "{} ", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the cells of a bitboard.
#[derive(Clone, Copy)]
pub struct Cells<'a, T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    board: &'a BitBoard<T, N>,
    idx: usize,
}

impl<'a, T, const N: usize> Iterator for Cells<'a, T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < N * N {
            let idx = self.idx;
            self.idx += 1;
            if ((self.board.bits >> idx) & T::one()) != T::zero() {
                return Some((idx % N, idx / N));
            }
        }
        None
    }
}

impl<T, const N: usize> BitAnd for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits & rhs.bits)
    }
}

impl<T, const N: usize> BitOr for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits | rhs.bits)
    }
}

/// Complement within the board.
impl<T, const N: usize> Not for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        Self::from_raw(!self.bits)
    }
}

impl<T, const N: usize> BitAndAssign for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits = self.bits & rhs.bits;
    }
}

impl<T, const N: usize> BitOrAssign for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits = self.bits | rhs.bits;
    }
}
