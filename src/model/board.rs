//! One participant's board: ship placements, cell states and shot history.

use alloc::vec::Vec;
use core::fmt;
use rand::Rng;

use super::common::{BoardError, CellState, ShotOutcome, ShotResult};
use super::config::{fleet_index, fleet_manifest, BOARD_SIZE, FLEET, TOTAL_SHIPS};
use super::coordinate::Coordinate;
use super::ship::{Mask, Orientation, Ship, ShipClass};

const SIZE: usize = BOARD_SIZE as usize;

/// Attempts per ship before random placement starts over on a fresh board.
const PLACEMENT_ATTEMPTS: usize = 100;

/// Fresh boards tried by [`Board::random_fleet`].
const FLEET_RETRIES: usize = 100;

/// Cell states indexed `[row][col]`.
pub type Cells = [[CellState; SIZE]; SIZE];

#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: Cells,
    ships: Vec<Ship>,
    ship_map: Mask,
    shots: Mask,
}

impl Board {
    /// Empty board: no ships, no shots.
    pub fn new() -> Self {
        Board {
            cells: [[CellState::Empty; SIZE]; SIZE],
            ships: Vec::with_capacity(TOTAL_SHIPS),
            ship_map: Mask::new(),
            shots: Mask::new(),
        }
    }

    /// Whether `ship` may be added: all its cells empty and no existing ship
    /// touching it by edge or corner.
    pub fn can_place(&self, ship: &Ship) -> bool {
        let touched = ship.mask().dilate();
        ship.coordinates()
            .all(|c| self.cell_state(c) == CellState::Empty)
            && (touched & self.ship_map).is_empty()
    }

    /// Add `ship` if the placement rules allow it. Rejected placements leave
    /// the board untouched.
    pub fn place_ship(&mut self, ship: Ship) -> bool {
        if !self.can_place(&ship) {
            return false;
        }
        for c in ship.coordinates() {
            self.cells[c.row()][c.col()] = CellState::Ship;
        }
        self.ship_map |= ship.mask();
        self.ships.push(ship);
        true
    }

    /// Fire at `coord`.
    pub fn shoot(&mut self, coord: Coordinate) -> ShotResult {
        if self.is_shot(coord) {
            return ShotResult::without_ship(ShotOutcome::AlreadyShot);
        }
        self.record_shot(coord);

        let struck = self
            .ships
            .iter_mut()
            .find(|s| !s.is_sunk() && s.occupies(coord));
        let Some(ship) = struck else {
            self.cells[coord.row()][coord.col()] = CellState::Miss;
            return ShotResult::without_ship(ShotOutcome::Miss);
        };

        ship.hit(coord);
        let ship = *ship;
        self.cells[coord.row()][coord.col()] = CellState::Hit;
        if ship.is_sunk() {
            for c in ship.coordinates() {
                self.cells[c.row()][c.col()] = CellState::Sunk;
            }
            return ShotResult {
                outcome: ShotOutcome::Sunk,
                ship: Some(ship),
            };
        }
        ShotResult {
            outcome: ShotOutcome::Hit,
            ship: Some(ship),
        }
    }

    /// True once at least one ship exists and every ship is sunk.
    pub fn all_ships_sunk(&self) -> bool {
        !self.ships.is_empty() && self.ships.iter().all(|s| s.is_sunk())
    }

    pub fn cell_state(&self, coord: Coordinate) -> CellState {
        self.cells[coord.row()][coord.col()]
    }

    /// Copy of the whole cell matrix.
    pub fn cells(&self) -> Cells {
        self.cells
    }

    /// Overwrite a cell from an externally reported outcome and record the
    /// coordinate as shot. Ship ownership is never touched.
    pub fn set_cell_state(&mut self, coord: Coordinate, state: CellState) {
        self.cells[coord.row()][coord.col()] = state;
        self.record_shot(coord);
    }

    fn record_shot(&mut self, coord: Coordinate) {
        // In-bounds by construction of `Coordinate`.
        let _ = self.shots.insert(coord.col(), coord.row());
    }

    /// Copy of the shot set.
    pub fn shots(&self) -> Mask {
        self.shots
    }

    pub fn is_shot(&self, coord: Coordinate) -> bool {
        self.shots.contains(coord.col(), coord.row())
    }

    /// Coordinates fired upon, row-major.
    pub fn shot_coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.shots
            .iter()
            .filter_map(|(col, row)| Coordinate::new(col, row).ok())
    }

    /// Ships in placement order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Occupancy mask of all ships.
    pub fn ship_map(&self) -> Mask {
        self.ship_map
    }

    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }

    pub fn sunk_ship_count(&self) -> usize {
        self.ships.iter().filter(|s| s.is_sunk()).count()
    }

    /// Placed ships per class, in [`FLEET`] order.
    pub fn fleet_counts(&self) -> [usize; FLEET.len()] {
        let mut counts = [0usize; FLEET.len()];
        for ship in &self.ships {
            counts[fleet_index(ship.class())] += 1;
        }
        counts
    }

    /// Exactly the required number of ships of every class.
    pub fn fleet_complete(&self) -> bool {
        let counts = self.fleet_counts();
        FLEET
            .iter()
            .all(|&class| counts[fleet_index(class)] == class.count())
    }

    /// What an opponent may know about this board: shots and their outcomes,
    /// with untouched ship cells shown as empty and no ships attached.
    pub fn observed(&self) -> Board {
        let mut cells = self.cells;
        for row in cells.iter_mut() {
            for cell in row.iter_mut() {
                if *cell == CellState::Ship {
                    *cell = CellState::Empty;
                }
            }
        }
        Board {
            cells,
            ships: Vec::new(),
            ship_map: Mask::new(),
            shots: self.shots,
        }
    }

    /// A random ship of `class` that fits the current board.
    pub fn random_placement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        class: ShipClass,
    ) -> Result<Ship, BoardError> {
        let len = class.length();
        for _ in 0..PLACEMENT_ATTEMPTS {
            let orientation = if len == 1 || rng.random::<bool>() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_col, max_row) = match orientation {
                Orientation::Horizontal => (SIZE - len, SIZE - 1),
                Orientation::Vertical => (SIZE - 1, SIZE - len),
            };
            let anchor = Coordinate::new(
                rng.random_range(0..=max_col),
                rng.random_range(0..=max_row),
            )?;
            let ship = Ship::new(class, anchor, orientation)?;
            if self.can_place(&ship) {
                return Ok(ship);
            }
        }
        Err(BoardError::UnableToPlaceShip)
    }

    /// Place the whole standard fleet at random, longest ships first.
    pub fn place_fleet_randomly<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), BoardError> {
        for class in fleet_manifest() {
            let ship = self.random_placement(rng, class)?;
            if !self.place_ship(ship) {
                return Err(BoardError::UnableToPlaceShip);
            }
        }
        Ok(())
    }

    /// A board holding a complete random fleet, starting over on a fresh
    /// board whenever the ships paint themselves into a corner.
    pub fn random_fleet<R: Rng + ?Sized>(rng: &mut R) -> Result<Board, BoardError> {
        for _ in 0..FLEET_RETRIES {
            let mut board = Board::new();
            if board.place_fleet_randomly(rng).is_ok() {
                return Ok(board);
            }
        }
        Err(BoardError::UnableToPlaceShip)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ ships: {:?}, shots: {} }}", self.ships, self.shots.count())?;
        for row in self.cells.iter() {
            for cell in row.iter() {
                let ch = match cell {
                    CellState::Empty => '.',
                    CellState::Ship => 'S',
                    CellState::Miss => 'o',
                    CellState::Hit => 'X',
                    CellState::Sunk => '#',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
