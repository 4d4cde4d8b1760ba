//! Hunt/target shot selection over an observed opponent board.
//!
//! The agent only reads cell states and the shot set, so it works the same
//! on the engine's fog-of-war view and on a client's reconciled view. It
//! keeps no state between calls.
//!
//! * **Target mode**: unfinished hits are grouped into orthogonally connected
//!   clusters; a cluster is extended along its axis, a lone hit is probed on
//!   its four sides.
//! * **Hunt mode**: a random cell of the checkerboard parity, falling back to
//!   any valid cell late in the game.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use rand::Rng;

use crate::model::{Board, BoardError, CellState, Coordinate, Mask};

/// Pick the next shot against `view`.
pub fn choose_target<R: Rng + ?Sized>(view: &Board, rng: &mut R) -> Result<Coordinate, BoardError> {
    let hits = active_hits(view);
    if !hits.is_empty() {
        if let Some(target) = cluster_hits(&hits)
            .iter()
            .find_map(|cluster| cluster_target(view, cluster))
        {
            return Ok(target);
        }
    }
    hunt(view, rng)
}

/// Whether `coord` is worth firing at: not shot yet, not next to a sunk
/// ship, and not diagonal to a hit.
///
/// A hit reached orthogonally does not exclude the cell, even when it
/// belongs to an unrelated cluster.
pub fn is_valid_target(view: &Board, coord: Coordinate) -> bool {
    if view.is_shot(coord) {
        return false;
    }
    coord
        .neighbors()
        .all(|(n, diagonal)| match view.cell_state(n) {
            CellState::Sunk => false,
            CellState::Hit => !diagonal,
            _ => true,
        })
}

/// Cells hunt mode picks from, row-major: valid cells of even parity, or
/// every valid cell once none of those remain.
pub fn hunt_candidates(view: &Board) -> Vec<Coordinate> {
    let parity: Vec<Coordinate> = Coordinate::all()
        .filter(|c| c.is_even_parity() && is_valid_target(view, *c))
        .collect();
    if !parity.is_empty() {
        return parity;
    }
    Coordinate::all()
        .filter(|c| is_valid_target(view, *c))
        .collect()
}

fn hunt<R: Rng + ?Sized>(view: &Board, rng: &mut R) -> Result<Coordinate, BoardError> {
    let candidates = hunt_candidates(view);
    if candidates.is_empty() {
        return Err(BoardError::NoValidMove);
    }
    Ok(candidates[rng.random_range(0..candidates.len())])
}

/// Struck cells of ships still afloat, row-major.
fn active_hits(view: &Board) -> Vec<Coordinate> {
    Coordinate::all()
        .filter(|c| view.cell_state(*c) == CellState::Hit)
        .collect()
}

/// Orthogonally connected groups of `hits`, in discovery order.
fn cluster_hits(hits: &[Coordinate]) -> Vec<Vec<Coordinate>> {
    let pending: Mask = hits.iter().map(|c| (c.col(), c.row())).collect();
    let mut visited = Mask::new();
    let mut clusters = Vec::new();

    for &start in hits {
        if visited.contains(start.col(), start.row()) {
            continue;
        }
        let _ = visited.insert(start.col(), start.row());
        let mut queue = VecDeque::from([start]);
        let mut cluster = Vec::new();
        while let Some(current) = queue.pop_front() {
            cluster.push(current);
            for n in current.orthogonal() {
                if pending.contains(n.col(), n.row()) && !visited.contains(n.col(), n.row()) {
                    let _ = visited.insert(n.col(), n.row());
                    queue.push_back(n);
                }
            }
        }
        clusters.push(cluster);
    }
    clusters
}

fn cluster_target(view: &Board, cluster: &[Coordinate]) -> Option<Coordinate> {
    let first = *cluster.first()?;
    if cluster.len() == 1 {
        return adjacent_target(view, first);
    }

    let same_row = cluster.iter().all(|c| c.row() == first.row());
    let same_col = cluster.iter().all(|c| c.col() == first.col());
    let extensions = if same_row {
        let min = cluster.iter().map(|c| c.col()).min()?;
        let max = cluster.iter().map(|c| c.col()).max()?;
        [
            min.checked_sub(1).and_then(|col| Coordinate::new(col, first.row()).ok()),
            Coordinate::new(max + 1, first.row()).ok(),
        ]
    } else if same_col {
        let min = cluster.iter().map(|c| c.row()).min()?;
        let max = cluster.iter().map(|c| c.row()).max()?;
        [
            min.checked_sub(1).and_then(|row| Coordinate::new(first.col(), row).ok()),
            Coordinate::new(first.col(), max + 1).ok(),
        ]
    } else {
        [None, None]
    };

    extensions
        .into_iter()
        .flatten()
        .find(|c| is_valid_target(view, *c))
        .or_else(|| cluster.iter().find_map(|c| adjacent_target(view, *c)))
}

fn adjacent_target(view: &Board, hit: Coordinate) -> Option<Coordinate> {
    hit.orthogonal().find(|c| is_valid_target(view, *c))
}
