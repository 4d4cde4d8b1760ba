#![allow(dead_code)]

use battleship_arena::{Coordinate, Orientation, ShipClass};

/// A complete, legal fleet: (class, anchor, orientation).
///
/// ```text
///   A B C D E F G H I J
/// 0 S S S S . S S S . .
/// 1 . . . . . . . . . .
/// 2 S S S . S S . S S .
/// 3 . . . . . . . . . .
/// 4 S S . S . S . S . S
/// ```
pub fn standard_fleet() -> Vec<(ShipClass, Coordinate, Orientation)> {
    [
        (ShipClass::Battleship, "A0"),
        (ShipClass::Cruiser, "F0"),
        (ShipClass::Cruiser, "A2"),
        (ShipClass::Destroyer, "E2"),
        (ShipClass::Destroyer, "H2"),
        (ShipClass::Destroyer, "A4"),
        (ShipClass::Boat, "D4"),
        (ShipClass::Boat, "F4"),
        (ShipClass::Boat, "H4"),
        (ShipClass::Boat, "J4"),
    ]
    .into_iter()
    .map(|(class, anchor)| (class, c(anchor), Orientation::Horizontal))
    .collect()
}

/// Every cell covered by [`standard_fleet`].
pub fn standard_fleet_cells() -> Vec<Coordinate> {
    standard_fleet()
        .into_iter()
        .flat_map(|(class, anchor, _)| {
            (0..class.length()).map(move |i| Coordinate::new(anchor.col() + i, anchor.row()).unwrap())
        })
        .collect()
}

pub fn c(text: &str) -> Coordinate {
    text.parse().unwrap()
}
