use core::time::Duration;

use super::ship::ShipClass;

pub const BOARD_SIZE: u8 = 10;

/// Ship classes of the standard fleet, longest first.
pub const FLEET: [ShipClass; 4] = [
    ShipClass::Battleship,
    ShipClass::Cruiser,
    ShipClass::Destroyer,
    ShipClass::Boat,
];

/// Number of ships every participant must place.
pub const TOTAL_SHIPS: usize = 1 + 2 + 3 + 4;

/// Number of cells covered by a complete fleet.
pub const TOTAL_SHIP_CELLS: usize = 4 + 2 * 3 + 3 * 2 + 4;

/// A turn lasting longer than this forfeits the match on the next shot.
pub const TURN_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Pause before an automated participant fires.
pub const AI_MOVE_DELAY: Duration = Duration::from_millis(500);

/// Every ship of the standard fleet, longest class first.
pub fn fleet_manifest() -> impl Iterator<Item = ShipClass> {
    FLEET
        .into_iter()
        .flat_map(|class| core::iter::repeat(class).take(class.count()))
}

/// Position of `class` in [`FLEET`].
pub fn fleet_index(class: ShipClass) -> usize {
    match class {
        ShipClass::Battleship => 0,
        ShipClass::Cruiser => 1,
        ShipClass::Destroyer => 2,
        ShipClass::Boat => 3,
    }
}
