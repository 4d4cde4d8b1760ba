mod common;

use battleship_arena::{
    Board, BoardError, CellState, Orientation, Ship, ShipClass, ShotOutcome, TOTAL_SHIPS,
};
use common::{c, standard_fleet, standard_fleet_cells};
use rand::{rngs::SmallRng, SeedableRng};

fn ship(class: ShipClass, anchor: &str, orientation: Orientation) -> Ship {
    Ship::new(class, c(anchor), orientation).unwrap()
}

fn fleet_board() -> Board {
    let mut board = Board::new();
    for (class, anchor, orientation) in standard_fleet() {
        assert!(board.place_ship(Ship::new(class, anchor, orientation).unwrap()));
    }
    board
}

#[test]
fn test_ship_must_fit() {
    assert!(Ship::new(ShipClass::Battleship, c("G3"), Orientation::Horizontal).is_ok());
    assert!(matches!(
        Ship::new(ShipClass::Battleship, c("H3"), Orientation::Horizontal),
        Err(BoardError::Placement { .. })
    ));
    assert!(matches!(
        Ship::new(ShipClass::Cruiser, c("A8"), Orientation::Vertical),
        Err(BoardError::Placement { .. })
    ));
    let boat = ship(ShipClass::Boat, "J9", Orientation::Vertical);
    assert_eq!(boat.coordinates().count(), 1);
}

#[test]
fn test_ship_cells_extend_right_and_down() {
    let h = ship(ShipClass::Cruiser, "B3", Orientation::Horizontal);
    assert_eq!(h.coordinates().collect::<Vec<_>>(), vec![c("B3"), c("C3"), c("D3")]);
    let v = ship(ShipClass::Cruiser, "B3", Orientation::Vertical);
    assert_eq!(v.coordinates().collect::<Vec<_>>(), vec![c("B3"), c("B4"), c("B5")]);
}

#[test]
fn test_no_touch_rule() {
    let mut board = Board::new();
    assert!(board.place_ship(ship(ShipClass::Destroyer, "C3", Orientation::Horizontal)));

    // Overlap, edge contact and corner contact are all refused.
    for (anchor, orientation) in [
        ("D3", Orientation::Vertical),
        ("E3", Orientation::Horizontal),
        ("C4", Orientation::Horizontal),
        ("E4", Orientation::Vertical),
        ("B1", Orientation::Vertical),
    ] {
        let candidate = ship(ShipClass::Destroyer, anchor, orientation);
        assert!(!board.can_place(&candidate), "{} should touch", anchor);
        assert!(!board.place_ship(candidate));
    }
    assert_eq!(board.ship_count(), 1);

    // One empty cell of separation is enough.
    assert!(board.place_ship(ship(ShipClass::Destroyer, "F3", Orientation::Horizontal)));
    assert!(board.place_ship(ship(ShipClass::Boat, "C5", Orientation::Horizontal)));
    assert_eq!(board.ship_count(), 3);
}

#[test]
fn test_rejected_placement_leaves_board_untouched() {
    let mut board = fleet_board();
    let before = board.clone();
    assert!(!board.place_ship(ship(ShipClass::Boat, "B1", Orientation::Horizontal)));
    assert_eq!(board, before);
}

#[test]
fn test_standard_fleet_is_complete() {
    let board = fleet_board();
    assert_eq!(board.ship_count(), TOTAL_SHIPS);
    assert_eq!(board.fleet_counts(), [1, 2, 3, 4]);
    assert!(board.fleet_complete());
    for cell in standard_fleet_cells() {
        assert_eq!(board.cell_state(cell), CellState::Ship);
    }
}

#[test]
fn test_extra_ship_breaks_fleet_completeness() {
    let mut board = fleet_board();
    assert!(board.place_ship(ship(ShipClass::Boat, "A9", Orientation::Horizontal)));
    assert_eq!(board.fleet_counts(), [1, 2, 3, 5]);
    assert!(!board.fleet_complete());
}

#[test]
fn test_shoot_miss_hit_sunk() {
    let mut board = Board::new();
    assert!(board.place_ship(ship(ShipClass::Destroyer, "C3", Orientation::Vertical)));

    let miss = board.shoot(c("A0"));
    assert_eq!(miss.outcome, ShotOutcome::Miss);
    assert!(miss.ship.is_none());
    assert_eq!(board.cell_state(c("A0")), CellState::Miss);

    let hit = board.shoot(c("C3"));
    assert_eq!(hit.outcome, ShotOutcome::Hit);
    assert_eq!(hit.ship.map(|s| s.class()), Some(ShipClass::Destroyer));
    assert_eq!(hit.sunk_class(), None);
    assert_eq!(board.cell_state(c("C3")), CellState::Hit);
    assert!(!board.all_ships_sunk());

    let sunk = board.shoot(c("C4"));
    assert_eq!(sunk.outcome, ShotOutcome::Sunk);
    assert_eq!(sunk.sunk_class(), Some(ShipClass::Destroyer));
    assert_eq!(board.cell_state(c("C3")), CellState::Sunk);
    assert_eq!(board.cell_state(c("C4")), CellState::Sunk);
    assert_eq!(board.sunk_ship_count(), 1);
    assert!(board.all_ships_sunk());
}

#[test]
fn test_battleship_sinks_on_fourth_hit() {
    let mut board = Board::new();
    assert!(board.place_ship(ship(ShipClass::Battleship, "A0", Orientation::Horizontal)));

    let outcomes: Vec<_> = ["A0", "B0", "C0", "D0"]
        .iter()
        .map(|cell| board.shoot(c(cell)).outcome)
        .collect();
    assert_eq!(
        outcomes,
        vec![ShotOutcome::Hit, ShotOutcome::Hit, ShotOutcome::Hit, ShotOutcome::Sunk]
    );
    for cell in ["A0", "B0", "C0", "D0"] {
        assert_eq!(board.cell_state(c(cell)), CellState::Sunk);
    }
    assert!(board.all_ships_sunk());
}

#[test]
fn test_repeat_shot_changes_nothing() {
    let mut board = fleet_board();
    board.shoot(c("A0"));
    board.shoot(c("A9"));
    let before = board.clone();

    assert_eq!(board.shoot(c("A0")).outcome, ShotOutcome::AlreadyShot);
    assert_eq!(board.shoot(c("A9")).outcome, ShotOutcome::AlreadyShot);
    assert_eq!(board, before);
}

#[test]
fn test_empty_board_is_not_defeated() {
    assert!(!Board::new().all_ships_sunk());
}

#[test]
fn test_every_cell_shot_sinks_fleet() {
    let mut board = fleet_board();
    let mut hits = 0;
    for cell in battleship_arena::Coordinate::all() {
        if board.shoot(cell).outcome.is_hit() {
            hits += 1;
        }
    }
    assert_eq!(hits, battleship_arena::TOTAL_SHIP_CELLS);
    assert!(board.all_ships_sunk());
    assert_eq!(board.shots().count(), 100);
}

#[test]
fn test_observed_hides_untouched_ships() {
    let mut board = fleet_board();
    board.shoot(c("A0"));
    board.shoot(c("B9"));

    let view = board.observed();
    assert_eq!(view.cell_state(c("A0")), CellState::Hit);
    assert_eq!(view.cell_state(c("B0")), CellState::Empty);
    assert_eq!(view.cell_state(c("B9")), CellState::Miss);
    assert_eq!(view.ship_count(), 0);
    assert_eq!(view.shots(), board.shots());
}

#[test]
fn test_set_cell_state_records_shot() {
    let mut board = Board::new();
    board.set_cell_state(c("E5"), CellState::Hit);
    assert!(board.is_shot(c("E5")));
    assert_eq!(board.shot_coordinates().collect::<Vec<_>>(), vec![c("E5")]);
    assert_eq!(board.ship_count(), 0);
}

#[test]
fn test_random_fleet_is_legal() {
    for seed in 0..50 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = Board::random_fleet(&mut rng).unwrap();
        assert!(board.fleet_complete(), "seed {}", seed);
        assert_eq!(board.ship_map().count(), battleship_arena::TOTAL_SHIP_CELLS);
        for ship in board.ships() {
            if ship.class() == ShipClass::Boat {
                assert_eq!(ship.orientation(), Orientation::Horizontal);
            }
        }
    }
}

#[test]
fn test_random_fleet_is_deterministic_per_seed() {
    let a = Board::random_fleet(&mut SmallRng::seed_from_u64(7)).unwrap();
    let b = Board::random_fleet(&mut SmallRng::seed_from_u64(7)).unwrap();
    assert_eq!(a, b);
}
