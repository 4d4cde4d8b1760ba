use battleship_arena::{Board, Coordinate, ShotOutcome, TOTAL_SHIP_CELLS};
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};

fn random_board(seed: u64) -> Board {
    Board::random_fleet(&mut SmallRng::seed_from_u64(seed)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// No two ships of a random fleet touch, not even at a corner.
    #[test]
    fn random_fleet_ships_never_touch(seed in any::<u64>()) {
        let board = random_board(seed);
        prop_assert!(board.fleet_complete());
        let ships = board.ships();
        for (i, a) in ships.iter().enumerate() {
            for b in &ships[i + 1..] {
                prop_assert!((a.mask().dilate() & b.mask()).is_empty());
            }
        }
    }

    /// A shot flips exactly the cells it should and is never counted twice.
    #[test]
    fn shots_are_idempotent(seed in any::<u64>(), targets in prop::collection::vec(0usize..100, 1..60)) {
        let mut board = random_board(seed);
        for index in targets {
            let target = Coordinate::from_index(index).unwrap();
            let fresh = !board.is_shot(target);
            let shots_before = board.shots().count();
            let result = board.shoot(target);
            prop_assert_eq!(result.outcome == ShotOutcome::AlreadyShot, !fresh);
            prop_assert_eq!(board.shots().count(), shots_before + usize::from(fresh));
            prop_assert_eq!(board.ship_count(), 10);
        }
    }

    /// Sweeping the whole grid in any order lands exactly one hit per ship cell.
    #[test]
    fn sweep_hits_every_ship_cell(seed in any::<u64>(), order in Just((0usize..100).collect::<Vec<_>>()).prop_shuffle()) {
        let mut board = random_board(seed);
        let mut hits = 0;
        let mut sunk = 0;
        for index in order {
            let result = board.shoot(Coordinate::from_index(index).unwrap());
            if result.outcome.is_hit() {
                hits += 1;
            }
            if result.outcome == ShotOutcome::Sunk {
                sunk += 1;
            }
        }
        prop_assert_eq!(hits, TOTAL_SHIP_CELLS);
        prop_assert_eq!(sunk, 10);
        prop_assert!(board.all_ships_sunk());
    }
}
