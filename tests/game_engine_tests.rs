mod common;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use battleship_arena::{
    CellState, EngineConfig, FinishReason, GameEngine, GameStatus, MatchId, Orientation,
    PlayerId, Rejection, ShipClass, ShotOutcome,
};
use common::{c, standard_fleet, standard_fleet_cells};

fn place_fleet(engine: &GameEngine, player: PlayerId) {
    for (class, anchor, orientation) in standard_fleet() {
        engine.place_ship(player, class, anchor, orientation).unwrap();
    }
}

fn started_with(config: EngineConfig) -> (GameEngine, PlayerId, PlayerId) {
    let (p1, p2) = (PlayerId::random(), PlayerId::random());
    let engine = GameEngine::with_config(MatchId::random(), p1, p2, config);
    place_fleet(&engine, p1);
    place_fleet(&engine, p2);
    assert!(engine.start_game());
    (engine, p1, p2)
}

fn started() -> (GameEngine, PlayerId, PlayerId) {
    started_with(EngineConfig::default())
}

#[test]
fn test_setup_until_both_fleets_complete() {
    let (p1, p2) = (PlayerId::random(), PlayerId::random());
    let engine = GameEngine::new(MatchId::random(), p1, p2);
    assert_eq!(engine.status(), GameStatus::Setup);
    assert!(!engine.start_game());

    place_fleet(&engine, p1);
    assert!(engine.check_ready(p1));
    assert!(!engine.check_ready(p2));
    assert!(!engine.start_game());
    assert_eq!(engine.status(), GameStatus::Setup);

    place_fleet(&engine, p2);
    assert!(engine.start_game());
    assert_eq!(engine.status(), GameStatus::InProgress);
    assert_eq!(engine.current_turn(), p1);
    assert!(engine.is_turn(p1));
    assert!(!engine.is_turn(p2));
    assert!(!engine.start_game());
}

#[test]
fn test_placement_rejections() {
    let (p1, p2) = (PlayerId::random(), PlayerId::random());
    let engine = GameEngine::new(MatchId::random(), p1, p2);

    engine
        .place_ship(p1, ShipClass::Destroyer, c("C3"), Orientation::Horizontal)
        .unwrap();
    assert_eq!(
        engine.place_ship(p1, ShipClass::Boat, c("E4"), Orientation::Horizontal),
        Err(Rejection::InvalidPlacement)
    );
    assert!(matches!(
        engine.place_ship(p1, ShipClass::Battleship, c("J0"), Orientation::Horizontal),
        Err(Rejection::ShipOffBoard(_))
    ));
    let stranger = PlayerId::random();
    assert_eq!(
        engine.place_ship(stranger, ShipClass::Boat, c("A0"), Orientation::Horizontal),
        Err(Rejection::UnknownPlayer(stranger))
    );
    // The other board is independent.
    engine
        .place_ship(p2, ShipClass::Boat, c("E4"), Orientation::Horizontal)
        .unwrap();
    assert_eq!(engine.board_of(p1).unwrap().ship_count(), 1);
}

#[test]
fn test_boat_orientation_is_ignored() {
    let (p1, p2) = (PlayerId::random(), PlayerId::random());
    let engine = GameEngine::new(MatchId::random(), p1, p2);
    engine
        .place_ship(p1, ShipClass::Boat, c("J9"), Orientation::Vertical)
        .unwrap();
    let board = engine.board_of(p1).unwrap();
    assert_eq!(board.ships()[0].orientation(), Orientation::Horizontal);
}

#[test]
fn test_no_placement_after_start() {
    let (engine, p1, _) = started();
    assert_eq!(
        engine.place_ship(p1, ShipClass::Boat, c("A9"), Orientation::Horizontal),
        Err(Rejection::NotInSetup)
    );
}

#[test]
fn test_fire_requires_play_and_turn() {
    let (p1, p2) = (PlayerId::random(), PlayerId::random());
    let engine = GameEngine::new(MatchId::random(), p1, p2);
    assert_eq!(engine.fire(p1, c("A0")).unwrap_err(), Rejection::NotInProgress);

    let (engine, p1, p2) = started();
    assert_eq!(engine.fire(p2, c("A0")).unwrap_err(), Rejection::NotYourTurn);
    let stranger = PlayerId::random();
    assert_eq!(
        engine.fire(stranger, c("A0")).unwrap_err(),
        Rejection::UnknownPlayer(stranger)
    );
    assert!(engine.fire(p1, c("A0")).is_ok());
}

#[test]
fn test_miss_passes_turn_hit_keeps_it() {
    let (engine, p1, p2) = started();

    let hit = engine.fire(p1, c("A0")).unwrap();
    assert_eq!(hit.shot.outcome, ShotOutcome::Hit);
    assert_eq!(hit.current_turn, p1);

    let miss = engine.fire(p1, c("A9")).unwrap();
    assert_eq!(miss.shot.outcome, ShotOutcome::Miss);
    assert_eq!(miss.current_turn, p2);
    assert_eq!(engine.current_turn(), p2);

    let sunk = engine.fire(p2, c("D4")).unwrap();
    assert_eq!(sunk.shot.outcome, ShotOutcome::Sunk);
    assert_eq!(sunk.shot.sunk_class(), Some(ShipClass::Boat));
    assert_eq!(sunk.current_turn, p2);
}

#[test]
fn test_repeat_shot_keeps_turn() {
    let (engine, p1, _) = started();
    engine.fire(p1, c("A0")).unwrap();
    let before = engine.snapshot();

    let again = engine.fire(p1, c("A0")).unwrap();
    assert_eq!(again.shot.outcome, ShotOutcome::AlreadyShot);
    assert_eq!(again.current_turn, p1);
    let after = engine.snapshot();
    assert_eq!(after.boards, before.boards);
    assert_eq!(after.current_turn, before.current_turn);
}

#[test]
fn test_last_ship_cell_wins() {
    let (engine, p1, p2) = started();
    let cells = standard_fleet_cells();
    let (last, rest) = cells.split_last().unwrap();
    for cell in rest {
        let report = engine.fire(p1, *cell).unwrap();
        assert!(report.shot.outcome.is_hit());
        assert!(!report.is_finished());
    }
    let report = engine.fire(p1, *last).unwrap();
    assert_eq!(report.shot.outcome, ShotOutcome::Sunk);
    assert!(report.is_finished());
    assert_eq!(engine.winner(), Some(p1));
    assert_eq!(engine.finish_reason(), Some(FinishReason::FleetDestroyed));
    assert_eq!(engine.shot_stats(p1).unwrap(), (20, 20));
    assert_eq!(engine.shot_stats(p2).unwrap(), (0, 0));

    assert_eq!(engine.fire(p1, c("A9")).unwrap_err(), Rejection::NotInProgress);
    assert_eq!(engine.surrender(p2), Ok(false));
    assert_eq!(engine.winner(), Some(p1));
}

#[test]
fn test_surrender_and_abandon() {
    let (engine, p1, p2) = started();
    assert_eq!(engine.surrender(p1), Ok(true));
    assert_eq!(engine.status(), GameStatus::Finished);
    assert_eq!(engine.winner(), Some(p2));
    assert_eq!(engine.finish_reason(), Some(FinishReason::Surrender));

    let (engine, p1, p2) = started();
    assert_eq!(engine.abandon(p2), Ok(true));
    assert_eq!(engine.winner(), Some(p1));
    assert_eq!(engine.finish_reason(), Some(FinishReason::Disconnect));
    assert_eq!(FinishReason::Disconnect.describe(), "Player disconnected");
}

#[test]
fn test_surrender_during_setup_finishes() {
    let (p1, p2) = (PlayerId::random(), PlayerId::random());
    let engine = GameEngine::new(MatchId::random(), p1, p2);
    assert_eq!(engine.surrender(p2), Ok(true));
    assert_eq!(engine.winner(), Some(p1));
    assert!(!engine.start_game());
}

#[test]
fn test_turn_timeout_is_checked_on_fire() {
    let config = EngineConfig {
        turn_timeout: Duration::from_millis(20),
    };
    let (engine, p1, p2) = started_with(config);
    thread::sleep(Duration::from_millis(60));
    // Nothing happens until someone acts.
    assert_eq!(engine.status(), GameStatus::InProgress);

    assert_eq!(engine.fire(p1, c("A0")).unwrap_err(), Rejection::TurnTimedOut);
    assert_eq!(engine.status(), GameStatus::Finished);
    assert_eq!(engine.winner(), Some(p2));
    assert_eq!(engine.finish_reason(), Some(FinishReason::TurnTimeout));
    assert_eq!(engine.board_of(p2).unwrap().shots().count(), 0);
}

#[test]
fn test_hit_restarts_turn_timer() {
    let config = EngineConfig {
        turn_timeout: Duration::from_millis(300),
    };
    let (engine, p1, _) = started_with(config);
    for cell in ["A0", "B0", "C0"] {
        thread::sleep(Duration::from_millis(120));
        assert!(engine.fire(p1, c(cell)).is_ok(), "{} timed out", cell);
    }
}

#[test]
fn test_opponent_view_hides_ships() {
    let (engine, p1, p2) = started();
    engine.fire(p1, c("A0")).unwrap();
    engine.fire(p1, c("A9")).unwrap();

    let view = engine.opponent_view(p1).unwrap();
    assert_eq!(view.cell_state(c("A0")), CellState::Hit);
    assert_eq!(view.cell_state(c("B0")), CellState::Empty);
    assert_eq!(view.cell_state(c("A9")), CellState::Miss);
    assert_eq!(view.ship_count(), 0);

    let own = engine.board_of(p2).unwrap();
    assert_eq!(own.cell_state(c("B0")), CellState::Ship);
    assert_eq!(engine.opponent_of(p1), Some(p2));
    assert_eq!(engine.opponent_of(PlayerId::random()), None);
}

#[test]
fn test_snapshot_is_a_copy() {
    let (engine, p1, _) = started();
    let mut snapshot = engine.snapshot();
    snapshot.boards[1].shoot(c("A0"));
    assert_eq!(engine.board_of(engine.players()[1]).unwrap().shots().count(), 0);
    assert_eq!(snapshot.players, [p1, engine.players()[1]]);
}

#[test]
fn test_simultaneous_fire_has_one_winner() {
    let (engine, p1, _) = started();
    let engine = Arc::new(engine);
    let targets = ["A9", "B9", "C9", "D9", "E9", "F9", "G9", "H9"];
    let barrier = Arc::new(Barrier::new(targets.len()));

    let handles: Vec<_> = targets
        .iter()
        .map(|t| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            let target = c(t);
            thread::spawn(move || {
                barrier.wait();
                engine.fire(p1, target)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(Rejection::NotYourTurn)))
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(refused, targets.len() - 1);
    assert_eq!(engine.snapshot().boards[1].shots().count(), 1);
}
