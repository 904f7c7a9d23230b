use retrocade::games::digger::{Digger, DiggerCell, GRID_HEIGHT, GRID_WIDTH};
use retrocade::games::{Direction, Game};

#[test]
fn level_one_layout_is_reproducible() {
    let mut a = Digger::with_seed(7);
    let mut b = Digger::with_seed(1234);
    a.start_game();
    b.start_game();
    assert_eq!(a.grid(), b.grid());
    assert_eq!(a.player_pos(), b.player_pos());
    assert_eq!(a.emeralds_remaining(), 8);
    assert_eq!(a.level(), 1);
    assert_eq!(a.lives(), 3);
}

#[test]
fn grid_dimensions_are_fixed() {
    let mut game = Digger::with_seed(1);
    game.start_game();
    assert_eq!(game.grid().len(), GRID_HEIGHT as usize);
    for row in game.grid() {
        assert_eq!(row.len(), GRID_WIDTH as usize);
    }
    for _ in 0..50 {
        game.step();
    }
    assert_eq!(game.grid().len(), GRID_HEIGHT as usize);
}

#[test]
fn emerald_count_never_increases_during_play() {
    let mut game = Digger::with_seed(11);
    game.start_game();
    let mut remaining = game.emeralds_remaining();
    let sweep = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];
    for i in 0..300 {
        if game.is_game_over() {
            break;
        }
        if i % 9 == 0 {
            game.change_direction(sweep[(i / 9) % 4]);
        }
        let level_before = game.level();
        game.step();
        if game.level() != level_before {
            // A level transition refills the board.
            remaining = game.emeralds_remaining();
            continue;
        }
        assert!(game.emeralds_remaining() <= remaining);
        remaining = game.emeralds_remaining();
    }
}

#[test]
fn enemies_spawn_on_the_configured_interval() {
    let mut game = Digger::with_seed(13);
    game.start_game();
    for _ in 0..70 {
        game.step();
    }
    assert!(game.enemies().is_empty());
    game.step();
    game.step();
    assert_eq!(game.enemies().len(), 1);
    // Spawned onto an open cell, not into dirt.
    let enemy = game.enemies()[0];
    let cell = game.grid()[enemy.y as usize][enemy.x as usize];
    assert_ne!(cell, DiggerCell::Dirt);
    assert_ne!(cell, DiggerCell::Rock);
}

#[test]
fn pausing_suspends_the_simulation() {
    let mut game = Digger::with_seed(1);
    game.start_game();
    game.step();
    game.toggle_pause();
    let pos = game.player_pos();
    let emeralds = game.emeralds_remaining();
    for _ in 0..20 {
        game.step();
    }
    assert_eq!(game.player_pos(), pos);
    assert_eq!(game.emeralds_remaining(), emeralds);
}
