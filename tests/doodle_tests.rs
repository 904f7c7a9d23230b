use retrocade::games::doodle::{DoodleJump, GAME_HEIGHT, GAME_WIDTH};

#[test]
fn nothing_moves_until_the_game_starts() {
    let mut game = DoodleJump::with_seed(1);
    let before = game.doodler();
    for _ in 0..10 {
        game.step();
    }
    let after = game.doodler();
    assert_eq!(before.y, after.y);
    assert!(!game.is_started());
}

#[test]
fn starting_seeds_platforms_and_launches_upward() {
    let mut game = DoodleJump::with_seed(1);
    game.start_game();
    assert_eq!(game.platforms().len(), 6);
    // The first platform is the guaranteed one under the spawn point.
    let first = game.platforms()[0];
    assert_eq!(first.y, GAME_HEIGHT - 50.0);
    assert!(first.x > 0.0 && first.x + first.width < GAME_WIDTH);
    // The doodler launches with an upward impulse.
    assert!(game.doodler().vy < 0.0);
    assert_eq!(game.score(), 0);
}

#[test]
fn pausing_freezes_the_physics() {
    let mut game = DoodleJump::with_seed(1);
    game.start_game();
    game.step();
    game.toggle_pause();
    let frozen = game.doodler();
    for _ in 0..20 {
        game.step();
    }
    assert_eq!(game.doodler().y, frozen.y);
    assert_eq!(game.doodler().vy, frozen.vy);
    game.toggle_pause();
    game.step();
    assert_ne!(game.doodler().y, frozen.y);
}

#[test]
fn friction_bleeds_off_horizontal_speed() {
    let mut game = DoodleJump::with_seed(1);
    game.start_game();
    // A burst of rightward input, then let go.
    for _ in 0..10 {
        game.move_right();
        game.step();
    }
    assert!(game.doodler().vx > 0.0);
    game.stop_moving();
    for _ in 0..60 {
        game.step();
    }
    assert_eq!(game.doodler().vx, 0.0);
}
