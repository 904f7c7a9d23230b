use crossterm::event::{KeyCode, KeyEvent};
use retrocade::games::xonix::{Xonix, XonixCell, GRID_HEIGHT, GRID_WIDTH};
use retrocade::games::{Direction, Game};

#[test]
fn starts_on_the_top_border_with_full_lives() {
    let mut game = Xonix::with_seed(1);
    game.start_game();
    assert_eq!(game.player_pos(), (GRID_WIDTH / 2, 0));
    assert_eq!(game.lives(), 3);
    assert_eq!(game.level(), 1);
    assert_eq!(game.required_percentage(), 75);
    assert_eq!(game.enemies().len(), 2);
    assert!(!game.is_drawing());
}

#[test]
fn movement_is_clamped_to_the_grid() {
    let mut game = Xonix::with_seed(1);
    game.start_game();
    game.change_direction(Direction::Up);
    for _ in 0..3 {
        game.step();
    }
    assert_eq!(game.player_pos(), (GRID_WIDTH / 2, 0));
    assert!(!game.is_drawing());
}

#[test]
fn stepping_inward_draws_a_line() {
    let mut game = Xonix::with_seed(1);
    game.start_game();
    game.change_direction(Direction::Down);
    game.step();
    assert!(game.is_drawing());
    assert_eq!(game.path().len(), 1);
    assert_eq!(game.grid()[1][GRID_WIDTH as usize / 2], XonixCell::Line);
}

#[test]
fn reversal_is_ignored_while_drawing() {
    let mut game = Xonix::with_seed(1);
    game.start_game();
    game.change_direction(Direction::Down);
    game.step();
    assert!(game.is_drawing());
    game.change_direction(Direction::Up);
    game.step();
    // Still heading down; the path keeps growing.
    assert_eq!(game.player_pos(), (GRID_WIDTH / 2, 2));
    assert_eq!(game.path().len(), 2);
}

#[test]
fn grid_dimensions_are_fixed() {
    let mut game = Xonix::with_seed(1);
    game.start_game();
    game.change_direction(Direction::Down);
    for _ in 0..10 {
        game.step();
    }
    assert_eq!(game.grid().len(), GRID_HEIGHT as usize);
    for row in game.grid() {
        assert_eq!(row.len(), GRID_WIDTH as usize);
    }
}

#[test]
fn space_or_enter_starts_from_the_attract_screen() {
    let mut game = Xonix::with_seed(1);
    assert!(!game.is_started());
    game.handle_input(KeyEvent::from(KeyCode::Char(' ')));
    assert!(game.is_started());
}
