use retrocade::games::tetris::{PieceKind, Tetris, BOARD_HEIGHT, BOARD_WIDTH};
use retrocade::games::Game;

fn scripted(pieces: &[PieceKind]) -> Tetris {
    let mut game = Tetris::with_seed(1);
    for &kind in pieces {
        game.push_piece(kind);
    }
    game.start_game();
    game
}

#[test]
fn three_horizontal_bars_clear_the_bottom_row() {
    let mut game = scripted(&[PieceKind::I; 5]);

    // Horizontal I spans 4 columns; lay them at 0, 4 and 8.
    game.rotate_piece();
    for _ in 0..5 {
        game.move_piece(-1);
    }
    game.hard_drop();

    game.rotate_piece();
    game.move_piece(-1);
    game.hard_drop();

    game.rotate_piece();
    for _ in 0..3 {
        game.move_piece(1);
    }
    game.hard_drop();

    // Each bar fell 15 rows at 2 points/row, the sweep paid 100 x (0+1).
    assert_eq!(game.score(), 3 * 15 * 2 + 100);
    assert_eq!(game.lines(), 1);
    assert_eq!(game.level(), 0);

    // The swept board is empty again, and its dimensions are untouched.
    assert_eq!(game.board().len(), BOARD_HEIGHT);
    for row in game.board() {
        assert_eq!(row.len(), BOARD_WIDTH);
        assert!(row.iter().all(|c| c.is_none()));
    }
}

#[test]
fn soft_drop_scores_one_point_per_row_moved() {
    let mut game = scripted(&[PieceKind::O; 3]);
    // The O rests when its lower row reaches the floor: 15 moves down.
    for _ in 0..20 {
        game.soft_drop();
    }
    assert_eq!(game.score(), 15);
    assert_eq!(game.piece_pos().1, 15);
}

#[test]
fn hard_drop_rests_on_the_first_obstruction() {
    let mut game = scripted(&[PieceKind::O; 4]);
    game.hard_drop();
    // First O occupies rows 15-16 at columns 5-6.
    assert!(game.board()[15][5].is_some());
    assert!(game.board()[16][6].is_some());

    game.hard_drop();
    // Second O stacks directly on top of the first.
    assert!(game.board()[13][5].is_some());
    assert!(game.board()[14][6].is_some());
    assert!(game.board()[12][5].is_none());

    // 15 + 13 rows traversed at 2 points each.
    assert_eq!(game.score(), 15 * 2 + 13 * 2);
}

#[test]
fn blocked_spawn_ends_the_game() {
    let mut game = scripted(&[PieceKind::O; 12]);
    for _ in 0..9 {
        game.hard_drop();
    }
    assert!(game.is_game_over());
    assert!(game.score() > 0);
}

#[test]
fn side_moves_are_rejected_at_the_walls() {
    let mut game = scripted(&[PieceKind::O; 2]);
    for _ in 0..20 {
        game.move_piece(-1);
    }
    assert_eq!(game.piece_pos().0, 0);
    for _ in 0..20 {
        game.move_piece(1);
    }
    assert_eq!(game.piece_pos().0, (BOARD_WIDTH - 2) as i32);
}

#[test]
fn next_piece_preview_feeds_the_spawn() {
    let mut game = scripted(&[PieceKind::T, PieceKind::Z, PieceKind::S]);
    assert_eq!(game.piece_kind(), PieceKind::T);
    assert_eq!(game.next_piece(), PieceKind::Z);
    game.hard_drop();
    assert_eq!(game.piece_kind(), PieceKind::Z);
    assert_eq!(game.next_piece(), PieceKind::S);
}
