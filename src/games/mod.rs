pub mod digger;
pub mod doodle;
pub mod snake;
pub mod tetris;
pub mod xonix;

use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// Four-way movement intent shared by the grid games.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

pub trait Game {
    fn update(&mut self);
    fn handle_input(&mut self, key: KeyEvent);
    /// Release events only arrive on terminals with enhanced keyboard
    /// reporting; games that latch held keys override this.
    fn handle_key_release(&mut self, _key: KeyEvent) {}
    fn render(&mut self, frame: &mut Frame, area: Rect);
    fn reset(&mut self);
    fn get_score(&self) -> u32;
    fn is_game_over(&self) -> bool;
}
