use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::games::digger::Digger;
use crate::games::doodle::DoodleJump;
use crate::games::snake::Snake;
use crate::games::tetris::Tetris;
use crate::games::xonix::Xonix;
use crate::games::Game;
use crate::storage::{Storage, MAX_NAME_LEN, NUM_GAMES};

const VOLUME_STEP: u8 = 10;

#[derive(Clone, Copy, PartialEq)]
pub enum Tab {
    Home,
    Tetris,
    Snake,
    DoodleJump,
    Digger,
    Xonix,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Home,
            Tab::Tetris,
            Tab::Snake,
            Tab::DoodleJump,
            Tab::Digger,
            Tab::Xonix,
        ]
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Home => " Home ",
            Tab::Tetris => " Tetris ",
            Tab::Snake => " Snake ",
            Tab::DoodleJump => " Doodle ",
            Tab::Digger => " Digger ",
            Tab::Xonix => " Xonix ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Tetris => 1,
            Tab::Snake => 2,
            Tab::DoodleJump => 3,
            Tab::Digger => 4,
            Tab::Xonix => 5,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub selected_game: usize, // 0-4 for home screen game selection
    pub tetris: Tetris,
    pub snake: Snake,
    pub doodle: DoodleJump,
    pub digger: Digger,
    pub xonix: Xonix,
    pub storage: Storage,
    pub show_high_scores: bool,
    // Login state
    pub logging_in: bool,
    pub name_buffer: String,
}

impl App {
    pub fn new() -> Self {
        let storage = Storage::load();
        let name_buffer = storage.player().unwrap_or_default().to_string();
        Self {
            should_quit: false,
            current_tab: Tab::Home,
            selected_game: 0,
            tetris: Tetris::new(),
            snake: Snake::new(),
            doodle: DoodleJump::new(),
            digger: Digger::new(),
            xonix: Xonix::new(),
            storage,
            show_high_scores: false,
            logging_in: true,
            name_buffer,
        }
    }

    pub fn player_name(&self) -> String {
        self.storage.player().unwrap_or("???").to_string()
    }

    pub fn on_tick(&mut self) {
        // Nothing moves while the login prompt is up.
        if self.logging_in {
            return;
        }

        match self.current_tab {
            Tab::Home => {}
            Tab::Tetris => self.tetris.update(),
            Tab::Snake => self.snake.update(),
            Tab::DoodleJump => self.doodle.update(),
            Tab::Digger => self.digger.update(),
            Tab::Xonix => self.xonix.update(),
        }
        self.check_submit_scores();
    }

    /// Record finished games on the leaderboard under the logged-in name,
    /// once per run of each game.
    fn check_submit_scores(&mut self) {
        let games: [(usize, bool, u32); NUM_GAMES] = [
            (0, self.tetris.is_game_over(), self.tetris.get_score()),
            (1, self.snake.is_game_over(), self.snake.get_score()),
            (2, self.doodle.is_game_over(), self.doodle.get_score()),
            (3, self.digger.is_game_over(), self.digger.get_score()),
            (4, self.xonix.is_game_over(), self.xonix.get_score()),
        ];
        for (idx, game_over, score) in games {
            if game_over && score > 0 && !self.storage.was_submitted(idx) {
                let name = self.player_name();
                self.storage.submit(idx, &name, score);
                self.storage.mark_submitted(idx);
            }
            if !game_over && self.storage.was_submitted(idx) {
                self.storage.clear_submitted(idx);
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // The login prompt intercepts all input
        if self.logging_in {
            self.handle_login_input(key);
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                if matches!(self.current_tab, Tab::Home) {
                    self.should_quit = true;
                    return;
                }
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.prev_tab();
                } else {
                    self.next_tab();
                }
                return;
            }
            KeyCode::BackTab => {
                self.prev_tab();
                return;
            }
            KeyCode::Esc => {
                if !matches!(self.current_tab, Tab::Home) {
                    // Returning to the selection screen discards the game's
                    // session state.
                    match self.current_tab {
                        Tab::Home => {}
                        Tab::Tetris => self.tetris.reset(),
                        Tab::Snake => self.snake.reset(),
                        Tab::DoodleJump => self.doodle.reset(),
                        Tab::Digger => self.digger.reset(),
                        Tab::Xonix => self.xonix.reset(),
                    }
                    self.current_tab = Tab::Home;
                    return;
                }
            }
            _ => {}
        }

        // Home screen shortcuts and navigation
        if matches!(self.current_tab, Tab::Home) {
            match key.code {
                KeyCode::Char('1') => {
                    self.current_tab = Tab::Tetris;
                    return;
                }
                KeyCode::Char('2') => {
                    self.current_tab = Tab::Snake;
                    return;
                }
                KeyCode::Char('3') => {
                    self.current_tab = Tab::DoodleJump;
                    return;
                }
                KeyCode::Char('4') => {
                    self.current_tab = Tab::Digger;
                    return;
                }
                KeyCode::Char('5') => {
                    self.current_tab = Tab::Xonix;
                    return;
                }
                KeyCode::Char('h') | KeyCode::Char('H') => {
                    self.show_high_scores = !self.show_high_scores;
                    return;
                }
                KeyCode::Char('l') | KeyCode::Char('L') => {
                    // Log out and return to the name prompt
                    self.storage.clear_player();
                    self.name_buffer.clear();
                    self.logging_in = true;
                    return;
                }
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    let volume = self.storage.volume().saturating_add(VOLUME_STEP).min(100);
                    self.storage.set_volume(volume);
                    return;
                }
                KeyCode::Char('-') => {
                    let volume = self.storage.volume().saturating_sub(VOLUME_STEP);
                    self.storage.set_volume(volume);
                    return;
                }
                KeyCode::Right => {
                    self.selected_game = (self.selected_game + 1) % NUM_GAMES;
                    return;
                }
                KeyCode::Left => {
                    self.selected_game = (self.selected_game + NUM_GAMES - 1) % NUM_GAMES;
                    return;
                }
                KeyCode::Enter => {
                    self.current_tab = match self.selected_game {
                        0 => Tab::Tetris,
                        1 => Tab::Snake,
                        2 => Tab::DoodleJump,
                        3 => Tab::Digger,
                        4 => Tab::Xonix,
                        _ => Tab::Home,
                    };
                    return;
                }
                _ => {}
            }
        }

        // Forward to active game
        match self.current_tab {
            Tab::Home => {}
            Tab::Tetris => self.tetris.handle_input(key),
            Tab::Snake => self.snake.handle_input(key),
            Tab::DoodleJump => self.doodle.handle_input(key),
            Tab::Digger => self.digger.handle_input(key),
            Tab::Xonix => self.xonix.handle_input(key),
        }
    }

    pub fn on_key_release(&mut self, key: KeyEvent) {
        if self.logging_in {
            return;
        }
        match self.current_tab {
            Tab::Home => {}
            Tab::Tetris => self.tetris.handle_key_release(key),
            Tab::Snake => self.snake.handle_key_release(key),
            Tab::DoodleJump => self.doodle.handle_key_release(key),
            Tab::Digger => self.digger.handle_key_release(key),
            Tab::Xonix => self.xonix.handle_key_release(key),
        }
    }

    fn handle_login_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if !self.name_buffer.is_empty() {
                    self.storage.set_player(&self.name_buffer.clone());
                    self.logging_in = false;
                }
            }
            KeyCode::Backspace => {
                self.name_buffer.pop();
            }
            KeyCode::Char(c) => {
                if self.name_buffer.chars().count() < MAX_NAME_LEN && c.is_ascii_graphic() {
                    self.name_buffer.push(c.to_ascii_uppercase());
                }
            }
            _ => {}
        }
    }

    fn next_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.current_tab = tabs[(idx + 1) % tabs.len()];
    }

    fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.current_tab = tabs[(idx + tabs.len() - 1) % tabs.len()];
    }
}
