use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::Game;

pub const GAME_WIDTH: f32 = 400.0;
pub const GAME_HEIGHT: f32 = 600.0;
const PLAYER_WIDTH: f32 = 45.0;
const PLAYER_HEIGHT: f32 = 45.0;
const GRAVITY: f32 = 0.3;
const PLATFORM_HEIGHT: f32 = 15.0;
const PLATFORM_WIDTH_DEFAULT: f32 = 65.0;
const PLATFORM_COUNT: usize = 6;

const HORIZONTAL_ACCELERATION: f32 = 0.5;
const MAX_HORIZONTAL_SPEED: f32 = 5.0;
const FRICTION: f32 = 0.9;
const JUMP_BOOST_MULTIPLIER: f32 = 1.25;

// Terminals without release reporting only refresh holds via key
// autorepeat, which can pause ~500 ms after the first press.
const HOLD_TTL_TICKS: u32 = 30;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Doodler {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing_right: bool,
}

struct Difficulty {
    platform_width: f32,
    min_gap: f32,
    max_gap: f32,
    score_multiplier: f32,
    jump_force: f32,
}

fn difficulty_for(score: u32) -> Difficulty {
    if score > 4000 {
        Difficulty {
            platform_width: 45.0,
            min_gap: 90.0,
            max_gap: 170.0,
            score_multiplier: 1.5,
            jump_force: -11.5,
        }
    } else if score > 2000 {
        Difficulty {
            platform_width: 50.0,
            min_gap: 80.0,
            max_gap: 150.0,
            score_multiplier: 1.3,
            jump_force: -11.0,
        }
    } else if score > 750 {
        Difficulty {
            platform_width: 60.0,
            min_gap: 70.0,
            max_gap: 130.0,
            score_multiplier: 1.1,
            jump_force: -10.0,
        }
    } else {
        Difficulty {
            platform_width: PLATFORM_WIDTH_DEFAULT,
            min_gap: 60.0,
            max_gap: 110.0,
            score_multiplier: 1.0,
            jump_force: -9.0,
        }
    }
}

/// Held-key latch: cleared by an explicit release where the terminal
/// reports them, or by TTL expiry where it only autorepeats.
#[derive(Clone, Copy, Default)]
struct Hold {
    ttl: u32,
}

impl Hold {
    fn press(&mut self) {
        self.ttl = HOLD_TTL_TICKS;
    }

    fn release(&mut self) {
        self.ttl = 0;
    }

    fn tick(&mut self) {
        self.ttl = self.ttl.saturating_sub(1);
    }

    fn active(&self) -> bool {
        self.ttl > 0
    }
}

pub struct DoodleJump {
    doodler: Doodler,
    platforms: Vec<Platform>,
    score: u32,
    total_scroll: f32,
    started: bool,
    game_over: bool,
    paused: bool,
    left: Hold,
    right: Hold,
    jump: Hold,
    rng: StdRng,
}

impl DoodleJump {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            doodler: Doodler {
                x: GAME_WIDTH / 2.0 - PLAYER_WIDTH / 2.0,
                y: GAME_HEIGHT - PLAYER_HEIGHT - 50.0,
                vx: 0.0,
                vy: 0.0,
                facing_right: true,
            },
            platforms: Vec::new(),
            score: 0,
            total_scroll: 0.0,
            started: false,
            game_over: false,
            paused: false,
            left: Hold::default(),
            right: Hold::default(),
            jump: Hold::default(),
            rng,
        }
    }

    pub fn start_game(&mut self) {
        self.platforms = self.create_platforms();
        let initial = difficulty_for(0);
        self.doodler = Doodler {
            x: GAME_WIDTH / 2.0 - PLAYER_WIDTH / 2.0,
            y: GAME_HEIGHT - PLAYER_HEIGHT - 100.0,
            vx: 0.0,
            vy: initial.jump_force,
            facing_right: true,
        };
        self.score = 0;
        self.total_scroll = 0.0;
        self.started = true;
        self.game_over = false;
        self.paused = false;
        self.left = Hold::default();
        self.right = Hold::default();
        self.jump = Hold::default();
    }

    fn create_platforms(&mut self) -> Vec<Platform> {
        let width = difficulty_for(0).platform_width;
        let mut platforms = vec![Platform {
            x: GAME_WIDTH / 2.0 - width / 2.0,
            y: GAME_HEIGHT - 50.0,
            width,
            height: PLATFORM_HEIGHT,
        }];
        for i in 1..PLATFORM_COUNT {
            platforms.push(Platform {
                x: self.rng.gen::<f32>() * (GAME_WIDTH - width),
                y: GAME_HEIGHT - 75.0 * i as f32 - 100.0,
                width,
                height: PLATFORM_HEIGHT,
            });
        }
        platforms
    }

    pub fn move_left(&mut self) {
        if self.paused {
            return;
        }
        self.left.press();
        self.right.release();
    }

    pub fn move_right(&mut self) {
        if self.paused {
            return;
        }
        self.right.press();
        self.left.release();
    }

    pub fn stop_moving(&mut self) {
        self.left.release();
        self.right.release();
    }

    pub fn hold_jump(&mut self) {
        if self.paused {
            return;
        }
        self.jump.press();
    }

    pub fn release_jump(&mut self) {
        self.jump.release();
    }

    /// One physics frame.
    pub fn step(&mut self) {
        if self.game_over || self.paused || !self.started {
            return;
        }

        let prev_bottom = self.doodler.y + PLAYER_HEIGHT;

        if self.left.active() {
            self.doodler.vx -= HORIZONTAL_ACCELERATION;
        } else if self.right.active() {
            self.doodler.vx += HORIZONTAL_ACCELERATION;
        } else {
            self.doodler.vx *= FRICTION;
        }
        self.doodler.vx = self
            .doodler
            .vx
            .clamp(-MAX_HORIZONTAL_SPEED, MAX_HORIZONTAL_SPEED);
        if self.doodler.vx > 0.1 {
            self.doodler.facing_right = true;
        }
        if self.doodler.vx < -0.1 {
            self.doodler.facing_right = false;
        }
        if !self.left.active() && !self.right.active() && self.doodler.vx.abs() < 0.1 {
            self.doodler.vx = 0.0;
        }

        self.doodler.x += self.doodler.vx;
        self.doodler.vy += GRAVITY;
        self.doodler.y += self.doodler.vy;

        // Horizontal wrap-around.
        if self.doodler.x > GAME_WIDTH {
            self.doodler.x = -PLAYER_WIDTH;
        } else if self.doodler.x + PLAYER_WIDTH < 0.0 {
            self.doodler.x = GAME_WIDTH;
        }

        let difficulty = difficulty_for(self.score);

        // Swept landing test, only while falling.
        if self.doodler.vy > 0.0 {
            for i in 0..self.platforms.len() {
                let platform = self.platforms[i];
                let next_bottom = self.doodler.y + PLAYER_HEIGHT;
                if prev_bottom <= platform.y
                    && next_bottom >= platform.y
                    && self.doodler.x + PLAYER_WIDTH > platform.x
                    && self.doodler.x < platform.x + platform.width
                {
                    let boost = if self.jump.active() {
                        JUMP_BOOST_MULTIPLIER
                    } else {
                        1.0
                    };
                    self.doodler.vy = difficulty.jump_force * boost;
                    self.doodler.y = platform.y - PLAYER_HEIGHT;
                    break;
                }
            }
        }

        // Camera reframing: rising above the midline scrolls the world.
        let mut scroll = 0.0f32;
        if self.doodler.y < GAME_HEIGHT / 2.0 && self.doodler.vy < 0.0 {
            scroll = GAME_HEIGHT / 2.0 - self.doodler.y;
            self.doodler.y = GAME_HEIGHT / 2.0;
        }

        if scroll > 0.0 {
            self.score += (scroll * difficulty.score_multiplier) as u32;
            self.total_scroll += scroll;

            let mut highest = GAME_HEIGHT;
            for platform in &mut self.platforms {
                platform.y += scroll;
                if platform.y < highest {
                    highest = platform.y;
                }
            }
            self.platforms.retain(|p| p.y < GAME_HEIGHT);

            if self.platforms.len() < PLATFORM_COUNT {
                let gap = difficulty.min_gap
                    + self.rng.gen::<f32>() * (difficulty.max_gap - difficulty.min_gap);
                let platform = Platform {
                    x: self.rng.gen::<f32>() * (GAME_WIDTH - difficulty.platform_width),
                    y: highest - gap,
                    width: difficulty.platform_width,
                    height: PLATFORM_HEIGHT,
                };
                self.platforms.push(platform);
            }
        }

        if self.doodler.y > GAME_HEIGHT {
            self.game_over = true;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.started && !self.game_over {
            self.paused = !self.paused;
        }
    }

    pub fn doodler(&self) -> Doodler {
        self.doodler
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_scroll(&self) -> f32 {
        self.total_scroll
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn render_field(&self, width: usize, height: usize) -> Vec<Line<'static>> {
        let sx = width as f32 / GAME_WIDTH;
        let sy = height as f32 / GAME_HEIGHT;

        let mut grid: Vec<Vec<(char, Style)>> =
            vec![vec![(' ', Style::default().bg(Color::Rgb(8, 8, 24))); width]; height];

        for platform in &self.platforms {
            let py = (platform.y * sy) as usize;
            if py >= height {
                continue;
            }
            let x0 = (platform.x * sx) as usize;
            let x1 = (((platform.x + platform.width) * sx) as usize).min(width);
            for x in x0..x1 {
                grid[py][x] = (
                    '▀',
                    Style::default()
                        .fg(Color::Rgb(80, 200, 120))
                        .bg(Color::Rgb(8, 8, 24)),
                );
            }
        }

        let px = (self.doodler.x * sx) as usize;
        let py = (self.doodler.y * sy) as usize;
        let glyph = if self.doodler.facing_right { '◉' } else { '◎' };
        if px < width && py < height {
            grid[py][px] = (
                glyph,
                Style::default()
                    .fg(Color::Rgb(255, 220, 80))
                    .bg(Color::Rgb(8, 8, 24))
                    .add_modifier(Modifier::BOLD),
            );
            if py + 1 < height {
                grid[py + 1][px] = (
                    '▞',
                    Style::default()
                        .fg(Color::Rgb(220, 180, 60))
                        .bg(Color::Rgb(8, 8, 24)),
                );
            }
        }

        grid.into_iter()
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .into_iter()
                    .map(|(ch, style)| Span::styled(String::from(ch), style))
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Game for DoodleJump {
    fn update(&mut self) {
        if self.game_over || self.paused || !self.started {
            return;
        }
        self.left.tick();
        self.right.tick();
        self.jump.tick();
        self.step();
    }

    fn handle_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(),
            KeyCode::Char('p') | KeyCode::Char('P') => self.toggle_pause(),
            _ => {
                if self.game_over || !self.started {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                        self.start_game();
                    }
                    return;
                }
                if self.paused {
                    return;
                }
                match key.code {
                    KeyCode::Left => self.move_left(),
                    KeyCode::Right => self.move_right(),
                    KeyCode::Down => self.stop_moving(),
                    KeyCode::Char(' ') | KeyCode::Up => self.hold_jump(),
                    _ => {}
                }
            }
        }
    }

    fn handle_key_release(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => self.left.release(),
            KeyCode::Right => self.right.release(),
            KeyCode::Char(' ') | KeyCode::Up => self.release_jump(),
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(255, 200, 80)))
            .title(" 🦘 Doodle Jump ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(255, 220, 100))
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(inner);

        let tier = match self.score {
            s if s > 4000 => "Very Hard",
            s if s > 2000 => "Hard",
            s if s > 750 => "Medium",
            _ => "Easy",
        };
        let status = Line::from(vec![
            Span::styled(" 🦘 ", Style::default()),
            Span::styled(
                format!("Score: {} ", self.score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("Tier: {} ", tier), Style::default().fg(Color::Cyan)),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Height: {:.0} ", self.total_scroll),
                Style::default().fg(Color::Green),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        let fw = chunks[1].width as usize;
        let fh = chunks[1].height as usize;
        if fw > 0 && fh > 0 {
            let lines = self.render_field(fw, fh);
            frame.render_widget(Paragraph::new(lines), chunks[1]);
        }

        if self.game_over {
            let msg = Paragraph::new(Line::from(vec![
                Span::styled(
                    " 💀 GAME OVER! ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("Score: {} │ Press ENTER to restart, Esc for menu", self.score),
                    Style::default().fg(Color::Gray),
                ),
            ]));
            frame.render_widget(msg, chunks[2]);
        } else if !self.started {
            let msg = Paragraph::new(Line::from(vec![Span::styled(
                " ▶ Press SPACE to start! ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )]));
            frame.render_widget(msg, chunks[2]);
        } else if self.paused {
            let msg = Paragraph::new(Line::from(vec![Span::styled(
                " ⏸ PAUSED - Press P to resume ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )]));
            frame.render_widget(msg, chunks[2]);
        } else {
            let help = Paragraph::new(Line::from(vec![
                Span::styled(" ←→ Steer ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("SPACE Boost Jump ", Style::default().fg(Color::Yellow)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("↓ Stop ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("P Pause ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("Esc Menu", Style::default().fg(Color::DarkGray)),
            ]));
            frame.render_widget(help, chunks[2]);
        }
    }

    fn reset(&mut self) {
        *self = DoodleJump::new();
    }

    fn get_score(&self) -> u32 {
        self.score
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_only_happens_while_falling() {
        let mut game = DoodleJump::with_seed(1);
        game.start_game();
        game.platforms = vec![Platform {
            x: 0.0,
            y: 550.0,
            width: GAME_WIDTH,
            height: PLATFORM_HEIGHT,
        }];
        // The doodler spawns rising (vy < 0); while rising the velocity
        // integrates gravity every frame with no resets.
        let mut prev_vy = game.doodler().vy;
        let mut landings = 0;
        for _ in 0..400 {
            game.step();
            let vy = game.doodler().vy;
            let integrated = (vy - (prev_vy + GRAVITY)).abs() < 1e-4;
            if !integrated {
                // Only a landing may break the gravity integration, and a
                // landing flips a downward velocity to an upward impulse.
                assert!(prev_vy > 0.0 && vy < 0.0);
                assert!((game.doodler().y - (550.0 - PLAYER_HEIGHT)).abs() < 1e-3);
                landings += 1;
            }
            prev_vy = vy;
        }
        assert!(landings > 0);
        assert!(!game.is_game_over());
    }

    #[test]
    fn falling_past_the_bottom_ends_the_game() {
        let mut game = DoodleJump::with_seed(1);
        game.start_game();
        game.platforms.clear();
        for _ in 0..600 {
            game.step();
            if game.is_game_over() {
                break;
            }
        }
        assert!(game.is_game_over());
    }

    #[test]
    fn scrolling_awards_score_and_recycles_platforms() {
        let mut game = DoodleJump::with_seed(3);
        game.start_game();
        game.platforms = vec![Platform {
            x: 0.0,
            y: 550.0,
            width: GAME_WIDTH,
            height: PLATFORM_HEIGHT,
        }];
        // Boosted jumps carry the doodler past the midline, so the world
        // scrolls instead.
        for _ in 0..600 {
            game.hold_jump();
            game.step();
        }
        assert!(game.score() > 0);
        assert!(game.total_scroll() > 0.0);
        // Recycling keeps the platform count topped up.
        assert!(game.platforms().len() <= PLATFORM_COUNT);
        assert!(!game.platforms().is_empty());
    }

    #[test]
    fn horizontal_input_wraps_around_the_world() {
        let mut game = DoodleJump::with_seed(1);
        game.start_game();
        game.platforms = vec![Platform {
            x: 0.0,
            y: 550.0,
            width: GAME_WIDTH,
            height: PLATFORM_HEIGHT,
        }];
        let mut wrapped = false;
        let mut prev_x = game.doodler().x;
        for _ in 0..500 {
            game.move_right();
            game.step();
            let x = game.doodler().x;
            if x < prev_x - 100.0 {
                wrapped = true;
            }
            prev_x = x;
        }
        assert!(wrapped);
    }
}
