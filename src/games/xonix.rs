use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::{Direction, Game};

pub const GRID_WIDTH: i32 = 40;
pub const GRID_HEIGHT: i32 = 30;

const TICK_MS: u64 = 100;
const FRAME_MS: u64 = 16;
const CELL_POINTS: u32 = 10;
const LEVEL_BONUS: u32 = 1000;
const MESSAGE_TICKS: u32 = 15;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum XonixCell {
    Empty,
    Border,
    Filled,
    Line,
}

#[derive(Clone, Copy, Debug)]
pub struct Bouncer {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

struct LevelConfig {
    enemies: usize,
    enemy_speed: f32,
    required_percentage: u32,
}

const LEVEL_CONFIGS: [LevelConfig; 6] = [
    LevelConfig { enemies: 2, enemy_speed: 1.0, required_percentage: 75 },
    LevelConfig { enemies: 3, enemy_speed: 1.0, required_percentage: 75 },
    LevelConfig { enemies: 4, enemy_speed: 1.1, required_percentage: 75 },
    LevelConfig { enemies: 4, enemy_speed: 1.2, required_percentage: 80 },
    LevelConfig { enemies: 5, enemy_speed: 1.2, required_percentage: 80 },
    LevelConfig { enemies: 5, enemy_speed: 1.3, required_percentage: 85 },
];

pub struct Xonix {
    grid: Vec<Vec<XonixCell>>,
    player_x: i32,
    player_y: i32,
    drawing: bool,
    heading: Option<Direction>,
    path: Vec<(i32, i32)>,
    enemies: Vec<Bouncer>,
    score: u32,
    lives: u32,
    level: u32,
    started: bool,
    game_over: bool,
    won: bool,
    paused: bool,
    elapsed_ms: u64,
    message: String,
    message_ticks: u32,
    next_id: u32,
    rng: StdRng,
}

impl Xonix {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            grid: Self::initial_grid(),
            player_x: GRID_WIDTH / 2,
            player_y: 0,
            drawing: false,
            heading: None,
            path: Vec::new(),
            enemies: Vec::new(),
            score: 0,
            lives: 3,
            level: 1,
            started: false,
            game_over: false,
            won: false,
            paused: false,
            elapsed_ms: 0,
            message: String::new(),
            message_ticks: 0,
            next_id: 0,
            rng,
        }
    }

    fn initial_grid() -> Vec<Vec<XonixCell>> {
        (0..GRID_HEIGHT)
            .map(|y| {
                (0..GRID_WIDTH)
                    .map(|x| {
                        if y == 0 || y == GRID_HEIGHT - 1 || x == 0 || x == GRID_WIDTH - 1 {
                            XonixCell::Border
                        } else {
                            XonixCell::Empty
                        }
                    })
                    .collect()
            })
            .collect()
    }

    pub fn start_game(&mut self) {
        self.score = 0;
        self.lives = 3;
        self.started = true;
        self.game_over = false;
        self.won = false;
        self.paused = false;
        self.next_id = 0;
        self.elapsed_ms = 0;
        self.generate_level(1);
    }

    fn config(&self) -> &'static LevelConfig {
        &LEVEL_CONFIGS[(self.level as usize - 1).min(LEVEL_CONFIGS.len() - 1)]
    }

    pub fn generate_level(&mut self, level: u32) {
        self.level = level;
        let config = &LEVEL_CONFIGS[(level as usize - 1).min(LEVEL_CONFIGS.len() - 1)];
        self.grid = Self::initial_grid();
        self.player_x = GRID_WIDTH / 2;
        self.player_y = 0;
        self.drawing = false;
        self.heading = None;
        self.path.clear();
        self.enemies.clear();
        for _ in 0..config.enemies {
            let angle = self.rng.gen::<f32>() * 2.0 * std::f32::consts::PI;
            let id = self.next_id;
            self.next_id += 1;
            self.enemies.push(Bouncer {
                id,
                x: GRID_WIDTH as f32 / 2.0,
                y: GRID_HEIGHT as f32 / 2.0,
                dx: angle.cos() * config.enemy_speed,
                dy: angle.sin() * config.enemy_speed,
            });
        }
        self.message = format!("LEVEL {level}");
        self.message_ticks = MESSAGE_TICKS;
    }

    pub fn change_direction(&mut self, dir: Direction) {
        if self.paused || self.game_over || !self.started {
            return;
        }
        if self.drawing {
            if let Some(current) = self.heading {
                if dir == current.opposite() {
                    return;
                }
            }
        }
        self.heading = Some(dir);
    }

    fn cell(&self, x: i32, y: i32) -> XonixCell {
        self.grid[y as usize][x as usize]
    }

    fn solid(cell: XonixCell) -> bool {
        matches!(cell, XonixCell::Border | XonixCell::Filled)
    }

    /// One 100 ms simulation tick: player movement/cutting, then enemy
    /// bounces and path-hit detection.
    pub fn step(&mut self) {
        if self.game_over || self.paused || !self.started {
            return;
        }
        if self.message_ticks > 0 {
            self.message_ticks -= 1;
            if self.message_ticks == 0 && !self.game_over {
                self.message.clear();
            }
        }

        self.move_player();
        if self.game_over {
            return;
        }
        self.move_enemies();
        self.check_level_complete();
    }

    fn move_player(&mut self) {
        let Some(dir) = self.heading else {
            return;
        };
        let (dx, dy) = dir.delta();
        let nx = (self.player_x + dx).clamp(0, GRID_WIDTH - 1);
        let ny = (self.player_y + dy).clamp(0, GRID_HEIGHT - 1);

        let current = self.cell(self.player_x, self.player_y);
        let next = self.cell(nx, ny);

        if self.drawing {
            if Self::solid(next) {
                let mut final_path = self.path.clone();
                final_path.push((nx, ny));
                self.complete_cut(&final_path);
                self.drawing = false;
                self.path.clear();
                self.player_x = nx;
                self.player_y = ny;
            } else if next == XonixCell::Line {
                // Crossing your own trail is fatal.
                self.lose_life();
            } else {
                self.path.push((nx, ny));
                if self.grid[ny as usize][nx as usize] == XonixCell::Empty {
                    self.grid[ny as usize][nx as usize] = XonixCell::Line;
                }
                self.player_x = nx;
                self.player_y = ny;
            }
        } else {
            if Self::solid(current) && next == XonixCell::Empty {
                self.drawing = true;
                self.path = vec![(nx, ny)];
                self.grid[ny as usize][nx as usize] = XonixCell::Line;
            }
            self.player_x = nx;
            self.player_y = ny;
        }
    }

    /// Close the cut: flood-fill the interior regions and convert every
    /// enemy-free one to FILLED. When no region holds an enemy, all but
    /// the largest are filled.
    fn complete_cut(&mut self, final_path: &[(i32, i32)]) {
        let mut grid = self.grid.clone();
        for &(x, y) in final_path {
            grid[y as usize][x as usize] = XonixCell::Border;
        }

        let mut visited = vec![vec![false; GRID_WIDTH as usize]; GRID_HEIGHT as usize];
        let mut regions: Vec<(Vec<(i32, i32)>, bool)> = Vec::new();

        for sy in 1..GRID_HEIGHT - 1 {
            for sx in 1..GRID_WIDTH - 1 {
                if visited[sy as usize][sx as usize]
                    || grid[sy as usize][sx as usize] != XonixCell::Empty
                {
                    continue;
                }
                // BFS flood fill over EMPTY cells.
                let mut region = Vec::new();
                let mut has_enemy = false;
                let mut queue = VecDeque::new();
                queue.push_back((sx, sy));
                visited[sy as usize][sx as usize] = true;
                while let Some((x, y)) = queue.pop_front() {
                    region.push((x, y));
                    if self
                        .enemies
                        .iter()
                        .any(|e| e.x.floor() as i32 == x && e.y.floor() as i32 == y)
                    {
                        has_enemy = true;
                    }
                    for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
                        if nx >= 0
                            && nx < GRID_WIDTH
                            && ny >= 0
                            && ny < GRID_HEIGHT
                            && !visited[ny as usize][nx as usize]
                            && grid[ny as usize][nx as usize] == XonixCell::Empty
                        {
                            visited[ny as usize][nx as usize] = true;
                            queue.push_back((nx, ny));
                        }
                    }
                }
                regions.push((region, has_enemy));
            }
        }

        let fill_all_but_largest = regions.len() > 1 && regions.iter().all(|(_, e)| !e);
        if fill_all_but_largest {
            regions.sort_by_key(|(cells, _)| cells.len());
            regions.pop();
        }

        let mut filled_something = false;
        for (cells, has_enemy) in &regions {
            if *has_enemy || cells.is_empty() {
                continue;
            }
            filled_something = true;
            self.score += cells.len() as u32 * CELL_POINTS;
            for &(x, y) in cells {
                grid[y as usize][x as usize] = XonixCell::Filled;
            }
        }

        let path_cell = if filled_something {
            XonixCell::Filled
        } else {
            XonixCell::Border
        };
        for &(x, y) in final_path {
            grid[y as usize][x as usize] = path_cell;
        }

        self.grid = grid;
    }

    fn move_enemies(&mut self) {
        let mut moved = self.enemies.clone();
        for enemy in &mut moved {
            let next_x = enemy.x + enemy.dx;
            let next_y = enemy.y + enemy.dy;
            let gx = next_x.floor() as i32;
            let gy = next_y.floor() as i32;
            let cgx = enemy.x.floor() as i32;
            let cgy = enemy.y.floor() as i32;

            let solid_at = |x: i32, y: i32| {
                x >= 0
                    && x < GRID_WIDTH
                    && y >= 0
                    && y < GRID_HEIGHT
                    && Self::solid(self.grid[y as usize][x as usize])
            };

            // Per-axis reflection; diagonal-only contact reflects both.
            let mut bounced = false;
            if solid_at(cgx, gy) {
                enemy.dy = -enemy.dy;
                bounced = true;
            }
            if solid_at(gx, cgy) {
                enemy.dx = -enemy.dx;
                bounced = true;
            }
            if !bounced && solid_at(gx, gy) {
                enemy.dx = -enemy.dx;
                enemy.dy = -enemy.dy;
            }

            enemy.x += enemy.dx;
            enemy.y += enemy.dy;

            if enemy.x < 0.5 {
                enemy.x = 0.5;
                if enemy.dx < 0.0 {
                    enemy.dx = -enemy.dx;
                }
            }
            if enemy.x > GRID_WIDTH as f32 - 1.5 {
                enemy.x = GRID_WIDTH as f32 - 1.5;
                if enemy.dx > 0.0 {
                    enemy.dx = -enemy.dx;
                }
            }
            if enemy.y < 0.5 {
                enemy.y = 0.5;
                if enemy.dy < 0.0 {
                    enemy.dy = -enemy.dy;
                }
            }
            if enemy.y > GRID_HEIGHT as f32 - 1.5 {
                enemy.y = GRID_HEIGHT as f32 - 1.5;
                if enemy.dy > 0.0 {
                    enemy.dy = -enemy.dy;
                }
            }
        }

        let path_hit = moved.iter().any(|e| {
            let (ex, ey) = (e.x.floor() as i32, e.y.floor() as i32);
            self.path.iter().any(|&(px, py)| px == ex && py == ey)
        });

        if path_hit {
            self.lose_life();
        } else {
            self.enemies = moved;
        }
    }

    fn lose_life(&mut self) {
        if self.lives <= 1 {
            self.lives = 0;
            self.game_over = true;
            self.message = "GAME OVER".into();
            return;
        }
        self.lives -= 1;
        self.player_x = GRID_WIDTH / 2;
        self.player_y = 0;
        self.drawing = false;
        self.heading = None;
        for &(x, y) in &self.path {
            if self.grid[y as usize][x as usize] == XonixCell::Line {
                self.grid[y as usize][x as usize] = XonixCell::Empty;
            }
        }
        self.path.clear();
    }

    pub fn filled_percentage(&self) -> u32 {
        let filled = self
            .grid
            .iter()
            .flatten()
            .filter(|c| Self::solid(**c))
            .count();
        (filled * 100 / (GRID_WIDTH * GRID_HEIGHT) as usize) as u32
    }

    pub fn required_percentage(&self) -> u32 {
        self.config().required_percentage
    }

    fn check_level_complete(&mut self) {
        if self.filled_percentage() < self.config().required_percentage {
            return;
        }
        self.score += self.level * LEVEL_BONUS;
        if self.level as usize + 1 > LEVEL_CONFIGS.len() {
            self.game_over = true;
            self.won = true;
            self.message = "YOU WIN!".into();
        } else {
            self.generate_level(self.level + 1);
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.started && !self.game_over {
            self.paused = !self.paused;
        }
    }

    pub fn grid(&self) -> &Vec<Vec<XonixCell>> {
        &self.grid
    }

    pub fn player_pos(&self) -> (i32, i32) {
        (self.player_x, self.player_y)
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn path(&self) -> &[(i32, i32)] {
        &self.path
    }

    pub fn enemies(&self) -> &[Bouncer] {
        &self.enemies
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn render_field(&self) -> Vec<Line<'static>> {
        let mut grid: Vec<Vec<(char, Style)>> = self
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        XonixCell::Empty => (' ', Style::default().bg(Color::Rgb(5, 5, 18))),
                        XonixCell::Border => (
                            '▓',
                            Style::default()
                                .fg(Color::Rgb(60, 120, 200))
                                .bg(Color::Rgb(15, 30, 60)),
                        ),
                        XonixCell::Filled => (
                            '█',
                            Style::default()
                                .fg(Color::Rgb(30, 70, 140))
                                .bg(Color::Rgb(15, 30, 60)),
                        ),
                        XonixCell::Line => (
                            '░',
                            Style::default()
                                .fg(Color::Rgb(255, 210, 70))
                                .bg(Color::Rgb(70, 55, 10)),
                        ),
                    })
                    .collect()
            })
            .collect();

        for enemy in &self.enemies {
            let x = enemy.x.floor() as usize;
            let y = enemy.y.floor() as usize;
            if x < GRID_WIDTH as usize && y < GRID_HEIGHT as usize {
                grid[y][x] = (
                    '●',
                    Style::default()
                        .fg(Color::Rgb(255, 90, 90))
                        .bg(Color::Rgb(5, 5, 18))
                        .add_modifier(Modifier::BOLD),
                );
            }
        }

        grid[self.player_y as usize][self.player_x as usize] = (
            '◈',
            Style::default()
                .fg(Color::Rgb(120, 255, 160))
                .add_modifier(Modifier::BOLD),
        );

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

impl Game for Xonix {
    fn update(&mut self) {
        if self.game_over || self.paused || !self.started {
            return;
        }
        self.elapsed_ms += FRAME_MS;
        while self.elapsed_ms >= TICK_MS {
            self.elapsed_ms -= TICK_MS;
            self.step();
        }
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
                    KeyCode::Up => self.change_direction(Direction::Up),
                    KeyCode::Down => self.change_direction(Direction::Down),
                    KeyCode::Left => self.change_direction(Direction::Left),
                    KeyCode::Right => self.change_direction(Direction::Right),
                    _ => {}
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(80, 150, 220)))
            .title(" ◈ Xonix ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(100, 180, 255))
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

        let pct = self.filled_percentage();
        let required = self.required_percentage();
        let status = Line::from(vec![
            Span::styled(" ◈ ", Style::default()),
            Span::styled(
                format!("Score: {} ", self.score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Lives: {} ", "♥ ".repeat(self.lives as usize)),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("Level: {} ", self.level), Style::default().fg(Color::Cyan)),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Filled: {pct}%/{required}% "),
                Style::default().fg(if pct * 100 >= required * 80 {
                    Color::Green
                } else {
                    Color::White
                }),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{} ", self.message),
                Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        let fw = chunks[1].width as usize;
        let fh = chunks[1].height as usize;
        if fw > 0 && fh > 0 {
            let lines = self.render_field();
            frame.render_widget(Paragraph::new(lines), chunks[1]);
        }

        if self.game_over {
            let headline = if self.won { " 🎉 YOU WIN! " } else { " 💀 GAME OVER! " };
            let color = if self.won { Color::Green } else { Color::Red };
            let msg = Paragraph::new(Line::from(vec![
                Span::styled(headline, Style::default().fg(color).add_modifier(Modifier::BOLD)),
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
                Span::styled(" ←↑↓→ Move / Cut ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("P Pause ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("R Restart ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("Esc Menu", Style::default().fg(Color::DarkGray)),
            ]));
            frame.render_widget(help, chunks[2]);
        }
    }

    fn reset(&mut self) {
        *self = Xonix::new();
    }

    fn get_score(&self) -> u32 {
        self.score
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }
}
