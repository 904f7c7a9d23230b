use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::{Direction, Game};

pub const BOARD_SIZE: i32 = 20;

const INITIAL_SPEED_MS: u64 = 200;
const SPEED_INCREMENT_MS: u64 = 2;
const MIN_SPEED_MS: u64 = 40;
const FOOD_POINTS: u32 = 10;
const OBSTACLE_SCORE_THRESHOLD: u32 = 50;
const FRAME_MS: u64 = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

pub struct Snake {
    snake: Vec<Cell>,
    food: Vec<Cell>,
    obstacles: Vec<Cell>,
    heading: Option<Direction>,
    pending: Option<Direction>,
    speed_ms: u64,
    elapsed_ms: u64,
    score: u32,
    started: bool,
    game_over: bool,
    paused: bool,
    eat_flash: u8,
    rng: StdRng,
}

impl Snake {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            snake: Vec::new(),
            food: Vec::new(),
            obstacles: Vec::new(),
            heading: None,
            pending: None,
            speed_ms: INITIAL_SPEED_MS,
            elapsed_ms: 0,
            score: 0,
            started: false,
            game_over: false,
            paused: false,
            eat_flash: 0,
            rng,
        }
    }

    pub fn start_game(&mut self) {
        self.snake = vec![Cell { x: 10, y: 10 }];
        self.food.clear();
        self.obstacles.clear();
        self.heading = None;
        self.pending = None;
        self.speed_ms = INITIAL_SPEED_MS;
        self.elapsed_ms = 0;
        self.score = 0;
        self.started = true;
        self.game_over = false;
        self.paused = false;
        self.eat_flash = 0;
        let first = self.sample_free_cell(true);
        self.food.push(first);
    }

    /// Rejection-sample a cell not occupied by the snake, food, or
    /// (optionally) obstacles.
    fn sample_free_cell(&mut self, avoid_obstacles: bool) -> Cell {
        for _ in 0..1000 {
            let cell = Cell {
                x: self.rng.gen_range(0..BOARD_SIZE),
                y: self.rng.gen_range(0..BOARD_SIZE),
            };
            let taken = self.snake.contains(&cell)
                || self.food.contains(&cell)
                || (avoid_obstacles && self.obstacles.contains(&cell));
            if !taken {
                return cell;
            }
        }
        // Board effectively full; any cell will do at this point.
        Cell { x: 0, y: 0 }
    }

    pub fn change_direction(&mut self, dir: Direction) {
        if self.game_over || self.paused || !self.started {
            return;
        }
        if let Some(current) = self.pending.or(self.heading) {
            // Reversal would walk straight into the neck.
            if self.snake.len() > 1 && dir == current.opposite() {
                return;
            }
        }
        self.pending = Some(dir);
    }

    /// One simulation step: move the head, resolve collisions, eat.
    pub fn step(&mut self) {
        if self.game_over || self.paused || !self.started {
            return;
        }
        if let Some(dir) = self.pending.take() {
            self.heading = Some(dir);
        }
        let Some(dir) = self.heading else {
            return; // waiting for the first direction input
        };

        let (dx, dy) = dir.delta();
        let head = Cell {
            x: self.snake[0].x + dx,
            y: self.snake[0].y + dy,
        };

        if head.x < 0 || head.x >= BOARD_SIZE || head.y < 0 || head.y >= BOARD_SIZE {
            self.game_over = true;
            return;
        }
        if self.snake.iter().skip(1).any(|&seg| seg == head) {
            self.game_over = true;
            return;
        }
        if self.obstacles.contains(&head) {
            self.game_over = true;
            return;
        }

        self.snake.insert(0, head);

        if let Some(idx) = self.food.iter().position(|&f| f == head) {
            self.score += FOOD_POINTS;
            self.eat_flash = 12;
            self.speed_ms = (self.speed_ms.saturating_sub(SPEED_INCREMENT_MS)).max(MIN_SPEED_MS);
            self.food.remove(idx);

            let replacement = self.sample_free_cell(true);
            self.food.push(replacement);
            let desired = 1 + (self.score / 100) as usize;
            while self.food.len() < desired {
                let extra = self.sample_free_cell(true);
                self.food.push(extra);
            }

            self.manage_obstacles();
        } else {
            self.snake.pop();
        }
    }

    fn manage_obstacles(&mut self) {
        if self.score < OBSTACLE_SCORE_THRESHOLD {
            self.obstacles.clear();
            return;
        }
        // Regenerate the obstacle field on every 100-point boundary.
        if self.score % 100 == 0 {
            let count = 2 + (self.score / 100) as usize;
            self.obstacles.clear();
            for _ in 0..count {
                let cell = self.sample_free_cell(false);
                self.obstacles.push(cell);
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.started && !self.game_over {
            self.paused = !self.paused;
        }
    }

    pub fn snake_cells(&self) -> &[Cell] {
        &self.snake
    }

    pub fn head(&self) -> Option<Cell> {
        self.snake.first().copied()
    }

    pub fn heading(&self) -> Option<Direction> {
        self.heading
    }

    pub fn food(&self) -> &[Cell] {
        &self.food
    }

    pub fn obstacles(&self) -> &[Cell] {
        &self.obstacles
    }

    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn render_field(&self) -> Vec<Line<'static>> {
        let mut grid: Vec<Vec<(&'static str, Style)>> = vec![
            vec![
                ("·.", Style::default().fg(Color::Rgb(30, 45, 30)));
                BOARD_SIZE as usize
            ];
            BOARD_SIZE as usize
        ];

        for &obstacle in &self.obstacles {
            grid[obstacle.y as usize][obstacle.x as usize] =
                ("▒▒", Style::default().fg(Color::Rgb(130, 130, 140)));
        }
        for &food in &self.food {
            grid[food.y as usize][food.x as usize] = (
                "● ",
                Style::default()
                    .fg(Color::Rgb(230, 70, 70))
                    .add_modifier(Modifier::BOLD),
            );
        }
        for (i, &seg) in self.snake.iter().enumerate() {
            let style = if i == 0 {
                let head_color = if self.eat_flash > 0 {
                    Color::Rgb(255, 255, 120)
                } else {
                    Color::Rgb(120, 255, 120)
                };
                Style::default().fg(head_color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Rgb(60, 190, 60))
            };
            grid[seg.y as usize][seg.x as usize] = ("██", style);
        }

        grid.into_iter()
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .into_iter()
                    .map(|(s, style)| Span::styled(s, style))
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Game for Snake {
    fn update(&mut self) {
        if self.game_over || self.paused || !self.started {
            return;
        }
        if self.eat_flash > 0 {
            self.eat_flash -= 1;
        }
        self.elapsed_ms += FRAME_MS;
        while self.elapsed_ms >= self.speed_ms {
            self.elapsed_ms -= self.speed_ms;
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
            .border_style(Style::default().fg(Color::Rgb(80, 220, 80)))
            .title(" 🐍 Snake ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(120, 255, 120))
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

        let status = Line::from(vec![
            Span::styled(" 🐍 ", Style::default()),
            Span::styled(
                format!("Score: {} ", self.score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Length: {} ", self.snake.len()),
                Style::default().fg(Color::Green),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Speed: {}ms ", self.speed_ms),
                Style::default().fg(Color::Cyan),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        let well = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(50, 90, 50)));
        let well_area = Rect {
            x: chunks[1].x,
            y: chunks[1].y,
            width: ((BOARD_SIZE * 2) as u16 + 2).min(chunks[1].width),
            height: (BOARD_SIZE as u16 + 2).min(chunks[1].height),
        };
        let well_inner = well.inner(well_area);
        frame.render_widget(well, well_area);
        frame.render_widget(Paragraph::new(self.render_field()), well_inner);

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
                Span::styled(" ←↑↓→ Steer ", Style::default().fg(Color::DarkGray)),
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
        *self = Snake::new();
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

    fn running_snake(cells: Vec<Cell>, heading: Direction) -> Snake {
        let mut game = Snake::with_seed(1);
        game.start_game();
        game.snake = cells;
        game.heading = Some(heading);
        game.pending = None;
        game
    }

    #[test]
    fn reversal_is_rejected_while_body_exists() {
        let mut game = running_snake(
            vec![Cell { x: 10, y: 10 }, Cell { x: 9, y: 10 }],
            Direction::Right,
        );
        game.food.clear();
        game.change_direction(Direction::Left);
        game.step();
        assert_eq!(game.heading(), Some(Direction::Right));
        assert_eq!(game.head(), Some(Cell { x: 11, y: 10 }));
        assert!(!game.is_game_over());
    }

    #[test]
    fn reversal_is_harmless_at_length_one() {
        let mut game = running_snake(vec![Cell { x: 10, y: 10 }], Direction::Right);
        game.food.clear();
        game.change_direction(Direction::Left);
        game.step();
        assert_eq!(game.heading(), Some(Direction::Left));
        assert_eq!(game.head(), Some(Cell { x: 9, y: 10 }));
    }

    #[test]
    fn eating_grows_and_speeds_up() {
        let mut game = running_snake(vec![Cell { x: 10, y: 10 }], Direction::Right);
        game.food = vec![Cell { x: 11, y: 10 }];
        game.step();
        assert_eq!(game.score(), 10);
        assert_eq!(game.snake_cells().len(), 2);
        assert_eq!(game.speed_ms(), INITIAL_SPEED_MS - SPEED_INCREMENT_MS);
        // The eaten food was replaced.
        assert_eq!(game.food().len(), 1);
        assert_ne!(game.food()[0], Cell { x: 11, y: 10 });
    }

    #[test]
    fn tail_cell_is_fatal_before_it_vacates() {
        // Square body: head about to re-enter the current tail cell.
        let mut game = running_snake(
            vec![
                Cell { x: 10, y: 10 },
                Cell { x: 10, y: 11 },
                Cell { x: 11, y: 11 },
                Cell { x: 11, y: 10 },
            ],
            Direction::Right,
        );
        game.food.clear();
        game.step();
        assert!(game.is_game_over());
    }

    #[test]
    fn obstacle_collision_ends_game() {
        let mut game = running_snake(vec![Cell { x: 10, y: 10 }], Direction::Right);
        game.food.clear();
        game.obstacles = vec![Cell { x: 11, y: 10 }];
        game.step();
        assert!(game.is_game_over());
    }

    #[test]
    fn obstacles_regenerate_on_hundred_point_boundary() {
        let mut game = running_snake(vec![Cell { x: 5, y: 5 }], Direction::Right);
        game.score = 90;
        game.food = vec![Cell { x: 6, y: 5 }];
        game.step();
        assert_eq!(game.score(), 100);
        assert_eq!(game.obstacles().len(), 3);
        for obstacle in game.obstacles() {
            assert!(!game.snake_cells().contains(obstacle));
        }
    }
}
