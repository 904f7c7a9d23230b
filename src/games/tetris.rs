use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::Game;

pub const BOARD_WIDTH: usize = 12;
pub const BOARD_HEIGHT: usize = 17;

const LINES_PER_LEVEL: u32 = 10;
// Points for 0/1/2/3/4 swept rows, scaled by (level + 1) on award.
const LINE_POINTS: [u32; 5] = [0, 100, 300, 500, 800];
const SOFT_DROP_POINTS: u32 = 1;
const HARD_DROP_POINTS: u32 = 2;
const FRAME_MS: u64 = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    pub fn shape(self) -> Vec<Vec<u8>> {
        match self {
            PieceKind::I => vec![
                vec![0, 1, 0, 0],
                vec![0, 1, 0, 0],
                vec![0, 1, 0, 0],
                vec![0, 1, 0, 0],
            ],
            PieceKind::J => vec![vec![0, 1, 0], vec![0, 1, 0], vec![1, 1, 0]],
            PieceKind::L => vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 1]],
            PieceKind::O => vec![vec![1, 1], vec![1, 1]],
            PieceKind::S => vec![vec![0, 1, 1], vec![1, 1, 0], vec![0, 0, 0]],
            PieceKind::T => vec![vec![1, 1, 1], vec![0, 1, 0], vec![0, 0, 0]],
            PieceKind::Z => vec![vec![1, 1, 0], vec![0, 1, 1], vec![0, 0, 0]],
        }
    }

    fn color(self) -> Color {
        match self {
            PieceKind::I => Color::Rgb(80, 220, 230),
            PieceKind::J => Color::Rgb(80, 120, 240),
            PieceKind::L => Color::Rgb(240, 160, 60),
            PieceKind::O => Color::Rgb(240, 220, 70),
            PieceKind::S => Color::Rgb(90, 220, 90),
            PieceKind::T => Color::Rgb(190, 100, 230),
            PieceKind::Z => Color::Rgb(230, 80, 80),
        }
    }
}

#[derive(Clone)]
struct ActivePiece {
    x: i32,
    y: i32,
    kind: PieceKind,
    shape: Vec<Vec<u8>>,
    collided: bool,
}

impl ActivePiece {
    fn spawn(kind: PieceKind) -> Self {
        Self {
            x: BOARD_WIDTH as i32 / 2 - 1,
            y: 0,
            kind,
            shape: kind.shape(),
            collided: false,
        }
    }
}

// Transpose, then reverse each row (clockwise quarter turn).
fn rotated(shape: &[Vec<u8>]) -> Vec<Vec<u8>> {
    (0..shape[0].len())
        .map(|i| {
            let mut row: Vec<u8> = shape.iter().map(|r| r[i]).collect();
            row.reverse();
            row
        })
        .collect()
}

pub struct Tetris {
    board: Vec<Vec<Option<PieceKind>>>,
    player: ActivePiece,
    next_piece: PieceKind,
    score: u32,
    level: u32,
    lines: u32,
    started: bool,
    game_over: bool,
    paused: bool,
    drop_elapsed_ms: u64,
    scripted: VecDeque<PieceKind>,
    rng: StdRng,
}

impl Tetris {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            board: vec![vec![None; BOARD_WIDTH]; BOARD_HEIGHT],
            player: ActivePiece::spawn(PieceKind::O),
            next_piece: PieceKind::O,
            score: 0,
            level: 0,
            lines: 0,
            started: false,
            game_over: false,
            paused: false,
            drop_elapsed_ms: 0,
            scripted: VecDeque::new(),
            rng,
        }
    }

    /// Queue a specific piece ahead of the random stream. Scripted pieces
    /// are consumed before the generator is consulted.
    pub fn push_piece(&mut self, kind: PieceKind) {
        self.scripted.push_back(kind);
    }

    fn draw_piece(&mut self) -> PieceKind {
        if let Some(kind) = self.scripted.pop_front() {
            return kind;
        }
        PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())]
    }

    pub fn start_game(&mut self) {
        self.board = vec![vec![None; BOARD_WIDTH]; BOARD_HEIGHT];
        self.score = 0;
        self.level = 0;
        self.lines = 0;
        self.game_over = false;
        self.paused = false;
        self.started = true;
        self.drop_elapsed_ms = 0;
        let first = self.draw_piece();
        self.player = ActivePiece::spawn(first);
        self.next_piece = self.draw_piece();
    }

    fn active(&self) -> bool {
        self.started && !self.game_over && !self.paused
    }

    fn collides(&self, shape: &[Vec<u8>], px: i32, py: i32) -> bool {
        for (y, row) in shape.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v == 0 {
                    continue;
                }
                let bx = px + x as i32;
                let by = py + y as i32;
                if bx < 0 || bx >= BOARD_WIDTH as i32 || by >= BOARD_HEIGHT as i32 {
                    return true;
                }
                if by >= 0 && self.board[by as usize][bx as usize].is_some() {
                    return true;
                }
            }
        }
        false
    }

    pub fn move_piece(&mut self, dx: i32) {
        if !self.active() || self.player.collided {
            return;
        }
        if !self.collides(&self.player.shape, self.player.x + dx, self.player.y) {
            self.player.x += dx;
        }
    }

    pub fn rotate_piece(&mut self) {
        if !self.active() || self.player.collided {
            return;
        }
        let shape = rotated(&self.player.shape);
        let mut x = self.player.x;
        // Symmetric kick search: +1, -1, +2, -2, ... bounded by shape width.
        let mut offset = 1i32;
        while self.collides(&shape, x, self.player.y) {
            x += offset;
            offset = -(offset + if offset > 0 { 1 } else { -1 });
            if offset > shape[0].len() as i32 {
                return;
            }
        }
        self.player.shape = shape;
        self.player.x = x;
    }

    /// One gravity step: a collided piece locks, otherwise the piece falls
    /// one row or is marked collided.
    pub fn gravity_step(&mut self) {
        if !self.active() {
            return;
        }
        if self.player.collided {
            self.lock_piece();
            return;
        }
        if self.collides(&self.player.shape, self.player.x, self.player.y + 1) {
            self.player.collided = true;
        } else {
            self.player.y += 1;
        }
    }

    pub fn soft_drop(&mut self) {
        if !self.active() || self.player.collided {
            return;
        }
        if self.collides(&self.player.shape, self.player.x, self.player.y + 1) {
            self.player.collided = true;
        } else {
            self.player.y += 1;
            self.score += SOFT_DROP_POINTS;
        }
    }

    pub fn hard_drop(&mut self) {
        if !self.active() || self.player.collided {
            return;
        }
        let mut rows = 0u32;
        while !self.collides(&self.player.shape, self.player.x, self.player.y + 1) {
            self.player.y += 1;
            rows += 1;
        }
        self.score += rows * HARD_DROP_POINTS;
        self.player.collided = true;
        self.lock_piece();
    }

    fn lock_piece(&mut self) {
        let piece = self.player.clone();
        for (y, row) in piece.shape.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v == 0 {
                    continue;
                }
                let by = piece.y + y as i32;
                let bx = piece.x + x as i32;
                if by >= 0 && (by as usize) < BOARD_HEIGHT && bx >= 0 && (bx as usize) < BOARD_WIDTH
                {
                    self.board[by as usize][bx as usize] = Some(piece.kind);
                }
            }
        }

        // Sweep full rows, refilling from the top.
        let mut swept = 0u32;
        self.board.retain(|row| {
            if row.iter().all(|c| c.is_some()) {
                swept += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..swept {
            self.board.insert(0, vec![None; BOARD_WIDTH]);
        }

        if swept > 0 {
            self.score += LINE_POINTS[swept as usize] * (self.level + 1);
            self.lines += swept;
            self.level = self.lines / LINES_PER_LEVEL;
        }

        let spawned = ActivePiece::spawn(self.next_piece);
        if self.collides(&spawned.shape, spawned.x, spawned.y) {
            self.player = spawned;
            self.game_over = true;
            return;
        }
        self.player = spawned;
        self.next_piece = self.draw_piece();
    }

    pub fn toggle_pause(&mut self) {
        if self.started && !self.game_over {
            self.paused = !self.paused;
        }
    }

    fn drop_interval_ms(&self) -> u64 {
        1000 / (self.level as u64 + 1) + 200
    }

    pub fn board(&self) -> &Vec<Vec<Option<PieceKind>>> {
        &self.board
    }

    pub fn piece_pos(&self) -> (i32, i32) {
        (self.player.x, self.player.y)
    }

    pub fn piece_kind(&self) -> PieceKind {
        self.player.kind
    }

    pub fn piece_shape(&self) -> &Vec<Vec<u8>> {
        &self.player.shape
    }

    pub fn next_piece(&self) -> PieceKind {
        self.next_piece
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn render_board(&self) -> Vec<Line<'static>> {
        let mut cells: Vec<Vec<Option<PieceKind>>> = self.board.clone();
        if self.started && !self.game_over {
            for (y, row) in self.player.shape.iter().enumerate() {
                for (x, &v) in row.iter().enumerate() {
                    if v == 0 {
                        continue;
                    }
                    let by = self.player.y + y as i32;
                    let bx = self.player.x + x as i32;
                    if by >= 0
                        && (by as usize) < BOARD_HEIGHT
                        && bx >= 0
                        && (bx as usize) < BOARD_WIDTH
                    {
                        cells[by as usize][bx as usize] = Some(self.player.kind);
                    }
                }
            }
        }

        cells
            .into_iter()
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .into_iter()
                    .map(|cell| match cell {
                        Some(kind) => Span::styled(
                            "██",
                            Style::default().fg(kind.color()).add_modifier(Modifier::BOLD),
                        ),
                        None => Span::styled("·.", Style::default().fg(Color::Rgb(35, 35, 55))),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn render_preview(&self) -> Vec<Line<'static>> {
        let shape = self.next_piece.shape();
        let color = self.next_piece.color();
        shape
            .into_iter()
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .into_iter()
                    .map(|v| {
                        if v != 0 {
                            Span::styled("██", Style::default().fg(color))
                        } else {
                            Span::raw("  ")
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Game for Tetris {
    fn update(&mut self) {
        if !self.active() {
            return;
        }
        self.drop_elapsed_ms += FRAME_MS;
        let interval = self.drop_interval_ms();
        while self.drop_elapsed_ms >= interval {
            self.drop_elapsed_ms -= interval;
            self.gravity_step();
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
                    KeyCode::Left => self.move_piece(-1),
                    KeyCode::Right => self.move_piece(1),
                    KeyCode::Up | KeyCode::Char('x') | KeyCode::Char('X') => self.rotate_piece(),
                    KeyCode::Down => self.soft_drop(),
                    KeyCode::Char(' ') => self.hard_drop(),
                    _ => {}
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(80, 220, 230)))
            .title(" 🧊 Tetris ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(120, 230, 240))
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .split(inner);

        let status = Line::from(vec![
            Span::styled(" 🧊 ", Style::default()),
            Span::styled(
                format!("Score: {} ", self.score),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("Level: {} ", self.level), Style::default().fg(Color::Cyan)),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Lines: {} ", self.lines),
                Style::default().fg(Color::Green),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        // Board on the left, next-piece preview beside it.
        let field = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length((BOARD_WIDTH * 2) as u16 + 2),
                Constraint::Min(10),
            ])
            .split(chunks[1]);

        let well = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(70, 70, 110)));
        let well_inner = well.inner(field[0]);
        frame.render_widget(well, field[0]);
        frame.render_widget(Paragraph::new(self.render_board()), well_inner);

        let mut side = vec![Line::from(Span::styled(
            " Next:",
            Style::default().fg(Color::Rgb(150, 150, 180)),
        ))];
        side.extend(self.render_preview());
        frame.render_widget(Paragraph::new(side), field[1]);

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
                Span::styled(" ←→ Move ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("↑ Rotate ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("↓ Soft Drop ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("SPACE Hard Drop ", Style::default().fg(Color::Yellow)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("P Pause ", Style::default().fg(Color::DarkGray)),
                Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
                Span::styled("Esc Menu", Style::default().fg(Color::DarkGray)),
            ]));
            frame.render_widget(help, chunks[2]);
        }
    }

    fn reset(&mut self) {
        let scripted = std::mem::take(&mut self.scripted);
        *self = Tetris::new();
        self.scripted = scripted;
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
    fn rotation_is_transpose_then_reverse() {
        let shape = PieceKind::T.shape();
        let turned = rotated(&shape);
        assert_eq!(
            turned,
            vec![vec![0, 0, 1], vec![0, 1, 1], vec![0, 0, 1]]
        );
        // Four quarter turns return the original shape.
        let back = rotated(&rotated(&rotated(&rotated(&shape))));
        assert_eq!(back, shape);
    }

    #[test]
    fn rotation_kicks_off_the_left_wall() {
        let mut game = Tetris::with_seed(7);
        game.push_piece(PieceKind::I);
        game.push_piece(PieceKind::I);
        game.start_game();
        // Vertical I occupies column x+1; park it against the wall.
        for _ in 0..10 {
            game.move_piece(-1);
        }
        assert_eq!(game.piece_pos().0, -1);
        // Horizontal I would span columns -1..=2; the kick resolves to 0.
        game.rotate_piece();
        assert_eq!(game.piece_pos().0, 0);
        assert_eq!(game.piece_shape()[1], vec![1, 1, 1, 1]);
    }

    #[test]
    fn rotation_rejected_when_no_offset_fits() {
        let mut game = Tetris::with_seed(7);
        game.push_piece(PieceKind::I);
        game.push_piece(PieceKind::I);
        game.start_game();
        game.rotate_piece(); // horizontal bar on row 1
        // A filled row directly beneath the bar blocks the vertical shape
        // at every kick offset.
        for x in 0..BOARD_WIDTH {
            game.board[2][x] = Some(PieceKind::O);
        }
        let before_shape = game.piece_shape().clone();
        let before_pos = game.piece_pos();
        game.rotate_piece();
        assert_eq!(game.piece_shape(), &before_shape);
        assert_eq!(game.piece_pos(), before_pos);
    }

    #[test]
    fn collided_piece_locks_on_next_gravity_step() {
        let mut game = Tetris::with_seed(7);
        game.push_piece(PieceKind::O);
        game.push_piece(PieceKind::O);
        game.push_piece(PieceKind::O);
        game.start_game();
        // Walk the O down until it rests on the floor: 15 falling steps,
        // then one step that marks the collision.
        for _ in 0..16 {
            game.gravity_step();
        }
        assert!(game.player.collided);
        let merged_before = game
            .board
            .iter()
            .flatten()
            .filter(|c| c.is_some())
            .count();
        assert_eq!(merged_before, 0);
        game.gravity_step();
        let merged_after = game
            .board
            .iter()
            .flatten()
            .filter(|c| c.is_some())
            .count();
        assert_eq!(merged_after, 4);
    }
}
