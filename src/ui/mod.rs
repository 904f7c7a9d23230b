pub mod home;
pub mod tabs;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab};
use crate::games::Game;
use crate::storage::MAX_NAME_LEN;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Tab bar
        Constraint::Min(0),    // Content
    ])
    .split(frame.area());

    tabs::render_tabs(frame, app, chunks[0]);

    match app.current_tab {
        Tab::Home => home::render_home(
            frame,
            chunks[1],
            app.selected_game,
            app.show_high_scores,
            &app.storage,
        ),
        Tab::Tetris => app.tetris.render(frame, chunks[1]),
        Tab::Snake => app.snake.render(frame, chunks[1]),
        Tab::DoodleJump => app.doodle.render(frame, chunks[1]),
        Tab::Digger => app.digger.render(frame, chunks[1]),
        Tab::Xonix => app.xonix.render(frame, chunks[1]),
    }

    // Login overlay (renders on top of everything)
    if app.logging_in {
        render_login(frame, frame.area(), &app.name_buffer);
    }
}

fn render_login(frame: &mut Frame, area: Rect, name_buffer: &str) {
    let overlay_w = 46u16.min(area.width.saturating_sub(4));
    let overlay_h = 11u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(overlay_w)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_h)) / 2;
    let overlay_area = Rect::new(x, y, overlay_w, overlay_h);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 220, 80)))
        .title(" 🕹 WELCOME TO RETROCADE ")
        .title_style(
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        )
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    // Typed chars + underscores for the remaining slots
    let typed_len = name_buffer.chars().count();
    let remaining = MAX_NAME_LEN.saturating_sub(typed_len);
    let display_name = format!("{}{}", name_buffer, "_".repeat(remaining));

    let lines = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Enter your player name:",
            Style::default().fg(Color::Rgb(180, 180, 200)),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled("    [ ", Style::default().fg(Color::Rgb(100, 100, 130))),
            Span::styled(
                display_name,
                Style::default()
                    .fg(Color::Rgb(255, 255, 255))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ]", Style::default().fg(Color::Rgb(100, 100, 130))),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "  Enter",
                Style::default()
                    .fg(Color::Rgb(80, 200, 255))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                " play  ",
                Style::default().fg(Color::Rgb(100, 100, 130)),
            ),
            Span::styled(
                "Ctrl+C",
                Style::default()
                    .fg(Color::Rgb(80, 200, 255))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" quit", Style::default().fg(Color::Rgb(100, 100, 130))),
        ]),
    ];

    let p = Paragraph::new(lines).style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}
