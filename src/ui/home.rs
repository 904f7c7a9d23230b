use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::storage::{Storage, GAME_NAMES, NUM_GAMES};

const BANNER: &str = r#"
 ╔══════════════════════════════════════════════════════════════════════════╗
 ║  ██████╗ ███████╗████████╗██████╗  ██████╗  ██████╗ █████╗ ██████╗ ███████╗ ║
 ║  ██╔══██╗██╔════╝╚══██╔══╝██╔══██╗██╔═══██╗██╔════╝██╔══██╗██╔══██╗██╔════╝ ║
 ║  ██████╔╝█████╗     ██║   ██████╔╝██║   ██║██║     ███████║██║  ██║█████╗   ║
 ║  ██╔══██╗██╔══╝     ██║   ██╔══██╗██║   ██║██║     ██╔══██║██║  ██║██╔══╝   ║
 ║  ██║  ██║███████╗   ██║   ██║  ██║╚██████╔╝╚██████╗██║  ██║██████╔╝███████╗ ║
 ║  ╚═╝  ╚═╝╚══════╝   ╚═╝   ╚═╝  ╚═╝ ╚═════╝  ╚═════╝╚═╝  ╚═╝╚═════╝ ╚══════╝ ║
 ╚══════════════════════════════════════════════════════════════════════════╝"#;

struct GameTile {
    key: &'static str,
    icon: &'static str,
    name: &'static str,
    desc: &'static str,
    color: Color,
    border_color: Color,
}

const GAME_TILES: [GameTile; NUM_GAMES] = [
    GameTile { key: "1", icon: "🧊", name: "Tetris", desc: "Stack the pieces,\nsweep the rows!", color: Color::Rgb(80, 220, 230), border_color: Color::Rgb(40, 110, 120) },
    GameTile { key: "2", icon: "🐍", name: "Snake", desc: "Eat and grow,\ndon't bite back!", color: Color::Rgb(80, 220, 80), border_color: Color::Rgb(40, 120, 40) },
    GameTile { key: "3", icon: "🦘", name: "Doodle", desc: "Bounce ever\nhigher!", color: Color::Rgb(255, 220, 100), border_color: Color::Rgb(140, 110, 40) },
    GameTile { key: "4", icon: "⛏", name: "Digger", desc: "Tunnel for\nemeralds & gold!", color: Color::Rgb(230, 180, 100), border_color: Color::Rgb(120, 90, 50) },
    GameTile { key: "5", icon: "◈", name: "Xonix", desc: "Cut the field,\ntrap the balls!", color: Color::Rgb(100, 180, 255), border_color: Color::Rgb(50, 90, 140) },
];

fn render_game_tile(frame: &mut Frame, area: Rect, tile: &GameTile, selected: bool) {
    let border_color = if selected {
        Color::Rgb(255, 220, 80)
    } else {
        tile.border_color
    };
    let border_type = if selected {
        BorderType::Double
    } else {
        BorderType::Rounded
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let mut lines: Vec<Line> = Vec::new();

    let name_color = if selected {
        Color::Rgb(255, 255, 255)
    } else {
        tile.color
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("[{}] ", tile.key),
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} ", tile.icon), Style::default()),
        Span::styled(
            tile.name,
            Style::default().fg(name_color).add_modifier(Modifier::BOLD),
        ),
    ]));

    for desc_line in tile.desc.split('\n') {
        lines.push(Line::from(vec![Span::styled(
            desc_line,
            Style::default().fg(if selected {
                Color::Rgb(180, 180, 200)
            } else {
                Color::Rgb(120, 120, 140)
            }),
        )]));
    }

    if selected {
        lines.push(Line::from(vec![Span::styled(
            "▶ Enter to play",
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        )]));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(p, inner);
}

fn game_controls(game_idx: usize) -> Vec<Line<'static>> {
    let key_style = Style::default().fg(Color::Rgb(80, 200, 255));
    let label_style = Style::default().fg(Color::Rgb(140, 140, 140));
    let rows: &[(&str, &str)] = match game_idx {
        0 => &[
            ("← →", "Move piece"),
            ("↑", "Rotate"),
            ("↓", "Soft drop"),
            ("Space", "Hard drop"),
        ],
        1 => &[("↑ ↓ ← →", "Steer the snake")],
        2 => &[
            ("← →", "Steer in the air"),
            ("Space", "Boost jump (hold)"),
            ("↓", "Stop moving"),
        ],
        3 => &[("↑ ↓ ← →", "Dig"), ("Space", "Fire")],
        4 => &[("↑ ↓ ← →", "Move / cut")],
        _ => &[],
    };

    let tile = &GAME_TILES[game_idx.min(NUM_GAMES - 1)];
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("  {} {}", tile.icon, tile.name),
            Style::default().fg(tile.color).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ];
    for (keys, action) in rows {
        lines.push(Line::from(vec![
            Span::styled(format!("    {keys:<14}"), key_style),
            Span::styled(*action, label_style),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled(format!("    {:<14}", "P / R / Esc"), key_style),
        Span::styled("Pause / Restart / Menu", label_style),
    ]));
    lines
}

fn render_leaderboards(frame: &mut Frame, area: Rect, storage: &Storage) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(180, 140, 50)))
        .title(" 🏆 TOP SCORES ")
        .title_style(
            Style::default()
                .fg(Color::Rgb(255, 215, 0))
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::horizontal(vec![Constraint::Ratio(1, NUM_GAMES as u32); NUM_GAMES])
        .split(inner);

    for (idx, column) in columns.iter().enumerate() {
        let mut lines = vec![Line::from(vec![Span::styled(
            GAME_NAMES[idx],
            Style::default()
                .fg(Color::Rgb(80, 200, 255))
                .add_modifier(Modifier::BOLD),
        )])];
        let entries = storage.top_scores(idx);
        if entries.is_empty() {
            lines.push(Line::from(vec![Span::styled(
                "  —",
                Style::default().fg(Color::Rgb(90, 90, 110)),
            )]));
        }
        for (rank, entry) in entries.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}. ", rank + 1),
                    Style::default().fg(Color::Rgb(140, 140, 160)),
                ),
                Span::styled(
                    format!("{:<12}", entry.name),
                    Style::default().fg(Color::Rgb(200, 140, 255)),
                ),
                Span::styled(
                    format!("{:>7}", entry.score),
                    Style::default().fg(Color::Rgb(255, 215, 0)),
                ),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), *column);
    }
}

pub fn render_home(
    frame: &mut Frame,
    area: Rect,
    selected_game: usize,
    show_high_scores: bool,
    storage: &Storage,
) {
    let chunks = Layout::vertical([
        Constraint::Length(9),  // Banner
        Constraint::Length(7),  // Game tiles
        Constraint::Min(6),     // Controls / leaderboards
        Constraint::Length(1),  // Footer
    ])
    .split(area);

    let banner = Paragraph::new(BANNER)
        .style(
            Style::default()
                .fg(Color::Rgb(200, 120, 255))
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let tile_areas =
        Layout::horizontal(vec![Constraint::Ratio(1, NUM_GAMES as u32); NUM_GAMES])
            .split(chunks[1]);
    for (i, tile) in GAME_TILES.iter().enumerate() {
        render_game_tile(frame, tile_areas[i], tile, i == selected_game);
    }

    if show_high_scores {
        render_leaderboards(frame, chunks[2], storage);
    } else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(60, 60, 90)))
            .title(" Controls ")
            .title_style(Style::default().fg(Color::Rgb(150, 150, 180)));
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);
        frame.render_widget(Paragraph::new(game_controls(selected_game)), inner);
    }

    let volume = storage.volume();
    let bars = (volume / 10) as usize;
    let footer = Line::from(vec![
        Span::styled(" ←→ Select ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("Enter Play ", Style::default().fg(Color::Yellow)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("H Scores ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled(
            format!("🔊 {}{} {volume}% (+/-) ", "▮".repeat(bars), "▯".repeat(10 - bars)),
            Style::default().fg(Color::Rgb(120, 200, 255)),
        ),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("L Logout ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("Q Quit", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), chunks[3]);
}
