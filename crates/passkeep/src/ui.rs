//! UI rendering

use passkeep::TotpState;
use passkeep_core::format;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Seconds left at which a countdown turns red
const EXPIRING_SOON: u64 = 5;

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Entries
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_entries(f, app, chunks[1]);
    draw_footer(f, chunks[2]);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.paused {
        " passkeep [PAUSED] "
    } else {
        " passkeep "
    };

    let remaining = app.model.remaining();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(title, Style::default().fg(Color::Cyan).bold()),
        Span::raw(" - "),
        Span::styled(
            format!("codes change in {}", format::countdown(remaining)),
            Style::default().fg(countdown_color(remaining)),
        ),
        Span::styled(
            format!("  (updated {})", format::time(app.last_refresh)),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn draw_entries(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["#", "Name", "Username", "Password", "Code", "Left"])
        .style(Style::default().fg(Color::Cyan).bold())
        .bottom_margin(1);

    let rows: Vec<Row> = if app.model.rows.is_empty() {
        vec![Row::new(vec![Cell::from(""), Cell::from("No entries stored")
            .style(Style::default().fg(Color::DarkGray))])]
    } else {
        app.model
            .rows
            .iter()
            .map(|row| {
                let password = if app.show_passwords {
                    row.password.clone()
                } else {
                    format::mask(&row.password)
                };

                let (code, left) = match &row.totp {
                    TotpState::Absent => (
                        Cell::from("-").style(Style::default().fg(Color::DarkGray)),
                        Cell::from(""),
                    ),
                    TotpState::Active { code, remaining } => (
                        Cell::from(format::code(code.as_str())).style(Style::default().fg(Color::Green).bold()),
                        Cell::from(format::countdown(*remaining))
                            .style(Style::default().fg(countdown_color(*remaining))),
                    ),
                    TotpState::Invalid(_) => (
                        Cell::from("invalid").style(Style::default().fg(Color::Red)),
                        Cell::from(""),
                    ),
                };

                Row::new(vec![
                    Cell::from(row.position.to_string()),
                    Cell::from(row.name.clone()),
                    Cell::from(row.username.clone()),
                    Cell::from(password),
                    code,
                    left,
                ])
            })
            .collect()
    };

    let with_totp = app.model.rows.iter().filter(|r| r.totp.code().is_some()).count();
    let title = format!(" Entries ({} total, {} with TOTP) ", app.model.rows.len(), with_totp);

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),      // #
            Constraint::Percentage(25), // Name
            Constraint::Percentage(25), // Username
            Constraint::Min(10),        // Password
            Constraint::Length(9),      // Code
            Constraint::Length(5),      // Left
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .block(
        Block::default()
            .title(title)
            .title_style(Style::default().fg(Color::Magenta).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );

    let mut state = TableState::default().with_selected(if app.model.rows.is_empty() {
        None
    } else {
        Some(app.selected)
    });
    f.render_stateful_widget(table, area, &mut state);
}

fn countdown_color(remaining: u64) -> Color {
    if remaining <= EXPIRING_SOON {
        Color::Red
    } else {
        Color::Green
    }
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled(" q", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" quit  "),
        Span::styled("s", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" show passwords  "),
        Span::styled("p", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" pause  "),
        Span::styled("?", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" help"),
    ]);

    let footer = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}

fn draw_help_overlay(f: &mut Frame) {
    let area = f.area();

    let popup_width = 44;
    let popup_height = 11;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width.min(area.width), popup_height.min(area.height));

    f.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(Color::Cyan)),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        Line::from(""),
        key("  q / Esc  ", "Quit"),
        key("  r        ", "Refresh now"),
        key("  p        ", "Pause/resume auto-refresh"),
        key("  s        ", "Show/hide passwords"),
        key("  j/k      ", "Move selection"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? to close",
            Style::default().fg(Color::DarkGray),
        ))
        .centered(),
    ];

    let help_popup = Paragraph::new(help_text).block(
        Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(Style::default().fg(Color::Yellow).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    f.render_widget(help_popup, popup_area);
}
