//! Rendering for the askdesk TUI.
//!
//! Lays out the chat column (transcript + input + status bar), the sidebar
//! (language, about, news), and the help/quit overlays.

pub mod input;
pub mod theme;
pub mod transcript;

use crate::app::{App, Overlay};
use askdesk_engine::Language;
use input::InputLine;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};
use theme::Styles;
use transcript::Transcript;

/// Static news items shown in the sidebar.
const NEWS_ITEMS: [&str; 3] = [
    "Campus winter hours updated",
    "New mental health services now open",
    "Career center job fair - Feb 12",
];

/// Minimum width before the sidebar is hidden.
const SIDEBAR_MIN_TOTAL_WIDTH: u16 = 72;

/// Height of the input area (bordered).
const INPUT_HEIGHT: u16 = 3;

/// Draw the whole UI for one frame.
pub fn draw(app: &App, frame: &mut Frame<'_>) {
    let area = frame.area();
    let buf = frame.buffer_mut();

    // Background fill
    Block::default().style(Styles::default()).render(area, buf);

    let columns = if area.width >= SIDEBAR_MIN_TOTAL_WIDTH {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(28)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1)])
            .split(area)
    };

    render_chat_column(app, columns[0], buf);
    if columns.len() > 1 {
        render_sidebar(app, columns[1], buf);
    }

    match app.overlay {
        Overlay::None => {}
        Overlay::Help => render_help_overlay(area, buf),
        Overlay::QuitConfirm => render_quit_confirm(area, buf),
    }
}

fn render_chat_column(app: &App, area: Rect, buf: &mut Buffer) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);

    // Transcript pane
    let block = Block::default()
        .title(" askdesk ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active());
    let inner = block.inner(rows[0]);
    block.render(rows[0], buf);
    Transcript::new(app.session.turns())
        .tick(app.tick)
        .scroll(app.transcript_scroll)
        .render(inner, buf);

    // Input pane
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(if app.session.has_pending() {
            Styles::border()
        } else {
            Styles::border_active()
        });
    InputLine::new(&app.input_state)
        .pending(app.session.has_pending())
        .block(input_block)
        .render(rows[1], buf);

    render_status_bar(app, rows[2], buf);
}

fn render_status_bar(app: &App, area: Rect, buf: &mut Buffer) {
    let line = if let Some(msg) = &app.notification {
        Line::from(Span::styled(format!(" {msg}"), Styles::notification()))
    } else {
        Line::from(vec![
            Span::styled(" Enter", Styles::key_hint()),
            Span::styled(" send  ", Styles::dim()),
            Span::styled("Tab", Styles::key_hint()),
            Span::styled(format!(" language ({})  ", app.session.language().name()), Styles::dim()),
            Span::styled("Ctrl+N", Styles::key_hint()),
            Span::styled(" clear  ", Styles::dim()),
            Span::styled("F1", Styles::key_hint()),
            Span::styled(" help  ", Styles::dim()),
            Span::styled("Esc", Styles::key_hint()),
            Span::styled(" quit", Styles::dim()),
        ])
    };
    Paragraph::new(line).render(area, buf);
}

fn render_sidebar(app: &App, area: Rect, buf: &mut Buffer) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(Language::ALL.len() as u16 + 2),
            Constraint::Min(6),
            Constraint::Length(NEWS_ITEMS.len() as u16 + 2),
        ])
        .split(area);

    // Language selector
    let mut lang_lines = Vec::new();
    for lang in Language::ALL {
        let marker = if lang == app.session.language() {
            "> "
        } else {
            "  "
        };
        let style = if lang == app.session.language() {
            Styles::key_hint()
        } else {
            Styles::dim()
        };
        lang_lines.push(Line::from(Span::styled(
            format!("{marker}{}", lang.name()),
            style,
        )));
    }
    Paragraph::new(lang_lines)
        .block(
            Block::default()
                .title(" Language ")
                .borders(Borders::ALL)
                .border_style(Styles::border()),
        )
        .render(rows[0], buf);

    // About
    let about = Paragraph::new(vec![
        Line::from(Span::styled(
            "Your student support assistant.",
            Styles::default(),
        )),
        Line::default(),
        Line::from(Span::styled("Ask about:", Styles::dim())),
        Line::from(Span::styled("- Academic advising", Styles::dim())),
        Line::from(Span::styled("- Course planning", Styles::dim())),
        Line::from(Span::styled("- Fees & payments", Styles::dim())),
        Line::from(Span::styled("- Campus services", Styles::dim())),
        Line::from(Span::styled("- Mental health resources", Styles::dim())),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(" About ")
            .borders(Borders::ALL)
            .border_style(Styles::border()),
    );
    about.render(rows[1], buf);

    // News
    let news_lines: Vec<Line<'_>> = NEWS_ITEMS
        .iter()
        .map(|item| Line::from(Span::styled(format!("- {item}"), Styles::dim())))
        .collect();
    Paragraph::new(news_lines)
        .block(
            Block::default()
                .title(" News & Updates ")
                .borders(Borders::ALL)
                .border_style(Styles::border()),
        )
        .render(rows[2], buf);
}

/// Centered overlay rect of the given size, clamped to the area.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let rect = centered_rect(44, 12, area);
    Clear.render(rect, buf);

    let lines = vec![
        Line::from(Span::styled("Keys", Styles::title())),
        Line::default(),
        help_line("Enter", "send your question"),
        help_line("Tab", "cycle answer language"),
        help_line("Up/Down", "scroll the transcript"),
        help_line("Ctrl+N", "clear the chat"),
        help_line("Ctrl+E", "export the transcript"),
        help_line("Ctrl+Y", "copy the last answer"),
        help_line("Esc", "quit"),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .style(Styles::default()),
        )
        .render(rect, buf);
}

fn help_line(key: &str, what: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<8}"), Styles::key_hint()),
        Span::styled(what.to_string(), Styles::default()),
    ])
}

fn render_quit_confirm(area: Rect, buf: &mut Buffer) {
    let rect = centered_rect(40, 5, area);
    Clear.render(rect, buf);

    let lines = vec![
        Line::from(Span::styled("Quit askdesk?", Styles::default())),
        Line::default(),
        Line::from(vec![
            Span::styled("Enter", Styles::key_hint()),
            Span::styled(" quit   ", Styles::dim()),
            Span::styled("Esc", Styles::key_hint()),
            Span::styled(" stay", Styles::dim()),
        ]),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .style(Styles::default()),
        )
        .render(rect, buf);
}
