//! Chat transcript widget.
//!
//! Renders the session history as aligned bubbles: user messages on the
//! right, bot messages on the left. A pending bot turn renders as animated
//! typing dots driven by the tick counter, never as literal text.

use crate::ui::theme::{Styles, TYPING_FRAMES};
use askdesk_engine::{Sender, Turn};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Fraction of the pane width a bubble may occupy (percent).
const BUBBLE_WIDTH_PCT: usize = 70;

/// Transcript widget for a slice of turns.
pub struct Transcript<'a> {
    turns: &'a [Turn],
    /// Tick counter, used to animate the typing indicator.
    tick: usize,
    /// Scroll offset in lines; clamped to the content during render.
    scroll: usize,
}

impl<'a> Transcript<'a> {
    /// Create a transcript over the given turns.
    pub fn new(turns: &'a [Turn]) -> Self {
        Self {
            turns,
            tick: 0,
            scroll: 0,
        }
    }

    /// Set the animation tick.
    #[must_use]
    pub fn tick(mut self, tick: usize) -> Self {
        self.tick = tick;
        self
    }

    /// Set the scroll offset.
    #[must_use]
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Build the display lines for the given pane width.
    fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        let bubble_width = (width * BUBBLE_WIDTH_PCT / 100).max(10);
        let mut lines: Vec<Line<'static>> = Vec::new();

        for turn in self.turns {
            if !lines.is_empty() {
                lines.push(Line::default());
            }

            match (&turn.sender, turn.body.text()) {
                (Sender::User, Some(text)) => {
                    for wrapped in textwrap::wrap(text, bubble_width) {
                        lines.push(right_aligned(&wrapped, width));
                    }
                }
                (Sender::Bot, Some(text)) => {
                    for wrapped in textwrap::wrap(text, bubble_width) {
                        lines.push(Line::from(Span::styled(
                            wrapped.into_owned(),
                            Styles::bot(),
                        )));
                    }
                }
                // Pending placeholder: animated dots, left-aligned like a
                // bot message.
                (_, None) => {
                    let frame = TYPING_FRAMES[self.tick % TYPING_FRAMES.len()];
                    lines.push(Line::from(Span::styled(frame.to_string(), Styles::dim())));
                }
            }
        }

        lines
    }
}

/// Build a right-aligned line by left-padding to the pane width.
fn right_aligned(text: &str, width: usize) -> Line<'static> {
    let pad = width.saturating_sub(text.width());
    Line::from(vec![
        Span::raw(" ".repeat(pad)),
        Span::styled(text.to_string(), Styles::user()),
    ])
}

impl Widget for Transcript<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 1 || area.height < 1 {
            return;
        }

        let lines = self.build_lines(area.width as usize);
        let height = area.height as usize;

        // Clamp so scrolling past the end pins the view to the bottom.
        let max_scroll = lines.len().saturating_sub(height);
        let scroll = self.scroll.min(max_scroll);

        let visible: Vec<Line<'static>> =
            lines.into_iter().skip(scroll).take(height).collect();
        Paragraph::new(visible).render(area, buf);
    }
}
