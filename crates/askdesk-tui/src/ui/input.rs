//! Single-line chat input widget.

use crate::ui::theme::{Palette, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Placeholder text for the input line.
///
/// While an answer is pending the input is disabled, and the placeholder
/// says so instead of inviting a question.
pub fn input_placeholder(pending: bool) -> &'static str {
    if pending {
        "Waiting for the answer..."
    } else {
        "Ask me anything..."
    }
}

/// Editing state for the chat input line.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    content: String,
    /// Cursor position as a character index.
    cursor: usize,
}

impl InputState {
    /// Create an empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the input is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Clear content and reset the cursor.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Take the content for submission, leaving the input empty.
    pub fn submit(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, ch: char) {
        let byte_idx = self.byte_index(self.cursor);
        self.content.insert(byte_idx, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.byte_index(self.cursor);
            self.content.remove(byte_idx);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.content.chars().count() {
            let byte_idx = self.byte_index(self.cursor);
            self.content.remove(byte_idx);
        }
    }

    /// Move the cursor one character left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor one character right.
    pub fn move_right(&mut self) {
        if self.cursor < self.content.chars().count() {
            self.cursor += 1;
        }
    }

    /// Move the cursor to the start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor to the end.
    pub fn move_end(&mut self) {
        self.cursor = self.content.chars().count();
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map_or(self.content.len(), |(i, _)| i)
    }
}

/// Widget rendering the input line with a prompt and cursor.
pub struct InputLine<'a> {
    state: &'a InputState,
    /// Whether an answer is pending (input disabled).
    pending: bool,
    block: Option<Block<'a>>,
}

impl<'a> InputLine<'a> {
    /// Create an input line for the given state.
    pub fn new(state: &'a InputState) -> Self {
        Self {
            state,
            pending: false,
            block: None,
        }
    }

    /// Set the pending flag (changes placeholder, dims the prompt).
    #[must_use]
    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }

    /// Set the surrounding block.
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for InputLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.height < 1 || inner.width < 3 {
            return;
        }

        let prompt_style = if self.pending {
            Styles::dim()
        } else {
            Style::default().fg(Palette::ACCENT)
        };
        let mut spans = vec![Span::styled("> ", prompt_style)];

        if self.state.is_empty() {
            spans.push(Span::styled(input_placeholder(self.pending), Styles::dim()));
        } else {
            // Keep the cursor visible by trimming from the left when the
            // content is wider than the line.
            let budget = (inner.width as usize).saturating_sub(3).max(1);
            let mut visible = self.state.content();
            while visible.width() > budget {
                let mut chars = visible.chars();
                chars.next();
                visible = chars.as_str();
            }

            spans.push(Span::styled(
                visible.to_string(),
                Style::default().fg(Palette::FG),
            ));
            if !self.pending {
                spans.push(Span::styled("_", Style::default().fg(Palette::FG)));
            }
        }

        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_insert_and_submit() {
        let mut state = InputState::new();
        for ch in "fees?".chars() {
            state.insert(ch);
        }
        assert_eq!(state.content(), "fees?");

        let taken = state.submit();
        assert_eq!(taken, "fees?");
        assert!(state.is_empty());
    }

    #[test]
    fn test_cursor_editing() {
        let mut state = InputState::new();
        for ch in "abc".chars() {
            state.insert(ch);
        }
        state.move_left();
        state.backspace();
        assert_eq!(state.content(), "ac");

        state.move_home();
        state.delete();
        assert_eq!(state.content(), "c");

        state.move_end();
        state.insert('!');
        assert_eq!(state.content(), "c!");
    }

    #[test]
    fn test_multibyte_input() {
        let mut state = InputState::new();
        for ch in "où ?".chars() {
            state.insert(ch);
        }
        assert_eq!(state.content(), "où ?");
        state.backspace();
        state.backspace();
        assert_eq!(state.content(), "où");
    }

    #[test]
    fn test_placeholder_text() {
        assert_eq!(input_placeholder(false), "Ask me anything...");
        assert_eq!(input_placeholder(true), "Waiting for the answer...");
    }

    #[test]
    fn test_render_placeholder_when_empty() {
        let state = InputState::new();
        let backend = TestBackend::new(40, 3);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                frame.render_widget(InputLine::new(&state), frame.area());
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("Ask me anything"));
    }
}
