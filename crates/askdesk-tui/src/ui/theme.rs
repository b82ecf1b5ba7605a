//! Theme and styling definitions for the askdesk TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(24, 24, 32);
    pub const FG: Color = Color::Rgb(232, 232, 232);
    pub const DIM: Color = Color::Rgb(136, 136, 152);

    // Chat bubbles
    pub const USER: Color = Color::Rgb(110, 150, 255);
    pub const BOT: Color = Color::Rgb(216, 216, 224);

    // Accent colors
    pub const ACCENT: Color = Color::Rgb(130, 170, 255);

    // Status colors
    pub const SUCCESS: Color = Color::Rgb(130, 220, 130);
    pub const WARNING: Color = Color::Rgb(240, 200, 100);
    pub const ERROR: Color = Color::Rgb(240, 100, 100);

    // Border colors
    pub const BORDER: Color = Color::Rgb(80, 80, 100);
    pub const BORDER_ACTIVE: Color = Color::Rgb(130, 170, 255);
}

/// Animation frames for the "thinking" indicator on a pending turn.
pub const TYPING_FRAMES: [&str; 4] = ["·", "··", "···", "··"];

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM)
    }

    /// User message text.
    pub fn user() -> Style {
        Style::default().fg(Palette::USER)
    }

    /// Bot message text.
    pub fn bot() -> Style {
        Style::default().fg(Palette::BOT)
    }

    /// Section or pane title.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint in the status bar.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Temporary notification message.
    pub fn notification() -> Style {
        Style::default().fg(Palette::WARNING)
    }

    /// Border of an unfocused pane.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border of the focused pane.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }
}
