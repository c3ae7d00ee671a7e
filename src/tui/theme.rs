//! Console Theme - Visual Design System
//!
//! Violet/amber palette. Elements carry [`LabelStyle`] tags; this is the only
//! place those tags become terminal colours.

use ratatui::style::{Color, Modifier, Style};

use crate::element::{LabelStyle, DEFAULT_FRAMES};
use crate::node::ConfirmationStatus;

/// Console color palette
pub struct ConsoleTheme {
    // Primary palette
    pub space_violet: Color,
    pub amber_gold: Color,
    pub cyan_teal: Color,
    pub star_white: Color,

    // Status colors
    pub success_green: Color,
    pub warning_orange: Color,
    pub error_red: Color,
}

impl Default for ConsoleTheme {
    fn default() -> Self {
        Self {
            space_violet: Color::Rgb(138, 43, 226), // #8A2BE2
            amber_gold: Color::Rgb(255, 191, 0),    // #FFBF00
            cyan_teal: Color::Rgb(0, 255, 255),     // #00FFFF
            star_white: Color::Rgb(230, 237, 243),  // #E6EDF3

            success_green: Color::Rgb(63, 185, 80), // #3FB950
            warning_orange: Color::Rgb(210, 153, 34), // #D29922
            error_red: Color::Rgb(248, 81, 73),     // #F85149
        }
    }
}

impl ConsoleTheme {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Styles
    // ─────────────────────────────────────────────────────────────────────

    pub fn text(&self) -> Style {
        Style::default().fg(self.star_white)
    }

    pub fn dimmed(&self) -> Style {
        Style::default().fg(Color::Rgb(128, 128, 128))
    }

    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.space_violet)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.amber_gold)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.cyan_teal)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success_green)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning_orange)
    }

    pub fn error(&self) -> Style {
        Style::default()
            .fg(self.error_red)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for a row or field that currently holds focus
    pub fn focused(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.cyan_teal)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.highlight()
        } else {
            self.dimmed()
        }
    }

    /// Map an element style tag to a terminal style
    pub fn label(&self, style: LabelStyle) -> Style {
        match style {
            LabelStyle::Normal => self.text(),
            LabelStyle::Ok => self.accent(),
            LabelStyle::Warn => self.warning(),
            LabelStyle::Succ => self.success(),
            LabelStyle::Error => self.error(),
            LabelStyle::Bold => self.text().add_modifier(Modifier::BOLD),
            LabelStyle::Highlight => self.highlight(),
            LabelStyle::Title => self.header(),
        }
    }

    /// Marker shown in the worker table's status column
    pub fn confirmation(&self, status: ConfirmationStatus, frame: usize) -> (&'static str, Style) {
        match status {
            ConfirmationStatus::Unconfirmed => (icons::UNCONFIRMED, self.warning()),
            ConfirmationStatus::InProgress => {
                (DEFAULT_FRAMES[frame % DEFAULT_FRAMES.len()], self.accent())
            }
            ConfirmationStatus::Confirmed => (icons::CONFIRMED, self.success()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Icons and Symbols
// ─────────────────────────────────────────────────────────────────────────────

pub mod icons {
    pub const CONFIRMED: &str = "✓";
    pub const UNCONFIRMED: &str = "✖";
    pub const CURSOR: &str = "▸";
    pub const NODE: &str = "▣";
    pub const ACCOUNT: &str = "◉";
}
