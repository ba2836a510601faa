//! src/view/theme.rs
//! ============================================================================
//! # Catppuccin Mocha colours
//!
//! One fixed palette for every pane. Colours from
//! https://github.com/catppuccin/catppuccin

use ratatui::style::{Color, Modifier, Style};
use tracing::{debug, instrument};

use crate::model::{entry::EntryKind, ui_state::NotificationLevel};

#[instrument(level = "debug")]
pub fn init_theme() {
    debug!(background = ?BACKGROUND, foreground = ?FOREGROUND, "Theme initialized");
}

pub const BACKGROUND: Color = Color::Rgb(30, 30, 46); // Base
pub const CURRENT_LINE: Color = Color::Rgb(69, 71, 90); // Surface1
pub const HOVER_LINE: Color = Color::Rgb(49, 50, 68); // Surface0
pub const FOREGROUND: Color = Color::Rgb(205, 214, 244); // Text
pub const COMMENT: Color = Color::Rgb(127, 132, 156); // Overlay1
pub const CYAN: Color = Color::Rgb(137, 220, 235); // Sky
pub const GREEN: Color = Color::Rgb(166, 227, 161); // Green
pub const ORANGE: Color = Color::Rgb(250, 179, 135); // Peach
pub const PINK: Color = Color::Rgb(245, 194, 231); // Pink
pub const PURPLE: Color = Color::Rgb(203, 166, 247); // Mauve
pub const RED: Color = Color::Rgb(243, 139, 168); // Red
pub const YELLOW: Color = Color::Rgb(249, 226, 175); // Yellow

pub fn pane_style() -> Style {
    Style::default().bg(BACKGROUND).fg(FOREGROUND)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PURPLE)
    } else {
        Style::default().fg(COMMENT)
    }
}

pub fn title_style() -> Style {
    Style::default().fg(PURPLE).add_modifier(Modifier::BOLD)
}

pub fn kind_style(kind: EntryKind) -> Style {
    match kind {
        EntryKind::Group => Style::default().fg(CYAN),
        EntryKind::Dataset => Style::default().fg(GREEN),
    }
}

pub fn unavailable_style() -> Style {
    Style::default().fg(RED).add_modifier(Modifier::DIM)
}

pub fn highlight_style() -> Style {
    Style::default().bg(CURRENT_LINE).add_modifier(Modifier::BOLD)
}

pub fn hover_style() -> Style {
    Style::default().bg(HOVER_LINE)
}

pub fn match_style() -> Style {
    Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)
}

pub fn hint_style() -> Style {
    Style::default().fg(COMMENT)
}

pub fn notification_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Info => CYAN,
        NotificationLevel::Warning => YELLOW,
        NotificationLevel::Error => RED,
    }
}
