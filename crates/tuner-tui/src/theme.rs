//! Color palette and style constants for the tuner TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_ACCENT: Color = Color::Rgb(235, 111, 80);
pub const C_PLAYING: Color = Color::Rgb(96, 192, 124);
pub const C_CONNECTING: Color = Color::Rgb(240, 180, 92);
pub const C_ERROR: Color = Color::Rgb(235, 90, 90);
pub const C_MUTED: Color = Color::Rgb(84, 84, 100);
pub const C_SECONDARY: Color = Color::Rgb(128, 128, 148);
pub const C_PRIMARY: Color = Color::Rgb(214, 214, 226);
pub const C_SELECTION_BG: Color = Color::Rgb(30, 30, 44);
pub const C_PANEL_BORDER: Color = Color::Rgb(44, 44, 58);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(110, 128, 212);
pub const C_BADGE_READY: Color = Color::Rgb(96, 192, 124);
pub const C_BADGE_PENDING: Color = Color::Rgb(240, 180, 92);
pub const C_BADGE_ERR: Color = Color::Rgb(235, 90, 90);

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_selected() -> Style {
    Style::default().bg(C_SELECTION_BG).fg(C_PRIMARY)
}

pub fn style_selected_focused() -> Style {
    Style::default()
        .bg(C_SELECTION_BG)
        .fg(C_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}
