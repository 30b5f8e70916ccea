//! Palette and semantic styles for the explorer.

use ratatui::style::{Color, Modifier, Style};

use kmip_explorer_core::RowStyle;

// ── Core Palette ──────────────────────────────────────────────────────

pub const ORANGE: Color = Color::Rgb(255, 165, 0); // #ffa500
pub const SKY_BLUE: Color = Color::Rgb(0, 191, 255); // #00bfff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29
pub const BG_ERROR: Color = Color::Rgb(110, 20, 20); // #6e1414

// ── Object states ─────────────────────────────────────────────────────

pub const STATE_ACTIVE: Color = Color::Rgb(65, 105, 225); // #4169e1
pub const STATE_DEACTIVATED: Color = Color::Rgb(105, 105, 105); // #696969
pub const STATE_COMPROMISED: Color = Color::Rgb(205, 92, 92); // #cd5c5c
pub const STATE_DESTROYED: Color = Color::Rgb(128, 128, 128); // #808080
pub const STATE_DESTROYED_COMPROMISED: Color = Color::Rgb(220, 20, 60); // #dc143c

// ── Semantic Styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ORANGE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_selected() -> Style {
    Style::default().bg(BG_HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Row text for an object, keyed on its lifecycle state.
pub fn row_style(style: RowStyle) -> Style {
    let base = Style::default();
    match style {
        RowStyle::Default => base.fg(DIM_WHITE),
        RowStyle::Active => base.fg(STATE_ACTIVE),
        RowStyle::Deactivated => base.fg(STATE_DEACTIVATED),
        RowStyle::Compromised => base.fg(STATE_COMPROMISED),
        RowStyle::Destroyed => base
            .fg(STATE_DESTROYED)
            .add_modifier(Modifier::CROSSED_OUT),
        RowStyle::DestroyedCompromised => base
            .fg(STATE_DESTROYED_COMPROMISED)
            .add_modifier(Modifier::CROSSED_OUT),
    }
}

pub fn tab_active() -> Style {
    Style::default().fg(ORANGE).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Banner field labels.
pub fn info_label() -> Style {
    Style::default().fg(ORANGE).add_modifier(Modifier::BOLD)
}

/// Key hint text (e.g., "q quit  / search").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(SKY_BLUE).add_modifier(Modifier::BOLD)
}

/// Attribute names in the attributes pane.
pub fn attribute_name() -> Style {
    Style::default().fg(SUCCESS_GREEN)
}

/// Structure field names inside an attribute value.
pub fn attribute_field() -> Style {
    Style::default().fg(ELECTRIC_YELLOW)
}

pub fn field_label(focused: bool) -> Style {
    if focused {
        Style::default().fg(ORANGE).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DIM_WHITE)
    }
}

pub fn field_value(focused: bool) -> Style {
    if focused {
        Style::default().fg(NEON_CYAN).bg(BG_HIGHLIGHT)
    } else {
        Style::default().fg(NEON_CYAN)
    }
}

pub fn button(focused: bool, enabled: bool) -> Style {
    match (focused, enabled) {
        (_, false) => Style::default().fg(BORDER_GRAY).add_modifier(Modifier::DIM),
        (true, true) => Style::default()
            .fg(BG_DARK)
            .bg(ORANGE)
            .add_modifier(Modifier::BOLD),
        (false, true) => Style::default().fg(DIM_WHITE).bg(BG_HIGHLIGHT),
    }
}
