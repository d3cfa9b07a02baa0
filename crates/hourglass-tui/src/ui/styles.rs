use ratatui::style::{Color, Modifier, Style};

use hourglass_core::utils::color::parse_hex;

// Color palette
pub const BROWN: Color = Color::Rgb(0x63, 0x3D, 0x00);
pub const CREAM: Color = Color::Rgb(0xFA, 0xF0, 0xDC);
pub const IVORY: Color = Color::Rgb(0xFF, 0xF8, 0xEB);
pub const GOLD: Color = Color::Rgb(0xFF, 0xD7, 0x00);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const SUCCESS: Color = Color::Rgb(96, 160, 96);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(72, 52, 24);

/// Terminal color for a `#RRGGBB` string; unparseable input falls back to `fallback`.
pub fn hex_color(hex: &str, fallback: Color) -> Color {
    match parse_hex(hex) {
        Some(rgb) => Color::Rgb(rgb.r, rgb.g, rgb.b),
        None => fallback,
    }
}

pub fn title_style() -> Style {
    Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(IVORY)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(GOLD)
}

pub fn success_style() -> Style {
    Style::default().fg(SUCCESS)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(GOLD)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(GOLD)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn input_style(focused: bool) -> Style {
    if focused {
        selected_style().fg(CREAM)
    } else {
        list_item_style()
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(BROWN).fg(CREAM)
}

pub fn help_key_style() -> Style {
    Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(IVORY)
}

/// Event block colors: background from the event, readable text on top.
pub fn event_style(color: Option<&str>) -> Style {
    let (background, _) = hourglass_core::utils::event_palette(color);
    let text = hourglass_core::utils::contrast_text(&background);
    Style::default()
        .bg(hex_color(&background, GOLD))
        .fg(hex_color(text, BROWN))
}
