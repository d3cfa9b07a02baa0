//! Content for each route, plus the event and filter modals.

pub mod auth;
pub mod calendar;
pub mod friends;
pub mod invitations;
pub mod modals;

use ratatui::text::{Line, Span};

use super::styles;

/// `Label: [value▌]` row used by every text form.
pub(crate) fn field_line(label: &str, value: &str, width: usize, focused: bool) -> Line<'static> {
    let cursor = if focused { "▌" } else { "" };
    let shown: String = {
        let chars: Vec<char> = value.chars().collect();
        // Keep the tail visible while typing past the box width
        let start = chars.len().saturating_sub(width);
        chars[start..].iter().collect()
    };
    Line::from(vec![
        Span::styled(format!("  {:<10}[", label), styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", shown, cursor, width = width),
            styles::input_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

/// Error line, or an empty line when there is none.
pub(crate) fn error_line(error: Option<&str>) -> Line<'static> {
    match error {
        Some(e) => Line::from(Span::styled(format!("  {}", e), styles::error_style())),
        None => Line::from(""),
    }
}
