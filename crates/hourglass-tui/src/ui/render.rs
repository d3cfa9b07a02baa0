use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use hourglass_core::Route;

use crate::app::{App, AppState, Modal, TABS};

use super::pages::{auth, calendar, friends, invitations, modals};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Overlays, modal first so help and quit draw over it
    if let Some(modal) = &app.modal {
        match modal {
            Modal::CreateEvent(form) => modals::render_event_form(frame, form, None),
            Modal::EditEvent(edit) => {
                modals::render_event_form(frame, &edit.form, Some(edit.as_ref()))
            }
            Modal::Filters(form) => modals::render_filters(frame, form),
        }
    }

    if matches!(app.state, AppState::ShowingNotifications) {
        render_notifications_overlay(frame, app);
    }

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  HourglassED";
    let page = format!(" / {}", app.current_route().title());
    let protected = app.current_route().is_protected();
    let help_hint = if protected { "[?] Help" } else { "" };
    let unread = app.notifications.unread();
    let (badge, badge_style) = match unread {
        _ if !protected => (String::new(), styles::muted_style()),
        0 => ("[N] No new notifications  ".to_string(), styles::muted_style()),
        n => (format!("[N] {} unread  ", n), styles::highlight_style()),
    };
    let used = title.len() + page.len() + badge.len() + help_hint.len() + 4;

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(page, styles::muted_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(badge, badge_style),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let route = app.current_route();
    let mut spans = vec![Span::raw(" ")];

    if route.is_protected() {
        for (i, tab) in TABS.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", styles::muted_style()));
            }
            let label = format!("[{}] {}", i + 1, tab.title());
            spans.push(Span::styled(label, styles::tab_style(*tab == route)));
        }

        if let Some(user) = app.current_user_id() {
            let right = format!("user #{}  [L]ogout ", user);
            let left: usize = spans.iter().map(|s| s.content.chars().count()).sum();
            let padding = (area.width as usize).saturating_sub(left + right.len() + 1);
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::styled(right, styles::muted_style()));
        }
    } else {
        spans.push(Span::styled(route.title(), styles::tab_style(true)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_route() {
        Route::Login => auth::render_login(frame, app, area),
        Route::Signup => auth::render_signup(frame, app, area),
        Route::VerifyEmail => auth::render_verify(frame, app, area),
        Route::Calendar => calendar::render(frame, app, area),
        Route::Friends => friends::render(frame, app, area),
        Route::Invitations => invitations::render(frame, app, area),
    }
}

fn shortcuts(app: &App) -> &'static str {
    if matches!(app.state, AppState::ShowingNotifications) {
        return "[Enter] mark read | [r] reload | [Esc] close";
    }
    if app.modal.is_some() {
        return "[Esc] close";
    }
    match app.current_route() {
        Route::Login => "[Enter] log in | [F2] sign up | [Esc] quit",
        Route::Signup => "[Enter] create account | [Esc] back to login",
        Route::VerifyEmail => "[Enter] verify | [Ctrl+R] resend | [Esc] back",
        Route::Calendar => "[c]reate | [f]ilter | [[ ]] month | [q]uit",
        Route::Friends => "[a]dd | [y]es/[x] no | [Tab] list | [q]uit",
        Route::Invitations => "[y]es/[x] no | [d] cancel | [Tab] list | [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (left_text, left_style) = match &app.toast {
        Some(toast) if toast.is_error => (format!(" {} ", toast.message), styles::error_style()),
        Some(toast) => (format!(" {} ", toast.message), styles::success_style()),
        None if app.submitting => (" Working...".to_string(), styles::muted_style()),
        None if app.current_route() == Route::Calendar && app.calendar.filters.is_active() => (
            format!(" Filters: {} ", app.calendar.filters.summary()),
            styles::highlight_style(),
        ),
        None => (String::new(), styles::muted_style()),
    };
    let right_text = format!(" {} ", shortcuts(app));

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc.to_string(), styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(56, 32, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("   HourglassED", styles::title_style())),
        Line::from(Span::styled(
            format!("   version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-3", "Calendar / Friends / Invitations"),
        help_line("←/→", "Previous/next page"),
        help_line("↑/↓", "Move selection"),
        help_line("r", "Reload page"),
        help_line("N", "Notifications"),
        help_line("L", "Log out"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Calendar", styles::highlight_style())),
        help_line("[ / ]", "Previous/next month"),
        help_line("t", "Jump to this month"),
        help_line("c", "Create event"),
        help_line("Enter", "Open selected event"),
        help_line("f", "Filters"),
        Line::from(""),
        Line::from(Span::styled(" Event form", styles::highlight_style())),
        help_line("Tab", "Next field (←/→ changes type)"),
        help_line("Ctrl+S", "Save"),
        help_line("Ctrl+D", "Delete (press twice)"),
        help_line("Ctrl+P/R", "Pick / remove participant"),
        help_line("Ctrl+W", "Withdraw from event"),
        Line::from(""),
        Line::from(Span::styled(" Friends and invitations", styles::highlight_style())),
        help_line("a", "Send friend request"),
        help_line("y / x", "Accept / reject"),
        help_line("d", "Cancel a sent invitation"),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_notifications_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(72, 18, frame.area());
    frame.render_widget(Clear, area);

    let view = &app.notifications;
    let status = if view.loading { " loading..." } else { "" };
    let title = format!(" Notifications ({} unread){} ", view.unread(), status);
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if view.items.is_empty() {
        let text = if view.loading { "" } else { "  You have no notifications." };
        let paragraph = Paragraph::new(Line::from(Span::styled(text, styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let message_width = (area.width as usize).saturating_sub(22);
    let rows: Vec<Row> = view
        .items
        .iter()
        .map(|n| {
            let style = if n.is_read {
                styles::muted_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(if n.is_read { " " } else { "*" }),
                Cell::from(n.formatted_created_at()),
                Cell::from(n.short_message(message_width)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Length(12),
        Constraint::Fill(1),
    ];
    let table = Table::new(rows, widths)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(view.selection));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(42, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect_fixed(40, 10, outer);
        assert_eq!(inner, Rect::new(30, 15, 40, 10));

        // Larger than the screen clamps to it
        let small = Rect::new(0, 0, 20, 5);
        let clamped = centered_rect_fixed(40, 10, small);
        assert_eq!(clamped.width, 20);
        assert_eq!(clamped.height, 5);
    }
}
