use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use hourglass_core::models::FriendRequest;

use super::field_line;
use crate::app::{App, FriendsSection, FriendsView};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.friends;

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(columns[0]);

    render_section_bar(frame, view, left[0]);
    match view.section {
        FriendsSection::Friends => render_friend_list(frame, view, left[1]),
        FriendsSection::Received => render_requests(frame, view, &view.received, true, left[1]),
        FriendsSection::Sent => render_requests(frame, view, &view.sent, false, left[1]),
    }
    render_side_panel(frame, view, columns[1]);
}

fn render_section_bar(frame: &mut Frame, view: &FriendsView, area: Rect) {
    let sections = [
        (FriendsSection::Friends, view.friends.len()),
        (FriendsSection::Received, view.received.len()),
        (FriendsSection::Sent, view.sent.len()),
    ];
    let mut spans = vec![Span::raw(" ")];
    for (i, (section, count)) in sections.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            format!("{} ({})", section.title(), count),
            styles::tab_style(*section == view.section),
        ));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn list_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
}

fn render_friend_list(frame: &mut Frame, view: &FriendsView, area: Rect) {
    let friends = view.visible_friends();
    let header = Row::new(vec![Cell::from("Name"), Cell::from("Email")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = friends
        .iter()
        .enumerate()
        .map(|(i, friend)| {
            let style = if i == view.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(friend.friend_name.clone()),
                Cell::from(friend.friend_email.clone()),
            ])
            .style(style)
        })
        .collect();

    let title = if view.search.is_empty() {
        format!(" Friends ({}) - [/] search ", friends.len())
    } else {
        format!(" Friends ({}) - \"{}\" ", friends.len(), view.search)
    };

    let table = Table::new(rows, [Constraint::Percentage(45), Constraint::Fill(1)])
        .header(header)
        .block(list_block(title))
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(view.selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_requests(
    frame: &mut Frame,
    view: &FriendsView,
    requests: &[FriendRequest],
    received: bool,
    area: Rect,
) {
    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from(if received { "From" } else { "To" }),
        Cell::from("Status"),
        Cell::from("Sent"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = requests
        .iter()
        .enumerate()
        .map(|(i, request)| {
            let style = if i == view.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let other = if received {
                request.sender_id
            } else {
                request.receiver_id
            };
            Row::new(vec![
                Cell::from(request.request_id.to_string()),
                Cell::from(format!("User #{}", other)),
                Cell::from(request.status.to_string()),
                Cell::from(request.created_at.format("%b %d, %Y").to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(14),
    ];
    let hint = if received { " - [y] accept [x] reject" } else { "" };
    let title = format!(" {} ({}){} ", view.section.title(), requests.len(), hint);

    let table = Table::new(rows, widths)
        .header(header)
        .block(list_block(title))
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(view.selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_side_panel(frame: &mut Frame, view: &FriendsView, area: Rect) {
    let block = Block::default()
        .title(" Friend ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(view.adding.is_some() || view.searching));

    let mut lines = Vec::new();

    if let Some(email) = &view.adding {
        lines.push(Line::from(Span::styled(
            " Send a friend request",
            styles::highlight_style(),
        )));
        lines.push(Line::from(""));
        lines.push(field_line("Email", email, 24, true));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Enter to send, Esc to cancel",
            styles::muted_style(),
        )));
    } else if view.searching {
        lines.push(field_line("Search", &view.search, 24, true));
        lines.push(Line::from(Span::styled(
            " Enter to keep, Esc to clear",
            styles::muted_style(),
        )));
    } else if let Some(friend) = &view.detail {
        lines.push(Line::from(Span::styled(
            format!(" {}", friend.friend_name),
            styles::title_style(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" Email   ", styles::muted_style()),
            Span::styled(friend.friend_email.clone(), styles::list_item_style()),
        ]));
        lines.push(Line::from(vec![
            Span::styled(" User    ", styles::muted_style()),
            Span::styled(format!("#{}", friend.friend_id), styles::list_item_style()),
        ]));
    } else if let Some(friend) = view.selected_friend() {
        lines.push(Line::from(Span::styled(
            format!(" {}", friend.label()),
            styles::list_item_style(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Enter for details",
            styles::muted_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " Press a to add a friend by email",
            styles::muted_style(),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
