use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use hourglass_core::models::InvitationStatus;

use crate::app::{App, InvitationsSection};
use crate::ui::styles;

fn status_style(status: InvitationStatus) -> ratatui::style::Style {
    match status {
        InvitationStatus::Accepted => styles::success_style(),
        InvitationStatus::Rejected => styles::error_style(),
        InvitationStatus::Pending => styles::highlight_style(),
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.invitations;
    let received = view.section == InvitationsSection::Received;

    let header = Row::new(vec![
        Cell::from("Event"),
        Cell::from("When"),
        Cell::from(if received { "Status" } else { "Invitee" }),
        Cell::from(if received { "" } else { "Status" }),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = view
        .current()
        .iter()
        .enumerate()
        .map(|(i, invitation)| {
            let style = if i == view.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let when = invitation
                .event
                .as_ref()
                .map(|e| e.formatted_start())
                .unwrap_or_else(|| "-".to_string());
            let status = Span::styled(
                invitation.status.to_string(),
                status_style(invitation.status),
            );
            let cells = if received {
                vec![
                    Cell::from(invitation.event_label()),
                    Cell::from(when),
                    Cell::from(status),
                    Cell::from(""),
                ]
            } else {
                vec![
                    Cell::from(invitation.event_label()),
                    Cell::from(when),
                    Cell::from(invitation.invitee_label()),
                    Cell::from(status),
                ]
            };
            Row::new(cells).style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(35),
        Constraint::Length(24),
        Constraint::Fill(1),
        Constraint::Length(10),
    ];

    let (name, hint) = if received {
        ("Received", "[y] accept [x] reject")
    } else {
        ("Sent", "[d] cancel pending")
    };
    let title = format!(
        " Invitations: {} ({}) - {} - [Tab] {} ",
        name,
        view.current().len(),
        hint,
        if received { "sent" } else { "received" }
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(view.selection));
    frame.render_stateful_widget(table, area, &mut state);
}
