use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use hourglass_core::utils::display_or;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_agenda(frame, app, chunks[0]);
    render_event_detail(frame, app, chunks[1]);
}

fn render_agenda(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.calendar;
    let user = app.current_user_id();

    let header = Row::new(vec![
        Cell::from("Day"),
        Cell::from(""),
        Cell::from("Time"),
        Cell::from("Title"),
    ])
    .style(styles::title_style())
    .height(1);

    let mut rows = Vec::new();
    for (day, events) in view.days() {
        for (position, (index, event)) in events.iter().enumerate() {
            let day_label = if position == 0 {
                day.format("%a %d").to_string()
            } else {
                String::new()
            };
            let style = if *index == view.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            rows.push(
                Row::new(vec![
                    Cell::from(day_label),
                    // Owned events carry a mark in their color swatch
                    Cell::from(Span::styled(
                        if user.is_some_and(|id| event.is_owned_by(id)) { " *" } else { "  " },
                        styles::event_style(event.color.as_deref()),
                    )),
                    Cell::from(event.formatted_time_range()),
                    Cell::from(event.display_title()),
                ])
                .style(style),
            );
        }
    }

    let widths = [
        Constraint::Length(7),
        Constraint::Length(3),
        Constraint::Length(14),
        Constraint::Fill(1),
    ];

    let status = if view.loading { " loading..." } else { "" };
    let title = format!(
        " {} ({}){} - [ ] month, [t]oday ",
        view.title(),
        view.events.len(),
        status
    );

    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.modal.is_none()));

    if rows.is_empty() && !view.loading {
        let text = Paragraph::new(Line::from(Span::styled(
            "  No events this month. Press c to create one.",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(text, area);
        return;
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(view.selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_event_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Details ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(event) = app.calendar.selected() else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let owner = match app.current_user_id() {
        Some(id) if event.is_owned_by(id) => "you",
        _ => "a friend",
    };

    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!(" {:<8}", label), styles::muted_style()),
            Span::styled(value, styles::list_item_style()),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", event.display_title()),
            styles::event_style(event.color.as_deref()),
        )),
        Line::from(""),
        row("Starts", event.formatted_start()),
        row("Ends", event.formatted_end()),
        row("Owner", owner.to_string()),
        row("Color", display_or(event.color.as_deref(), "default").to_string()),
    ];
    if let Some(notes) = event.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Notes", styles::highlight_style())));
        lines.push(Line::from(format!(" {}", notes)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Enter to open",
        styles::muted_style(),
    )));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
