use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use hourglass_core::forms::{EventField, EventForm, FiltersForm};

use super::{error_line, field_line};
use crate::app::EditModal;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

const FIELD_WIDTH: usize = 32;

fn modal_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
}

fn field_value(form: &EventForm, field: EventField) -> String {
    match field {
        EventField::Type => {
            let name = form.type_name();
            if form.type_choice == hourglass_core::forms::TypeChoice::Custom {
                "< new type >".to_string()
            } else if name.is_empty() {
                "loading...".to_string()
            } else {
                format!("< {} >", name)
            }
        }
        EventField::CustomType => form.custom_type.clone(),
        EventField::Header => form.header.clone(),
        EventField::Title => form.title.clone(),
        EventField::Start => form.start.clone(),
        EventField::End => form.end.clone(),
        EventField::Color => form.color.clone(),
        EventField::Notes => form.notes.clone(),
        EventField::Invites => format!("{} queued", form.invites.len()),
    }
}

/// Create or edit modal. `edit` carries the participants panel.
pub fn render_event_form(frame: &mut Frame, form: &EventForm, edit: Option<&EditModal>) {
    let width = if edit.is_some() { 84 } else { 60 };
    let area = centered_rect_fixed(width, 24, frame.area());
    frame.render_widget(Clear, area);

    let title = match (form.is_editing(), form.read_only) {
        (true, true) => " Event (view only) ".to_string(),
        (true, false) => " Edit event - Ctrl+S save, Ctrl+D delete ".to_string(),
        (false, _) => " New event - Ctrl+S save ".to_string(),
    };
    let block = modal_block(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = if edit.is_some() {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(56), Constraint::Fill(1)])
            .split(inner)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1)])
            .split(inner)
    };

    render_fields(frame, form, columns[0]);
    if let Some(edit) = edit {
        render_participants(frame, edit, columns[1]);
    }
}

fn render_fields(frame: &mut Frame, form: &EventForm, area: Rect) {
    let mut lines = vec![Line::from("")];
    for field in form.visible_fields() {
        let focused = field == form.focus && !form.read_only;
        if field == EventField::Invites {
            lines.extend(invite_lines(form, focused));
            continue;
        }
        lines.push(field_line(
            field.label(),
            &field_value(form, field),
            FIELD_WIDTH,
            focused,
        ));
    }

    if form.focus == EventField::Start || form.focus == EventField::End {
        lines.push(Line::from(Span::styled(
            "  Format: YYYY-MM-DDTHH:MM (local time)",
            styles::muted_style(),
        )));
    }

    if !form.color.trim().is_empty() {
        lines.push(Line::from(vec![
            Span::styled("  Preview   ", styles::muted_style()),
            Span::styled(
                format!(" {} ", form.title.trim()),
                styles::event_style(Some(form.color.trim())),
            ),
        ]));
    }

    lines.push(Line::from(""));
    if form.submitting {
        lines.push(Line::from(Span::styled("  Saving...", styles::muted_style())));
    } else {
        lines.push(error_line(form.error.as_deref()));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn invite_lines(form: &EventForm, focused: bool) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("  {:<10}", EventField::Invites.label()),
        styles::muted_style(),
    ))];

    let available = form.available_friends();
    if available.is_empty() && form.invites.is_empty() {
        lines.push(Line::from(Span::styled(
            "    no friends to invite",
            styles::muted_style(),
        )));
    }
    for (i, friend) in available.iter().enumerate().take(4) {
        let style = if focused && i == form.invite_cursor {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(Span::styled(format!("    + {}", friend.label()), style)));
    }
    for friend in form.invites.queued() {
        lines.push(Line::from(Span::styled(
            format!("    ✓ {}", friend.label()),
            styles::success_style(),
        )));
    }
    lines
}

fn render_participants(frame: &mut Frame, edit: &EditModal, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" Participants ({})", edit.participants.len()),
            styles::highlight_style(),
        )),
    ];
    for (i, participant) in edit.participants.iter().enumerate() {
        let style = if i == edit.participant_selection {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", participant.user_name),
            style,
        )));
        lines.push(Line::from(Span::styled(
            format!("   {}", participant.user_email),
            styles::muted_style(),
        )));
    }
    lines.push(Line::from(""));
    let hint = if edit.form.read_only {
        " Ctrl+W withdraw"
    } else {
        " Ctrl+P pick, Ctrl+R remove"
    };
    lines.push(Line::from(Span::styled(hint, styles::muted_style())));

    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_filters(frame: &mut Frame, form: &FiltersForm) {
    let height = (form.row_count() as u16 + 8).min(24);
    let area = centered_rect_fixed(44, height, frame.area());
    frame.render_widget(Clear, area);

    let check = |on: bool| if on { "[x]" } else { "[ ]" };
    let row_style = |row: usize| {
        if row == form.cursor {
            styles::selected_style()
        } else {
            styles::list_item_style()
        }
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {} Only my events", check(form.owned_only)),
            row_style(0),
        )),
        Line::from(""),
        Line::from(Span::styled("  Event types", styles::highlight_style())),
    ];
    if form.classes.is_empty() {
        lines.push(Line::from(Span::styled("    loading...", styles::muted_style())));
    }
    for (i, class) in form.classes.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("  {} {}", check(form.is_selected(class.class_id)), class.class_name),
            row_style(i + 1),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Space toggle, Enter apply, c clear",
        styles::muted_style(),
    )));

    let paragraph = Paragraph::new(lines).block(modal_block(" Filters ".to_string()));
    frame.render_widget(paragraph, area);
}
