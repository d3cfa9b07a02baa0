use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use hourglass_core::forms::{otp::OTP_LENGTH, LoginFocus, SignupFocus};

use super::{error_line, field_line};
use crate::app::App;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

const FIELD_WIDTH: usize = 28;

fn form_block(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
}

fn button_line(label: &str, busy: bool) -> Line<'static> {
    let text = if busy {
        "   ...   ".to_string()
    } else {
        format!(" {} ", label)
    };
    Line::from(vec![
        Span::raw("            ["),
        Span::styled(text, styles::selected_style()),
        Span::raw("]"),
    ])
}

pub fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.login;
    let area = centered_rect_fixed(48, 11, area);
    let masked = "*".repeat(form.password.chars().count());

    let lines = vec![
        Line::from(""),
        field_line("Email", &form.email, FIELD_WIDTH, form.focus == LoginFocus::Email),
        field_line("Password", &masked, FIELD_WIDTH, form.focus == LoginFocus::Password),
        Line::from(""),
        button_line("Log in", app.submitting),
        Line::from(""),
        error_line(form.error.as_deref()),
        Line::from(vec![
            Span::styled("  No account? Press ", styles::muted_style()),
            Span::styled("F2", styles::help_key_style()),
            Span::styled(" to sign up", styles::muted_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(form_block("Log in"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

pub fn render_signup(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.signup;
    let area = centered_rect_fixed(48, 11, area);
    let masked = "*".repeat(form.password.chars().count());

    let lines = vec![
        Line::from(""),
        field_line("Name", &form.name, FIELD_WIDTH, form.focus == SignupFocus::Name),
        field_line("Email", &form.email, FIELD_WIDTH, form.focus == SignupFocus::Email),
        field_line("Password", &masked, FIELD_WIDTH, form.focus == SignupFocus::Password),
        Line::from(""),
        button_line("Create account", app.submitting),
        Line::from(""),
        error_line(form.error.as_deref()),
    ];

    let paragraph = Paragraph::new(lines)
        .block(form_block("Sign up"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

pub fn render_verify(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.verify;
    let area = centered_rect_fixed(52, 12, area);

    let mut boxes = vec![Span::raw("        ")];
    for i in 0..OTP_LENGTH {
        let digit = form.otp.digit(i).unwrap_or('_');
        boxes.push(Span::styled(
            format!(" {} ", digit),
            styles::input_style(i == form.otp.focus()),
        ));
        boxes.push(Span::raw(" "));
    }

    let email = if form.email.is_empty() {
        "your email".to_string()
    } else {
        form.email.clone()
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  Enter the code sent to {}", email),
            styles::list_item_style(),
        )),
        Line::from(""),
        Line::from(boxes),
        Line::from(""),
        button_line("Verify", app.submitting),
        Line::from(""),
    ];
    match (&form.error, &form.notice) {
        (Some(error), _) => lines.push(error_line(Some(error))),
        (None, Some(notice)) => lines.push(Line::from(Span::styled(
            format!("  {}", notice),
            styles::success_style(),
        ))),
        (None, None) => lines.push(Line::from("")),
    }
    lines.push(Line::from(Span::styled(
        "  Ctrl+R sends a new code",
        styles::muted_style(),
    )));

    let paragraph = Paragraph::new(lines)
        .block(form_block("Verify email"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
