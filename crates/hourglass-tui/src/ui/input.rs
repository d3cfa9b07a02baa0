//! Keyboard input handling for the TUI.
//!
//! Keys go to the first thing that claims them: the quit, help and
//! notification overlays, then an open modal, then the current page. Nothing here waits on the
//! network; submissions are spawned and their results arrive through
//! `App::check_background_tasks`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use hourglass_core::forms::EventField;
use hourglass_core::{Location, Route};

use crate::app::{next_tab, prev_tab, App, AppState, FriendsSection, Modal, TABS};

fn ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    if matches!(app.state, AppState::ShowingNotifications) {
        handle_notifications_input(app, key);
        return false;
    }

    if app.modal.is_some() {
        handle_modal_input(app, key);
        return false;
    }

    match app.current_route() {
        Route::Login => handle_login_input(app, key),
        Route::Signup => handle_signup_input(app, key),
        Route::VerifyEmail => handle_verify_input(app, key),
        Route::Calendar | Route::Friends | Route::Invitations => handle_page_input(app, key),
    }
    false
}

// ============================================================================
// Auth pages
// ============================================================================

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::F(2) => app.switch_to(Location::new(Route::Signup)),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => app.login.toggle_focus(),
        KeyCode::Enter => app.submit_login(),
        KeyCode::Backspace => app.login.delete_char(),
        KeyCode::Char(c) => {
            app.login.insert_char(c);
        }
        _ => {}
    }
}

fn handle_signup_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.switch_to(Location::new(Route::Login)),
        KeyCode::Tab | KeyCode::Down => app.signup.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.signup.focus_prev(),
        KeyCode::Enter => app.submit_signup(),
        KeyCode::Backspace => app.signup.delete_char(),
        KeyCode::Char(c) => {
            app.signup.insert_char(c);
        }
        _ => {}
    }
}

fn handle_verify_input(app: &mut App, key: KeyEvent) {
    if ctrl(&key, 'r') {
        app.resend_otp();
        return;
    }
    match key.code {
        KeyCode::Esc => app.switch_to(Location::new(Route::Login)),
        KeyCode::Enter => app.submit_verify(),
        KeyCode::Left => app.verify.otp.left(),
        KeyCode::Right => app.verify.otp.right(),
        KeyCode::Backspace => app.verify.otp.backspace(),
        KeyCode::Char(c) => {
            app.verify.error = None;
            app.verify.otp.input(c);
        }
        _ => {}
    }
}

// ============================================================================
// Protected pages
// ============================================================================

fn handle_page_input(app: &mut App, key: KeyEvent) {
    // Text entry on the friends page swallows everything
    if app.current_route() == Route::Friends
        && (app.friends.adding.is_some() || app.friends.searching)
    {
        handle_friends_text_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return;
        }
        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            app.navigate(TABS[index]);
            return;
        }
        KeyCode::Left => {
            app.navigate(prev_tab(app.current_route()));
            return;
        }
        KeyCode::Right => {
            app.navigate(next_tab(app.current_route()));
            return;
        }
        KeyCode::Char('L') => {
            app.logout();
            return;
        }
        KeyCode::Char('N') => {
            app.open_notifications();
            return;
        }
        KeyCode::Char('r') => {
            app.reload_page();
            return;
        }
        _ => {}
    }

    match app.current_route() {
        Route::Calendar => handle_calendar_input(app, key),
        Route::Friends => handle_friends_input(app, key),
        Route::Invitations => handle_invitations_input(app, key),
        Route::Login | Route::Signup | Route::VerifyEmail => {}
    }
}

fn handle_notifications_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('N') | KeyCode::Char('q') => app.close_notifications(),
        KeyCode::Up | KeyCode::Char('k') => app.notifications.move_selection(false),
        KeyCode::Down | KeyCode::Char('j') => app.notifications.move_selection(true),
        KeyCode::Enter | KeyCode::Char('m') => app.mark_notification_read(),
        KeyCode::Char('r') => app.load_notifications(),
        _ => {}
    }
}

fn handle_calendar_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.calendar.move_selection(false),
        KeyCode::Down | KeyCode::Char('j') => app.calendar.move_selection(true),
        KeyCode::Char('[') | KeyCode::Char('p') => app.shift_month(-1),
        KeyCode::Char(']') | KeyCode::Char('n') => app.shift_month(1),
        KeyCode::Char('t') => app.go_to_today(),
        KeyCode::Char('c') => app.open_create_modal(),
        KeyCode::Char('f') => app.open_filters_modal(),
        KeyCode::Enter => app.open_edit_modal(),
        _ => {}
    }
}

fn handle_friends_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.friends.next_section(),
        KeyCode::Up | KeyCode::Char('k') => app.friends.move_selection(false),
        KeyCode::Down | KeyCode::Char('j') => app.friends.move_selection(true),
        KeyCode::Char('a') => app.friends.adding = Some(String::new()),
        KeyCode::Char('/') if app.friends.section == FriendsSection::Friends => {
            app.friends.searching = true;
        }
        KeyCode::Char('y') => app.answer_friend_request(true),
        KeyCode::Char('x') => app.answer_friend_request(false),
        KeyCode::Enter => app.load_friend_detail(),
        KeyCode::Esc => {
            app.friends.detail = None;
            app.friends.search.clear();
        }
        _ => {}
    }
}

fn handle_friends_text_input(app: &mut App, key: KeyEvent) {
    if app.friends.adding.is_some() {
        match key.code {
            KeyCode::Esc => app.friends.adding = None,
            KeyCode::Enter => app.send_friend_request(),
            KeyCode::Backspace => {
                if let Some(email) = app.friends.adding.as_mut() {
                    email.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(email) = app.friends.adding.as_mut() {
                    email.push(c);
                }
            }
            _ => {}
        }
        return;
    }

    let friends = &mut app.friends;
    match key.code {
        KeyCode::Esc => {
            friends.searching = false;
            friends.search.clear();
        }
        KeyCode::Enter => friends.searching = false,
        KeyCode::Backspace => {
            friends.search.pop();
        }
        KeyCode::Char(c) => {
            friends.search.push(c);
            friends.selection = 0;
        }
        _ => {}
    }
}

fn handle_invitations_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.invitations.toggle_section(),
        KeyCode::Up | KeyCode::Char('k') => app.invitations.move_selection(false),
        KeyCode::Down | KeyCode::Char('j') => app.invitations.move_selection(true),
        KeyCode::Char('y') => app.answer_invitation(true),
        KeyCode::Char('x') => app.answer_invitation(false),
        KeyCode::Char('d') => app.cancel_invitation(),
        _ => {}
    }
}

// ============================================================================
// Modals
// ============================================================================

fn handle_modal_input(app: &mut App, key: KeyEvent) {
    if matches!(app.modal, Some(Modal::Filters(_))) {
        handle_filters_input(app, key);
        return;
    }

    if key.code == KeyCode::Esc {
        app.close_modal();
        return;
    }
    if ctrl(&key, 's') {
        app.submit_event_modal();
        return;
    }
    if ctrl(&key, 'd') {
        app.delete_event();
        return;
    }
    if ctrl(&key, 'w') {
        app.withdraw_from_event();
        return;
    }
    if ctrl(&key, 'r') {
        app.remove_participant();
        return;
    }
    if ctrl(&key, 'p') {
        if let Some(Modal::EditEvent(edit)) = app.modal.as_mut() {
            edit.move_participant(true);
        }
        return;
    }

    // Any other key disarms a pending delete
    if let Some(Modal::EditEvent(edit)) = app.modal.as_mut() {
        edit.confirm_delete = false;
    }

    let Some(focus) = app.event_form_mut().filter(|f| !f.read_only).map(|f| f.focus) else {
        return;
    };
    if key.code == KeyCode::Enter && focus != EventField::Invites {
        app.submit_event_modal();
        return;
    }
    let Some(form) = app.event_form_mut() else {
        return;
    };

    match (key.code, focus) {
        (KeyCode::Tab, _) => form.focus_next(),
        (KeyCode::BackTab, _) => form.focus_prev(),
        (KeyCode::Left, EventField::Type) => form.cycle_type(false),
        (KeyCode::Right, EventField::Type) => form.cycle_type(true),
        (KeyCode::Up, EventField::Invites) => form.move_invite_cursor(false),
        (KeyCode::Down, EventField::Invites) => form.move_invite_cursor(true),
        (KeyCode::Enter, EventField::Invites) => {
            form.queue_selected_friend();
        }
        (KeyCode::Backspace, EventField::Invites) => {
            form.unqueue_last();
        }
        (KeyCode::Up, _) => form.focus_prev(),
        (KeyCode::Down, _) => form.focus_next(),
        (KeyCode::Backspace, _) => {
            form.delete_char();
        }
        (KeyCode::Char(c), _) => {
            form.insert_char(c);
        }
        _ => {}
    }
}

fn handle_filters_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_modal(),
        KeyCode::Enter => app.apply_filters(false),
        KeyCode::Char('c') => app.apply_filters(true),
        _ => {
            let Some(Modal::Filters(form)) = app.modal.as_mut() else {
                return;
            };
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => form.move_cursor(false),
                KeyCode::Down | KeyCode::Char('j') => form.move_cursor(true),
                KeyCode::Char(' ') => form.toggle_current(),
                _ => {}
            }
        }
    }
}
