//! Gatekeeping for protected pages.
//!
//! The guard runs synchronously whenever a protected location is entered. It
//! is advisory only: the backend re-validates the token on every request and a
//! token that passes here can still be rejected through the 401 path.

use chrono::Utc;
use tracing::debug;

use super::session::SessionStore;
use super::token;
use crate::nav::{Location, Navigator};

/// What the guard found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    NoToken,
    Expired,
    Valid,
}

/// What the caller should do with the attempted location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show the page
    Render,
    /// Show nothing; go here instead
    Redirect(Location),
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Classify the stored token as of `now_secs`.
    pub fn state_at(&self, now_secs: i64) -> GuardState {
        match self.session.token() {
            None => GuardState::NoToken,
            Some(t) if token::is_expired_at(&t, now_secs) => GuardState::Expired,
            Some(_) => GuardState::Valid,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state_at(Utc::now().timestamp())
    }

    /// Decide whether `attempted` may render, as of `now_secs`.
    ///
    /// An expired token is removed from storage before redirecting.
    pub fn check_at(&self, attempted: &Location, now_secs: i64) -> GuardOutcome {
        if !attempted.route.is_protected() {
            return GuardOutcome::Render;
        }
        match self.state_at(now_secs) {
            GuardState::Valid => GuardOutcome::Render,
            state => {
                if state == GuardState::Expired {
                    self.session.clear();
                }
                debug!(?state, route = %attempted.route, "Guard redirecting to login");
                GuardOutcome::Redirect(Location::login_from(attempted.clone()))
            }
        }
    }

    pub fn check(&self, attempted: &Location) -> GuardOutcome {
        self.check_at(attempted, Utc::now().timestamp())
    }

    /// Check the navigator's current location and apply any redirect in place,
    /// so the protected page never becomes the current entry.
    pub fn enforce(&self, navigator: &Navigator) -> GuardOutcome {
        let outcome = self.check(&navigator.current());
        if let GuardOutcome::Redirect(ref to) = outcome {
            navigator.replace(to.clone());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::tests::make_token;
    use crate::nav::Route;

    fn guard_with(token: Option<&str>) -> (RouteGuard, SessionStore) {
        let session = SessionStore::in_memory();
        if let Some(t) = token {
            session.store(t).unwrap();
        }
        (RouteGuard::new(session.clone()), session)
    }

    #[test]
    fn test_no_token_redirects_with_from() {
        let (guard, _) = guard_with(None);
        let attempted = Location::new(Route::Friends);
        match guard.check_at(&attempted, 100) {
            GuardOutcome::Redirect(to) => {
                assert_eq!(to.route, Route::Login);
                assert_eq!(to.from(), Some(&attempted));
            }
            GuardOutcome::Render => panic!("expected redirect"),
        }
    }

    #[test]
    fn test_expired_token_is_removed() {
        let (guard, session) = guard_with(Some(&make_token(r#"{"exp": 50}"#)));
        assert_eq!(guard.state_at(100), GuardState::Expired);

        let outcome = guard.check_at(&Location::new(Route::Calendar), 100);
        assert!(matches!(outcome, GuardOutcome::Redirect(ref l) if l.route == Route::Login));
        assert!(session.token().is_none());
    }

    #[test]
    fn test_valid_token_renders() {
        let token = make_token(r#"{"exp": 500}"#);
        let (guard, session) = guard_with(Some(&token));
        assert_eq!(
            guard.check_at(&Location::new(Route::Invitations), 100),
            GuardOutcome::Render
        );
        assert_eq!(session.token().as_deref(), Some(token.as_str()));
    }

    #[test]
    fn test_malformed_token_counts_as_expired() {
        let (guard, session) = guard_with(Some("not-a-jwt"));
        assert_eq!(guard.state_at(100), GuardState::Expired);
        guard.check_at(&Location::new(Route::Calendar), 100);
        assert!(session.token().is_none());
    }

    #[test]
    fn test_public_routes_always_render() {
        let (guard, _) = guard_with(None);
        for route in [Route::Login, Route::Signup, Route::VerifyEmail] {
            assert_eq!(guard.check_at(&Location::new(route), 100), GuardOutcome::Render);
        }
    }

    #[test]
    fn test_enforce_replaces_current_entry() {
        let (guard, _) = guard_with(None);
        let nav = Navigator::new(Location::new(Route::Login));
        nav.navigate(Route::Friends);

        let outcome = guard.enforce(&nav);
        assert!(matches!(outcome, GuardOutcome::Redirect(_)));
        let history = nav.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].route, Route::Login);
        assert_eq!(history[1].from().map(|l| l.route), Some(Route::Friends));
    }
}
