//! Client-side navigation.
//!
//! The `Navigator` holds the current location and the history of locations
//! visited, much like a browser's history stack. It is shared between the UI
//! and the HTTP wrapper so that a 401 seen by any request can send the user
//! back to the login page.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

/// A page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    VerifyEmail,
    Calendar,
    Friends,
    Invitations,
}

impl Route {
    /// The path this route is served under.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::VerifyEmail => "/verify-email",
            Route::Calendar => "/",
            Route::Friends => "/friends",
            Route::Invitations => "/invitations",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path {
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            "/verify-email" => Some(Route::VerifyEmail),
            "/" | "" => Some(Route::Calendar),
            "/friends" => Some(Route::Friends),
            "/invitations" => Some(Route::Invitations),
            _ => None,
        }
    }

    /// Whether the route sits behind the route guard.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Calendar | Route::Friends | Route::Invitations)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Signup => "Sign up",
            Route::VerifyEmail => "OTP Verification",
            Route::Calendar => "Calendar",
            Route::Friends => "Friends",
            Route::Invitations => "Invitations",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// State carried along with a navigation.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    None,
    /// The location the user tried to reach before being sent to login
    From(Box<Location>),
    /// Credentials carried from sign-up into email verification
    Signup { email: String, password: String },
}

impl fmt::Debug for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavState::None => f.write_str("None"),
            NavState::From(from) => f.debug_tuple("From").field(from).finish(),
            NavState::Signup { email, .. } => f
                .debug_struct("Signup")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub route: Route,
    pub state: NavState,
}

impl Location {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            state: NavState::None,
        }
    }

    /// The login page, remembering where the user was headed.
    pub fn login_from(attempted: Location) -> Self {
        Self {
            route: Route::Login,
            state: NavState::From(Box::new(attempted)),
        }
    }

    pub fn with_state(route: Route, state: NavState) -> Self {
        Self { route, state }
    }

    /// The remembered destination, if this location carries one.
    pub fn from(&self) -> Option<&Location> {
        match &self.state {
            NavState::From(from) => Some(from),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct History {
    entries: Vec<Location>,
    /// Bumped on every navigation so observers can detect changes cheaply
    version: u64,
}

/// Shared navigation state. Clone is cheap and clones share the same history.
#[derive(Debug, Clone)]
pub struct Navigator {
    inner: Arc<Mutex<History>>,
}

impl Navigator {
    pub fn new(initial: Location) -> Self {
        Self {
            inner: Arc::new(Mutex::new(History {
                entries: vec![initial],
                version: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current(&self) -> Location {
        let history = self.lock();
        history
            .entries
            .last()
            .cloned()
            .unwrap_or_else(|| Location::new(Route::Login))
    }

    pub fn current_route(&self) -> Route {
        self.current().route
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Navigate to a new location, adding a history entry.
    pub fn push(&self, location: Location) {
        let mut history = self.lock();
        history.entries.push(location);
        history.version += 1;
    }

    /// Navigate to a new location, replacing the current history entry.
    pub fn replace(&self, location: Location) {
        let mut history = self.lock();
        history.entries.pop();
        history.entries.push(location);
        history.version += 1;
    }

    pub fn navigate(&self, route: Route) {
        self.push(Location::new(route));
    }

    /// Go back one entry. Returns false when there is nothing to go back to.
    pub fn back(&self) -> bool {
        let mut history = self.lock();
        if history.entries.len() <= 1 {
            return false;
        }
        history.entries.pop();
        history.version += 1;
        true
    }

    /// Send the user to the login page unless they are already there.
    ///
    /// The check and the navigation happen under one lock, so concurrent
    /// callers produce a single login entry. Returns whether a navigation
    /// took place.
    pub fn force_login(&self) -> bool {
        let mut history = self.lock();
        let on_login = history
            .entries
            .last()
            .map(|l| l.route == Route::Login)
            .unwrap_or(false);
        if on_login {
            return false;
        }
        info!("Session rejected by server, returning to login");
        history.entries.push(Location::new(Route::Login));
        history.version += 1;
        true
    }

    /// Snapshot of the history stack, oldest first.
    pub fn history(&self) -> Vec<Location> {
        self.lock().entries.clone()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Location::new(Route::Calendar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths_round_trip() {
        for route in [
            Route::Login,
            Route::Signup,
            Route::VerifyEmail,
            Route::Calendar,
            Route::Friends,
            Route::Invitations,
        ] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/login?next=/friends"), Some(Route::Login));
        assert_eq!(Route::from_path("/nowhere"), None);
    }

    #[test]
    fn test_protected_routes() {
        assert!(Route::Calendar.is_protected());
        assert!(Route::Friends.is_protected());
        assert!(Route::Invitations.is_protected());
        assert!(!Route::Login.is_protected());
        assert!(!Route::Signup.is_protected());
        assert!(!Route::VerifyEmail.is_protected());
    }

    #[test]
    fn test_push_replace_back() {
        let nav = Navigator::new(Location::new(Route::Login));
        nav.navigate(Route::Calendar);
        nav.replace(Location::new(Route::Friends));
        assert_eq!(nav.current_route(), Route::Friends);
        assert_eq!(nav.history().len(), 2);
        assert_eq!(nav.version(), 2);

        assert!(nav.back());
        assert_eq!(nav.current_route(), Route::Login);
        assert!(!nav.back());
    }

    #[test]
    fn test_force_login_only_once() {
        let nav = Navigator::new(Location::new(Route::Calendar));
        assert!(nav.force_login());
        assert!(!nav.force_login());
        let logins = nav
            .history()
            .iter()
            .filter(|l| l.route == Route::Login)
            .count();
        assert_eq!(logins, 1);
    }

    #[test]
    fn test_login_from_keeps_attempted_location() {
        let login = Location::login_from(Location::new(Route::Invitations));
        assert_eq!(login.route, Route::Login);
        assert_eq!(login.from().map(|l| l.route), Some(Route::Invitations));
        assert!(Location::new(Route::Login).from().is_none());
    }

    #[test]
    fn test_signup_state_debug_redacts_password() {
        let state = NavState::Signup {
            email: "ana@uni.edu".to_string(),
            password: "hunter2".to_string(),
        };
        let printed = format!("{:?}", state);
        assert!(printed.contains("ana@uni.edu"));
        assert!(!printed.contains("hunter2"));
    }
}
