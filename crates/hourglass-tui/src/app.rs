//! Application state management for the Hourglass terminal client.
//!
//! `App` owns all UI state and is only touched by the draw/input loop.
//! Network work runs on spawned tasks through `spawn_load`; results come back
//! over one channel as `BgResult`s and are drained once per tick by
//! `check_background_tasks`.
//!
//! Loads belong to one of four groups:
//! - `page_loads`: cancelled whenever the route changes
//! - `modal_loads`: cancelled when the modal closes
//! - `notification_loads`: the unread badge, cancelled on logout
//! - `actions`: user-initiated writes, left to finish on their own

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveDate, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use hourglass_core::forms::{
    Created, EventFilters, EventForm, EventOptions, FiltersForm, LoginForm, SignupForm,
    SubmitError, Verified, VerifyForm,
};
use hourglass_core::models::{
    unread_count, Event, EventClass, EventQuery, Friend, FriendRequest, Invitation,
    InvitationStatus, Notification, Participant, SentInvitationsQuery, TokenWithUser,
};
use hourglass_core::task::{spawn_load, LoadGroup, Loaded};
use hourglass_core::utils::datetime::{local_year_month, month_bounds, shift_month};
use hourglass_core::utils::format::contains_ignore_case;
use hourglass_core::{
    ApiClient, ApiError, Config, GuardOutcome, Location, Navigator, Route, RouteGuard,
    SessionStore,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background result channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// How long a toast stays in the status bar.
const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Pages reachable from the tab bar, in display order.
pub const TABS: [Route; 3] = [Route::Calendar, Route::Friends, Route::Invitations];

/// The tab after `route`, wrapping around.
pub fn next_tab(route: Route) -> Route {
    let index = TABS.iter().position(|r| *r == route).unwrap_or(0);
    TABS[(index + 1) % TABS.len()]
}

/// The tab before `route`, wrapping around.
pub fn prev_tab(route: Route) -> Route {
    let index = TABS.iter().position(|r| *r == route).unwrap_or(0);
    TABS[(index + TABS.len() - 1) % TABS.len()]
}

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ShowingNotifications,
    ConfirmingQuit,
    Quitting,
}

/// Short-lived message in the status bar.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub is_error: bool,
    shown_at: Instant,
}

impl Toast {
    fn new(message: impl Into<String>, is_error: bool) -> Self {
        Self {
            message: message.into(),
            is_error,
            shown_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_DURATION
    }
}

/// Month agenda state.
#[derive(Debug, Clone)]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    pub events: Vec<Event>,
    pub selection: usize,
    pub filters: EventFilters,
    pub loading: bool,
}

impl CalendarView {
    pub fn new(now: DateTime<Utc>) -> Self {
        let (year, month) = local_year_month(now);
        Self {
            year,
            month,
            events: Vec::new(),
            selection: 0,
            filters: EventFilters::default(),
            loading: false,
        }
    }

    pub fn shift(&mut self, delta: i32) {
        let (year, month) = shift_month(self.year, self.month, delta);
        self.year = year;
        self.month = month;
        self.selection = 0;
    }

    pub fn go_to(&mut self, now: DateTime<Utc>) {
        let (year, month) = local_year_month(now);
        self.year = year;
        self.month = month;
        self.selection = 0;
    }

    /// "October 2025"
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    /// Query for the visible month with the server-side part of the filters.
    pub fn query(&self) -> Option<EventQuery> {
        let (start, end) = month_bounds(self.year, self.month)?;
        let mut query = EventQuery::between(start, end);
        self.filters.apply_to_query(&mut query);
        Some(query)
    }

    pub fn set_events(&mut self, mut events: Vec<Event>) {
        self.filters.retain_matching(&mut events);
        events.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.event_id.cmp(&b.event_id)));
        self.events = events;
        self.selection = self.selection.min(self.events.len().saturating_sub(1));
        self.loading = false;
    }

    pub fn selected(&self) -> Option<&Event> {
        self.events.get(self.selection)
    }

    pub fn move_selection(&mut self, forward: bool) {
        self.selection = step(self.selection, self.events.len(), forward);
    }

    /// Events grouped by local start day, in order. Each event keeps its
    /// index into `events` so the renderer can mark the selection.
    pub fn days(&self) -> Vec<(NaiveDate, Vec<(usize, &Event)>)> {
        let mut days: Vec<(NaiveDate, Vec<(usize, &Event)>)> = Vec::new();
        for (index, event) in self.events.iter().enumerate() {
            let day = event.start_time.with_timezone(&Local).date_naive();
            match days.last_mut() {
                Some((d, list)) if *d == day => list.push((index, event)),
                _ => days.push((day, vec![(index, event)])),
            }
        }
        days
    }
}

/// Lists on the friends page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendsSection {
    Friends,
    Received,
    Sent,
}

impl FriendsSection {
    pub fn next(&self) -> Self {
        match self {
            FriendsSection::Friends => FriendsSection::Received,
            FriendsSection::Received => FriendsSection::Sent,
            FriendsSection::Sent => FriendsSection::Friends,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FriendsSection::Friends => "Friends",
            FriendsSection::Received => "Requests received",
            FriendsSection::Sent => "Requests sent",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FriendsView {
    pub friends: Vec<Friend>,
    pub received: Vec<FriendRequest>,
    pub sent: Vec<FriendRequest>,
    pub section: FriendsSection,
    pub selection: usize,
    pub detail: Option<Friend>,
    /// Email being typed for a new friend request
    pub adding: Option<String>,
    pub search: String,
    /// Keystrokes go to `search`
    pub searching: bool,
}

impl Default for FriendsView {
    fn default() -> Self {
        Self {
            friends: Vec::new(),
            received: Vec::new(),
            sent: Vec::new(),
            section: FriendsSection::Friends,
            selection: 0,
            detail: None,
            adding: None,
            search: String::new(),
            searching: false,
        }
    }
}

impl FriendsView {
    /// Friends matching the search text.
    pub fn visible_friends(&self) -> Vec<&Friend> {
        self.friends
            .iter()
            .filter(|f| {
                self.search.is_empty()
                    || contains_ignore_case(&f.friend_name, &self.search)
                    || contains_ignore_case(&f.friend_email, &self.search)
            })
            .collect()
    }

    pub fn section_len(&self) -> usize {
        match self.section {
            FriendsSection::Friends => self.visible_friends().len(),
            FriendsSection::Received => self.received.len(),
            FriendsSection::Sent => self.sent.len(),
        }
    }

    pub fn next_section(&mut self) {
        self.section = self.section.next();
        self.selection = 0;
        self.detail = None;
    }

    pub fn move_selection(&mut self, forward: bool) {
        self.selection = step(self.selection, self.section_len(), forward);
        self.detail = None;
    }

    pub fn selected_friend(&self) -> Option<&Friend> {
        match self.section {
            FriendsSection::Friends => self.visible_friends().get(self.selection).copied(),
            _ => None,
        }
    }

    pub fn selected_request(&self) -> Option<&FriendRequest> {
        match self.section {
            FriendsSection::Received => self.received.get(self.selection),
            FriendsSection::Sent => self.sent.get(self.selection),
            FriendsSection::Friends => None,
        }
    }

    fn clamp_selection(&mut self) {
        self.selection = self.selection.min(self.section_len().saturating_sub(1));
    }
}

/// Lists on the invitations page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationsSection {
    Received,
    Sent,
}

#[derive(Debug, Clone)]
pub struct InvitationsView {
    pub received: Vec<Invitation>,
    pub sent: Vec<Invitation>,
    pub section: InvitationsSection,
    pub selection: usize,
}

impl Default for InvitationsView {
    fn default() -> Self {
        Self {
            received: Vec::new(),
            sent: Vec::new(),
            section: InvitationsSection::Received,
            selection: 0,
        }
    }
}

impl InvitationsView {
    pub fn current(&self) -> &[Invitation] {
        match self.section {
            InvitationsSection::Received => &self.received,
            InvitationsSection::Sent => &self.sent,
        }
    }

    pub fn selected(&self) -> Option<&Invitation> {
        self.current().get(self.selection)
    }

    pub fn toggle_section(&mut self) {
        self.section = match self.section {
            InvitationsSection::Received => InvitationsSection::Sent,
            InvitationsSection::Sent => InvitationsSection::Received,
        };
        self.selection = 0;
    }

    pub fn move_selection(&mut self, forward: bool) {
        self.selection = step(self.selection, self.current().len(), forward);
    }

    fn clamp_selection(&mut self) {
        self.selection = self.selection.min(self.current().len().saturating_sub(1));
    }
}

/// Notification list shown in its overlay; the unread count sits in the title bar.
#[derive(Debug, Clone, Default)]
pub struct NotificationsView {
    pub items: Vec<Notification>,
    pub selection: usize,
    pub loading: bool,
}

impl NotificationsView {
    pub fn unread(&self) -> usize {
        unread_count(&self.items)
    }

    pub fn selected(&self) -> Option<&Notification> {
        self.items.get(self.selection)
    }

    pub fn move_selection(&mut self, forward: bool) {
        self.selection = step(self.selection, self.items.len(), forward);
    }

    pub fn set_items(&mut self, items: Vec<Notification>) {
        self.items = items;
        self.loading = false;
        self.selection = self.selection.min(self.items.len().saturating_sub(1));
    }

    /// Flip one entry to read without waiting for the reload.
    pub fn mark_read(&mut self, notification_id: i64) {
        if let Some(n) = self
            .items
            .iter_mut()
            .find(|n| n.notification_id == notification_id)
        {
            n.is_read = true;
        }
    }
}

/// Edit-event modal: the form plus the event's participants.
#[derive(Debug, Clone)]
pub struct EditModal {
    pub form: EventForm,
    pub event: Event,
    pub participants: Vec<Participant>,
    pub participant_selection: usize,
    /// Set after the first delete keypress; the second one deletes
    pub confirm_delete: bool,
}

impl EditModal {
    pub fn selected_participant(&self) -> Option<&Participant> {
        self.participants.get(self.participant_selection)
    }

    pub fn move_participant(&mut self, forward: bool) {
        self.participant_selection =
            step(self.participant_selection, self.participants.len(), forward);
    }
}

#[derive(Debug, Clone)]
pub enum Modal {
    CreateEvent(EventForm),
    EditEvent(Box<EditModal>),
    Filters(FiltersForm),
}

/// Move a list cursor one step, wrapping at both ends.
fn step(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// What to do after a write succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterAction {
    ReloadPage,
    ReloadParticipants(i64),
    CloseModal,
    MarkNotificationRead(i64),
}

/// Results sent back from spawned tasks.
pub enum BgResult {
    Events(Result<Vec<Event>, ApiError>),
    Friends(Result<Vec<Friend>, ApiError>),
    FriendRequests {
        received: Result<Vec<FriendRequest>, ApiError>,
        sent: Result<Vec<FriendRequest>, ApiError>,
    },
    FriendDetail(Result<Friend, ApiError>),
    Invitations {
        received: Result<Vec<Invitation>, ApiError>,
        sent: Result<Vec<Invitation>, ApiError>,
    },
    Notifications(Result<Vec<Notification>, ApiError>),
    Options(EventOptions),
    Classes(Result<Vec<EventClass>, ApiError>),
    Participants(Result<Vec<Participant>, ApiError>),
    LoggedIn {
        email: String,
        result: Result<TokenWithUser, SubmitError>,
    },
    SignedUp(Result<(), SubmitError>),
    Verified(Result<Verified, SubmitError>),
    OtpResent(Result<(), SubmitError>),
    EventCreated(Result<Created, SubmitError>),
    EventUpdated(Result<Event, SubmitError>),
    /// A write whose only follow-up is a toast and `then`
    Action {
        done: String,
        action: &'static str,
        result: Result<(), ApiError>,
        then: AfterAction,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionStore,
    pub navigator: Navigator,
    pub api: ApiClient,
    guard: RouteGuard,

    // UI state
    pub state: AppState,
    pub location: Location,
    seen_version: Option<u64>,
    pub modal: Option<Modal>,
    pub toast: Option<Toast>,
    /// An auth page submission is in flight
    pub submitting: bool,

    // Pages
    pub login: LoginForm,
    pub signup: SignupForm,
    pub verify: VerifyForm,
    pub calendar: CalendarView,
    pub friends: FriendsView,
    pub invitations: InvitationsView,
    pub notifications: NotificationsView,

    // Background work
    page_loads: LoadGroup,
    modal_loads: LoadGroup,
    notification_loads: LoadGroup,
    actions: LoadGroup,
    tx: mpsc::Sender<Loaded<BgResult>>,
    rx: mpsc::Receiver<Loaded<BgResult>>,
}

impl App {
    /// Create the application from the stored config and session.
    pub fn new() -> anyhow::Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let session = match SessionStore::from_config(&config) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Token storage unavailable, session will not persist");
                SessionStore::in_memory()
            }
        };

        let navigator = Navigator::new(Location::new(Route::Calendar));
        let api = ApiClient::from_config(&config, session.clone(), navigator.clone())?;
        info!(base_url = api.base_url(), "API client configured");

        Ok(Self::with_services(config, session, navigator, api))
    }

    pub fn with_services(
        config: Config,
        session: SessionStore,
        navigator: Navigator,
        api: ApiClient,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let login = LoginForm::new(config.last_email.clone());
        Self {
            guard: RouteGuard::new(session.clone()),
            location: navigator.current(),
            config,
            session,
            navigator,
            api,

            state: AppState::Normal,
            seen_version: None,
            modal: None,
            toast: None,
            submitting: false,

            login,
            signup: SignupForm::default(),
            verify: VerifyForm::default(),
            calendar: CalendarView::new(Utc::now()),
            friends: FriendsView::default(),
            invitations: InvitationsView::default(),
            notifications: NotificationsView::default(),

            page_loads: LoadGroup::new(),
            modal_loads: LoadGroup::new(),
            notification_loads: LoadGroup::new(),
            actions: LoadGroup::new(),
            tx,
            rx,
        }
    }

    pub fn current_route(&self) -> Route {
        self.location.route
    }

    pub fn current_user_id(&self) -> Option<i64> {
        self.session.user_id()
    }

    // =========================================================================
    // Toasts
    // =========================================================================

    pub fn notify(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message, false));
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message, true));
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, route: Route) {
        if self.location.route != route {
            self.navigator.navigate(route);
            self.sync_route();
        }
    }

    /// Replace the current entry, as auth pages do when moving between each other.
    pub fn switch_to(&mut self, location: Location) {
        self.navigator.replace(location);
        self.sync_route();
    }

    /// Pick up navigations made anywhere (input, forms, the 401 policy) and
    /// enter the new page. Protected pages go through the route guard first.
    pub fn sync_route(&mut self) {
        if self.seen_version == Some(self.navigator.version()) {
            return;
        }
        if let GuardOutcome::Redirect(to) = self.guard.enforce(&self.navigator) {
            debug!(to = %to.route, "Route guard redirected");
        }
        self.seen_version = Some(self.navigator.version());
        let location = self.navigator.current();
        self.enter(location);
    }

    fn enter(&mut self, location: Location) {
        debug!(route = %location.route, "Entering page");
        self.page_loads.cancel_all();
        self.close_modal();
        self.submitting = false;
        if !location.route.is_protected() && self.state == AppState::ShowingNotifications {
            self.state = AppState::Normal;
        }

        match location.route {
            Route::Login => self.login = LoginForm::new(self.config.last_email.clone()),
            Route::Signup => self.signup = SignupForm::default(),
            Route::VerifyEmail => self.verify = VerifyForm::from_location(&location),
            Route::Calendar | Route::Friends | Route::Invitations => {}
        }
        self.location = location;
        self.reload_page();
    }

    /// Start the loads for the current page.
    pub fn reload_page(&mut self) {
        match self.location.route {
            Route::Calendar => self.load_events(),
            Route::Friends => self.load_friends(),
            Route::Invitations => self.load_invitations(),
            Route::Login | Route::Signup | Route::VerifyEmail => return,
        }
        self.load_notifications();
    }

    pub fn logout(&mut self) {
        self.actions.cancel_all();
        self.notification_loads.cancel_all();
        self.notifications = NotificationsView::default();
        if self.state == AppState::ShowingNotifications {
            self.state = AppState::Normal;
        }
        self.api.auth().logout();
        self.calendar = CalendarView::new(Utc::now());
        self.friends = FriendsView::default();
        self.invitations = InvitationsView::default();
        self.sync_route();
        self.notify("Logged out");
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    fn spawn_page<F>(&mut self, load: F)
    where
        F: Future<Output = BgResult> + Send + 'static,
    {
        let handle = spawn_load(self.tx.clone(), load);
        self.page_loads.push(handle);
    }

    fn spawn_modal<F>(&mut self, load: F)
    where
        F: Future<Output = BgResult> + Send + 'static,
    {
        let handle = spawn_load(self.tx.clone(), load);
        self.modal_loads.push(handle);
    }

    fn spawn_action<F>(&mut self, action: F)
    where
        F: Future<Output = BgResult> + Send + 'static,
    {
        let handle = spawn_load(self.tx.clone(), action);
        self.actions.push(handle);
    }

    // =========================================================================
    // Page loads
    // =========================================================================

    pub fn load_events(&mut self) {
        let Some(query) = self.calendar.query() else {
            warn!(year = self.calendar.year, month = self.calendar.month, "Invalid calendar month");
            return;
        };
        // A newer month or filter supersedes whatever is still loading
        self.page_loads.cancel_all();
        self.calendar.loading = true;
        let api = self.api.clone();
        self.spawn_page(async move { BgResult::Events(api.events().list(&query).await) });
    }

    pub fn load_friends(&mut self) {
        let api = self.api.clone();
        self.spawn_page(async move { BgResult::Friends(api.friends().list().await) });
        let api = self.api.clone();
        self.spawn_page(async move {
            let friends = api.friends();
            let (received, sent) =
                futures::join!(friends.received_requests(), friends.sent_requests());
            BgResult::FriendRequests { received, sent }
        });
    }

    pub fn load_friend_detail(&mut self) {
        let Some(friend_id) = self.friends.selected_friend().map(|f| f.friend_id) else {
            return;
        };
        let api = self.api.clone();
        self.spawn_page(async move { BgResult::FriendDetail(api.friends().get(friend_id).await) });
    }

    pub fn load_invitations(&mut self) {
        let api = self.api.clone();
        self.spawn_page(async move {
            let invitations = api.invitations();
            let all = SentInvitationsQuery::default();
            let (received, sent) = futures::join!(invitations.received(), invitations.sent(&all));
            BgResult::Invitations { received, sent }
        });
    }

    pub fn load_notifications(&mut self) {
        // Only the newest list matters
        self.notification_loads.cancel_all();
        self.notifications.loading = true;
        let api = self.api.clone();
        let handle = spawn_load(self.tx.clone(), async move {
            BgResult::Notifications(api.notifications().list().await)
        });
        self.notification_loads.push(handle);
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn open_notifications(&mut self) {
        self.notifications.selection = 0;
        self.state = AppState::ShowingNotifications;
        self.load_notifications();
    }

    pub fn close_notifications(&mut self) {
        self.state = AppState::Normal;
    }

    /// Mark the selected notification as read. Already-read entries are skipped.
    pub fn mark_notification_read(&mut self) {
        let Some(notification_id) = self
            .notifications
            .selected()
            .filter(|n| !n.is_read)
            .map(|n| n.notification_id)
        else {
            return;
        };
        let api = self.api.clone();
        self.spawn_action(async move {
            let result = api.notifications().mark_as_read(notification_id).await;
            BgResult::Action {
                done: "Notification marked as read".to_string(),
                action: "mark notification as read",
                result: result.map(|_| ()),
                then: AfterAction::MarkNotificationRead(notification_id),
            }
        });
    }

    // =========================================================================
    // Calendar
    // =========================================================================

    pub fn shift_month(&mut self, delta: i32) {
        self.calendar.shift(delta);
        self.load_events();
    }

    pub fn go_to_today(&mut self) {
        self.calendar.go_to(Utc::now());
        self.load_events();
    }

    // =========================================================================
    // Modals
    // =========================================================================

    pub fn close_modal(&mut self) {
        self.modal_loads.cancel_all();
        self.modal = None;
    }

    pub fn open_create_modal(&mut self) {
        self.close_modal();
        self.modal = Some(Modal::CreateEvent(EventForm::new(Utc::now())));
        self.load_options();
    }

    pub fn open_edit_modal(&mut self) {
        let Some(event) = self.calendar.selected().cloned() else {
            return;
        };
        self.close_modal();
        let form = EventForm::for_event(&event, self.current_user_id());
        let event_id = event.event_id;
        self.modal = Some(Modal::EditEvent(Box::new(EditModal {
            form,
            event,
            participants: Vec::new(),
            participant_selection: 0,
            confirm_delete: false,
        })));
        self.load_options();
        self.load_participants(event_id);
    }

    pub fn open_filters_modal(&mut self) {
        self.close_modal();
        self.modal = Some(Modal::Filters(FiltersForm::from_filters(&self.calendar.filters)));
        let api = self.api.clone();
        self.spawn_modal(async move { BgResult::Classes(api.events().classes().await) });
    }

    fn load_options(&mut self) {
        let api = self.api.clone();
        self.spawn_modal(async move { BgResult::Options(EventOptions::load(&api).await) });
    }

    fn load_participants(&mut self, event_id: i64) {
        let api = self.api.clone();
        self.spawn_modal(async move {
            BgResult::Participants(api.invitations().participants(event_id).await)
        });
    }

    /// The form of an open create or edit modal.
    pub fn event_form_mut(&mut self) -> Option<&mut EventForm> {
        match self.modal.as_mut()? {
            Modal::CreateEvent(form) => Some(form),
            Modal::EditEvent(edit) => Some(&mut edit.form),
            Modal::Filters(_) => None,
        }
    }

    pub fn submit_event_modal(&mut self) {
        let Some(form) = self.event_form_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        let check = if form.is_editing() {
            form.to_update().map(|_| ())
        } else {
            form.to_create().map(|_| ())
        };
        if let Err(e) = check {
            form.error = Some(e.to_string());
            return;
        }
        form.submitting = true;
        form.error = None;

        let form = form.clone();
        let api = self.api.clone();
        if form.is_editing() {
            self.spawn_action(async move { BgResult::EventUpdated(form.submit_update(&api).await) });
        } else {
            self.spawn_action(async move { BgResult::EventCreated(form.submit_create(&api).await) });
        }
    }

    /// Delete the event in the edit modal. The first call only arms the confirmation.
    pub fn delete_event(&mut self) {
        let Some(Modal::EditEvent(edit)) = self.modal.as_mut() else {
            return;
        };
        if edit.form.read_only {
            edit.form.error = Some("Only the owner can delete this event".to_string());
            return;
        }
        if !edit.confirm_delete {
            edit.confirm_delete = true;
            edit.form.error = Some("Press Ctrl+D again to delete this event".to_string());
            return;
        }
        let event_id = edit.event.event_id;
        let api = self.api.clone();
        self.spawn_action(async move {
            BgResult::Action {
                done: "Event deleted".to_string(),
                action: "delete event",
                result: api.events().delete(event_id).await,
                then: AfterAction::CloseModal,
            }
        });
    }

    /// Owner removes the selected participant.
    pub fn remove_participant(&mut self) {
        let Some(Modal::EditEvent(edit)) = self.modal.as_ref() else {
            return;
        };
        if edit.form.read_only {
            return;
        }
        let Some(participant) = edit.selected_participant() else {
            return;
        };
        let Some(user_id) = participant.user_id else {
            return;
        };
        let name = participant.user_name.clone();
        let event_id = edit.event.event_id;
        let api = self.api.clone();
        self.spawn_action(async move {
            BgResult::Action {
                done: format!("Removed {}", name),
                action: "remove participant",
                result: api.events().remove_participant(event_id, user_id).await,
                then: AfterAction::ReloadParticipants(event_id),
            }
        });
    }

    /// A participant leaves an event they do not own.
    pub fn withdraw_from_event(&mut self) {
        let Some(Modal::EditEvent(edit)) = self.modal.as_ref() else {
            return;
        };
        if !edit.form.read_only {
            return;
        }
        let event_id = edit.event.event_id;
        let api = self.api.clone();
        self.spawn_action(async move {
            BgResult::Action {
                done: "Withdrawn from event".to_string(),
                action: "withdraw from event",
                result: api.events().withdraw(event_id).await,
                then: AfterAction::CloseModal,
            }
        });
    }

    pub fn apply_filters(&mut self, clear: bool) {
        let Some(Modal::Filters(form)) = self.modal.as_mut() else {
            return;
        };
        let filters = if clear { form.clear() } else { form.apply() };
        debug!(filters = %filters.summary(), "Applying filters");
        self.calendar.filters = filters;
        self.close_modal();
        self.load_events();
    }

    // =========================================================================
    // Auth pages
    // =========================================================================

    pub fn submit_login(&mut self) {
        if self.submitting {
            return;
        }
        if let Err(e) = self.login.validate() {
            self.login.error = Some(e.to_string());
            return;
        }
        self.submitting = true;
        let form = self.login.clone();
        let email = form.email.trim().to_string();
        let current = self.location.clone();
        let api = self.api.clone();
        self.spawn_action(async move {
            let result = form.submit(&api, &current).await;
            BgResult::LoggedIn { email, result }
        });
    }

    pub fn submit_signup(&mut self) {
        if self.submitting {
            return;
        }
        if let Err(e) = self.signup.validate() {
            self.signup.error = Some(e.to_string());
            return;
        }
        self.submitting = true;
        let form = self.signup.clone();
        let api = self.api.clone();
        self.spawn_action(async move { BgResult::SignedUp(form.submit(&api).await) });
    }

    pub fn submit_verify(&mut self) {
        if self.submitting {
            return;
        }
        self.verify.error = None;
        self.verify.notice = None;
        self.submitting = true;
        let form = self.verify.clone();
        let api = self.api.clone();
        self.spawn_action(async move { BgResult::Verified(form.submit(&api).await) });
    }

    pub fn resend_otp(&mut self) {
        self.verify.error = None;
        self.verify.notice = None;
        let form = self.verify.clone();
        let api = self.api.clone();
        self.spawn_action(async move { BgResult::OtpResent(form.resend(&api).await) });
    }

    // =========================================================================
    // Friends and invitations
    // =========================================================================

    pub fn send_friend_request(&mut self) {
        let Some(email) = self.friends.adding.take() else {
            return;
        };
        let email = email.trim().to_string();
        if email.is_empty() {
            self.notify_error("Email is required");
            return;
        }
        let api = self.api.clone();
        self.spawn_action(async move {
            let result = api.friends().send_request(&email).await.map(|_| ());
            BgResult::Action {
                done: format!("Friend request sent to {}", email),
                action: "send friend request",
                result,
                then: AfterAction::ReloadPage,
            }
        });
    }

    /// Accept or reject the selected received friend request.
    pub fn answer_friend_request(&mut self, accept: bool) {
        if self.friends.section != FriendsSection::Received {
            return;
        }
        let Some(request_id) = self.friends.selected_request().map(|r| r.request_id) else {
            return;
        };
        let api = self.api.clone();
        self.spawn_action(async move {
            let friends = api.friends();
            let (result, action) = if accept {
                (friends.accept(request_id).await, "accept friend request")
            } else {
                (friends.reject(request_id).await, "reject friend request")
            };
            let done = match &result {
                Ok(r) if !r.message.is_empty() => r.message.clone(),
                _ if accept => "Friend request accepted".to_string(),
                _ => "Friend request rejected".to_string(),
            };
            BgResult::Action {
                done,
                action,
                result: result.map(|_| ()),
                then: AfterAction::ReloadPage,
            }
        });
    }

    /// Accept or reject the selected received invitation.
    pub fn answer_invitation(&mut self, accept: bool) {
        if self.invitations.section != InvitationsSection::Received {
            return;
        }
        let Some(invitation) = self.invitations.selected().filter(|i| i.is_pending()) else {
            return;
        };
        let invitation_id = invitation.invitation_id;
        let status = if accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Rejected
        };
        let api = self.api.clone();
        self.spawn_action(async move {
            let result = api.invitations().respond(invitation_id, status).await;
            BgResult::Action {
                done: format!("Invitation {}", status),
                action: "answer invitation",
                result: result.map(|_| ()),
                then: AfterAction::ReloadPage,
            }
        });
    }

    /// Cancel the selected pending invitation the user sent.
    pub fn cancel_invitation(&mut self) {
        if self.invitations.section != InvitationsSection::Sent {
            return;
        }
        let Some(invitation) = self.invitations.selected().filter(|i| i.is_pending()) else {
            self.notify_error("Only pending invitations can be cancelled");
            return;
        };
        let invitation_id = invitation.invitation_id;
        let api = self.api.clone();
        self.spawn_action(async move {
            BgResult::Action {
                done: "Invitation cancelled".to_string(),
                action: "cancel invitation",
                result: api.invitations().cancel(invitation_id).await,
                then: AfterAction::ReloadPage,
            }
        });
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Drain finished background work and apply it.
    pub fn check_background_tasks(&mut self) {
        // A 401 seen by a load moves the navigator; tear the page down
        // before its remaining results are looked at
        self.sync_route();

        let mut results = Vec::new();
        while let Ok(loaded) = self.rx.try_recv() {
            results.push(loaded);
        }
        for loaded in results {
            if let Some(result) = loaded.take() {
                self.process_result(result);
            }
        }

        self.sync_route();

        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    fn process_result(&mut self, result: BgResult) {
        match result {
            BgResult::Events(result) => match result {
                Ok(events) => {
                    debug!(count = events.len(), "Events loaded");
                    self.calendar.set_events(events);
                }
                Err(e) => {
                    self.calendar.loading = false;
                    self.report(&e, "load events");
                }
            },
            BgResult::Friends(result) => match result {
                Ok(friends) => {
                    self.friends.friends = friends;
                    self.friends.clamp_selection();
                }
                Err(e) => self.report(&e, "load friends"),
            },
            BgResult::FriendRequests { received, sent } => {
                match received {
                    Ok(list) => self.friends.received = list,
                    Err(e) => self.report(&e, "load friend requests"),
                }
                match sent {
                    Ok(list) => self.friends.sent = list,
                    Err(e) => self.report(&e, "load friend requests"),
                }
                self.friends.clamp_selection();
            }
            BgResult::FriendDetail(result) => match result {
                Ok(friend) => self.friends.detail = Some(friend),
                Err(e) => self.report(&e, "load friend"),
            },
            BgResult::Invitations { received, sent } => {
                match received {
                    Ok(list) => self.invitations.received = list,
                    Err(e) => self.report(&e, "load invitations"),
                }
                match sent {
                    Ok(list) => self.invitations.sent = list,
                    Err(e) => self.report(&e, "load invitations"),
                }
                self.invitations.clamp_selection();
            }
            BgResult::Notifications(result) => match result {
                Ok(items) => {
                    debug!(count = items.len(), "Notifications loaded");
                    self.notifications.set_items(items);
                }
                Err(e) => {
                    self.notifications.loading = false;
                    // The badge is secondary; only complain while the list is open
                    if self.state == AppState::ShowingNotifications {
                        self.report(&e, "load notifications");
                    } else {
                        warn!(error = %e, "Failed to load notifications");
                    }
                }
            },
            BgResult::Options(options) => {
                if let Some(form) = self.event_form_mut() {
                    form.set_options(options);
                }
            }
            BgResult::Classes(result) => match result {
                Ok(classes) => {
                    if let Some(Modal::Filters(form)) = self.modal.as_mut() {
                        form.set_classes(classes);
                    }
                }
                Err(e) => self.report(&e, "load event types"),
            },
            BgResult::Participants(result) => match result {
                Ok(participants) => {
                    if let Some(Modal::EditEvent(edit)) = self.modal.as_mut() {
                        edit.participants = participants;
                        edit.participant_selection = edit
                            .participant_selection
                            .min(edit.participants.len().saturating_sub(1));
                    }
                }
                Err(e) => self.report(&e, "load participants"),
            },
            BgResult::LoggedIn { email, result } => {
                self.submitting = false;
                match result {
                    Ok(session) => {
                        self.remember_email(email);
                        self.notify(format!("Welcome, {}", session.user.name));
                    }
                    Err(e) => self.login.error = Some(LoginForm::error_message(&e)),
                }
            }
            BgResult::SignedUp(result) => {
                self.submitting = false;
                match result {
                    Ok(()) => self.notify("Account created. Check your email for a code."),
                    Err(e) => self.signup.error = Some(e.user_message("sign up")),
                }
            }
            BgResult::Verified(result) => {
                self.submitting = false;
                match result {
                    Ok(Verified::LoggedIn) => {
                        let email = self.verify.email.trim().to_string();
                        self.remember_email(email);
                        self.notify("Email verified");
                    }
                    Ok(Verified::NeedsLogin) => self.notify("Email verified. Please log in."),
                    Err(e) => {
                        self.verify.error = Some(VerifyForm::error_message(&e));
                        self.verify.otp.clear();
                    }
                }
            }
            BgResult::OtpResent(result) => match result {
                Ok(()) => self.verify.notice = Some("A new code has been sent.".to_string()),
                Err(e) => self.verify.error = Some(VerifyForm::resend_error_message(&e)),
            },
            BgResult::EventCreated(result) => match result {
                Ok(created) => {
                    let mut message = "Event created".to_string();
                    if created.invited > 0 {
                        message.push_str(&format!(", {} invited", created.invited));
                    }
                    if created.failed_invites > 0 {
                        message.push_str(&format!(", {} invitations failed", created.failed_invites));
                    }
                    if matches!(self.modal, Some(Modal::CreateEvent(_))) {
                        self.close_modal();
                    }
                    self.notify(message);
                    self.load_events();
                }
                Err(e) => self.event_submit_failed(&e, "create event"),
            },
            BgResult::EventUpdated(result) => match result {
                Ok(event) => {
                    if matches!(self.modal, Some(Modal::EditEvent(_))) {
                        self.close_modal();
                    }
                    self.notify(format!("Saved \"{}\"", event.title));
                    self.load_events();
                }
                Err(e) => self.event_submit_failed(&e, "update event"),
            },
            BgResult::Action {
                done,
                action,
                result,
                then,
            } => match result {
                Ok(()) => {
                    info!(action, "Action completed");
                    self.notify(done);
                    match then {
                        AfterAction::ReloadPage => self.reload_page(),
                        AfterAction::ReloadParticipants(event_id) => {
                            self.load_participants(event_id)
                        }
                        AfterAction::CloseModal => {
                            self.close_modal();
                            self.reload_page();
                        }
                        AfterAction::MarkNotificationRead(notification_id) => {
                            self.notifications.mark_read(notification_id);
                        }
                    }
                }
                Err(e) => self.report(&e, action),
            },
        }
    }

    fn event_submit_failed(&mut self, err: &SubmitError, action: &str) {
        let message = err.user_message(action);
        match self.event_form_mut() {
            Some(form) => {
                form.submitting = false;
                form.error = Some(message);
            }
            None => self.notify_error(message),
        }
    }

    /// Show a failed load or action. A 401 has already sent the user to login.
    fn report(&mut self, err: &ApiError, action: &str) {
        warn!(error = %err, action, "Request failed");
        if matches!(err, ApiError::Unauthorized) {
            self.notify_error("Your session has expired. Please log in again.");
        } else {
            self.notify_error(err.user_message(action));
        }
    }

    fn remember_email(&mut self, email: String) {
        if email.is_empty() || self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }
        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_app() -> App {
        let session = SessionStore::in_memory();
        let navigator = Navigator::new(Location::new(Route::Calendar));
        // Nothing listens here; requests fail fast with a connection error
        let api = ApiClient::new("http://127.0.0.1:9", session.clone(), navigator.clone())
            .unwrap();
        App::with_services(Config::default(), session, navigator, api)
    }

    fn event(event_id: i64, day: u32, hour: u32, event_type: i64) -> Event {
        let start = Local
            .with_ymd_and_hms(2025, 10, day, hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        Event {
            event_id,
            user_id: 1,
            event_type,
            header: None,
            title: format!("Event {}", event_id),
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
            recurrence_pattern: None,
            color: None,
            notes: None,
            linked_event_id: None,
        }
    }

    // ----- Tabs -----

    #[test]
    fn test_tab_next() {
        assert_eq!(next_tab(Route::Calendar), Route::Friends);
        assert_eq!(next_tab(Route::Friends), Route::Invitations);
        assert_eq!(next_tab(Route::Invitations), Route::Calendar);
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(prev_tab(Route::Calendar), Route::Invitations);
        assert_eq!(prev_tab(Route::Invitations), Route::Friends);
        // Auth pages are not tabs; stepping from one lands on the calendar's neighbour
        assert_eq!(next_tab(Route::Login), Route::Friends);
    }

    #[test]
    fn test_step_wraps() {
        assert_eq!(step(0, 3, false), 2);
        assert_eq!(step(2, 3, true), 0);
        assert_eq!(step(5, 0, true), 0);
    }

    // ----- Calendar -----

    #[test]
    fn test_calendar_month_navigation() {
        let now = Utc.with_ymd_and_hms(2025, 12, 15, 12, 0, 0).unwrap();
        let mut view = CalendarView::new(now);
        let (year, month) = local_year_month(now);
        assert_eq!((view.year, view.month), (year, month));
        view.year = 2025;
        view.month = 12;
        view.shift(1);
        assert_eq!((view.year, view.month), (2026, 1));
        assert_eq!(view.title(), "January 2026");
        view.shift(-2);
        assert_eq!((view.year, view.month), (2025, 11));
    }

    #[test]
    fn test_calendar_query_carries_filters() {
        let mut view = CalendarView::new(Utc::now());
        view.filters = EventFilters {
            owned_only: Some(true),
            event_types: vec![4],
        };
        let query = view.query().unwrap();
        assert!(query.start_time.unwrap() < query.end_time.unwrap());
        assert_eq!(query.owned_only, Some(true));
        assert_eq!(query.event_type, Some(4));
    }

    #[test]
    fn test_calendar_groups_by_day_in_order() {
        let mut view = CalendarView::new(Utc::now());
        view.set_events(vec![
            event(3, 2, 14, 1),
            event(1, 1, 9, 1),
            event(2, 2, 9, 1),
        ]);
        let ids: Vec<i64> = view.events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let days = view.days();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].1.len(), 1);
        let second: Vec<usize> = days[1].1.iter().map(|(i, _)| *i).collect();
        assert_eq!(second, vec![1, 2]);
    }

    #[test]
    fn test_calendar_client_side_type_filter() {
        let mut view = CalendarView::new(Utc::now());
        view.filters.event_types = vec![1, 3];
        view.selection = 5;
        view.set_events(vec![event(1, 1, 9, 1), event(2, 1, 10, 2), event(3, 1, 11, 3)]);
        assert_eq!(view.events.len(), 2);
        assert_eq!(view.selection, 1);
        assert!(!view.loading);
    }

    // ----- Friends -----

    #[test]
    fn test_friends_search_and_sections() {
        let mut view = FriendsView::default();
        view.friends = vec![
            Friend {
                friend_id: 1,
                friend_name: "Ana Ruiz".to_string(),
                friend_email: "ana@uni.edu".to_string(),
            },
            Friend {
                friend_id: 2,
                friend_name: "Bo Chen".to_string(),
                friend_email: "bo@uni.edu".to_string(),
            },
        ];
        view.search = "CHEN".to_string();
        assert_eq!(view.visible_friends().len(), 1);
        assert_eq!(view.selected_friend().map(|f| f.friend_id), Some(2));

        view.next_section();
        assert_eq!(view.section, FriendsSection::Received);
        assert!(view.selected_friend().is_none());
        view.next_section();
        view.next_section();
        assert_eq!(view.section, FriendsSection::Friends);
    }

    // ----- Navigation and modals -----

    #[tokio::test]
    async fn test_protected_page_without_token_goes_to_login() {
        let mut app = test_app();
        app.sync_route();
        assert_eq!(app.current_route(), Route::Login);
        assert_eq!(
            app.location.from().map(|l| l.route),
            Some(Route::Calendar)
        );
    }

    #[tokio::test]
    async fn test_route_change_closes_modal() {
        let mut app = test_app();
        app.switch_to(Location::new(Route::Signup));
        app.open_filters_modal();
        assert!(app.modal.is_some());
        app.switch_to(Location::new(Route::Login));
        assert!(app.modal.is_none());
        assert_eq!(app.current_route(), Route::Login);
    }

    #[tokio::test]
    async fn test_invalid_event_form_stays_open_with_error() {
        let mut app = test_app();
        app.open_create_modal();
        if let Some(form) = app.event_form_mut() {
            form.title = "Study".to_string();
            form.type_choice = hourglass_core::forms::TypeChoice::Custom;
            form.custom_type = "Review".to_string();
            form.end = form.start.clone();
        }
        app.submit_event_modal();
        let form = app.event_form_mut().unwrap();
        assert!(!form.submitting);
        assert_eq!(form.error.as_deref(), Some("Start must be before end"));
    }

    #[tokio::test]
    async fn test_apply_filters_closes_modal() {
        let mut app = test_app();
        app.open_filters_modal();
        if let Some(Modal::Filters(form)) = app.modal.as_mut() {
            form.toggle_current();
        }
        app.apply_filters(false);
        assert!(app.modal.is_none());
        assert_eq!(app.calendar.filters.owned_only, Some(true));
        assert!(app.calendar.loading);
    }

    #[tokio::test]
    async fn test_login_validation_shows_error() {
        let mut app = test_app();
        app.sync_route();
        app.submit_login();
        assert!(!app.submitting);
        assert_eq!(app.login.error.as_deref(), Some("Email is required"));
    }

    // ----- Notifications -----

    fn notification(id: i64, is_read: bool) -> Notification {
        Notification {
            notification_id: id,
            user_id: 1,
            message: format!("Notification {}", id),
            created_at: Utc::now(),
            is_read,
        }
    }

    #[tokio::test]
    async fn test_notifications_unread_and_mark_read() {
        let mut app = test_app();
        app.process_result(BgResult::Notifications(Ok(vec![
            notification(3, false),
            notification(2, false),
            notification(1, true),
        ])));
        assert_eq!(app.notifications.unread(), 2);
        assert!(!app.notifications.loading);

        app.process_result(BgResult::Action {
            done: "Notification marked as read".to_string(),
            action: "mark notification as read",
            result: Ok(()),
            then: AfterAction::MarkNotificationRead(2),
        });
        assert_eq!(app.notifications.unread(), 1);
        assert!(app.notifications.items[1].is_read);
    }

    #[tokio::test]
    async fn test_notifications_cleared_on_logout() {
        let mut app = test_app();
        app.notifications.set_items(vec![notification(1, false)]);
        app.open_notifications();
        assert_eq!(app.state, AppState::ShowingNotifications);
        assert!(app.notifications.loading);

        app.logout();
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.notifications.unread(), 0);
        assert_eq!(app.current_route(), Route::Login);
    }
}
