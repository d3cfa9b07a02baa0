//! Create-event and edit-event modal state.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::input::{self, MAX_HEADER_LENGTH};
use super::{non_blank, FormError, SubmitError};
use crate::api::ApiClient;
use crate::models::{Event, EventClass, EventCreate, EventUpdate, Friend};
use crate::utils::color::normalize_hex;
use crate::utils::datetime::{floor_to_minute, parse_local_input, to_local_input};

/// Selected event type: one of the loaded classes, or a new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeChoice {
    Class(String),
    Custom,
}

/// Editable fields in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    Type,
    CustomType,
    Header,
    Title,
    Start,
    End,
    Color,
    Notes,
    Invites,
}

impl EventField {
    const ORDER: [EventField; 9] = [
        EventField::Type,
        EventField::CustomType,
        EventField::Header,
        EventField::Title,
        EventField::Start,
        EventField::End,
        EventField::Color,
        EventField::Notes,
        EventField::Invites,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventField::Type => "Type *",
            EventField::CustomType => "New type",
            EventField::Header => "Header",
            EventField::Title => "Title *",
            EventField::Start => "Start *",
            EventField::End => "End *",
            EventField::Color => "Color",
            EventField::Notes => "Notes",
            EventField::Invites => "Invite",
        }
    }
}

/// Friends queued to be invited once the event exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteQueue {
    queued: Vec<Friend>,
}

impl InviteQueue {
    /// Queue a friend. Returns false if they were already queued.
    pub fn add(&mut self, friend: Friend) -> bool {
        if self.contains(friend.friend_id) {
            return false;
        }
        self.queued.push(friend);
        true
    }

    pub fn remove(&mut self, friend_id: i64) -> bool {
        let before = self.queued.len();
        self.queued.retain(|f| f.friend_id != friend_id);
        self.queued.len() != before
    }

    pub fn contains(&self, friend_id: i64) -> bool {
        self.queued.iter().any(|f| f.friend_id == friend_id)
    }

    /// Friends that can still be picked.
    pub fn available<'a>(&self, friends: &'a [Friend]) -> Vec<&'a Friend> {
        friends.iter().filter(|f| !self.contains(f.friend_id)).collect()
    }

    pub fn queued(&self) -> &[Friend] {
        &self.queued
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

/// Option lists a modal needs when it opens.
#[derive(Debug, Clone, Default)]
pub struct EventOptions {
    pub classes: Vec<EventClass>,
    pub friends: Vec<Friend>,
}

impl EventOptions {
    /// Load classes and friends in parallel. A failed list comes back empty.
    pub async fn load(api: &ApiClient) -> Self {
        let events = api.events();
        let friends_api = api.friends();
        let (classes, friends) = futures::join!(events.classes(), friends_api.list());
        let classes = classes.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load event classes");
            Vec::new()
        });
        let friends = friends.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load friends");
            Vec::new()
        });
        Self { classes, friends }
    }
}

/// Validated times and type, shared by create and update.
#[derive(Debug, Clone, PartialEq)]
struct Checked {
    type_name: Option<String>,
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Result of a successful create.
#[derive(Debug, Clone)]
pub struct Created {
    pub event: Event,
    pub invited: usize,
    pub failed_invites: usize,
}

#[derive(Debug, Clone)]
pub struct EventForm {
    /// Set when editing an existing event
    pub event_id: Option<i64>,
    /// Class id of the event being edited, resolved to a name once classes load
    original_type: Option<i64>,
    pub read_only: bool,

    pub type_choice: TypeChoice,
    pub custom_type: String,
    pub header: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub color: String,
    pub notes: String,

    pub classes: Vec<EventClass>,
    pub friends: Vec<Friend>,
    pub invites: InviteQueue,
    /// Index into the friends still available to invite
    pub invite_cursor: usize,

    pub focus: EventField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl EventForm {
    /// Blank create form: starts now, ends an hour later.
    pub fn new(now: DateTime<Utc>) -> Self {
        let start = floor_to_minute(now);
        Self {
            event_id: None,
            original_type: None,
            read_only: false,
            type_choice: TypeChoice::Class(String::new()),
            custom_type: String::new(),
            header: String::new(),
            title: String::new(),
            start: to_local_input(start),
            end: to_local_input(start + Duration::hours(1)),
            color: String::new(),
            notes: String::new(),
            classes: Vec::new(),
            friends: Vec::new(),
            invites: InviteQueue::default(),
            invite_cursor: 0,
            focus: EventField::Type,
            submitting: false,
            error: None,
        }
    }

    /// Edit form for `event`. Read-only unless `current_user` owns it.
    pub fn for_event(event: &Event, current_user: Option<i64>) -> Self {
        let read_only = !current_user.is_some_and(|id| event.is_owned_by(id));
        Self {
            event_id: Some(event.event_id),
            original_type: Some(event.event_type),
            read_only,
            type_choice: TypeChoice::Class(String::new()),
            custom_type: String::new(),
            header: input::clamp_chars(event.header.as_deref().unwrap_or_default(), MAX_HEADER_LENGTH),
            title: event.title.clone(),
            start: to_local_input(event.start_time),
            end: to_local_input(event.end_time),
            color: event.color.clone().unwrap_or_default(),
            notes: event.notes.clone().unwrap_or_default(),
            classes: Vec::new(),
            friends: Vec::new(),
            invites: InviteQueue::default(),
            invite_cursor: 0,
            focus: EventField::Header,
            submitting: false,
            error: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.event_id.is_some()
    }

    /// Install loaded option lists.
    ///
    /// A create form preselects the first class; an edit form selects the
    /// class of the event being edited.
    pub fn set_options(&mut self, options: EventOptions) {
        self.classes = options.classes;
        self.friends = options.friends;
        self.invite_cursor = 0;

        if let Some(type_id) = self.original_type {
            if let Some(name) = self.class_name(type_id).map(str::to_string) {
                self.type_choice = TypeChoice::Class(name);
            }
        } else if matches!(&self.type_choice, TypeChoice::Class(name) if name.is_empty()) {
            if let Some(first) = self.classes.first() {
                self.type_choice = TypeChoice::Class(first.class_name.clone());
            }
        }
    }

    pub fn class_name(&self, class_id: i64) -> Option<&str> {
        self.classes
            .iter()
            .find(|c| c.class_id == class_id)
            .map(|c| c.class_name.as_str())
    }

    /// Name shown for the type: the selected class, or the custom text.
    pub fn type_name(&self) -> String {
        match &self.type_choice {
            TypeChoice::Class(name) => name.trim().to_string(),
            TypeChoice::Custom => self.custom_type.trim().to_string(),
        }
    }

    /// Step through the class list, with "custom" after the last class.
    pub fn cycle_type(&mut self, forward: bool) {
        let count = self.classes.len() + 1;
        let current = match &self.type_choice {
            TypeChoice::Class(name) => self
                .classes
                .iter()
                .position(|c| &c.class_name == name)
                .unwrap_or(0),
            TypeChoice::Custom => self.classes.len(),
        };
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        self.type_choice = match self.classes.get(next) {
            Some(class) => TypeChoice::Class(class.class_name.clone()),
            None => TypeChoice::Custom,
        };
    }

    // ===== Focus and text entry =====

    fn field_visible(&self, field: EventField) -> bool {
        match field {
            EventField::CustomType => self.type_choice == TypeChoice::Custom,
            // Invitations are only sent for new events
            EventField::Invites => !self.is_editing(),
            _ => true,
        }
    }

    pub fn visible_fields(&self) -> Vec<EventField> {
        EventField::ORDER
            .iter()
            .copied()
            .filter(|f| self.field_visible(*f))
            .collect()
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, delta: isize) {
        let fields = self.visible_fields();
        let len = fields.len() as isize;
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.focus = fields[next];
    }

    fn focused_text(&mut self) -> Option<(&mut String, usize)> {
        match self.focus {
            EventField::CustomType => Some((&mut self.custom_type, input::MAX_TITLE_LENGTH)),
            EventField::Header => Some((&mut self.header, MAX_HEADER_LENGTH)),
            EventField::Title => Some((&mut self.title, input::MAX_TITLE_LENGTH)),
            EventField::Start => Some((&mut self.start, input::MAX_DATETIME_LENGTH)),
            EventField::End => Some((&mut self.end, input::MAX_DATETIME_LENGTH)),
            EventField::Color => Some((&mut self.color, input::MAX_COLOR_LENGTH)),
            EventField::Notes => Some((&mut self.notes, input::MAX_NOTES_LENGTH)),
            EventField::Type | EventField::Invites => None,
        }
    }

    /// Type a character into the focused text field.
    pub fn insert_char(&mut self, c: char) -> bool {
        if self.read_only {
            return false;
        }
        self.error = None;
        match self.focused_text() {
            Some((field, max)) => input::push_char(field, max, c),
            None => false,
        }
    }

    pub fn delete_char(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        match self.focused_text() {
            Some((field, _)) => field.pop().is_some(),
            None => false,
        }
    }

    // ===== Invitations =====

    pub fn available_friends(&self) -> Vec<&Friend> {
        self.invites.available(&self.friends)
    }

    pub fn move_invite_cursor(&mut self, forward: bool) {
        let len = self.available_friends().len();
        if len == 0 {
            self.invite_cursor = 0;
            return;
        }
        self.invite_cursor = if forward {
            (self.invite_cursor + 1) % len
        } else {
            (self.invite_cursor + len - 1) % len
        };
    }

    /// Queue the friend under the picker cursor.
    pub fn queue_selected_friend(&mut self) -> bool {
        let friend = match self.available_friends().get(self.invite_cursor) {
            Some(f) => (*f).clone(),
            None => return false,
        };
        let added = self.invites.add(friend);
        let remaining = self.available_friends().len();
        if self.invite_cursor >= remaining {
            self.invite_cursor = remaining.saturating_sub(1);
        }
        added
    }

    /// Drop the most recently queued friend.
    pub fn unqueue_last(&mut self) -> bool {
        match self.invites.queued().last().map(|f| f.friend_id) {
            Some(id) => self.invites.remove(id),
            None => false,
        }
    }

    // ===== Validation =====

    fn check(&self) -> Result<Checked, FormError> {
        let type_name = non_blank(&self.type_name());
        let title = non_blank(&self.title).ok_or(FormError::Required("Title"))?;
        let start = parse_local_input(&self.start).ok_or(FormError::MissingTime)?;
        let end = parse_local_input(&self.end).ok_or(FormError::MissingTime)?;
        if start >= end {
            return Err(FormError::StartNotBeforeEnd);
        }
        Ok(Checked {
            type_name,
            title,
            start,
            end,
        })
    }

    fn color_value(&self) -> Option<String> {
        non_blank(&self.color).map(|c| normalize_hex(&c).unwrap_or(c))
    }

    /// Body for `POST /event/`, or why the form cannot be submitted.
    pub fn to_create(&self) -> Result<EventCreate, FormError> {
        let type_name = non_blank(&self.type_name()).ok_or(FormError::Required("Type"))?;
        let checked = self.check()?;
        Ok(EventCreate {
            event_type: type_name,
            header: non_blank(&self.header),
            title: checked.title,
            start_time: checked.start,
            end_time: checked.end,
            recurrence_pattern: None,
            color: self.color_value(),
            notes: non_blank(&self.notes),
            linked_event_id: None,
        })
    }

    /// Body for `PUT /event/{id}`.
    ///
    /// Cleared optional fields are sent as empty strings so the server
    /// clears them too.
    pub fn to_update(&self) -> Result<EventUpdate, FormError> {
        if self.read_only {
            return Err(FormError::ReadOnly);
        }
        // A new type needs a name; an unchanged class may be left out
        if self.type_choice == TypeChoice::Custom && self.custom_type.trim().is_empty() {
            return Err(FormError::Required("Type"));
        }
        let checked = self.check()?;
        Ok(EventUpdate {
            event_type: checked.type_name,
            header: Some(self.header.trim().to_string()),
            title: Some(checked.title),
            start_time: Some(checked.start),
            end_time: Some(checked.end),
            recurrence_pattern: None,
            color: Some(self.color_value().unwrap_or_default()),
            notes: Some(self.notes.trim().to_string()),
            linked_event_id: None,
        })
    }

    // ===== Submission =====

    /// Create the event, then invite each queued friend in order.
    ///
    /// Validation runs before any request. Individual invitation failures do
    /// not fail the submission.
    pub async fn submit_create(&self, api: &ApiClient) -> Result<Created, SubmitError> {
        let body = self.to_create()?;
        let event = api.events().create(&body).await?;

        let mut invited = 0;
        let mut failed_invites = 0;
        for friend in self.invites.queued() {
            match api
                .invitations()
                .create(event.event_id, friend.friend_id)
                .await
            {
                Ok(_) => invited += 1,
                Err(e) => {
                    debug!(friend_id = friend.friend_id, error = %e, "Invitation failed");
                    failed_invites += 1;
                }
            }
        }
        info!(event_id = event.event_id, invited, failed_invites, "Event submitted");
        Ok(Created {
            event,
            invited,
            failed_invites,
        })
    }

    pub async fn submit_update(&self, api: &ApiClient) -> Result<Event, SubmitError> {
        let event_id = self.event_id.ok_or(FormError::ReadOnly)?;
        let body = self.to_update()?;
        Ok(api.events().update(event_id, &body).await?)
    }
}
