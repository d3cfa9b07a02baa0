//! Calendar filters and the modal that edits them.

use crate::models::{Event, EventClass, EventQuery};

/// Filters applied to the calendar's event list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    /// `Some(true)` to show only the user's own events; never `Some(false)`
    pub owned_only: Option<bool>,
    /// Class ids to show; empty shows every type
    pub event_types: Vec<i64>,
}

impl EventFilters {
    pub fn is_active(&self) -> bool {
        self.owned_only.is_some() || !self.event_types.is_empty()
    }

    /// Server-side part of the filter.
    ///
    /// The backend accepts a single `event_type`; with several selected
    /// the query omits it and `matches` narrows the result instead.
    pub fn apply_to_query(&self, query: &mut EventQuery) {
        query.owned_only = self.owned_only;
        query.event_type = match self.event_types.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
    }

    /// Client-side part of the filter.
    pub fn matches(&self, event: &Event) -> bool {
        self.event_types.is_empty() || self.event_types.contains(&event.event_type)
    }

    pub fn retain_matching(&self, events: &mut Vec<Event>) {
        events.retain(|e| self.matches(e));
    }

    /// Short description for the status bar, e.g. "owned, 2 types".
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.owned_only == Some(true) {
            parts.push("owned".to_string());
        }
        match self.event_types.len() {
            0 => {}
            1 => parts.push("1 type".to_string()),
            n => parts.push(format!("{} types", n)),
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Working copy of the filters while the modal is open.
#[derive(Debug, Clone, Default)]
pub struct FiltersForm {
    pub owned_only: bool,
    pub selected: Vec<i64>,
    pub classes: Vec<EventClass>,
    /// Row under the cursor: 0 is the owned-only toggle, then one per class
    pub cursor: usize,
}

impl FiltersForm {
    pub fn from_filters(filters: &EventFilters) -> Self {
        Self {
            owned_only: filters.owned_only.unwrap_or(false),
            selected: filters.event_types.clone(),
            classes: Vec::new(),
            cursor: 0,
        }
    }

    pub fn set_classes(&mut self, classes: Vec<EventClass>) {
        self.classes = classes;
        self.cursor = self.cursor.min(self.classes.len());
    }

    pub fn row_count(&self) -> usize {
        self.classes.len() + 1
    }

    pub fn move_cursor(&mut self, forward: bool) {
        let rows = self.row_count();
        self.cursor = if forward {
            (self.cursor + 1) % rows
        } else {
            (self.cursor + rows - 1) % rows
        };
    }

    pub fn is_selected(&self, class_id: i64) -> bool {
        self.selected.contains(&class_id)
    }

    pub fn toggle_type(&mut self, class_id: i64) {
        if self.is_selected(class_id) {
            self.selected.retain(|id| *id != class_id);
        } else {
            self.selected.push(class_id);
        }
    }

    /// Toggle whatever the cursor is on.
    pub fn toggle_current(&mut self) {
        match self.cursor {
            0 => self.owned_only = !self.owned_only,
            n => {
                if let Some(id) = self.classes.get(n - 1).map(|c| c.class_id) {
                    self.toggle_type(id);
                }
            }
        }
    }

    pub fn apply(&self) -> EventFilters {
        EventFilters {
            owned_only: self.owned_only.then_some(true),
            event_types: self.selected.clone(),
        }
    }

    /// Reset the form and return the empty filters.
    pub fn clear(&mut self) -> EventFilters {
        self.owned_only = false;
        self.selected.clear();
        EventFilters::default()
    }
}
