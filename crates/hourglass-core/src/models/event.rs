use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::datetime::flexible_utc;

/// Calendar event as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: i64,
    /// Owner of the event
    pub user_id: i64,
    /// Id of the event class
    pub event_type: i64,
    #[serde(default)]
    pub header: Option<String>,
    pub title: String,
    #[serde(with = "flexible_utc")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "flexible_utc")]
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub recurrence_pattern: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub linked_event_id: Option<i64>,
}

impl Event {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    /// Title prefixed with the upper-cased header, e.g. "MATH 201 Midterm"
    pub fn display_title(&self) -> String {
        match self.header.as_deref().map(str::trim) {
            Some(h) if !h.is_empty() => format!("{} {}", h.to_uppercase(), self.title),
            _ => self.title.clone(),
        }
    }

    /// Whether any part of the event falls in `[start, end)`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }

    /// Compact local time range: "09:00-10:30"
    pub fn formatted_time_range(&self) -> String {
        let start = self.start_time.with_timezone(&Local);
        let end = self.end_time.with_timezone(&Local);
        if start.date_naive() == end.date_naive() {
            format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
        } else {
            format!("{} - {}", start.format("%H:%M"), end.format("%b %d %H:%M"))
        }
    }

    pub fn formatted_start(&self) -> String {
        self.start_time
            .with_timezone(&Local)
            .format("%a %b %d, %Y %H:%M")
            .to_string()
    }

    pub fn formatted_end(&self) -> String {
        self.end_time
            .with_timezone(&Local)
            .format("%a %b %d, %Y %H:%M")
            .to_string()
    }
}

/// Event type category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventClass {
    pub class_id: i64,
    pub class_name: String,
    #[serde(default)]
    pub is_builtin: bool,
}

/// Body of `POST /event/`. The type is sent by name; unknown names create a
/// custom class server-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCreate {
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_event_id: Option<i64>,
}

/// Body of `PUT /event/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_event_id: Option<i64>,
}

/// Query parameters of `GET /event/`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EventQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_only: Option<bool>,
}

impl EventQuery {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(start),
            end_time: Some(end),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> Event {
        serde_json::from_str(
            r##"{"event_id":11,"user_id":3,"event_type":2,"header":"math 201","title":"Midterm",
                "start_time":"2025-10-02T09:00:00","end_time":"2025-10-02T10:30:00",
                "recurrence_pattern":null,"color":"#336699","notes":null,"linked_event_id":null}"##,
        )
        .expect("event should parse")
    }

    #[test]
    fn test_parse_event() {
        let event = sample_event();
        assert_eq!(event.event_id, 11);
        assert_eq!(event.start_time, Utc.with_ymd_and_hms(2025, 10, 2, 9, 0, 0).unwrap());
        assert_eq!(event.color.as_deref(), Some("#336699"));
        assert!(event.is_owned_by(3));
        assert!(!event.is_owned_by(4));
    }

    #[test]
    fn test_display_title() {
        let mut event = sample_event();
        assert_eq!(event.display_title(), "MATH 201 Midterm");
        event.header = Some("  ".to_string());
        assert_eq!(event.display_title(), "Midterm");
        event.header = None;
        assert_eq!(event.display_title(), "Midterm");
    }

    #[test]
    fn test_overlaps() {
        let event = sample_event();
        let day = Utc.with_ymd_and_hms(2025, 10, 2, 0, 0, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2025, 10, 3, 0, 0, 0).unwrap();
        assert!(event.overlaps(day, next_day));
        assert!(!event.overlaps(next_day, next_day + chrono::Duration::days(1)));
        // Touching the end is not an overlap
        assert!(!event.overlaps(event.end_time, next_day));
    }

    #[test]
    fn test_event_create_skips_empty_fields() {
        let body = EventCreate {
            event_type: "Exam".to_string(),
            header: None,
            title: "Final".to_string(),
            start_time: Utc.with_ymd_and_hms(2025, 12, 10, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 12, 10, 11, 0, 0).unwrap(),
            recurrence_pattern: None,
            color: Some("#FFD700".to_string()),
            notes: None,
            linked_event_id: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["event_type"], "Exam");
        assert_eq!(json["color"], "#FFD700");
        assert!(json.get("header").is_none());
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_event_update_serializes_only_set_fields() {
        let update = EventUpdate {
            title: Some("Renamed".to_string()),
            ..EventUpdate::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"title":"Renamed"}"#);
    }
}
