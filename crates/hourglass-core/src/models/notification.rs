use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::datetime::flexible_utc;
use crate::utils::format::truncate;

/// An in-app notification (invitation or friend request activity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub message: String,
    #[serde(with = "flexible_utc")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

impl Notification {
    pub fn formatted_created_at(&self) -> String {
        self.created_at
            .with_timezone(&chrono::Local)
            .format("%b %d %H:%M")
            .to_string()
    }

    pub fn short_message(&self, max_len: usize) -> String {
        truncate(&self.message, max_len)
    }
}

/// Number of notifications not yet marked as read.
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notification_with_offset() {
        let json = r#"{"notification_id":5,"user_id":3,"message":"Ana accepted your friend request","created_at":"2025-10-01T08:30:00.123456+00:00","is_read":false}"#;
        let n: Notification = serde_json::from_str(json).expect("notification should parse");
        assert_eq!(n.notification_id, 5);
        assert!(!n.is_read);
        assert_eq!(n.created_at.to_rfc3339(), "2025-10-01T08:30:00.123456+00:00");
    }

    #[test]
    fn test_unread_count() {
        let json = r#"[
            {"notification_id":1,"user_id":3,"message":"a","created_at":"2025-10-01T08:30:00","is_read":true},
            {"notification_id":2,"user_id":3,"message":"b","created_at":"2025-10-01T09:30:00","is_read":false},
            {"notification_id":3,"user_id":3,"message":"c","created_at":"2025-10-01T10:30:00"}
        ]"#;
        let list: Vec<Notification> = serde_json::from_str(json).expect("list should parse");
        assert_eq!(unread_count(&list), 2);
        assert_eq!(unread_count(&[]), 0);
    }
}
