use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Event;
use crate::utils::datetime::flexible_utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvitationStatus::Pending => write!(f, "Pending"),
            InvitationStatus::Accepted => write!(f, "Accepted"),
            InvitationStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// An event invitation, optionally joined with its event and invitee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub invitation_id: i64,
    pub event_id: i64,
    pub invited_user_id: i64,
    pub status: InvitationStatus,
    #[serde(default, with = "flexible_utc::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event: Option<Event>,
    #[serde(default)]
    pub invited_user_email: Option<String>,
    #[serde(default)]
    pub invited_user_name: Option<String>,
}

impl Invitation {
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Event title when the event was joined in, else its id
    pub fn event_label(&self) -> String {
        match &self.event {
            Some(event) => event.display_title(),
            None => format!("Event #{}", self.event_id),
        }
    }

    pub fn invitee_label(&self) -> String {
        match (&self.invited_user_name, &self.invited_user_email) {
            (Some(name), Some(email)) => format!("{} <{}>", name, email),
            (Some(name), None) => name.clone(),
            (None, Some(email)) => email.clone(),
            (None, None) => format!("User #{}", self.invited_user_id),
        }
    }
}

/// Body of `POST /invitations/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationCreate {
    pub event_id: i64,
    pub invited_user_id: i64,
}

/// Body of `POST /invitations/respond`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationRespond {
    pub invitation_id: i64,
    pub status: InvitationStatus,
}

/// Query parameters of `GET /invitations/sent`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentInvitationsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvitationStatus>,
}

/// A user taking part in an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub user_name: String,
    pub user_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_invitation() {
        let json = r#"{"invitation_id":4,"event_id":11,"invited_user_id":7,"status":"pending","created_at":"2025-09-30T12:00:00"}"#;
        let inv: Invitation = serde_json::from_str(json).expect("invitation should parse");
        assert!(inv.is_pending());
        assert!(inv.event.is_none());
        assert_eq!(inv.event_label(), "Event #11");
        assert_eq!(inv.invitee_label(), "User #7");
    }

    #[test]
    fn test_parse_invitation_with_event() {
        let json = r#"{"invitation_id":4,"event_id":11,"invited_user_id":7,"status":"accepted",
            "invited_user_email":"cy@uni.edu","invited_user_name":"Cy",
            "event":{"event_id":11,"user_id":3,"event_type":1,"title":"Study group",
                     "start_time":"2025-10-01T18:00:00Z","end_time":"2025-10-01T19:00:00Z"}}"#;
        let inv: Invitation = serde_json::from_str(json).expect("invitation should parse");
        assert_eq!(inv.status, InvitationStatus::Accepted);
        assert!(inv.created_at.is_none());
        assert_eq!(inv.event_label(), "Study group");
        assert_eq!(inv.invitee_label(), "Cy <cy@uni.edu>");
    }

    #[test]
    fn test_respond_body() {
        let body = InvitationRespond {
            invitation_id: 4,
            status: InvitationStatus::Rejected,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"invitation_id":4,"status":"rejected"}"#
        );
    }

    #[test]
    fn test_sent_query_skips_unset() {
        let query = SentInvitationsQuery {
            event_id: None,
            status: Some(InvitationStatus::Pending),
        };
        assert_eq!(serde_json::to_string(&query).unwrap(), r#"{"status":"pending"}"#);
    }

    #[test]
    fn test_parse_participant_without_id() {
        let p: Participant =
            serde_json::from_str(r#"{"user_name":"Dee","user_email":"dee@uni.edu"}"#).unwrap();
        assert_eq!(p.user_id, None);
        assert_eq!(p.user_name, "Dee");
    }
}
