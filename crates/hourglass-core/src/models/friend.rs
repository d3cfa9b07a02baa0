use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::datetime::flexible_utc;

/// One entry of the friends list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub friend_id: i64,
    #[serde(default)]
    pub friend_name: String,
    #[serde(default)]
    pub friend_email: String,
}

impl Friend {
    /// "Name <email>" as shown in pickers
    pub fn label(&self) -> String {
        match (self.friend_name.is_empty(), self.friend_email.is_empty()) {
            (false, false) => format!("{} <{}>", self.friend_name, self.friend_email),
            (false, true) => self.friend_name.clone(),
            (true, false) => self.friend_email.clone(),
            (true, true) => format!("User #{}", self.friend_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for FriendRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FriendRequestStatus::Pending => write!(f, "Pending"),
            FriendRequestStatus::Accepted => write!(f, "Accepted"),
            FriendRequestStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub request_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub status: FriendRequestStatus,
    #[serde(with = "flexible_utc")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestCreate {
    pub receiver_email: String,
}
