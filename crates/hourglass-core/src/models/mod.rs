//! Data models for the Hourglass backend.
//!
//! Request and response shapes of the REST API:
//!
//! - `User`, `TokenWithUser`: accounts and login results
//! - `Event`, `EventClass`: calendar events and their type categories
//! - `Friend`, `FriendRequest`: the friend graph
//! - `Invitation`, `Participant`: event invitations and attendees
//! - `Notification`: in-app activity notices

pub mod event;
pub mod friend;
pub mod invitation;
pub mod notification;
pub mod user;

pub use event::{Event, EventClass, EventCreate, EventQuery, EventUpdate};
pub use friend::{Friend, FriendRequest, FriendRequestCreate, FriendRequestStatus};
pub use invitation::{
    Invitation, InvitationCreate, InvitationRespond, InvitationStatus, Participant,
    SentInvitationsQuery,
};
pub use notification::{unread_count, Notification};
pub use user::{
    LoginRequest, MessageResponse, RegisterRequest, TokenWithUser, User, VerifyOtpRequest,
};
