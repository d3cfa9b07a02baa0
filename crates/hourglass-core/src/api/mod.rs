//! REST API client module for the Hourglass backend.
//!
//! `ApiClient` is the shared HTTP wrapper: it attaches the session's bearer
//! token to every request and handles 401 responses globally. The typed
//! per-resource clients borrow it:
//!
//! ```ignore
//! let events = api.events().list(&EventQuery::between(start, end)).await?;
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod friends;
pub mod invitations;
pub mod notifications;

pub use auth::AuthApi;
pub use client::ApiClient;
pub use error::ApiError;
pub use events::EventsApi;
pub use friends::FriendsApi;
pub use invitations::InvitationsApi;
pub use notifications::NotificationsApi;
