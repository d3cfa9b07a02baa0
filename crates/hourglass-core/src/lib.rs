//! Core library for the Hourglass academic calendar client.
//!
//! This crate holds everything that does not draw to a terminal:
//!
//! - `auth`: session store, token inspector, route guard, token storage
//! - `api`: the bearer-token HTTP wrapper and typed per-resource clients
//! - `nav`: the navigator (current location and history)
//! - `models`: request/response shapes of the backend
//! - `forms`: modal and page form state with client-side validation
//! - `task`: cancellable load handles
//! - `utils`: color, datetime and string helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod forms;
pub mod models;
pub mod nav;
pub mod task;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{GuardOutcome, RouteGuard, SessionStore};
pub use config::Config;
pub use nav::{Location, NavState, Navigator, Route};
