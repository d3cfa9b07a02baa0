//! Authentication module for managing the client-side session.
//!
//! This module provides:
//! - `SessionStore`: holder of the bearer token, backed by `TokenStorage`
//! - `token`: payload decoding and expiry checks for the bearer token
//! - `RouteGuard`: gating of protected pages on token presence and expiry
//! - `storage`: file, keychain and in-memory token storage backends

pub mod guard;
pub mod session;
pub mod storage;
pub mod token;

pub use guard::{GuardOutcome, GuardState, RouteGuard};
pub use session::{SessionStore, TOKEN_KEY};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage};
pub use token::{decode_payload, is_token_expired, TokenPayload};
