//! Form state for pages and modals.
//!
//! Forms hold the editable fields, validate them client-side and submit
//! through the typed API clients. Nothing here draws; the front-end renders
//! the state and forwards keystrokes.

pub mod auth;
pub mod event;
pub mod filters;
pub mod input;
pub mod otp;

use thiserror::Error;

use crate::api::ApiError;

pub use auth::{LoginFocus, LoginForm, SignupFocus, SignupForm, Verified, VerifyForm};
pub use event::{Created, EventField, EventForm, EventOptions, InviteQueue, TypeChoice};
pub use filters::{EventFilters, FiltersForm};
pub use otp::OtpInput;

/// A form refused to submit. No request was sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Start and end times are required")]
    MissingTime,

    #[error("Start must be before end")]
    StartNotBeforeEnd,

    #[error("Please enter the 6-digit code.")]
    IncompleteCode,

    #[error("Missing email. Please go back and enter your email again.")]
    MissingEmail,

    #[error("This event can only be changed by its owner")]
    ReadOnly,
}

/// Failure of a form submission: rejected locally or by the server.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    pub fn user_message(&self, action: &str) -> String {
        match self {
            SubmitError::Invalid(e) => e.to_string(),
            SubmitError::Api(e) => e.user_message(action),
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, SubmitError::Invalid(_))
    }
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
