//! Account endpoints: login, registration and email verification.

use tracing::{info, warn};

use super::{ApiClient, ApiError};
use crate::models::{
    LoginRequest, MessageResponse, RegisterRequest, TokenWithUser, User, VerifyOtpRequest,
};
use crate::nav::{Location, Route};

pub struct AuthApi<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a bearer token and store it in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenWithUser, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result: TokenWithUser = self.api.post("/auth/login", &body).await?;
        self.api
            .session()
            .store(&result.access_token)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        info!(user_id = result.user.user_id, "Logged in");
        Ok(result)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, ApiError> {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let user: User = self.api.post("/auth/register", &body).await?;
        info!(user_id = user.user_id, "Account registered");
        Ok(user)
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<MessageResponse, ApiError> {
        let body = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        };
        self.api.post("/auth/verify-email-otp", &body).await
    }

    pub async fn resend_otp(&self, email: &str) -> Result<MessageResponse, ApiError> {
        if email.trim().is_empty() {
            warn!("Resend requested without an email");
            return Err(ApiError::BadRequest(
                "No email address to send the code to.".to_string(),
            ));
        }
        self.api
            .post_action("/auth/resend-otp", &[("email", email.trim())])
            .await
    }

    /// Forget the session and go to the login page.
    pub fn logout(&self) {
        self.api.session().clear();
        self.api.navigator().replace(Location::new(Route::Login));
        info!("Logged out");
    }
}
