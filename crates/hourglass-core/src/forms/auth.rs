//! Login, sign-up and email verification forms.

use tracing::{error, info};

use super::input::{self, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH};
use super::otp::OtpInput;
use super::{non_blank, FormError, SubmitError};
use crate::api::{ApiClient, ApiError};
use crate::models::TokenWithUser;
use crate::nav::{Location, NavState, Route};

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginFocus,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new(email: Option<String>) -> Self {
        let email = email.unwrap_or_default();
        let focus = if email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        Self {
            email,
            password: String::new(),
            focus,
            error: None,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Email,
        };
    }

    pub fn insert_char(&mut self, c: char) -> bool {
        self.error = None;
        match self.focus {
            LoginFocus::Email => input::push_char(&mut self.email, MAX_EMAIL_LENGTH, c),
            LoginFocus::Password => input::push_char(&mut self.password, MAX_PASSWORD_LENGTH, c),
        }
    }

    pub fn delete_char(&mut self) {
        match self.focus {
            LoginFocus::Email => self.email.pop(),
            LoginFocus::Password => self.password.pop(),
        };
    }

    pub fn validate(&self) -> Result<(String, String), FormError> {
        let email = non_blank(&self.email).ok_or(FormError::Required("Email"))?;
        if self.password.is_empty() {
            return Err(FormError::Required("Password"));
        }
        Ok((email, self.password.clone()))
    }

    /// Log in and navigate to where the user was headed.
    ///
    /// `current` is the login location; its remembered destination wins,
    /// falling back to the calendar.
    pub async fn submit(
        &self,
        api: &ApiClient,
        current: &Location,
    ) -> Result<TokenWithUser, SubmitError> {
        let (email, password) = self.validate()?;
        let result = api.auth().login(&email, &password).await?;
        api.navigator().replace(destination_after_login(current));
        Ok(result)
    }

    /// Message for a failed submission.
    pub fn error_message(err: &SubmitError) -> String {
        match err {
            SubmitError::Invalid(e) => e.to_string(),
            SubmitError::Api(ApiError::Unauthorized) => "Invalid email or password".to_string(),
            SubmitError::Api(e @ ApiError::AccessDenied(_)) => e
                .detail()
                .unwrap_or("Please verify your email before logging in.")
                .to_string(),
            SubmitError::Api(e @ ApiError::Network(_)) => e.user_message("log in"),
            SubmitError::Api(e) => {
                error!(error = %e, "Login failed");
                "Login failed. Please try again.".to_string()
            }
        }
    }
}

/// Where a successful login lands.
pub fn destination_after_login(current: &Location) -> Location {
    match current.from() {
        Some(from) if from.route.is_protected() => from.clone(),
        _ => Location::new(Route::Calendar),
    }
}

/// Sign-up form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupFocus {
    Name,
    Email,
    Password,
}

#[derive(Debug, Clone)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub focus: SignupFocus,
    pub error: Option<String>,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            focus: SignupFocus::Name,
            error: None,
        }
    }
}

impl SignupForm {
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            SignupFocus::Name => SignupFocus::Email,
            SignupFocus::Email => SignupFocus::Password,
            SignupFocus::Password => SignupFocus::Name,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            SignupFocus::Name => SignupFocus::Password,
            SignupFocus::Email => SignupFocus::Name,
            SignupFocus::Password => SignupFocus::Email,
        };
    }

    pub fn insert_char(&mut self, c: char) -> bool {
        self.error = None;
        match self.focus {
            SignupFocus::Name => input::push_char(&mut self.name, MAX_NAME_LENGTH, c),
            SignupFocus::Email => input::push_char(&mut self.email, MAX_EMAIL_LENGTH, c),
            SignupFocus::Password => input::push_char(&mut self.password, MAX_PASSWORD_LENGTH, c),
        }
    }

    pub fn delete_char(&mut self) {
        match self.focus {
            SignupFocus::Name => self.name.pop(),
            SignupFocus::Email => self.email.pop(),
            SignupFocus::Password => self.password.pop(),
        };
    }

    pub fn validate(&self) -> Result<(String, String, String), FormError> {
        let name = non_blank(&self.name).ok_or(FormError::Required("Name"))?;
        let email = non_blank(&self.email).ok_or(FormError::Required("Email"))?;
        if self.password.is_empty() {
            return Err(FormError::Required("Password"));
        }
        Ok((name, email, self.password.clone()))
    }

    /// Register, then continue to verification carrying the credentials.
    pub async fn submit(&self, api: &ApiClient) -> Result<(), SubmitError> {
        let (name, email, password) = self.validate()?;
        api.auth().register(&name, &email, &password).await?;
        api.navigator().replace(Location::with_state(
            Route::VerifyEmail,
            NavState::Signup { email, password },
        ));
        Ok(())
    }
}

/// Where verification sent the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verified {
    /// Logged in automatically with the sign-up password
    LoggedIn,
    /// Password unknown; the user must log in by hand
    NeedsLogin,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyForm {
    pub email: String,
    password: Option<String>,
    pub otp: OtpInput,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl VerifyForm {
    /// Form for the verification page, picking up sign-up credentials if
    /// the location carries them.
    pub fn from_location(location: &Location) -> Self {
        match &location.state {
            NavState::Signup { email, password } => Self {
                email: email.clone(),
                password: Some(password.clone()).filter(|p| !p.is_empty()),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    pub fn knows_password(&self) -> bool {
        self.password.is_some()
    }

    /// Confirm the code, then log in when the password is known.
    pub async fn submit(&self, api: &ApiClient) -> Result<Verified, SubmitError> {
        let email = non_blank(&self.email).ok_or(FormError::MissingEmail)?;
        let code = self.otp.code().ok_or(FormError::IncompleteCode)?;
        api.auth().verify_otp(&email, &code).await?;
        info!("Email verified");

        match &self.password {
            Some(password) => {
                api.auth().login(&email, password).await?;
                api.navigator().replace(Location::new(Route::Calendar));
                Ok(Verified::LoggedIn)
            }
            None => {
                api.navigator().replace(Location::new(Route::Login));
                Ok(Verified::NeedsLogin)
            }
        }
    }

    pub async fn resend(&self, api: &ApiClient) -> Result<(), SubmitError> {
        let email = non_blank(&self.email).ok_or(FormError::MissingEmail)?;
        api.auth().resend_otp(&email).await?;
        Ok(())
    }

    pub fn error_message(err: &SubmitError) -> String {
        Self::message_or(err, "Invalid or expired code. Please try again.")
    }

    pub fn resend_error_message(err: &SubmitError) -> String {
        Self::message_or(err, "Failed to resend OTP. Please try again later.")
    }

    fn message_or(err: &SubmitError, fallback: &str) -> String {
        match err {
            SubmitError::Invalid(e) => e.to_string(),
            SubmitError::Api(e) => e
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Login ---

    #[test]
    fn test_login_requires_both_fields() {
        let mut form = LoginForm::new(None);
        assert_eq!(form.validate(), Err(FormError::Required("Email")));
        form.email = "ana@uni.edu".to_string();
        assert_eq!(form.validate(), Err(FormError::Required("Password")));
        form.password = "pw".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_login_focus_starts_on_password_with_known_email() {
        let form = LoginForm::new(Some("ana@uni.edu".to_string()));
        assert_eq!(form.focus, LoginFocus::Password);
        let form = LoginForm::new(None);
        assert_eq!(form.focus, LoginFocus::Email);
    }

    #[test]
    fn test_login_typing() {
        let mut form = LoginForm::new(None);
        form.error = Some("old".to_string());
        for c in "a@b".chars() {
            form.insert_char(c);
        }
        assert!(form.error.is_none());
        form.toggle_focus();
        form.insert_char('x');
        form.delete_char();
        assert_eq!(form.email, "a@b");
        assert!(form.password.is_empty());
    }

    #[test]
    fn test_login_error_messages() {
        let unauthorized = SubmitError::Api(ApiError::Unauthorized);
        assert_eq!(LoginForm::error_message(&unauthorized), "Invalid email or password");

        let unverified = SubmitError::Api(ApiError::AccessDenied(
            "Please verify your email before logging in.".to_string(),
        ));
        assert_eq!(
            LoginForm::error_message(&unverified),
            "Please verify your email before logging in."
        );

        let server = SubmitError::Api(ApiError::ServerError("boom".to_string()));
        assert_eq!(LoginForm::error_message(&server), "Login failed. Please try again.");
    }

    #[test]
    fn test_destination_after_login() {
        let attempted = Location::new(Route::Invitations);
        let login = Location::login_from(attempted.clone());
        assert_eq!(destination_after_login(&login), attempted);
        assert_eq!(
            destination_after_login(&Location::new(Route::Login)),
            Location::new(Route::Calendar)
        );
    }

    // --- Sign up ---

    #[test]
    fn test_signup_requires_all_fields() {
        let mut form = SignupForm::default();
        assert_eq!(form.validate(), Err(FormError::Required("Name")));
        form.name = "Ana".to_string();
        assert_eq!(form.validate(), Err(FormError::Required("Email")));
        form.email = "ana@uni.edu".to_string();
        assert_eq!(form.validate(), Err(FormError::Required("Password")));
        form.password = "secret".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_signup_focus_cycles() {
        let mut form = SignupForm::default();
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focus, SignupFocus::Password);
        form.focus_next();
        assert_eq!(form.focus, SignupFocus::Name);
        form.focus_prev();
        assert_eq!(form.focus, SignupFocus::Password);
    }

    // --- Verify ---

    #[test]
    fn test_verify_form_from_signup_state() {
        let location = Location::with_state(
            Route::VerifyEmail,
            NavState::Signup {
                email: "ana@uni.edu".to_string(),
                password: "secret".to_string(),
            },
        );
        let form = VerifyForm::from_location(&location);
        assert_eq!(form.email, "ana@uni.edu");
        assert!(form.knows_password());

        let bare = VerifyForm::from_location(&Location::new(Route::VerifyEmail));
        assert!(bare.email.is_empty());
        assert!(!bare.knows_password());
    }

    #[test]
    fn test_verify_error_message_prefers_detail() {
        let err = SubmitError::Api(ApiError::BadRequest("OTP expired".to_string()));
        assert_eq!(VerifyForm::error_message(&err), "OTP expired");
        let err = SubmitError::Api(ApiError::BadRequest(String::new()));
        assert_eq!(
            VerifyForm::error_message(&err),
            "Invalid or expired code. Please try again."
        );
        let err = SubmitError::Invalid(FormError::IncompleteCode);
        assert_eq!(VerifyForm::error_message(&err), "Please enter the 6-digit code.");
    }

    #[test]
    fn test_resend_error_message() {
        let err = SubmitError::Api(ApiError::ServerError("boom".to_string()));
        assert_eq!(
            VerifyForm::resend_error_message(&err),
            "Failed to resend OTP. Please try again later."
        );
        let err = SubmitError::Api(ApiError::BadRequest("User already verified".to_string()));
        assert_eq!(VerifyForm::resend_error_message(&err), "User already verified");
        let err = SubmitError::Invalid(FormError::MissingEmail);
        assert_eq!(
            VerifyForm::resend_error_message(&err),
            FormError::MissingEmail.to_string()
        );
    }
}
