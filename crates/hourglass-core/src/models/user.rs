use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub name: String,
}

/// Body of a successful `POST /auth/login`
#[derive(Clone, Deserialize)]
pub struct TokenWithUser {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl fmt::Debug for TokenWithUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenWithUser")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Plain acknowledgement, e.g. from `POST /auth/resend-otp`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"access_token":"a.b.c","token_type":"bearer","user":{"user_id":3,"email":"ana@uni.edu","name":"Ana"}}"#;
        let resp: TokenWithUser = serde_json::from_str(json).expect("login response should parse");
        assert_eq!(resp.access_token, "a.b.c");
        assert_eq!(resp.user.user_id, 3);
        assert!(!format!("{:?}", resp).contains("a.b.c"));
    }

    #[test]
    fn test_token_type_defaults() {
        let json = r#"{"access_token":"t","user":{"user_id":1,"email":"x@y.z","name":"X"}}"#;
        let resp: TokenWithUser = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token_type, "bearer");
    }
}
