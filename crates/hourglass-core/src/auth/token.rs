//! Client-side inspection of bearer tokens.
//!
//! Tokens are JWTs issued by the backend. The client never verifies the
//! signature; it only reads the payload to learn when the token expires so
//! that an obviously stale session is dropped without a server round-trip.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde_json::{Map, Value};

/// Decoded token payload: arbitrary claims plus an optional `exp`.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPayload {
    claims: Map<String, Value>,
}

impl TokenPayload {
    /// Expiry in seconds since epoch, if the claim is present and numeric.
    pub fn exp(&self) -> Option<f64> {
        self.claims.get("exp").and_then(Value::as_f64)
    }

    /// Subject claim, if present.
    pub fn sub(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.claims.get(claim)
    }
}

/// Reverse the URL-safe base64 alphabet and restore padding.
fn base64url_to_standard(segment: &str) -> String {
    let mut standard: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let padded_len = standard.len().div_ceil(4) * 4;
    while standard.len() < padded_len {
        standard.push('=');
    }
    standard
}

/// Decode the payload segment of a token.
///
/// Returns `None` unless the token has exactly three dot-separated segments
/// and the middle one is base64url-encoded JSON object.
pub fn decode_payload(token: &str) -> Option<TokenPayload> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }
    let bytes = STANDARD.decode(base64url_to_standard(segments[1])).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(claims) => Some(TokenPayload { claims }),
        _ => None,
    }
}

/// Whether the token is expired at `now_secs` (seconds since epoch).
///
/// Fails closed: an undecodable token or a missing/non-numeric `exp` counts
/// as expired.
pub fn is_expired_at(token: &str, now_secs: i64) -> bool {
    match decode_payload(token).and_then(|p| p.exp()) {
        Some(exp) => (now_secs as f64) >= exp,
        None => true,
    }
}

/// Whether the token is expired right now.
pub fn is_token_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now().timestamp())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    /// Build an unsigned token around a JSON payload.
    pub(crate) fn make_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{}.{}.signature", header, body)
    }

    // -------------------------------------------------------------------------
    // Decoding
    // -------------------------------------------------------------------------

    #[test]
    fn test_decode_requires_three_segments() {
        let token = make_token(r#"{"exp": 4102444800}"#);
        let parts: Vec<&str> = token.split('.').collect();

        assert!(decode_payload(&format!("{}.{}", parts[0], parts[1])).is_none());
        assert!(decode_payload(&format!("{}.x", token)).is_none());
        assert!(decode_payload("").is_none());
        assert!(decode_payload("single").is_none());
        assert!(decode_payload(&token).is_some());
    }

    #[test]
    fn test_base64url_to_standard() {
        assert_eq!(base64url_to_standard("ab-_c"), "ab+/c===");
        assert_eq!(base64url_to_standard("abcd"), "abcd");
        assert_eq!(base64url_to_standard("abcdef"), "abcdef==");
        assert_eq!(base64url_to_standard(""), "");
    }

    #[test]
    fn test_decode_handles_url_safe_alphabet() {
        let token = make_token(r#"{"sub":"??>>??~~","exp":10}"#);
        assert!(token.split('.').nth(1).unwrap().contains(['-', '_']));
        let payload = decode_payload(&token).expect("payload should decode");
        assert_eq!(payload.sub(), Some("??>>??~~"));
        assert_eq!(payload.exp(), Some(10.0));
    }

    #[test]
    fn test_decode_failures_yield_none() {
        assert!(decode_payload("a.!!!notbase64!!!.c").is_none());
        let not_json = URL_SAFE_NO_PAD.encode("not json");
        assert!(decode_payload(&format!("a.{}.c", not_json)).is_none());
        let array = URL_SAFE_NO_PAD.encode("[1,2,3]");
        assert!(decode_payload(&format!("a.{}.c", array)).is_none());
    }

    #[test]
    fn test_decode_keeps_arbitrary_claims() {
        let token = make_token(r#"{"sub":"42","role":"student","exp":5}"#);
        let payload = decode_payload(&token).unwrap();
        assert_eq!(payload.get("role").and_then(Value::as_str), Some("student"));
    }

    // -------------------------------------------------------------------------
    // Expiry
    // -------------------------------------------------------------------------

    #[test]
    fn test_expiry_fails_closed() {
        assert!(is_expired_at("garbage", 0));
        assert!(is_expired_at(&make_token(r#"{"sub":"1"}"#), 0));
        assert!(is_expired_at(&make_token(r#"{"exp":"4102444800"}"#), 0));
        assert!(is_expired_at(&make_token(r#"{"exp":null}"#), 0));
    }

    #[test]
    fn test_expiry_boundary() {
        let token = make_token(r#"{"exp": 1000}"#);
        assert!(!is_expired_at(&token, 999));
        assert!(is_expired_at(&token, 1000));
        assert!(is_expired_at(&token, 1001));
    }

    #[test]
    fn test_expiry_against_clock() {
        assert!(is_token_expired(&make_token(r#"{"exp": 1}"#)));
        assert!(!is_token_expired(&make_token(r#"{"exp": 4102444800}"#)));
    }
}
