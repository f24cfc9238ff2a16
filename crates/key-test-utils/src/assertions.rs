//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions that inspect a compact token without
//! verifying it. Signature checks belong to the service under test.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Token header structure
#[derive(Debug, Deserialize)]
struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

/// Standard token claims
#[derive(Debug, Deserialize)]
struct StandardClaims {
    pub sub: String,
    #[expect(dead_code)] // Used for payload structure validation but not accessed
    pub iat: i64,
    #[expect(dead_code)] // Used for payload structure validation but not accessed
    pub exp: i64,
    pub jti: String,
}

fn decode_segment(token: &str, index: usize) -> Vec<u8> {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("Token has no segment {}", index));
    URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Token segment {} is not base64url: {}", index, e))
}

fn payload(token: &str) -> Map<String, Value> {
    serde_json::from_slice(&decode_segment(token, 1)).expect("Failed to parse token payload")
}

/// Custom assertions for compact tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_token()
///     .assert_for_subject("user123")
///     .assert_has_claim("role", &json!("admin"));
/// ```
pub trait TokenAssertions {
    /// Assert three segments, an HS256 header, and the standard claims
    fn assert_valid_token(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the token carries claim `name` with `value`
    fn assert_has_claim(&self, name: &str, value: &Value) -> &Self;

    /// Assert that the token expires within the specified seconds (5 s tolerance)
    fn assert_expires_in(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_token(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "Token must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header: TokenHeader = serde_json::from_slice(&decode_segment(self, 0))
            .expect("Failed to parse token header JSON");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims: StandardClaims = serde_json::from_slice(&decode_segment(self, 1))
            .expect("Token payload lacks standard claims");
        assert!(!claims.jti.is_empty(), "jti must not be empty");
        assert!(!claims.sub.is_empty(), "sub must not be empty");

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = payload(self);
        assert_eq!(
            claims.get("sub").and_then(Value::as_str),
            Some(subject),
            "Expected subject '{}'",
            subject
        );
        self
    }

    fn assert_has_claim(&self, name: &str, value: &Value) -> &Self {
        let claims = payload(self);
        assert_eq!(
            claims.get(name),
            Some(value),
            "Expected claim '{}' to be {}",
            name,
            value
        );
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let exp = payload(self)
            .get("exp")
            .and_then(Value::as_i64)
            .expect("Token has no integral exp");
        let expires_in = exp - chrono::Utc::now().timestamp();

        // Allow 5-second tolerance for slow test machines
        assert!(
            (expires_in - seconds).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );
        self
    }
}
