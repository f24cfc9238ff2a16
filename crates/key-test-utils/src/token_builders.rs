//! Builder patterns for test data construction
//!
//! Provides a fluent API for hand-crafting tokens the service itself would
//! never issue: missing `exp`, foreign secrets, other algorithms.

use crate::test_ids::{ONE_HOUR_SECONDS, TEST_TOKEN_SECRET};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{Map, Value};

/// Builder for test token claims and compact tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("alice")
///     .with_claim("role", "admin")
///     .expires_in(3600)
///     .build();
/// ```
pub struct TestTokenBuilder {
    sub: Option<String>,
    iat: i64,
    exp: Option<i64>,
    jti: Option<String>,
    custom: Map<String, Value>,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults (one hour lifetime)
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: Some("test-subject".to_string()),
            iat: now.timestamp(),
            exp: Some((now + Duration::seconds(ONE_HOUR_SECONDS)).timestamp()),
            jti: Some("00000000-0000-4000-8000-000000000001".to_string()),
            custom: Map::new(),
            algorithm: Algorithm::HS256,
        }
    }

    /// Set the subject
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = Some(subject.to_string());
        self
    }

    /// Add a custom claim
    pub fn with_claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.custom.insert(name.to_string(), value.into());
        self
    }

    /// Set expiration in seconds from now (negative for already expired)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(seconds)).timestamp());
        self
    }

    /// Set expiration to an exact instant
    pub fn expires_at(mut self, instant: DateTime<Utc>) -> Self {
        self.exp = Some(instant.timestamp());
        self
    }

    /// Omit the `exp` claim entirely
    pub fn without_exp(mut self) -> Self {
        self.exp = None;
        self
    }

    /// Omit the `sub` claim entirely
    pub fn without_subject(mut self) -> Self {
        self.sub = None;
        self
    }

    /// Sign with a different HMAC algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the claims as a JSON value
    pub fn build_claims(&self) -> Value {
        let mut claims = Map::new();
        if let Some(sub) = &self.sub {
            claims.insert("sub".to_string(), Value::from(sub.clone()));
        }
        claims.insert("iat".to_string(), Value::from(self.iat));
        if let Some(exp) = self.exp {
            claims.insert("exp".to_string(), Value::from(exp));
        }
        if let Some(jti) = &self.jti {
            claims.insert("jti".to_string(), Value::from(jti.clone()));
        }
        for (name, value) in &self.custom {
            claims.insert(name.clone(), value.clone());
        }
        Value::Object(claims)
    }

    /// Sign with [`TEST_TOKEN_SECRET`]
    pub fn build(self) -> String {
        self.sign_with(TEST_TOKEN_SECRET)
    }

    /// Sign with an arbitrary secret
    pub fn sign_with(self, secret: &[u8]) -> String {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        encode(&header, &self.build_claims(), &EncodingKey::from_secret(secret))
            .expect("test token signing")
    }

    /// Unsigned token with header `alg: none` and an empty signature segment
    pub fn build_unsigned(self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.build_claims().to_string());
        format!("{header}.{payload}.")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the last character of `token` with a different Base64url character.
pub fn tamper_last_char(token: &str) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    if let Some(last) = chars.last_mut() {
        *last = if *last == 'A' { 'B' } else { 'A' };
    }
    chars.into_iter().collect()
}
