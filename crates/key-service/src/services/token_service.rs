//! Session token issuance and validation.
//!
//! Tokens are compact HS256 tokens carrying `sub`, `iat`, `exp`, `jti` and any
//! custom claims at the top level of the payload.
//!
//! Every read path verifies the signature before looking at a single claim.
//! `validate_token` then also requires `now < exp`; `get_claim` and
//! `get_expiration_time` do not check freshness.

use crate::config::{TokenServiceConfig, MIN_TOKEN_SECRET_BYTES};
use crate::crypto::jwt::{sign_token, verify_token};
use crate::errors::KsError;
use crate::observability::hash_for_correlation;
use chrono::{DateTime, Utc};
use common::jwt::{validate_exp_at, TokenRejection};
use common::secret::ExposeSecret;
use common::types::TokenId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::instrument;

/// Claim names owned by the service. Custom claims may not override them.
pub const RESERVED_CLAIMS: &[&str] = &["sub", "iat", "exp", "jti"];

/// Payload of an issued token.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Unique token identifier
    pub jti: String,
    /// Caller-supplied claims, flattened into the payload
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("jti", &self.jti)
            .field("custom_claims", &self.custom.len())
            .finish()
    }
}

/// Issues and verifies tokens with one fixed HMAC secret.
///
/// Holds no mutable state; share it across threads behind an `Arc` or clone it.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: TokenServiceConfig,
}

impl TokenService {
    /// Fails with `KeyFormat` if the secret is shorter than 32 bytes.
    pub fn new(config: TokenServiceConfig) -> Result<Self, KsError> {
        let len = config.secret.expose_secret().len();
        if len < MIN_TOKEN_SECRET_BYTES {
            return Err(KsError::KeyFormat(format!(
                "Token secret must be at least {} bytes, got {}",
                MIN_TOKEN_SECRET_BYTES, len
            )));
        }
        Ok(Self { config })
    }

    /// Issue a token for `subject` expiring at `expires_at`.
    ///
    /// `iat` is the current time and `jti` a fresh UUID v4. Both times are
    /// stored in whole seconds, so sub-second precision of `expires_at` is
    /// dropped. Custom claims named like a reserved claim are ignored.
    #[instrument(skip_all)]
    pub fn issue_token(
        &self,
        subject: &str,
        custom_claims: Option<Map<String, Value>>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, KsError> {
        let mut custom = custom_claims.unwrap_or_default();
        for name in RESERVED_CLAIMS {
            if custom.remove(*name).is_some() {
                tracing::debug!(
                    target: "token",
                    claim = *name,
                    "Dropped custom claim shadowing a reserved claim"
                );
            }
        }

        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            jti: TokenId::new().to_string(),
            custom,
        };

        let token = sign_token(&claims, self.config.secret.expose_secret())?;

        tracing::debug!(
            target: "token",
            subject = %hash_for_correlation(subject),
            jti = %claims.jti,
            exp = claims.exp,
            "Token issued"
        );

        Ok(token)
    }

    /// `true` iff the signature verifies and the current time is strictly before `exp`.
    ///
    /// Never fails: malformed, tampered, expired, or `exp`-less tokens all give `false`.
    pub fn validate_token(&self, token: &str) -> bool {
        self.validate_token_at(token, Utc::now())
    }

    /// [`validate_token`](Self::validate_token) evaluated at `now` instead of the current time.
    #[instrument(skip_all)]
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.check(token, now.timestamp()) {
            Ok(()) => true,
            Err(rejection) => {
                tracing::debug!(target: "token", reason = rejection.reason(), "Token rejected");
                false
            }
        }
    }

    /// Value of claim `name`, or `None` if the token does not carry it.
    ///
    /// Fails with `Security` if the token does not verify. Expiration is not
    /// checked.
    #[instrument(skip_all)]
    pub fn get_claim(&self, token: &str, name: &str) -> Result<Option<Value>, KsError> {
        let mut claims = self.verified_claims(token)?;
        Ok(claims.remove(name))
    }

    /// The token's `exp` as an instant.
    ///
    /// Fails with `Security` if the token does not verify and with
    /// `MissingClaim` if it has no integral `exp`. Expiration is not checked.
    #[instrument(skip_all)]
    pub fn get_expiration_time(&self, token: &str) -> Result<DateTime<Utc>, KsError> {
        let claims = self.verified_claims(token)?;
        let exp = claims
            .get("exp")
            .and_then(Value::as_i64)
            .ok_or_else(|| KsError::MissingClaim("exp".to_string()))?;

        DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| KsError::MissingClaim(format!("exp out of range: {}", exp)))
    }

    /// All claims of a verified token. Expiration is not checked.
    #[instrument(skip_all)]
    pub fn get_claims(&self, token: &str) -> Result<TokenClaims, KsError> {
        let claims = self.verified_claims(token)?;
        serde_json::from_value(Value::Object(claims)).map_err(|e| {
            tracing::debug!(target: "token", error = %e, "Verified token lacks standard claims");
            KsError::MissingClaim(format!("Token payload lacks standard claims: {}", e))
        })
    }

    fn verified_claims(&self, token: &str) -> Result<Map<String, Value>, KsError> {
        verify_token(token, self.config.secret.expose_secret()).map_err(|rejection| {
            tracing::debug!(
                target: "token",
                reason = rejection.reason(),
                "Claim read on unverified token"
            );
            KsError::Security(format!("Token failed verification: {}", rejection.reason()))
        })
    }

    /// Signature first, then `exp`.
    fn check(&self, token: &str, now: i64) -> Result<(), TokenRejection> {
        let claims = verify_token(token, self.config.secret.expose_secret())?;
        let exp = claims
            .get("exp")
            .and_then(Value::as_i64)
            .ok_or(TokenRejection::MissingExpiration)?;
        validate_exp_at(exp, now)
    }
}
