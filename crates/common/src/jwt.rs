//! Compact token guards shared across key-service components.
//!
//! This module provides the checks that run around signature verification:
//! - Size limits for DoS prevention
//! - Header inspection (`alg`) without trusting the payload
//! - Strict expiration checks against an explicit instant
//! - A typed rejection reason for diagnostics
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Header inspection never touches the payload; the payload is only
//!   trusted after the signature has been verified by the caller
//! - All rejection reasons render the same generic message so callers cannot
//!   leak which check failed
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{extract_alg, validate_exp_at, MAX_JWT_SIZE_BYTES};
//!
//! let alg = extract_alg(token)?;
//! // ... verify the signature, then:
//! validate_exp_at(claims_exp, now)?;
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed token size in bytes (8KB).
///
/// Tokens larger than this are rejected BEFORE any base64 decoding or HMAC
/// computation. A typical token with a handful of custom claims is well under
/// 1KB.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

// =============================================================================
// Error Types
// =============================================================================

/// Reasons a compact token is rejected.
///
/// Every variant displays the same generic message. Use [`TokenRejection::reason`]
/// for log fields.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Token size exceeds maximum allowed.
    #[error("The token is invalid or expired")]
    TooLarge,

    /// Token is not three base64url segments with a JSON header and payload.
    #[error("The token is invalid or expired")]
    Malformed,

    /// Signature does not verify under the service key, or the header names
    /// a different algorithm.
    #[error("The token is invalid or expired")]
    BadSignature,

    /// Verified payload has no numeric `exp` claim.
    #[error("The token is invalid or expired")]
    MissingExpiration,

    /// Current instant is not strictly before `exp`.
    #[error("The token is invalid or expired")]
    Expired,
}

impl TokenRejection {
    /// Short, stable label for log fields.
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            TokenRejection::TooLarge => "too_large",
            TokenRejection::Malformed => "malformed",
            TokenRejection::BadSignature => "bad_signature",
            TokenRejection::MissingExpiration => "missing_expiration",
            TokenRejection::Expired => "expired",
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Reject tokens over [`MAX_JWT_SIZE_BYTES`].
///
/// # Errors
///
/// Returns `TokenRejection::TooLarge` when the token exceeds the limit.
pub fn check_size(token: &str) -> Result<(), TokenRejection> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenRejection::TooLarge);
    }
    Ok(())
}

/// Extract the `alg` field from a compact token header without verifying it.
///
/// Used to refuse tokens whose header names an algorithm other than the one
/// the service signs with, before any key material is involved.
///
/// # Security
///
/// - Token size is checked BEFORE any parsing
/// - This function does NOT validate the signature
/// - Only the header segment is decoded; the payload is left untouched
///
/// # Errors
///
/// - `TooLarge` - Token exceeds size limit
/// - `Malformed` - Wrong segment count, bad base64url, invalid JSON, or no
///   string `alg` field
pub fn extract_alg(token: &str) -> Result<String, TokenRejection> {
    check_size(token)?;

    // Compact format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid compact format"
        );
        return Err(TokenRejection::Malformed);
    }

    let header_part = parts.first().ok_or(TokenRejection::Malformed)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode token header base64");
        TokenRejection::Malformed
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse token header JSON");
        TokenRejection::Malformed
    })?;

    header
        .get("alg")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(TokenRejection::Malformed)
}

/// Strict expiration check: accepted only while `now < exp`.
///
/// No leeway is applied. Both values are Unix epoch seconds. Call this only
/// with an `exp` taken from a payload whose signature has already been
/// verified.
///
/// # Errors
///
/// Returns `TokenRejection::Expired` when `now >= exp`.
pub fn validate_exp_at(exp: i64, now: i64) -> Result<(), TokenRejection> {
    if now >= exp {
        tracing::debug!(
            target: "common.jwt",
            exp = exp,
            now = now,
            "Token rejected: expired"
        );
        return Err(TokenRejection::Expired);
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
