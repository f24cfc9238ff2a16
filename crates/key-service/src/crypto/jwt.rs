//! HS256 compact token signing and verification.
//!
//! Keys are rebuilt from the secret on every call; nothing here holds state.

use crate::errors::KsError;
use common::jwt::{check_size, extract_alg, TokenRejection};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

/// The only algorithm tokens are signed and accepted with.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Header `alg` value matching [`TOKEN_ALGORITHM`].
pub const TOKEN_ALGORITHM_NAME: &str = "HS256";

/// Sign `claims` as a compact HS256 token.
#[instrument(skip_all)]
pub fn sign_token<T: Serialize>(claims: &T, secret: &[u8]) -> Result<String, KsError> {
    let mut header = Header::new(TOKEN_ALGORITHM);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &EncodingKey::from_secret(secret))
        .map_err(|e| KsError::Crypto(format!("Token signing operation failed: {}", e)))
}

/// Verify a compact token and return its payload as a JSON object.
///
/// Checks, in order: size, header `alg`, HMAC signature, payload shape.
/// No claim is interpreted here, in particular `exp` is NOT checked; callers
/// apply their own time rules to the verified payload.
#[instrument(skip_all)]
pub fn verify_token(token: &str, secret: &[u8]) -> Result<Map<String, Value>, TokenRejection> {
    check_size(token)?;

    let alg = extract_alg(token)?;
    if alg != TOKEN_ALGORITHM_NAME {
        tracing::debug!(target: "crypto", alg = %alg, "Token rejected: unexpected algorithm");
        return Err(TokenRejection::BadSignature);
    }

    let mut validation = Validation::new(TOKEN_ALGORITHM);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims.clear();

    let key = DecodingKey::from_secret(secret);
    let token_data = decode::<Map<String, Value>>(token, &key, &validation).map_err(|e| {
        tracing::debug!(target: "crypto", error = %e, "Token verification failed");
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenRejection::BadSignature
            }
            _ => TokenRejection::Malformed,
        }
    })?;

    Ok(token_data.claims)
}
