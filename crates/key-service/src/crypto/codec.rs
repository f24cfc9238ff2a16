//! Standard binary key encodings and their Base64 text form.
//!
//! Public keys are SubjectPublicKeyInfo (X.509) DER, private keys are PKCS#8
//! DER. Text uses the standard Base64 alphabet with padding.

use super::{KeyAlgorithm, PrivateKey, PublicKey};
use crate::errors::KsError;
use base64::{engine::general_purpose, Engine as _};
use common::secret::SecretString;
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};

/// SubjectPublicKeyInfo DER bytes for `key`.
pub fn public_key_der(key: &PublicKey) -> Result<Vec<u8>, KsError> {
    let document = match key {
        PublicKey::Dsa(key) => key.to_public_key_der(),
        PublicKey::Rsa(key) => key.to_public_key_der(),
    }
    .map_err(|e| KsError::Crypto(format!("Public key encoding failed: {}", e)))?;

    Ok(document.into_vec())
}

/// PKCS#8 DER bytes for `key`.
pub fn private_key_der(key: &PrivateKey) -> Result<Vec<u8>, KsError> {
    let document = match key {
        PrivateKey::Dsa(key) => key.to_pkcs8_der(),
        PrivateKey::Rsa(key) => key.to_pkcs8_der(),
    }
    .map_err(|e| KsError::Crypto(format!("Private key encoding failed: {}", e)))?;

    Ok(document.as_bytes().to_vec())
}

pub fn encode_public_key(key: &PublicKey) -> Result<String, KsError> {
    Ok(general_purpose::STANDARD.encode(public_key_der(key)?))
}

/// Base64 PKCS#8 text, wrapped so it cannot reach logs by accident.
pub fn encode_private_key(key: &PrivateKey) -> Result<SecretString, KsError> {
    let encoded = general_purpose::STANDARD.encode(private_key_der(key)?);
    Ok(SecretString::from(encoded))
}

/// Parse Base64 SubjectPublicKeyInfo text as a key of `algorithm`.
pub fn decode_public_key(
    public_key_b64: &str,
    algorithm: KeyAlgorithm,
) -> Result<PublicKey, KsError> {
    let der = decode_base64(public_key_b64, "public")?;

    match algorithm {
        KeyAlgorithm::Dsa => dsa::VerifyingKey::from_public_key_der(&der).map(PublicKey::Dsa),
        KeyAlgorithm::Rsa => rsa::RsaPublicKey::from_public_key_der(&der).map(PublicKey::Rsa),
    }
    .map_err(|e| KsError::KeyFormat(format!("Invalid {} public key encoding: {}", algorithm, e)))
}

/// Parse Base64 PKCS#8 text as a key of `algorithm`.
pub fn decode_private_key(
    private_key_b64: &str,
    algorithm: KeyAlgorithm,
) -> Result<PrivateKey, KsError> {
    let der = decode_base64(private_key_b64, "private")?;

    match algorithm {
        KeyAlgorithm::Dsa => dsa::SigningKey::from_pkcs8_der(&der).map(PrivateKey::Dsa),
        KeyAlgorithm::Rsa => rsa::RsaPrivateKey::from_pkcs8_der(&der).map(PrivateKey::Rsa),
    }
    .map_err(|e| KsError::KeyFormat(format!("Invalid {} private key encoding: {}", algorithm, e)))
}

fn decode_base64(text: &str, kind: &str) -> Result<Vec<u8>, KsError> {
    general_purpose::STANDARD
        .decode(text.trim())
        .map_err(|e| KsError::KeyFormat(format!("Invalid Base64 in {} key: {}", kind, e)))
}
