//! Cryptographic fixtures for testing
//!
//! Key pairs are generated once per test binary and cached, since DSA domain
//! parameter generation takes seconds. Token services use fixed secrets so
//! tokens minted in one test can be checked in another.

use crate::test_ids::{TEST_TOKEN_SECRET, TEST_TOKEN_SECRET_OTHER};
use common::secret::SecretBox;
use key_service::config::TokenServiceConfig;
use key_service::crypto::{generate_key_pair, KeyAlgorithm, KeyPair, DEFAULT_KEY_SIZE};
use key_service::services::token_service::TokenService;
use std::sync::OnceLock;

/// Shared 2048-bit DSA key pair.
pub fn test_dsa_key_pair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| {
        generate_key_pair(KeyAlgorithm::Dsa, DEFAULT_KEY_SIZE).expect("DSA fixture generation")
    })
}

/// Shared 2048-bit RSA key pair.
pub fn test_rsa_key_pair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| {
        generate_key_pair(KeyAlgorithm::Rsa, DEFAULT_KEY_SIZE).expect("RSA fixture generation")
    })
}

/// A second RSA pair, for "signed by someone else" cases.
pub fn test_other_rsa_key_pair() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| {
        generate_key_pair(KeyAlgorithm::Rsa, DEFAULT_KEY_SIZE).expect("RSA fixture generation")
    })
}

/// Shared 2048-bit key pair for `algorithm`.
pub fn test_key_pair(algorithm: KeyAlgorithm) -> &'static KeyPair {
    match algorithm {
        KeyAlgorithm::Dsa => test_dsa_key_pair(),
        KeyAlgorithm::Rsa => test_rsa_key_pair(),
    }
}

/// Token service configuration with [`TEST_TOKEN_SECRET`].
pub fn test_token_config() -> TokenServiceConfig {
    TokenServiceConfig::new(SecretBox::new(Box::new(TEST_TOKEN_SECRET.to_vec())))
}

/// Token service keyed with [`TEST_TOKEN_SECRET`].
pub fn test_token_service() -> TokenService {
    TokenService::new(test_token_config()).expect("test token secret is long enough")
}

/// Token service keyed with [`TEST_TOKEN_SECRET_OTHER`].
pub fn other_token_service() -> TokenService {
    TokenService::new(TokenServiceConfig::new(SecretBox::new(Box::new(
        TEST_TOKEN_SECRET_OTHER.to_vec(),
    ))))
    .expect("test token secret is long enough")
}
