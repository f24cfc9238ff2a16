//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate with key-service
//! specific guidance. Use these types for token signing secrets and any
//! other symmetric key material that passes through configuration.
//!
//! # Compile-Time Safety
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so any
//! struct deriving `Debug` that holds a secret gets safe logging behavior for
//! free. Secrets cannot leak through `{:?}` or tracing fields.
//!
//! # Memory Safety
//!
//! Secrets are zeroized when dropped.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretBox};
//!
//! #[derive(Debug)]
//! struct SigningConfig {
//!     issuer: String,
//!     hmac_secret: SecretBox<Vec<u8>>,
//! }
//!
//! let config = SigningConfig {
//!     issuer: "keytool".to_string(),
//!     hmac_secret: SecretBox::new(Box::new(vec![7u8; 32])),
//! };
//!
//! // Safe: the secret bytes are redacted
//! println!("{:?}", config);
//!
//! // Access requires an explicit call
//! let bytes: &[u8] = config.hmac_secret.expose_secret();
//! assert_eq!(bytes.len(), 32);
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for:
//! - Base64-encoded secrets read from the environment or a properties file
//!
//! Use `SecretBox<Vec<u8>>` for:
//! - Decoded HMAC signing secrets held by the token service

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};

/// Clone a boxed byte secret without exposing it to anything but the new box.
#[must_use]
pub fn clone_secret_bytes(secret: &SecretBox<Vec<u8>>) -> SecretBox<Vec<u8>> {
    SecretBox::new(Box::new(secret.expose_secret().clone()))
}
