//! Key Service Library
//!
//! Asymmetric key handling and HMAC-signed session tokens.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Key generation, signatures, key encodings, token primitives
//! - `errors` - Error types
//! - `observability` - Logging setup and privacy helpers
//! - `services` - Key file storage and token issuance/validation

pub mod config;
pub mod crypto;
pub mod errors;
pub mod observability;
pub mod services;
