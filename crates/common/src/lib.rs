//! Common utilities and types shared across key-service components.

#![warn(clippy::pedantic)]

/// Module for common data types
pub mod types;

/// Module for common configuration
pub mod config;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for compact token guards (size limits, header inspection, expiry checks)
pub mod jwt;
