//! # Key Service Test Utilities
//!
//! Shared test utilities for the key service.
//!
//! This crate provides:
//! - Cached key pair fixtures (generated once per test binary)
//! - A fixed token secret and ready-made token services
//! - Test data builders (TestTokenBuilder)
//! - Fixed test values (subjects, payloads)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use key_test_utils::*;
//!
//! #[test]
//! fn test_example() {
//!     let pair = test_dsa_key_pair();
//!     let service = test_token_service();
//!
//!     let token = TestTokenBuilder::new()
//!         .for_subject(TEST_SUBJECT)
//!         .with_claim("role", "admin")
//!         .build();
//!
//!     token.assert_valid_token()
//!          .assert_for_subject(TEST_SUBJECT);
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use test_ids::*;
pub use token_builders::*;
