//! Fixed test values for deterministic tests
//!
//! Using fixed values prevents flaky tests caused by random data.

// Subjects
pub const TEST_SUBJECT: &str = "user123";
pub const TEST_SUBJECT_OTHER: &str = "user456";

// Payloads for signature tests
pub const TEST_DATA: &str = "test_data_123456";
pub const TEST_DATA_MUTATED: &str = "test_data_123457";

// Custom claims
pub const TEST_ROLE_CLAIM: &str = "role";
pub const TEST_ROLE_ADMIN: &str = "admin";

// Token secrets (32 bytes each, never used outside tests)
pub const TEST_TOKEN_SECRET: &[u8; 32] = b"test-secret-do-not-use-in-prod!!";
pub const TEST_TOKEN_SECRET_OTHER: &[u8; 32] = b"another-secret-not-for-prod-use!";

// Token lifetimes
pub const ONE_HOUR_SECONDS: i64 = 3600;
