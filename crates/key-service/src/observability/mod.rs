//! Observability for the key service
//!
//! # Privacy by Default
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit safe field allow-listing.
//! Fields are categorized as:
//! - **SAFE**: Can be logged in plaintext (algorithm names, key sizes, paths, rejection reasons)
//! - **HASHED**: Must be SHA-256 hashed for correlation (token subjects)
//! - **NEVER**: Must never appear in logs (secrets, tokens, private keys, signed data)
//!
//! Log targets: `crypto` for primitives, `key_store` for key files, `token` for
//! token issuance and validation.

use crate::errors::KsError;
use common::config::LoggingConfig;
use sha2::{Digest, Sha256};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.log_level` when set. Output goes to stderr so
/// command output on stdout stays machine-readable. Calling this twice is a
/// no-op for the second call.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(common::config::DEFAULT_LOG_LEVEL));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for fields like token subjects that need correlation across log
/// entries but should not be stored in plaintext.
///
/// # Privacy
///
/// This is NOT cryptographically secure for secrets - it's a one-way hash
/// for correlation purposes only.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    // 32 bits is enough for correlation
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Error categories for log fields (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller supplied bad input (key text, key size, claim name)
    Input,
    /// Token or signature failed verification
    Cryptographic,
    /// Filesystem failures
    Storage,
    /// Primitive failures (RNG, encoder)
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Cryptographic => "cryptographic",
            ErrorCategory::Storage => "storage",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&KsError> for ErrorCategory {
    fn from(err: &KsError) -> Self {
        match err {
            KsError::KeyFormat(_)
            | KsError::UnsupportedKeySize { .. }
            | KsError::MissingClaim(_) => ErrorCategory::Input,
            KsError::Security(_) => ErrorCategory::Cryptographic,
            KsError::Io { .. } => ErrorCategory::Storage,
            KsError::Crypto(_) => ErrorCategory::Internal,
        }
    }
}
