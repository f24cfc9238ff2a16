use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KsError {
    /// Malformed Base64, malformed DER, unknown algorithm name, missing PEM
    /// markers, or a key that does not belong to the requested algorithm.
    #[error("Key format error: {0}")]
    KeyFormat(String),

    #[error("Unsupported key size for {algorithm}: {requested} (supported: {supported:?})")]
    UnsupportedKeySize {
        algorithm: &'static str,
        requested: usize,
        supported: &'static [usize],
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Claim extraction attempted on a token that did not verify.
    #[error("Security error: {0}")]
    Security(String),

    #[error("Missing claim: {0}")]
    MissingClaim(String),

    /// Failure inside a cryptographic primitive (RNG, encoder, signer).
    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl KsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KsError::Io {
            path: path.into(),
            source,
        }
    }
}
