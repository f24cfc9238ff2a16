use crate::crypto::KeyAlgorithm;
use base64::{engine::general_purpose, Engine as _};
use common::config::{LoggingConfig, DEFAULT_LOG_LEVEL};
use common::secret::{clone_secret_bytes, ExposeSecret, SecretBox};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Minimum HMAC secret length for token signing (256 bits).
pub const MIN_TOKEN_SECRET_BYTES: usize = 32;

/// Default lifetime of tokens issued by `keytool issue`.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

pub const DEFAULT_PUBLIC_KEY_PATH: &str = "public_key.pem";
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "private_key.pem";

#[derive(Debug)]
pub struct Config {
    /// Absent when no token operations are configured.
    pub token_secret: Option<SecretBox<Vec<u8>>>,
    pub key_algorithm: KeyAlgorithm,
    /// Unset means the caller picks. `keytool generate` then uses
    /// [`DEFAULT_KEY_SIZE`](crate::crypto::DEFAULT_KEY_SIZE).
    pub key_size: Option<usize>,
    pub public_key_path: PathBuf,
    pub private_key_path: PathBuf,
    pub token_ttl_seconds: i64,
    pub logging: LoggingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Invalid token secret: {0}")]
    InvalidTokenSecret(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Failed to read properties file {}: {source}", path.display())]
    PropertiesFile {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },
}

/// Immutable configuration for a `TokenService`.
#[derive(Debug)]
pub struct TokenServiceConfig {
    /// HMAC-SHA256 signing secret, at least [`MIN_TOKEN_SECRET_BYTES`] long.
    pub secret: SecretBox<Vec<u8>>,
}

impl TokenServiceConfig {
    pub fn new(secret: SecretBox<Vec<u8>>) -> Self {
        Self { secret }
    }

    /// Fresh random secret from the OS CSPRNG.
    pub fn generate() -> Result<Self, ConfigError> {
        let mut bytes = vec![0u8; MIN_TOKEN_SECRET_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| {
                ConfigError::InvalidTokenSecret(format!("Random generation failed: {}", e))
            })?;
        Ok(Self::new(SecretBox::new(Box::new(bytes))))
    }
}

impl Clone for TokenServiceConfig {
    fn clone(&self) -> Self {
        Self {
            secret: clone_secret_bytes(&self.secret),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `KEY=VALUE` properties file, with process
    /// environment variables taking precedence over file entries.
    pub fn from_properties_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_layers(read_properties_file(path)?, env::vars())
    }

    fn from_layers(
        mut vars: HashMap<String, String>,
        overrides: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        vars.extend(overrides);
        Self::from_vars(&vars)
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let token_secret = vars
            .get("KS_TOKEN_SECRET")
            .map(|encoded| decode_token_secret(encoded))
            .transpose()?;

        let key_algorithm = match vars.get("KS_KEY_ALGORITHM") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "KS_KEY_ALGORITHM".to_string(),
                reason: format!("'{}' is not DSA or RSA", value),
            })?,
            None => KeyAlgorithm::Dsa,
        };

        let key_size = vars
            .get("KS_KEY_SIZE")
            .map(|value| parse_key_size(value, key_algorithm))
            .transpose()?;

        let public_key_path = vars
            .get("KS_PUBLIC_KEY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_KEY_PATH));

        let private_key_path = vars
            .get("KS_PRIVATE_KEY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PRIVATE_KEY_PATH));

        let token_ttl_seconds = match vars.get("KS_TOKEN_TTL_SECONDS") {
            Some(value) => {
                let ttl = value.parse::<i64>().map_err(|e| ConfigError::InvalidValue {
                    name: "KS_TOKEN_TTL_SECONDS".to_string(),
                    reason: e.to_string(),
                })?;
                if ttl <= 0 {
                    return Err(ConfigError::InvalidValue {
                        name: "KS_TOKEN_TTL_SECONDS".to_string(),
                        reason: format!("must be positive, got {}", ttl),
                    });
                }
                ttl
            }
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let log_level = vars
            .get("KS_LOG_LEVEL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let json_logs = match vars.get("KS_LOG_JSON").map(String::as_str) {
            None => false,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "KS_LOG_JSON".to_string(),
                    reason: format!("'{}' is not a boolean", other),
                })
            }
        };

        Ok(Config {
            token_secret,
            key_algorithm,
            key_size,
            public_key_path,
            private_key_path,
            token_ttl_seconds,
            logging: LoggingConfig {
                log_level,
                json_logs,
            },
        })
    }

    /// Token service configuration built from `KS_TOKEN_SECRET`.
    pub fn token_service_config(&self) -> Result<TokenServiceConfig, ConfigError> {
        let secret = self
            .token_secret
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("KS_TOKEN_SECRET".to_string()))?;
        Ok(TokenServiceConfig::new(clone_secret_bytes(secret)))
    }
}

fn parse_key_size(value: &str, algorithm: KeyAlgorithm) -> Result<usize, ConfigError> {
    let key_size = value.parse::<usize>().map_err(|e| ConfigError::InvalidValue {
        name: "KS_KEY_SIZE".to_string(),
        reason: e.to_string(),
    })?;

    if !algorithm.is_supported_key_size(key_size) {
        return Err(ConfigError::InvalidValue {
            name: "KS_KEY_SIZE".to_string(),
            reason: format!(
                "{} is not supported for {} (supported: {:?})",
                key_size,
                algorithm,
                algorithm.supported_key_sizes()
            ),
        });
    }

    Ok(key_size)
}

fn decode_token_secret(encoded: &str) -> Result<SecretBox<Vec<u8>>, ConfigError> {
    let secret = SecretBox::new(Box::new(
        general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(ConfigError::Base64Error)?,
    ));

    let len = secret.expose_secret().len();
    if len < MIN_TOKEN_SECRET_BYTES {
        return Err(ConfigError::InvalidTokenSecret(format!(
            "Expected at least {} bytes, got {}",
            MIN_TOKEN_SECRET_BYTES, len
        )));
    }

    Ok(secret)
}

/// Read the entries of a dotenv-style `KEY=VALUE` file.
///
/// `#` starts a comment, values may be quoted, and an `export ` prefix is
/// allowed. Later entries override earlier ones. The process environment is
/// neither read nor modified.
pub fn read_properties_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let file_error = |source: dotenv::Error| ConfigError::PropertiesFile {
        path: path.to_path_buf(),
        source,
    };

    dotenv::from_path_iter(path)
        .map_err(file_error)?
        .map(|entry| entry.map_err(file_error))
        .collect()
}
