//! `keytool`: key pair generation, detached signatures, and session tokens
//! from the command line.
//!
//! Configuration comes from `KS_*` environment variables, optionally layered
//! over a properties file given with `--config`. Command results go to stdout,
//! logs to stderr.

use anyhow::{anyhow, Context};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use key_service::config::Config;
use key_service::crypto::{self, codec, KeyAlgorithm};
use key_service::errors::KsError;
use key_service::observability::{init_tracing, ErrorCategory};
use key_service::services::key_store_service;
use key_service::services::token_service::TokenService;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "keytool", version, about, long_about = None)]
struct Cli {
    /// Properties file with KS_* settings (environment variables take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a key pair and write it to two key files
    Generate {
        /// Key family (DSA or RSA)
        #[arg(long)]
        algorithm: Option<KeyAlgorithm>,
        /// Key size in bits (defaults to KS_KEY_SIZE, else 2048)
        #[arg(long)]
        size: Option<usize>,
        /// Public key output file
        #[arg(long)]
        public: Option<PathBuf>,
        /// Private key output file
        #[arg(long)]
        private: Option<PathBuf>,
    },

    /// Sign data with a private key file and print the Base64 signature
    Sign {
        #[arg(long)]
        private: Option<PathBuf>,
        #[arg(long)]
        algorithm: Option<KeyAlgorithm>,
        /// Data to sign (UTF-8)
        #[arg(long)]
        data: String,
    },

    /// Verify a Base64 signature against a public key file
    Verify {
        #[arg(long)]
        public: Option<PathBuf>,
        #[arg(long)]
        algorithm: Option<KeyAlgorithm>,
        #[arg(long)]
        data: String,
        #[arg(long)]
        signature: String,
    },

    /// Issue a session token
    Issue {
        #[arg(long)]
        subject: String,
        /// Custom claim as key=value; the value is read as JSON when it parses, else as a string
        #[arg(long = "claim", value_name = "KEY=VALUE")]
        claims: Vec<String>,
        /// Lifetime in seconds
        #[arg(long)]
        ttl: Option<i64>,
    },

    /// Validate a session token
    Validate {
        #[arg(long)]
        token: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_properties_file(path),
        None => Config::from_env(),
    }
    .context("Failed to load configuration")?;

    init_tracing(&config.logging);

    run(cli.command, &config).map_err(|e| {
        match error_category(&e) {
            Some(category) => error!(error_category = category.as_str(), "{:#}", e),
            None => error!("{:#}", e),
        }
        e
    })
}

fn error_category(err: &anyhow::Error) -> Option<ErrorCategory> {
    err.downcast_ref::<KsError>().map(ErrorCategory::from)
}

fn run(command: Command, config: &Config) -> anyhow::Result<ExitCode> {
    match command {
        Command::Generate {
            algorithm,
            size,
            public,
            private,
        } => {
            let algorithm = algorithm.unwrap_or(config.key_algorithm);
            let public = public.unwrap_or_else(|| config.public_key_path.clone());
            let private = private.unwrap_or_else(|| config.private_key_path.clone());

            let key_pair = match size.or(config.key_size) {
                Some(size) => {
                    info!(algorithm = %algorithm, key_size = size, "Generating key pair");
                    crypto::generate_key_pair(algorithm, size)?
                }
                None => {
                    info!(algorithm = %algorithm, "Generating key pair at default size");
                    crypto::generate_default_key_pair(algorithm)?
                }
            };
            key_store_service::write_key_pair_to_files(&key_pair, &public, &private)?;

            println!("{}", codec::encode_public_key(key_pair.public_key())?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Sign {
            private,
            algorithm,
            data,
        } => {
            let algorithm = algorithm.unwrap_or(config.key_algorithm);
            let private = private.unwrap_or_else(|| config.private_key_path.clone());

            let private_key = key_store_service::read_private_key_from_file(&private, algorithm)?;
            println!("{}", crypto::sign(data.as_bytes(), &private_key)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Verify {
            public,
            algorithm,
            data,
            signature,
        } => {
            let algorithm = algorithm.unwrap_or(config.key_algorithm);
            let public = public.unwrap_or_else(|| config.public_key_path.clone());

            let public_key = key_store_service::read_public_key_from_file(&public, algorithm)?;
            Ok(report(crypto::verify(data.as_bytes(), &public_key, &signature)))
        }

        Command::Issue {
            subject,
            claims,
            ttl,
        } => {
            let ttl = ttl.unwrap_or(config.token_ttl_seconds);
            if ttl <= 0 {
                return Err(anyhow!("--ttl must be positive, got {}", ttl));
            }

            let service = token_service(config)?;
            let custom = parse_claims(&claims)?;
            let custom = (!custom.is_empty()).then_some(custom);

            let expires_at = Utc::now() + Duration::seconds(ttl);
            let token = service.issue_token(&subject, custom, expires_at)?;
            println!("{}", token);
            Ok(ExitCode::SUCCESS)
        }

        Command::Validate { token } => {
            let service = token_service(config)?;
            Ok(report(service.validate_token(token.trim())))
        }
    }
}

fn token_service(config: &Config) -> anyhow::Result<TokenService> {
    Ok(TokenService::new(config.token_service_config()?)?)
}

fn report(valid: bool) -> ExitCode {
    if valid {
        println!("valid");
        ExitCode::SUCCESS
    } else {
        println!("invalid");
        ExitCode::FAILURE
    }
}

fn parse_claims(raw: &[String]) -> anyhow::Result<Map<String, Value>> {
    raw.iter()
        .map(|entry| {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("Claim '{}' is not KEY=VALUE", entry))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(anyhow!("Claim '{}' has an empty key", entry));
            }
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));
            Ok((key.to_string(), value))
        })
        .collect()
}
