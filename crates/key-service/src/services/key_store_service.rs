//! Key pair persistence as two single-block text files.
//!
//! Each file holds exactly one block:
//! `-----BEGIN PUBLIC KEY-----\n<Base64 SPKI>\n-----END PUBLIC KEY-----` and
//! the `PRIVATE KEY` analogue with a PKCS#8 body. Bodies are written on one
//! line; reads tolerate any wrapping.

use crate::crypto::codec::{
    decode_private_key, decode_public_key, encode_private_key, encode_public_key,
};
use crate::crypto::pem::{PemBlock, PRIVATE_KEY_LABEL, PUBLIC_KEY_LABEL};
use crate::crypto::{KeyAlgorithm, KeyPair, PrivateKey, PublicKey};
use crate::errors::KsError;
use common::secret::ExposeSecret;
use std::fs;
use std::path::Path;
use tracing::instrument;

/// Write `key_pair` to `public_path` and `private_path`, replacing existing files.
///
/// Parent directories must already exist. On Unix the private key file is
/// restricted to mode 0600; if that fails the write still succeeds and a
/// warning is logged.
#[instrument(skip_all, fields(algorithm = %key_pair.algorithm()))]
pub fn write_key_pair_to_files(
    key_pair: &KeyPair,
    public_path: &Path,
    private_path: &Path,
) -> Result<(), KsError> {
    let public_block = PemBlock::new(PUBLIC_KEY_LABEL, encode_public_key(key_pair.public_key())?);
    fs::write(public_path, format!("{public_block}\n"))
        .map_err(|e| KsError::io(public_path, e))?;

    tracing::info!(
        target: "key_store",
        path = %public_path.display(),
        "Public key written"
    );

    let private_body = encode_private_key(key_pair.private_key())?;
    let private_block = PemBlock::new(PRIVATE_KEY_LABEL, private_body.expose_secret());
    fs::write(private_path, format!("{private_block}\n"))
        .map_err(|e| KsError::io(private_path, e))?;

    restrict_permissions(private_path);

    tracing::info!(
        target: "key_store",
        path = %private_path.display(),
        "Private key written"
    );

    Ok(())
}

/// Read both halves of a key pair and check that they belong together.
#[instrument(skip_all, fields(algorithm = %algorithm))]
pub fn read_key_pair_from_files(
    public_path: &Path,
    private_path: &Path,
    algorithm: KeyAlgorithm,
) -> Result<KeyPair, KsError> {
    let public_key = read_public_key_from_file(public_path, algorithm)?;
    let private_key = read_private_key_from_file(private_path, algorithm)?;

    let key_pair = KeyPair::from_parts(public_key, private_key)?;

    tracing::info!(
        target: "key_store",
        public_path = %public_path.display(),
        private_path = %private_path.display(),
        bits = key_pair.bits(),
        "Key pair loaded"
    );

    Ok(key_pair)
}

/// Read the `PUBLIC KEY` block in `path` as a key of `algorithm`.
pub fn read_public_key_from_file(
    path: &Path,
    algorithm: KeyAlgorithm,
) -> Result<PublicKey, KsError> {
    let block = read_block(path, PUBLIC_KEY_LABEL)?;
    decode_public_key(&block.body, algorithm)
}

/// Read the `PRIVATE KEY` block in `path` as a key of `algorithm`.
pub fn read_private_key_from_file(
    path: &Path,
    algorithm: KeyAlgorithm,
) -> Result<PrivateKey, KsError> {
    let block = read_block(path, PRIVATE_KEY_LABEL)?;
    decode_private_key(&block.body, algorithm)
}

fn read_block(path: &Path, label: &str) -> Result<PemBlock, KsError> {
    let text = fs::read_to_string(path).map_err(|e| KsError::io(path, e))?;
    PemBlock::extract(&text, label).map_err(|e| {
        tracing::debug!(
            target: "key_store",
            path = %path.display(),
            error = %e,
            "Key file rejected"
        );
        e
    })
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let perms = fs::Permissions::from_mode(0o600); // rw-------
    if let Err(e) = fs::set_permissions(path, perms) {
        tracing::warn!(
            target: "key_store",
            path = %path.display(),
            error = %e,
            "Failed to restrict private key file permissions"
        );
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
