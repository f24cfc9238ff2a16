//! Asymmetric keys, key pair generation, and detached signatures.
//!
//! Two families are supported:
//! - DSA (`"DSA"`), signing under `"SHA256withDSA"` with RFC 6979 nonces
//! - RSA (`"RSA"`), signing under `"SHA256withRSA"` (PKCS#1 v1.5)
//!
//! Every operation is a pure function of its arguments. Signer and verifier
//! contexts are built per call, so keys can be shared freely across threads.

pub mod codec;
pub mod jwt;
pub mod pem;

use crate::errors::KsError;
use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use sha2::{Digest, Sha256};
use signature::{DigestSigner, DigestVerifier, SignatureEncoding, Signer, Verifier};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

/// Key size used when the caller does not name one.
pub const DEFAULT_KEY_SIZE: usize = 2048;

/// DSA sizes map onto the (L, N) pairs the primitive can generate:
/// 1024/160, 2048/256, 3072/256.
const DSA_KEY_SIZES: &[usize] = &[1024, 2048, 3072];

const RSA_KEY_SIZES: &[usize] = &[1024, 2048, 3072, 4096];

/// Asymmetric key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Dsa,
    Rsa,
}

impl KeyAlgorithm {
    /// Family name as used in key decoding (`"DSA"`, `"RSA"`).
    pub fn as_str(self) -> &'static str {
        match self {
            KeyAlgorithm::Dsa => "DSA",
            KeyAlgorithm::Rsa => "RSA",
        }
    }

    /// Signature algorithm identifier for keys of this family.
    pub fn signature_algorithm(self) -> &'static str {
        match self {
            KeyAlgorithm::Dsa => "SHA256withDSA",
            KeyAlgorithm::Rsa => "SHA256withRSA",
        }
    }

    /// Key sizes accepted by [`generate_key_pair`], ascending.
    pub fn supported_key_sizes(self) -> &'static [usize] {
        match self {
            KeyAlgorithm::Dsa => DSA_KEY_SIZES,
            KeyAlgorithm::Rsa => RSA_KEY_SIZES,
        }
    }

    pub fn is_supported_key_size(self, key_size: usize) -> bool {
        self.supported_key_sizes().contains(&key_size)
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = KsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DSA" => Ok(KeyAlgorithm::Dsa),
            "RSA" => Ok(KeyAlgorithm::Rsa),
            other => Err(KsError::KeyFormat(format!(
                "Unknown key algorithm: {other} (expected DSA or RSA)"
            ))),
        }
    }
}

/// Public half of a key pair.
#[derive(Debug, Clone)]
pub enum PublicKey {
    Dsa(dsa::VerifyingKey),
    Rsa(rsa::RsaPublicKey),
}

impl PublicKey {
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PublicKey::Dsa(_) => KeyAlgorithm::Dsa,
            PublicKey::Rsa(_) => KeyAlgorithm::Rsa,
        }
    }

    /// Nominal bit length (DSA prime `p`, RSA modulus `n`).
    pub fn bits(&self) -> usize {
        match self {
            PublicKey::Dsa(key) => key.components().p().bits(),
            PublicKey::Rsa(key) => key.size() * 8,
        }
    }
}

/// Private half of a key pair.
///
/// Debug is manually implemented to redact all key material.
#[derive(Clone)]
pub enum PrivateKey {
    Dsa(dsa::SigningKey),
    Rsa(rsa::RsaPrivateKey),
}

impl PrivateKey {
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PrivateKey::Dsa(_) => KeyAlgorithm::Dsa,
            PrivateKey::Rsa(_) => KeyAlgorithm::Rsa,
        }
    }

    pub fn bits(&self) -> usize {
        self.public_key().bits()
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Dsa(key) => PublicKey::Dsa(key.verifying_key().clone()),
            PrivateKey::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Paired public and private keys. Immutable once built.
#[derive(Debug, Clone)]
pub struct KeyPair {
    public_key: PublicKey,
    private_key: PrivateKey,
}

impl KeyPair {
    /// Assemble a key pair from independently loaded halves.
    ///
    /// Fails with `KeyFormat` if the halves belong to different families or
    /// the public key is not the one derived from the private key.
    pub fn from_parts(public_key: PublicKey, private_key: PrivateKey) -> Result<Self, KsError> {
        if public_key.algorithm() != private_key.algorithm() {
            return Err(KsError::KeyFormat(format!(
                "Key algorithm mismatch: public key is {}, private key is {}",
                public_key.algorithm(),
                private_key.algorithm()
            )));
        }

        let derived = codec::public_key_der(&private_key.public_key())?;
        if codec::public_key_der(&public_key)? != derived {
            return Err(KsError::KeyFormat(
                "Public key does not match private key".to_string(),
            ));
        }

        Ok(Self {
            public_key,
            private_key,
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.public_key.algorithm()
    }

    pub fn bits(&self) -> usize {
        self.public_key.bits()
    }
}

/// Generate a key pair using the OS CSPRNG.
///
/// `key_size` must be one of [`KeyAlgorithm::supported_key_sizes`]; anything
/// else fails with `UnsupportedKeySize` rather than being rounded.
#[instrument(skip_all, fields(algorithm = %algorithm, key_size = key_size))]
pub fn generate_key_pair(algorithm: KeyAlgorithm, key_size: usize) -> Result<KeyPair, KsError> {
    if !algorithm.is_supported_key_size(key_size) {
        return Err(unsupported_key_size(algorithm, key_size));
    }

    let private_key = match algorithm {
        KeyAlgorithm::Dsa => {
            #[allow(deprecated)] // 1024/160 is kept for interoperability with older peers
            let dsa_size = match key_size {
                1024 => dsa::KeySize::DSA_1024_160,
                2048 => dsa::KeySize::DSA_2048_256,
                3072 => dsa::KeySize::DSA_3072_256,
                _ => return Err(unsupported_key_size(algorithm, key_size)),
            };
            let components = dsa::Components::generate(&mut OsRng, dsa_size);
            PrivateKey::Dsa(dsa::SigningKey::generate(&mut OsRng, components))
        }
        KeyAlgorithm::Rsa => {
            let key = rsa::RsaPrivateKey::new(&mut OsRng, key_size)
                .map_err(|e| KsError::Crypto(format!("RSA key generation failed: {}", e)))?;
            PrivateKey::Rsa(key)
        }
    };

    tracing::debug!(target: "crypto", "Key pair generated");

    Ok(KeyPair {
        public_key: private_key.public_key(),
        private_key,
    })
}

/// Generate a key pair at [`DEFAULT_KEY_SIZE`].
pub fn generate_default_key_pair(algorithm: KeyAlgorithm) -> Result<KeyPair, KsError> {
    generate_key_pair(algorithm, DEFAULT_KEY_SIZE)
}

fn unsupported_key_size(algorithm: KeyAlgorithm, key_size: usize) -> KsError {
    KsError::UnsupportedKeySize {
        algorithm: algorithm.as_str(),
        requested: key_size,
        supported: algorithm.supported_key_sizes(),
    }
}

/// Sign `data` under the key family's SHA-256 signature algorithm.
///
/// Returns the signature as standard Base64. Both families sign
/// deterministically, so the same key and data always give the same text.
#[instrument(skip_all, fields(algorithm = %private_key.algorithm()))]
pub fn sign(data: &[u8], private_key: &PrivateKey) -> Result<String, KsError> {
    let signature_bytes = match private_key {
        PrivateKey::Dsa(key) => {
            let signature: dsa::Signature = key
                .try_sign_digest(Sha256::new_with_prefix(data))
                .map_err(|e| KsError::Crypto(format!("DSA signing failed: {}", e)))?;
            signature.to_vec()
        }
        PrivateKey::Rsa(key) => {
            let signing_key = rsa::pkcs1v15::SigningKey::<Sha256>::new(key.clone());
            let signature = signing_key
                .try_sign(data)
                .map_err(|e| KsError::Crypto(format!("RSA signing failed: {}", e)))?;
            signature.to_vec()
        }
    };

    Ok(general_purpose::STANDARD.encode(signature_bytes))
}

/// Check a Base64 signature over `data`.
///
/// Returns `false` for any mismatch: wrong data, wrong key, malformed Base64,
/// or a signature that does not parse. Never fails.
#[instrument(skip_all, fields(algorithm = %public_key.algorithm()))]
pub fn verify(data: &[u8], public_key: &PublicKey, signature_b64: &str) -> bool {
    let signature_bytes = match general_purpose::STANDARD.decode(signature_b64) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(target: "crypto", error = %e, "Signature is not valid Base64");
            return false;
        }
    };

    let verified = match public_key {
        PublicKey::Dsa(key) => match dsa::Signature::try_from(signature_bytes.as_slice()) {
            Ok(signature) => key
                .verify_digest(Sha256::new_with_prefix(data), &signature)
                .is_ok(),
            Err(e) => {
                tracing::debug!(target: "crypto", error = %e, "Malformed DSA signature");
                false
            }
        },
        PublicKey::Rsa(key) => match rsa::pkcs1v15::Signature::try_from(signature_bytes.as_slice())
        {
            Ok(signature) => rsa::pkcs1v15::VerifyingKey::<Sha256>::new(key.clone())
                .verify(data, &signature)
                .is_ok(),
            Err(e) => {
                tracing::debug!(target: "crypto", error = %e, "Malformed RSA signature");
                false
            }
        },
    };

    if !verified {
        tracing::debug!(target: "crypto", "Signature verification failed");
    }
    verified
}

/// Verify against a Base64 SPKI public key.
///
/// Fails with `KeyFormat` only when the key itself cannot be decoded for
/// `algorithm`; a signature that does not match yields `Ok(false)`.
pub fn verify_encoded(
    data: &[u8],
    public_key_b64: &str,
    algorithm: KeyAlgorithm,
    signature_b64: &str,
) -> Result<bool, KsError> {
    let public_key = codec::decode_public_key(public_key_b64, algorithm)?;
    Ok(verify(data, &public_key, signature_b64))
}
