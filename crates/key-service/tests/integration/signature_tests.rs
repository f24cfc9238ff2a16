//! Signature round trips at the default key size, through the Base64 codec.

use common::secret::ExposeSecret;
use key_service::crypto::codec::{
    decode_private_key, decode_public_key, encode_private_key, encode_public_key,
};
use key_service::crypto::{sign, verify, verify_encoded, KeyAlgorithm};
use key_service::errors::KsError;
use key_test_utils::*;

const ALGORITHMS: [KeyAlgorithm; 2] = [KeyAlgorithm::Dsa, KeyAlgorithm::Rsa];

#[test]
fn test_sign_and_verify_2048_bit_pairs() {
    for algorithm in ALGORITHMS {
        let pair = test_key_pair(algorithm);
        assert_eq!(pair.bits(), 2048, "{algorithm} fixture size");

        let signature = sign(TEST_DATA.as_bytes(), pair.private_key()).unwrap();
        assert!(
            verify(TEST_DATA.as_bytes(), pair.public_key(), &signature),
            "{algorithm} signature should verify"
        );
        assert!(
            !verify(TEST_DATA_MUTATED.as_bytes(), pair.public_key(), &signature),
            "{algorithm} signature must not verify other data"
        );
    }
}

#[test]
fn test_signature_from_other_key_does_not_verify() {
    let signature = sign(TEST_DATA.as_bytes(), test_other_rsa_key_pair().private_key()).unwrap();
    assert!(!verify(
        TEST_DATA.as_bytes(),
        test_rsa_key_pair().public_key(),
        &signature
    ));
}

#[test]
fn test_decoded_keys_interoperate_with_originals() {
    for algorithm in ALGORITHMS {
        let pair = test_key_pair(algorithm);
        let public_b64 = encode_public_key(pair.public_key()).unwrap();
        let public_key = decode_public_key(&public_b64, algorithm).unwrap();
        let private_b64 = encode_private_key(pair.private_key()).unwrap();
        let private_key = decode_private_key(private_b64.expose_secret(), algorithm).unwrap();

        let signature = sign(TEST_DATA.as_bytes(), pair.private_key()).unwrap();
        assert!(verify(TEST_DATA.as_bytes(), &public_key, &signature));

        let signature = sign(TEST_DATA.as_bytes(), &private_key).unwrap();
        assert!(verify(TEST_DATA.as_bytes(), pair.public_key(), &signature));
    }
}

#[test]
fn test_verify_encoded_with_base64_public_key() {
    let pair = test_dsa_key_pair();
    let public_b64 = encode_public_key(pair.public_key()).unwrap();
    let signature = sign(TEST_DATA.as_bytes(), pair.private_key()).unwrap();

    assert!(
        verify_encoded(TEST_DATA.as_bytes(), &public_b64, KeyAlgorithm::Dsa, &signature).unwrap()
    );
    assert!(matches!(
        verify_encoded(TEST_DATA.as_bytes(), &public_b64, KeyAlgorithm::Rsa, &signature),
        Err(KsError::KeyFormat(_))
    ));
}

#[test]
fn test_empty_payload_signs_and_verifies() {
    for algorithm in ALGORITHMS {
        let pair = test_key_pair(algorithm);
        let signature = sign(b"", pair.private_key()).unwrap();
        assert!(verify(b"", pair.public_key(), &signature));
        assert!(!verify(b"\0", pair.public_key(), &signature));
    }
}
