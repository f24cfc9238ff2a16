//! Key pair persistence through the file store.

use key_service::crypto::codec::encode_public_key;
use key_service::crypto::{sign, verify, KeyAlgorithm};
use key_service::errors::KsError;
use key_service::services::key_store_service::{
    read_key_pair_from_files, read_public_key_from_file, write_key_pair_to_files,
};
use key_test_utils::*;
use std::fs;

#[test]
fn test_file_round_trip_preserves_signing() {
    for algorithm in [KeyAlgorithm::Dsa, KeyAlgorithm::Rsa] {
        let dir = tempfile::tempdir().unwrap();
        let public_path = dir.path().join("public_key.pem");
        let private_path = dir.path().join("private_key.pem");

        write_key_pair_to_files(test_key_pair(algorithm), &public_path, &private_path).unwrap();
        let loaded = read_key_pair_from_files(&public_path, &private_path, algorithm).unwrap();

        let signature = sign(TEST_DATA.as_bytes(), loaded.private_key()).unwrap();
        assert!(verify(TEST_DATA.as_bytes(), loaded.public_key(), &signature));
        assert!(verify(
            TEST_DATA.as_bytes(),
            test_key_pair(algorithm).public_key(),
            &signature
        ));
    }
}

#[test]
fn test_read_tolerates_wrapped_body_and_surrounding_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wrapped.pem");

    let body = encode_public_key(test_rsa_key_pair().public_key()).unwrap();
    let wrapped: Vec<String> = body
        .as_bytes()
        .chunks(64)
        .map(|chunk| format!("  {}\t", String::from_utf8_lossy(chunk)))
        .collect();
    let text = format!(
        "Key for service X\n-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----\nnot part of the key\n",
        wrapped.join("\n")
    );
    fs::write(&path, text).unwrap();

    let public_key = read_public_key_from_file(&path, KeyAlgorithm::Rsa).unwrap();
    let signature = sign(TEST_DATA.as_bytes(), test_rsa_key_pair().private_key()).unwrap();
    assert!(verify(TEST_DATA.as_bytes(), &public_key, &signature));
}

#[test]
fn test_missing_end_marker_is_key_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.pem");
    let body = encode_public_key(test_rsa_key_pair().public_key()).unwrap();
    fs::write(&path, format!("-----BEGIN PUBLIC KEY-----\n{body}\n")).unwrap();

    assert!(matches!(
        read_public_key_from_file(&path, KeyAlgorithm::Rsa),
        Err(KsError::KeyFormat(_))
    ));
}

#[test]
fn test_swapped_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let public_path = dir.path().join("public_key.pem");
    let private_path = dir.path().join("private_key.pem");
    write_key_pair_to_files(test_rsa_key_pair(), &public_path, &private_path).unwrap();

    // Each file holds only its own label
    let result = read_key_pair_from_files(&private_path, &public_path, KeyAlgorithm::Rsa);
    assert!(matches!(result, Err(KsError::KeyFormat(_))));
}

#[test]
fn test_wrong_algorithm_is_key_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let public_path = dir.path().join("public_key.pem");
    let private_path = dir.path().join("private_key.pem");
    write_key_pair_to_files(test_dsa_key_pair(), &public_path, &private_path).unwrap();

    let result = read_key_pair_from_files(&public_path, &private_path, KeyAlgorithm::Rsa);
    assert!(matches!(result, Err(KsError::KeyFormat(_))));
}

#[test]
fn test_unpaired_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let a_public = dir.path().join("a_pub.pem");
    let a_private = dir.path().join("a_priv.pem");
    let b_public = dir.path().join("b_pub.pem");
    let b_private = dir.path().join("b_priv.pem");
    write_key_pair_to_files(test_rsa_key_pair(), &a_public, &a_private).unwrap();
    write_key_pair_to_files(test_other_rsa_key_pair(), &b_public, &b_private).unwrap();

    let result = read_key_pair_from_files(&a_public, &b_private, KeyAlgorithm::Rsa);
    assert!(matches!(result, Err(KsError::KeyFormat(msg)) if msg.contains("does not match")));
}

#[test]
fn test_missing_private_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let public_path = dir.path().join("public_key.pem");
    let private_path = dir.path().join("private_key.pem");
    write_key_pair_to_files(test_rsa_key_pair(), &public_path, &private_path).unwrap();
    fs::remove_file(&private_path).unwrap();

    let result = read_key_pair_from_files(&public_path, &private_path, KeyAlgorithm::Rsa);
    assert!(matches!(result, Err(KsError::Io { path, .. }) if path == private_path));
}
