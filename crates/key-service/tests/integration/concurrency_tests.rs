//! Shared keys and services used from many threads at once.

use chrono::{Duration, Utc};
use key_service::crypto::{sign, verify, KeyAlgorithm};
use key_test_utils::*;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;

#[test]
fn test_concurrent_sign_and_verify_share_one_key_pair() {
    for algorithm in [KeyAlgorithm::Dsa, KeyAlgorithm::Rsa] {
        let pair = test_key_pair(algorithm);
        let expected = sign(TEST_DATA.as_bytes(), pair.private_key()).unwrap();

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let expected = expected.clone();
                thread::spawn(move || {
                    let data = format!("{TEST_DATA}-{i}");
                    let signature = sign(data.as_bytes(), pair.private_key()).unwrap();
                    assert!(verify(data.as_bytes(), pair.public_key(), &signature));
                    assert!(!verify(data.as_bytes(), pair.public_key(), &expected));
                    assert_eq!(sign(TEST_DATA.as_bytes(), pair.private_key()).unwrap(), expected);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

#[test]
fn test_concurrent_token_issue_and_validate() {
    let service = Arc::new(test_token_service());

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let subject = format!("{TEST_SUBJECT}-{i}");
                let live = service
                    .issue_token(&subject, None, Utc::now() + Duration::hours(1))
                    .unwrap();
                let expired = service
                    .issue_token(&subject, None, Utc::now() - Duration::hours(1))
                    .unwrap();

                assert!(service.validate_token(&live));
                assert!(!service.validate_token(&expired));
                assert_eq!(
                    service.get_claim(&live, "sub").unwrap(),
                    Some(serde_json::json!(subject))
                );
                service.get_claims(&live).unwrap().jti
            })
        })
        .collect();

    let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), THREADS, "every token gets its own jti");
}
