//! Token issuance, validation, and claim extraction.

use chrono::{Duration, SubsecRound, Utc};
use jsonwebtoken::Algorithm;
use key_service::errors::KsError;
use key_test_utils::*;
use serde_json::{json, Map, Value};

fn role_admin() -> Option<Map<String, Value>> {
    let mut claims = Map::new();
    claims.insert(TEST_ROLE_CLAIM.to_string(), json!(TEST_ROLE_ADMIN));
    Some(claims)
}

#[test]
fn test_issue_with_custom_claim_then_read_back() {
    let service = test_token_service();
    let expires_at = Utc::now().trunc_subsecs(0) + Duration::seconds(ONE_HOUR_SECONDS);

    let token = service
        .issue_token(TEST_SUBJECT, role_admin(), expires_at)
        .unwrap();

    token
        .assert_valid_token()
        .assert_for_subject(TEST_SUBJECT)
        .assert_has_claim(TEST_ROLE_CLAIM, &json!(TEST_ROLE_ADMIN))
        .assert_expires_in(ONE_HOUR_SECONDS);

    assert!(service.validate_token(&token));
    assert_eq!(
        service.get_claim(&token, TEST_ROLE_CLAIM).unwrap(),
        Some(json!(TEST_ROLE_ADMIN))
    );
    assert_eq!(service.get_expiration_time(&token).unwrap(), expires_at);
}

#[test]
fn test_token_expired_an_hour_ago_is_invalid() {
    let service = test_token_service();
    let token = service
        .issue_token(TEST_SUBJECT, None, Utc::now() - Duration::seconds(ONE_HOUR_SECONDS))
        .unwrap();

    assert!(!service.validate_token(&token));
}

#[test]
fn test_tampered_token_is_rejected_everywhere() {
    let service = test_token_service();
    let token = service
        .issue_token(TEST_SUBJECT, role_admin(), Utc::now() + Duration::hours(1))
        .unwrap();
    let tampered = tamper_last_char(&token);
    assert_ne!(tampered, token);

    assert!(!service.validate_token(&tampered));
    assert!(matches!(
        service.get_claim(&tampered, TEST_ROLE_CLAIM),
        Err(KsError::Security(_))
    ));
    assert!(matches!(
        service.get_expiration_time(&tampered),
        Err(KsError::Security(_))
    ));
}

#[test]
fn test_tampered_payload_is_rejected() {
    let service = test_token_service();
    let token = service
        .issue_token(TEST_SUBJECT, role_admin(), Utc::now() + Duration::hours(1))
        .unwrap();

    // Re-encode the payload with an elevated subject, keep the old signature
    let forged_payload = TestTokenBuilder::new()
        .for_subject("admin")
        .build_claims()
        .to_string();
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    parts[1] = base64::Engine::encode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        forged_payload,
    );
    let forged = parts.join(".");

    assert!(!service.validate_token(&forged));
    assert!(matches!(service.get_claim(&forged, "sub"), Err(KsError::Security(_))));
}

#[test]
fn test_token_from_other_secret_is_untrusted() {
    let token = other_token_service()
        .issue_token(TEST_SUBJECT, None, Utc::now() + Duration::hours(1))
        .unwrap();

    let service = test_token_service();
    assert!(!service.validate_token(&token));
    assert!(matches!(service.get_claim(&token, "sub"), Err(KsError::Security(_))));
}

#[test]
fn test_builder_token_with_matching_secret_validates() {
    let token = TestTokenBuilder::new()
        .for_subject(TEST_SUBJECT)
        .with_claim(TEST_ROLE_CLAIM, TEST_ROLE_ADMIN)
        .build();

    let service = test_token_service();
    assert!(service.validate_token(&token));
    assert_eq!(
        service.get_claim(&token, "sub").unwrap(),
        Some(json!(TEST_SUBJECT))
    );
}

#[test]
fn test_token_without_exp_fails_closed() {
    let token = TestTokenBuilder::new().without_exp().build();
    let service = test_token_service();

    assert!(!service.validate_token(&token));
    assert!(matches!(
        service.get_expiration_time(&token),
        Err(KsError::MissingClaim(claim)) if claim == "exp"
    ));
    // Signature is fine, so claims remain readable
    assert!(service.get_claim(&token, "sub").unwrap().is_some());
}

#[test]
fn test_unsigned_token_is_rejected() {
    let token = TestTokenBuilder::new().build_unsigned();
    let service = test_token_service();

    assert!(!service.validate_token(&token));
    assert!(matches!(service.get_claim(&token, "sub"), Err(KsError::Security(_))));
}

#[test]
fn test_other_hmac_algorithm_is_rejected() {
    let token = TestTokenBuilder::new()
        .with_algorithm(Algorithm::HS512)
        .build();
    assert!(!test_token_service().validate_token(&token));
}

#[test]
fn test_absent_claim_is_none_not_error() {
    let service = test_token_service();
    let token = service
        .issue_token(TEST_SUBJECT, None, Utc::now() + Duration::hours(1))
        .unwrap();

    assert_eq!(service.get_claim(&token, "does_not_exist").unwrap(), None);
}

#[test]
fn test_empty_custom_claims_leave_base_claims_untouched() {
    let service = test_token_service();
    let exp = Utc::now() + Duration::hours(1);
    let with_empty = service
        .issue_token(TEST_SUBJECT, Some(Map::new()), exp)
        .unwrap();
    let with_none = service.issue_token(TEST_SUBJECT, None, exp).unwrap();

    let a = service.get_claims(&with_empty).unwrap();
    let b = service.get_claims(&with_none).unwrap();
    assert!(a.custom.is_empty());
    assert!(b.custom.is_empty());
    assert_eq!(a.exp, b.exp);
    assert_eq!(a.sub, TEST_SUBJECT);
}

#[test]
fn test_validity_is_evaluated_at_check_time() {
    let service = test_token_service();
    let exp = Utc::now().trunc_subsecs(0) + Duration::seconds(30);
    let token = service.issue_token(TEST_SUBJECT_OTHER, None, exp).unwrap();

    assert!(service.validate_token_at(&token, exp - Duration::seconds(30)));
    assert!(!service.validate_token_at(&token, exp + Duration::days(1)));
}

#[test]
fn test_oversized_token_fails_closed() {
    let huge = "x".repeat(10_000);
    let token = TestTokenBuilder::new().with_claim("blob", huge).build();
    let service = test_token_service();

    assert!(!service.validate_token(&token));
    assert!(matches!(service.get_claim(&token, "blob"), Err(KsError::Security(_))));
}

#[test]
fn test_token_without_subject_is_valid_but_has_no_sub() {
    let token = TestTokenBuilder::new()
        .without_subject()
        .with_claim(TEST_ROLE_CLAIM, TEST_ROLE_ADMIN)
        .build();
    let service = test_token_service();

    assert!(service.validate_token(&token));
    assert_eq!(service.get_claim(&token, "sub").unwrap(), None);
    assert_eq!(
        service.get_claim(&token, TEST_ROLE_CLAIM).unwrap(),
        Some(json!(TEST_ROLE_ADMIN))
    );
    assert!(matches!(service.get_claims(&token), Err(KsError::MissingClaim(_))));
}

#[test]
fn test_exact_expiration_instant_is_reported_and_enforced() {
    let exp = Utc::now().trunc_subsecs(0) + Duration::minutes(5);
    let token = TestTokenBuilder::new().expires_at(exp).build();
    let service = test_token_service();

    assert_eq!(service.get_expiration_time(&token).unwrap(), exp);
    assert!(service.validate_token_at(&token, exp - Duration::seconds(1)));
    assert!(!service.validate_token_at(&token, exp));
}
