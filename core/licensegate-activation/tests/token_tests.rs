mod common;

use common::{ABC_PC1_HMAC_TEST_SECRET, ABC_PC1_SHA256, ABC_PC2_SHA256};
use licensegate_activation::{TokenError, TokenIssuer};
use pretty_assertions::{assert_eq, assert_ne};

#[test]
fn sha256_known_vectors() {
    let issuer = TokenIssuer::sha256();
    assert_eq!(issuer.issue("ABC-123", "PC1"), ABC_PC1_SHA256);
    assert_eq!(issuer.issue("ABC-123", "PC2"), ABC_PC2_SHA256);
}

#[test]
fn sha256_hashes_plain_concatenation() {
    let issuer = TokenIssuer::sha256();
    assert_eq!(issuer.issue("ABC-", "123PC1"), ABC_PC1_SHA256);
}

#[test]
fn hmac_known_vector() {
    let issuer = TokenIssuer::hmac_sha256("test-secret").unwrap();
    assert_eq!(issuer.issue("ABC-123", "PC1"), ABC_PC1_HMAC_TEST_SECRET);
}

#[test]
fn hmac_differs_by_secret_and_from_sha256() {
    let a = TokenIssuer::hmac_sha256("test-secret").unwrap();
    let b = TokenIssuer::hmac_sha256("other-secret").unwrap();
    let plain = TokenIssuer::sha256();
    assert_ne!(a.issue("ABC-123", "PC1"), b.issue("ABC-123", "PC1"));
    assert_ne!(a.issue("ABC-123", "PC1"), plain.issue("ABC-123", "PC1"));
}

#[test]
fn hmac_issuer_is_reusable() {
    let issuer = TokenIssuer::hmac_sha256(b"test-secret").unwrap();
    let first = issuer.issue("ABC-123", "PC1");
    let _ = issuer.issue("XYZ", "PC9");
    assert_eq!(issuer.issue("ABC-123", "PC1"), first);
}

#[test]
fn empty_secret_rejected() {
    assert!(matches!(
        TokenIssuer::hmac_sha256(""),
        Err(TokenError::EmptySecret)
    ));
}

#[test]
fn scheme_names() {
    assert_eq!(TokenIssuer::sha256().scheme_name(), "sha256");
    assert_eq!(TokenIssuer::default().scheme_name(), "sha256");
    assert_eq!(
        TokenIssuer::hmac_sha256("s").unwrap().scheme_name(),
        "hmac-sha256"
    );
}

#[test]
fn debug_does_not_leak_secret() {
    let issuer = TokenIssuer::hmac_sha256("very-private-secret").unwrap();
    let debug = format!("{issuer:?}");
    assert!(debug.contains("hmac-sha256"));
    assert!(!debug.contains("very-private-secret"));
}
