use licensegate_activation::{ActivationError, RejectReason, TokenError};
use licensegate_store::StoreError;

#[test]
fn error_display_invalid_request() {
    let err = ActivationError::InvalidRequest("license key is empty".into());
    let msg = format!("{err}");
    assert!(msg.contains("invalid activation request"));
    assert!(msg.contains("license key is empty"));
}

#[test]
fn error_display_not_found() {
    assert!(format!("{}", ActivationError::LicenseNotFound).contains("not found"));
}

#[test]
fn error_display_device_limit() {
    let err = ActivationError::DeviceLimitExceeded(5);
    let msg = format!("{err}");
    assert!(msg.contains("device limit"));
    assert!(msg.contains('5'));
}

#[test]
fn error_display_storage() {
    let err = ActivationError::StorageUnavailable(StoreError::Poisoned);
    assert!(format!("{err}").contains("storage unavailable"));
}

#[test]
fn only_limit_has_reason() {
    assert_eq!(
        ActivationError::DeviceLimitExceeded(1).reject_reason(),
        Some(RejectReason::Limit)
    );
    assert_eq!(ActivationError::LicenseNotFound.reject_reason(), None);
    assert_eq!(
        ActivationError::InvalidRequest(String::new()).reject_reason(),
        None
    );
    assert_eq!(
        ActivationError::StorageUnavailable(StoreError::Poisoned).reject_reason(),
        None
    );
}

#[test]
fn reject_reason_wire_name() {
    assert_eq!(serde_json::to_string(&RejectReason::Limit).unwrap(), "\"limit\"");
}

#[test]
fn token_error_display() {
    assert!(format!("{}", TokenError::EmptySecret).contains("secret"));
}
