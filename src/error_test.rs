use super::*;

// =============================================================================
// validate_credentials
// =============================================================================

#[test]
fn validate_credentials_accepts_both_fields() {
    assert_eq!(validate_credentials("a@b.c", "pw"), Ok(()));
}

#[test]
fn validate_credentials_rejects_empty_email() {
    assert_eq!(validate_credentials("", "pw"), Err(ValidationError::MissingEmail));
}

#[test]
fn validate_credentials_rejects_whitespace_email() {
    assert_eq!(validate_credentials("   ", "pw"), Err(ValidationError::MissingEmail));
}

#[test]
fn validate_credentials_rejects_empty_password() {
    assert_eq!(validate_credentials("a@b.c", ""), Err(ValidationError::MissingPassword));
}

#[test]
fn validate_credentials_reports_email_first() {
    assert_eq!(validate_credentials("", ""), Err(ValidationError::MissingEmail));
}

#[test]
fn validate_credentials_keeps_whitespace_password() {
    assert_eq!(validate_credentials("a@b.c", " "), Ok(()));
}

// =============================================================================
// ErrorCode
// =============================================================================

#[test]
fn auth_error_validation_delegates_code() {
    let err = AuthError::from(ValidationError::MissingPassword);
    assert_eq!(err.error_code(), "E_MISSING_PASSWORD");
    assert_eq!(err.to_string(), "password is required");
}

#[test]
fn auth_error_network_is_retryable() {
    assert!(AuthError::Network("timeout".into()).retryable());
    assert!(!AuthError::InvalidCredentials.retryable());
    assert!(!AuthError::Validation(ValidationError::MissingEmail).retryable());
}

#[test]
fn storage_error_io_is_retryable() {
    let err = StorageError::Io { key: "k".into(), source: std::io::Error::other("disk") };
    assert_eq!(err.error_code(), "E_STORAGE_IO");
    assert!(err.retryable());
}

#[test]
fn storage_error_decode_is_not_retryable() {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = StorageError::Decode { key: "k".into(), source };
    assert_eq!(err.error_code(), "E_STORAGE_DECODE");
    assert!(!err.retryable());
}
