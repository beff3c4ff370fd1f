//! Error taxonomy for the session gate core.
//!
//! DESIGN
//! ======
//! Three families, one per concern: credential validation (local, never hits
//! the network), identity-provider failures, and preference storage failures.
//! None of them is fatal. Callers surface `AuthError` to the user and log
//! `StorageError`; the gate keeps its current state either way.

// =============================================================================
// ERROR CODE
// =============================================================================

/// Grepable error code and retryable flag for user-facing error reporting.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Credential fields rejected before contacting the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("email is required")]
    MissingEmail,
    #[error("password is required")]
    MissingPassword,
}

impl ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingEmail => "E_MISSING_EMAIL",
            Self::MissingPassword => "E_MISSING_PASSWORD",
        }
    }
}

/// Check that both credential fields are present.
///
/// The email is trimmed before the check; the password is taken verbatim.
///
/// # Errors
///
/// Returns the first missing field, email first.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    Ok(())
}

// =============================================================================
// AUTH
// =============================================================================

/// Failures from sign-in, sign-up, OAuth, and sign-out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider rejected the email/password pair.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// The provider refused the request for another reason (e.g. email taken).
    #[error("identity provider rejected request: {0}")]
    Rejected(String),

    /// The provider could not be reached.
    #[error("identity provider unreachable: {0}")]
    Network(String),

    /// The external OAuth flow was cancelled or failed.
    #[error("oauth flow aborted: {0}")]
    OAuthAborted(String),

    /// No OAuth provider is configured under this id.
    #[error("unsupported oauth provider: {0}")]
    UnsupportedProvider(String),
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::Rejected(_) => "E_AUTH_REJECTED",
            Self::Network(_) => "E_AUTH_NETWORK",
            Self::OAuthAborted(_) => "E_OAUTH_ABORTED",
            Self::UnsupportedProvider(_) => "E_UNSUPPORTED_PROVIDER",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::OAuthAborted(_))
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Durable preference storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode preference {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode preference {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend is not reachable at all (e.g. storage disabled).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_STORAGE_IO",
            Self::Encode { .. } => "E_STORAGE_ENCODE",
            Self::Decode { .. } => "E_STORAGE_DECODE",
            Self::Unavailable(_) => "E_STORAGE_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Unavailable(_))
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
