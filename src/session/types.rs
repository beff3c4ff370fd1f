//! Session data model shared by the provider seam, the store, and the gate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TOKEN
// =============================================================================

/// Opaque credential handle issued by the identity provider.
///
/// The core only checks presence. `Debug` is redacted so tokens never reach
/// logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw credential, for handing back to the provider that issued it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier.
    pub id: Uuid,
    pub email: String,
    /// Display name, if the provider knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar image URL, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Identity plus the credential that proves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub identity: Identity,
    pub token: Token,
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No answer from the identity provider yet.
    Unknown,
    Unauthenticated,
    Authenticated,
}

/// Current authentication state. Identity and token exist only when
/// authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Unknown,
    Unauthenticated,
    Authenticated(AuthSession),
}

impl Session {
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Unknown => SessionStatus::Unknown,
            Self::Unauthenticated => SessionStatus::Unauthenticated,
            Self::Authenticated(_) => SessionStatus::Authenticated,
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(auth) => Some(&auth.identity),
            _ => None,
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Authenticated(auth) => Some(&auth.token),
            _ => None,
        }
    }

    /// Session implied by a provider report: absence means signed out.
    #[must_use]
    pub fn from_provider(session: Option<AuthSession>) -> Self {
        session.map_or(Self::Unauthenticated, Self::Authenticated)
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Kind of change reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthChangeKind {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// One notification pushed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub kind: AuthChangeKind,
    pub session: Option<AuthSession>,
}

impl SessionEvent {
    #[must_use]
    pub fn signed_in(session: AuthSession) -> Self {
        Self { kind: AuthChangeKind::SignedIn, session: Some(session) }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self { kind: AuthChangeKind::SignedOut, session: None }
    }
}

/// A session change as republished by the store to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTransition {
    pub kind: AuthChangeKind,
    pub from: SessionStatus,
    pub to: Session,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
