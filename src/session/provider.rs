//! Identity-provider seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! Hosted backends (credential check, token issuance, OAuth redirects) sit
//! behind this trait. The core calls the imperative operations and consumes
//! the change channel; it never learns how sessions are produced.

use tokio::sync::mpsc;

use super::types::{AuthSession, SessionEvent};
use crate::error::AuthError;

/// Result of a sign-up request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The provider granted a session right away; a `SignedIn` event follows.
    SessionGranted,
    /// The provider wants the user to confirm the address first. No event.
    ConfirmationRequired,
}

/// Remote identity service consumed by [`crate::session::SessionStore`].
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an email/password pair. A `SignedIn` event is emitted on
    /// success, possibly after this call returns.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    /// Start an external OAuth flow. The resulting session, if any, arrives
    /// only through the change channel.
    async fn sign_in_with_oauth(&self, provider_id: &str) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Restore a previously issued session, if one is still valid.
    async fn get_session(&self) -> Result<Option<AuthSession>, AuthError>;

    /// Register for change notifications, delivered in emission order.
    fn on_auth_state_change(&self) -> mpsc::UnboundedReceiver<SessionEvent>;
}
