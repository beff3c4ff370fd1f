//! In-process identity provider.
//!
//! DESIGN
//! ======
//! Keeps accounts and the current session in memory and emits the same
//! notification sequence a hosted backend would. The demo host and the test
//! suites run against it; production hosts plug in their own
//! [`IdentityProvider`].
//!
//! OAuth is modelled as two steps: `sign_in_with_oauth` only opens the flow,
//! and `complete_oauth` plays the external redirect coming back later.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use super::provider::{IdentityProvider, SignUpOutcome};
use super::types::{AuthSession, Identity, SessionEvent, Token};
use crate::error::AuthError;
use crate::util::{bytes_to_hex, lock};

/// Generate a random 32-byte hex access token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[derive(Debug, Clone)]
struct Account {
    id: Uuid,
    password: String,
    confirmed: bool,
}

#[derive(Default)]
struct ProviderState {
    accounts: HashMap<String, Account>,
    current: Option<AuthSession>,
    listeners: Vec<mpsc::UnboundedSender<SessionEvent>>,
    pending_oauth: Option<String>,
    offline: bool,
    calls: usize,
}

/// Identity provider backed by process memory.
pub struct MemoryIdentityProvider {
    state: Mutex<ProviderState>,
    oauth_providers: HashSet<String>,
    require_confirmation: bool,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    /// Provider that grants sessions on sign-up and knows the `google` flow.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProviderState::default()),
            oauth_providers: HashSet::from(["google".to_string()]),
            require_confirmation: false,
        }
    }

    /// Make sign-up hold the session back until [`Self::confirm_email`].
    #[must_use]
    pub fn with_email_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Seed a confirmed account.
    pub fn register(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        let account = Account { id, password: password.to_string(), confirmed: true };
        lock(&self.state)
            .accounts
            .insert(normalize_email(email), account);
        id
    }

    /// Mark a pending sign-up as confirmed.
    pub fn confirm_email(&self, email: &str) -> bool {
        let mut state = lock(&self.state);
        match state.accounts.get_mut(&normalize_email(email)) {
            Some(account) => {
                account.confirmed = true;
                true
            }
            None => false,
        }
    }

    /// Simulate losing (or regaining) connectivity to the backend.
    pub fn set_offline(&self, offline: bool) {
        lock(&self.state).offline = offline;
    }

    /// Number of remote calls received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        lock(&self.state).calls
    }

    /// Push an arbitrary notification to every listener.
    pub fn emit(&self, event: SessionEvent) {
        let mut state = lock(&self.state);
        state.current.clone_from(&event.session);
        broadcast(&mut state.listeners, &event);
    }

    /// Finish the OAuth flow opened by `sign_in_with_oauth`, as the external
    /// redirect would.
    ///
    /// # Errors
    ///
    /// Returns `OAuthAborted` if no flow is pending for `provider_id`.
    pub fn complete_oauth(&self, provider_id: &str, email: &str) -> Result<(), AuthError> {
        let mut state = lock(&self.state);
        if state.pending_oauth.as_deref() != Some(provider_id) {
            return Err(AuthError::OAuthAborted(format!("no pending {provider_id} flow")));
        }
        state.pending_oauth = None;

        let key = normalize_email(email);
        let id = state
            .accounts
            .entry(key)
            .or_insert_with(|| Account { id: Uuid::new_v4(), password: String::new(), confirmed: true })
            .id;
        let session = issue_session(id, email);
        info!(%provider_id, user_id = %id, "oauth flow completed");
        state.current = Some(session.clone());
        broadcast(&mut state.listeners, &SessionEvent::signed_in(session));
        Ok(())
    }

    fn begin_call(&self) -> Result<std::sync::MutexGuard<'_, ProviderState>, AuthError> {
        let mut state = lock(&self.state);
        state.calls += 1;
        if state.offline {
            return Err(AuthError::Network("identity provider offline".into()));
        }
        Ok(state)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let mut state = self.begin_call()?;
        let Some(account) = state.accounts.get(&normalize_email(email)).cloned() else {
            return Err(AuthError::InvalidCredentials);
        };
        if account.password.is_empty() || account.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        if !account.confirmed {
            return Err(AuthError::Rejected("email not confirmed".into()));
        }

        let session = issue_session(account.id, email);
        state.current = Some(session.clone());
        broadcast(&mut state.listeners, &SessionEvent::signed_in(session));
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let mut state = self.begin_call()?;
        let key = normalize_email(email);
        if state.accounts.contains_key(&key) {
            return Err(AuthError::Rejected("user already registered".into()));
        }

        let id = Uuid::new_v4();
        let confirmed = !self.require_confirmation;
        state
            .accounts
            .insert(key, Account { id, password: password.to_string(), confirmed });

        if !confirmed {
            debug!(user_id = %id, "sign-up awaiting email confirmation");
            return Ok(SignUpOutcome::ConfirmationRequired);
        }

        let session = issue_session(id, email);
        state.current = Some(session.clone());
        broadcast(&mut state.listeners, &SessionEvent::signed_in(session));
        Ok(SignUpOutcome::SessionGranted)
    }

    async fn sign_in_with_oauth(&self, provider_id: &str) -> Result<(), AuthError> {
        if !self.oauth_providers.contains(provider_id) {
            return Err(AuthError::UnsupportedProvider(provider_id.to_string()));
        }
        let mut state = self.begin_call()?;
        state.pending_oauth = Some(provider_id.to_string());
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut state = self.begin_call()?;
        if state.current.take().is_some() {
            broadcast(&mut state.listeners, &SessionEvent::signed_out());
        }
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let state = self.begin_call()?;
        Ok(state.current.clone())
    }

    fn on_auth_state_change(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.state).listeners.push(tx);
        rx
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_session(id: Uuid, email: &str) -> AuthSession {
    AuthSession {
        identity: Identity { id, email: email.trim().to_string(), name: None, avatar_url: None },
        token: Token::new(generate_token()),
    }
}

fn broadcast(listeners: &mut Vec<mpsc::UnboundedSender<SessionEvent>>, event: &SessionEvent) {
    listeners.retain(|tx| tx.send(event.clone()).is_ok());
    debug!(kind = ?event.kind, listeners = listeners.len(), "session event broadcast");
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
