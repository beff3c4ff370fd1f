//! Session store, the sole consumer of identity-provider notifications.
//!
//! DESIGN
//! ======
//! The snapshot lives in a `watch` channel so readers never wait on the
//! writer. Transitions fan out over one unbounded channel per subscriber:
//! every subscriber sees every transition, in provider order, never merged.
//!
//! Only the consumer task started by [`SessionStore::start`] writes the
//! snapshot. The imperative operations call the provider and return; their
//! effect on the session arrives later as a notification.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::provider::{IdentityProvider, SignUpOutcome};
use super::types::{AuthChangeKind, AuthSession, Session, SessionEvent, SessionStatus, SessionTransition};
use crate::error::{AuthError, ErrorCode, validate_credentials};
use crate::util::lock;

/// Shared handle to the session snapshot and its subscribers.
/// Clone is cheap: all fields are behind one `Arc`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    provider: Arc<dyn IdentityProvider>,
    snapshot: watch::Sender<Session>,
    listeners: Mutex<Vec<mpsc::UnboundedSender<SessionTransition>>>,
}

impl SessionStore {
    /// Store in the `Unknown` state with no consumer attached.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (snapshot, _) = watch::channel(Session::Unknown);
        Self { inner: Arc::new(StoreInner { provider, snapshot, listeners: Mutex::new(Vec::new()) }) }
    }

    /// Build a store and spawn its consumer task.
    ///
    /// The task subscribes to the provider before asking for the initial
    /// session, so nothing emitted in between is missed. It ends when the
    /// provider drops its side of the notification channel.
    pub fn start(provider: Arc<dyn IdentityProvider>) -> (Self, JoinHandle<()>) {
        let store = Self::new(provider);
        let events = store.inner.provider.on_auth_state_change();
        let task = tokio::spawn(store.clone().consume(events));
        (store, task)
    }

    async fn consume(self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        let initial = self.initial_check();
        tokio::pin!(initial);
        let mut initial_done = false;

        loop {
            tokio::select! {
                () = &mut initial, if !initial_done => {
                    initial_done = true;
                }
                maybe_event = events.recv() => {
                    if let Some(event) = maybe_event {
                        self.apply(event);
                    } else {
                        if !initial_done {
                            initial.await;
                        }
                        break;
                    }
                }
            }
        }
        debug!("identity provider channel closed; session consumer exiting");
    }

    async fn initial_check(&self) {
        match self.inner.provider.get_session().await {
            Ok(session) => {
                self.apply_initial(session);
            }
            Err(e) => {
                // EDGE: status stays Unknown, which keeps the gate blocked.
                warn!(error = %e, code = e.error_code(), "initial session check failed");
            }
        }
    }

    /// Latest known session. Never blocks.
    #[must_use]
    pub fn current_session(&self) -> Session {
        self.inner.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.snapshot.borrow().status()
    }

    /// Latest-value view for consumers that only care about the current
    /// session. Intermediate values may be skipped; use [`Self::subscribe`]
    /// to see every transition.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.inner.snapshot.subscribe()
    }

    /// Register a listener for every future transition.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionTransition> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner.listeners).push(tx);
        rx
    }

    /// Fold one provider notification into the snapshot and fan it out.
    pub(crate) fn apply(&self, event: SessionEvent) -> SessionTransition {
        let to = Session::from_provider(event.session);
        let from = self.inner.snapshot.send_replace(to.clone()).status();
        let transition = SessionTransition { kind: event.kind, from, to };
        self.publish(&transition);
        transition
    }

    /// Apply the initial session check, unless a notification got there first.
    pub(crate) fn apply_initial(&self, session: Option<AuthSession>) -> Option<SessionTransition> {
        let to = Session::from_provider(session);
        let applied = self.inner.snapshot.send_if_modified(|current| {
            if current.status() == SessionStatus::Unknown {
                *current = to.clone();
                true
            } else {
                false
            }
        });
        if !applied {
            debug!("initial session check superseded by provider notification");
            return None;
        }

        let transition = SessionTransition { kind: AuthChangeKind::InitialSession, from: SessionStatus::Unknown, to };
        self.publish(&transition);
        Some(transition)
    }

    fn publish(&self, transition: &SessionTransition) {
        info!(
            kind = ?transition.kind,
            from = ?transition.from,
            to = ?transition.to.status(),
            "session transition"
        );
        lock(&self.inner.listeners).retain(|tx| tx.send(transition.clone()).is_ok());
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// UI state must follow the resulting transition, not this call.
    ///
    /// # Errors
    ///
    /// `AuthError::Validation` if a field is empty (the provider is not
    /// contacted), otherwise whatever the provider reports.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        validate_credentials(email, password)?;
        self.inner
            .provider
            .sign_in_with_password(email.trim(), password)
            .await
            .inspect_err(|e| warn!(error = %e, code = e.error_code(), "sign-in failed"))
    }

    /// Create an account. With `ConfirmationRequired` no transition follows.
    ///
    /// # Errors
    ///
    /// Same as [`Self::sign_in`].
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        validate_credentials(email, password)?;
        let outcome = self
            .inner
            .provider
            .sign_up(email.trim(), password)
            .await
            .inspect_err(|e| warn!(error = %e, code = e.error_code(), "sign-up failed"))?;
        info!(?outcome, "sign-up accepted");
        Ok(outcome)
    }

    /// Open an external OAuth flow. The session, if any, arrives later as a
    /// transition, possibly after this call has returned.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the flow could not be started.
    pub async fn sign_in_with_provider(&self, provider_id: &str) -> Result<(), AuthError> {
        self.inner
            .provider
            .sign_in_with_oauth(provider_id)
            .await
            .inspect_err(|e| warn!(error = %e, %provider_id, "oauth sign-in failed"))
    }

    /// Sign out. A no-op that fires nothing when already signed out.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; the session is left unchanged.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        if self.status() == SessionStatus::Unauthenticated {
            debug!("sign-out requested while unauthenticated; nothing to do");
            return Ok(());
        }
        self.inner
            .provider
            .sign_out()
            .await
            .inspect_err(|e| warn!(error = %e, code = e.error_code(), "sign-out failed"))
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
