//! Authentication session model, provider seam, and store.
//!
//! ARCHITECTURE
//! ============
//! The identity provider pushes `SessionEvent`s onto a channel. The
//! `SessionStore` is the only consumer: it folds each event into its snapshot
//! and republishes a `SessionTransition` to every subscriber. Presentation
//! code and the gate only ever read snapshots or transitions.

pub mod memory;
pub mod provider;
pub mod store;
pub mod types;

pub use provider::IdentityProvider;
pub use store::SessionStore;
pub use types::{AuthChangeKind, AuthSession, Identity, Session, SessionEvent, SessionStatus, SessionTransition, Token};
