//! User profile view and the cached user-email slice.
//!
//! SYSTEM CONTEXT
//! ==============
//! Presentation components read the signed-in user from `UserView`. The
//! email is also cached in the preference store so it is available on the
//! next cold start before the identity provider has answered.

use super::store::PreferenceStore;
use crate::session::{Identity, Session};

pub const USER_EMAIL_KEY: &str = "user_email";

/// What user-aware screens render from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub user: Option<Identity>,
    /// True while the session is still unknown.
    pub loading: bool,
}

impl UserView {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        match session {
            Session::Unknown => Self { user: None, loading: true },
            Session::Unauthenticated => Self { user: None, loading: false },
            Session::Authenticated(auth) => Self { user: Some(auth.identity.clone()), loading: false },
        }
    }

    /// Name to greet the user with: display name, else email.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        let user = self.user.as_ref()?;
        Some(user.name.as_deref().unwrap_or(&user.email))
    }
}

/// Mirror the session's email into the preference store.
///
/// `Unknown` leaves the cache alone; signing out clears it. Unchanged values
/// are not rewritten.
pub fn sync_user_email(prefs: &PreferenceStore, session: &Session) {
    match session {
        Session::Unknown => {}
        Session::Unauthenticated => {
            if prefs.get(USER_EMAIL_KEY).is_some() {
                prefs.remove(USER_EMAIL_KEY);
            }
        }
        Session::Authenticated(auth) => {
            if prefs.get_str(USER_EMAIL_KEY).as_deref() != Some(auth.identity.email.as_str()) {
                prefs.set(USER_EMAIL_KEY, auth.identity.email.as_str());
            }
        }
    }
}

/// Email cached by a previous session, if any.
#[must_use]
pub fn cached_user_email(prefs: &PreferenceStore) -> Option<String> {
    prefs.get_str(USER_EMAIL_KEY)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
