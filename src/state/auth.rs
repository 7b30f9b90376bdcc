//! Auth view-model for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Published as an `RwSignal` so user-aware components re-render when the
//! guard loads or clears the session.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::UserProfile;
use crate::state::session::SessionStore;

/// Current user and whether a guard check is still running.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub loading: bool,
}

impl AuthState {
    /// Settled view of the store.
    pub fn from_session(session: &SessionStore) -> Self {
        Self { user: session.user(), loading: false }
    }

    /// Settled with a user; protected content may render.
    pub fn is_signed_in(&self) -> bool {
        !self.loading && self.user.is_some()
    }
}

/// Whether auth has settled without a user.
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && state.user.is_none()
}
