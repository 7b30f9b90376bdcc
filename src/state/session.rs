//! Persisted session store: the current token pair and user profile.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owned by the application root and shared by the HTTP client wrapper and
//! the navigation guard. Consumers read through accessors and mutate only
//! through the operations below.
//!
//! DESIGN
//! ======
//! The in-memory session is the source of truth. Durable storage is a
//! write-through mirror for the two token strings, read once in
//! [`SessionStore::restore`]. The profile is never persisted.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::StorageKeys;
use crate::error::ApiError;
use crate::net::types::{TokenPair, UserProfile};
use crate::util::storage::KeyValueStore;

/// Resolves the profile for an access token.
///
/// Implemented by the HTTP client wrapper; the store only depends on this
/// seam.
#[allow(async_fn_in_trait)]
pub trait IdentityApi {
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, ApiError>;
}

/// Snapshot of the session. Empty strings mean "no token".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Option<UserProfile>,
}

#[derive(Clone)]
pub struct SessionStore {
    session: Rc<RefCell<Session>>,
    storage: Rc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.session.borrow();
        f.debug_struct("SessionStore")
            .field("has_token", &!session.access_token.is_empty())
            .field("has_refresh_token", &!session.refresh_token.is_empty())
            .field("user", &session.user.as_ref().map(|u| u.id))
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Load tokens persisted by a previous run. The profile starts absent.
    pub fn restore(storage: Rc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        let session = Session {
            access_token: storage.get(&keys.token).unwrap_or_default(),
            refresh_token: storage.get(&keys.refresh_token).unwrap_or_default(),
            user: None,
        };
        Self { session: Rc::new(RefCell::new(session)), storage, keys }
    }

    pub fn token(&self) -> String {
        self.session.borrow().access_token.clone()
    }

    pub fn refresh_token(&self) -> String {
        self.session.borrow().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.borrow().user.clone()
    }

    pub fn has_token(&self) -> bool {
        !self.session.borrow().access_token.is_empty()
    }

    pub fn has_user(&self) -> bool {
        self.session.borrow().user.is_some()
    }

    pub fn snapshot(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Replace the access token in memory and storage. An empty token also
    /// drops the cached profile.
    pub fn set_token(&self, token: &str) {
        {
            let mut session = self.session.borrow_mut();
            session.access_token = token.to_owned();
            if token.is_empty() {
                session.user = None;
            }
        }
        self.storage.set(&self.keys.token, token);
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.session.borrow_mut().refresh_token = token.to_owned();
        self.storage.set(&self.keys.refresh_token, token);
    }

    /// Store both tokens from a login or refresh response.
    pub fn set_tokens(&self, pair: &TokenPair) {
        self.set_token(&pair.access_token);
        self.set_refresh_token(&pair.refresh_token);
    }

    /// Replace the cached profile. Memory only.
    pub fn set_user(&self, user: Option<UserProfile>) {
        self.session.borrow_mut().user = user;
    }

    /// Load the profile for the current access token.
    ///
    /// No-op without a token. Failures clear the cached profile and are
    /// logged, never returned; inspect [`SessionStore::user`] afterwards.
    /// If the token is replaced while the request is in flight, the fetch
    /// is repeated with the new token.
    pub async fn fetch_user<I: IdentityApi>(&self, identity: &I) {
        let mut token = self.token();
        while !token.is_empty() {
            let result = identity.current_user(&token).await;
            let current = self.token();
            if current != token {
                // Rotated during the fetch: the answer belongs to the old
                // token. Ask again for the new one; a logout ends the loop.
                log::debug!("access token changed during profile fetch");
                token = current;
                continue;
            }
            match result {
                Ok(user) => self.set_user(Some(user)),
                Err(e) => {
                    self.set_user(None);
                    log::error!("failed to fetch user: {e}");
                }
            }
            return;
        }
    }

    /// Clear tokens and profile, in memory and storage. Idempotent.
    pub fn logout(&self) {
        *self.session.borrow_mut() = Session::default();
        self.storage.remove(&self.keys.token);
        self.storage.remove(&self.keys.refresh_token);
    }
}
