//! Navigation guard for auth-required routes.
//!
//! Evaluated fresh on every transition; the only memory between
//! transitions is what the session store holds.
//!
//! 1. Public target: allow.
//! 2. No access token: redirect to the entry route, no network call.
//! 3. Token but no cached profile: fetch it once; if still absent, log out
//!    and redirect.
//! 4. Otherwise allow.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::routes::RouteMeta;
use crate::state::session::{IdentityApi, SessionStore};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavDecision {
    Allow,
    Redirect(String),
}

pub struct NavigationGuard<I> {
    session: SessionStore,
    identity: I,
    entry_route: String,
}

impl<I: IdentityApi> NavigationGuard<I> {
    pub fn new(session: SessionStore, identity: I, entry_route: impl Into<String>) -> Self {
        Self { session, identity, entry_route: entry_route.into() }
    }

    pub async fn check(&self, to: &RouteMeta) -> NavDecision {
        if !to.requires_auth {
            return NavDecision::Allow;
        }
        if !self.session.has_token() {
            log::debug!("no token for {}, redirecting", to.path);
            return self.redirect();
        }
        if !self.session.has_user() {
            self.session.fetch_user(&self.identity).await;
            if !self.session.has_user() {
                log::warn!("profile unavailable for {}, logging out", to.path);
                self.session.logout();
                return self.redirect();
            }
        }
        NavDecision::Allow
    }

    fn redirect(&self) -> NavDecision {
        NavDecision::Redirect(self.entry_route.clone())
    }
}
