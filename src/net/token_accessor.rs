//! Where the request path reads the current access token from.

use std::rc::Rc;

use crate::state::session::SessionStore;
use crate::util::storage::KeyValueStore;

/// Token lookup strategy, chosen when the client is built.
#[derive(Clone)]
pub enum TokenAccessor {
    /// Read the live session store.
    Live(SessionStore),
    /// Read durable storage directly, for code running outside the
    /// application root that owns the store.
    Stored { storage: Rc<dyn KeyValueStore>, key: String },
}

impl TokenAccessor {
    /// Current access token, `None` when absent or empty.
    pub fn access_token(&self) -> Option<String> {
        let token = match self {
            Self::Live(session) => session.token(),
            Self::Stored { storage, key } => storage.get(key).unwrap_or_default(),
        };
        (!token.is_empty()).then_some(token)
    }
}
