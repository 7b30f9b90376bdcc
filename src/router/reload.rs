//! One-shot recovery from lazily loaded route modules that fail to fetch,
//! typically after a redeploy replaced the chunk the page still refers to.
//!
//! A full reload is attempted once; the flag in durable storage stops a
//! reload loop and is cleared when routing comes up successfully.

#[cfg(test)]
#[path = "reload_test.rs"]
mod reload_test;

use std::rc::Rc;

use crate::util::storage::KeyValueStore;

pub const MODULE_LOAD_ERROR: &str = "Failed to fetch dynamically imported module";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadErrorAction {
    /// Force a full page load of the target path.
    Reload(String),
    /// A reload was already attempted; report the error instead.
    GiveUp,
    /// Not a module-load failure.
    Ignore,
}

pub struct DynamicReload {
    storage: Rc<dyn KeyValueStore>,
    key: String,
}

impl DynamicReload {
    pub fn new(storage: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    pub fn on_load_error(&self, message: &str, target: &str) -> LoadErrorAction {
        if !message.contains(MODULE_LOAD_ERROR) {
            log::error!("navigation error: {message}");
            return LoadErrorAction::Ignore;
        }
        if self.storage.get(&self.key).is_some() {
            log::error!("module load error persisted after reload: {message}");
            return LoadErrorAction::GiveUp;
        }
        log::info!("reloading {target} to recover from module load error");
        self.storage.set(&self.key, "true");
        LoadErrorAction::Reload(target.to_owned())
    }

    /// Routing initialized; allow a future reload attempt.
    pub fn mark_ready(&self) {
        self.storage.remove(&self.key);
    }
}
