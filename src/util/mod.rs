//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from session and
//! routing logic so that logic stays testable off the browser.

pub mod storage;
