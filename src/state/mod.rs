//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! `session` owns the token pair and profile; `auth` is the reactive view
//! of it that components render from.

pub mod auth;
pub mod session;
