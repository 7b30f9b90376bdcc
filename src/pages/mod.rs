//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Pages only read the auth view-model and call session operations; the
//! guard in `app` decides whether they may be shown.

pub mod entry;
pub mod protected;
