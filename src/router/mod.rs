//! Route metadata and navigation gating.
//!
//! ARCHITECTURE
//! ============
//! `routes` says which paths need a session, `guard` decides each
//! transition against the session store, and `reload` recovers once from a
//! failed lazy-module load.

pub mod guard;
pub mod reload;
pub mod routes;
