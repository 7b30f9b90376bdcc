//! Networking modules for authenticated REST calls.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the client wrapper every call goes through, `refresh` holds the
//! single-flight coordinator, `transport` is the browser seam, and `types`
//! defines the wire schema.

pub mod api;
pub mod refresh;
pub mod token_accessor;
pub mod transport;
pub mod types;
