//! # ui-auth
//!
//! Client-side authentication plumbing for the OKR single-page app: a
//! persisted session store, an HTTP client wrapper that attaches bearer
//! tokens and refreshes expired ones with single-flight coordination, and
//! a navigation guard for auth-required routes.
//!
//! The core builds natively; the `csr` feature adds the Leptos app, the
//! `fetch` transport and `localStorage` persistence for the browser.

pub mod config;
pub mod error;
pub mod net;
pub mod router;
pub mod state;
pub mod util;

#[cfg(feature = "csr")]
pub mod app;
#[cfg(feature = "csr")]
pub mod pages;

#[cfg(test)]
mod test_support;

/// WASM entry point: install logging and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
