//! Authenticated HTTP client wrapper.
//!
//! Every outbound call gets `Authorization: Bearer <token>` when a token is
//! known. A 401 on a first attempt triggers the refresh protocol:
//!
//! - no refresh token: log out and return the 401;
//! - a refresh already running: park until it settles;
//! - otherwise lead the refresh, store the new pair, release parked
//!   requests in FIFO order, then retry.
//!
//! Each logical request is retried at most once; a 401 on the retry is
//! returned as-is.
//!
//! ERROR HANDLING
//! ==============
//! A failed refresh logs the session out and is returned to the leader and
//! to every parked request. Non-401 failures pass through untouched as
//! [`ApiError::Status`].

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::refresh::{RefreshCoordinator, RefreshTicket};
use super::token_accessor::TokenAccessor;
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use super::types::{LoginRequest, RefreshRequest, TokenPair, UserProfile};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::state::session::{IdentityApi, SessionStore};

pub const ME_PATH: &str = "/users/me";
pub const REFRESH_PATH: &str = "/users/refresh-token";
pub const LOGIN_PATH: &str = "/users/login";

const UNAUTHORIZED: u16 = 401;

fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

fn authorize(request: &mut ApiRequest, token: &str) {
    request.set_header("Authorization", bearer_value(token));
}

struct ClientInner<T> {
    transport: T,
    config: ClientConfig,
    session: SessionStore,
    tokens: TokenAccessor,
    refresh: RefreshCoordinator,
}

/// Cheap-to-clone handle; clones share the transport, session and refresh
/// coordinator.
pub struct ApiClient<T> {
    inner: Rc<ClientInner<T>>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(transport: T, config: ClientConfig, session: SessionStore, tokens: TokenAccessor) -> Self {
        Self {
            inner: Rc::new(ClientInner { transport, config, session, tokens, refresh: RefreshCoordinator::new() }),
        }
    }

    /// Client reading tokens from the live session store.
    pub fn live(transport: T, config: ClientConfig, session: SessionStore) -> Self {
        let tokens = TokenAccessor::Live(session.clone());
        Self::new(transport, config, session, tokens)
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Request for an API path such as `/objectives`.
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, self.inner.config.endpoint(path))
    }

    /// Send with bearer injection and one-shot refresh recovery.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] for any non-2xx final response, the
    /// refresh error if recovery failed, or the transport error.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        if let Some(token) = self.inner.tokens.access_token() {
            authorize(&mut request, &token);
        }

        let response = self.inner.transport.send(&request).await?;
        if response.status != UNAUTHORIZED {
            return response.error_for_status();
        }

        let token = self.recover(response).await?;
        authorize(&mut request, &token);
        self.inner.transport.send(&request).await?.error_for_status()
    }

    /// Obtain a fresh access token after a 401, leading or joining the
    /// single in-flight refresh.
    async fn recover(&self, unauthorized: ApiResponse) -> Result<String, ApiError> {
        let refresh_token = self.inner.session.refresh_token();
        if refresh_token.is_empty() {
            log::warn!("401 with no refresh token, logging out");
            self.inner.session.logout();
            return Err(ApiError::Status { status: unauthorized.status, body: unauthorized.body });
        }

        match self.inner.refresh.begin_or_enqueue() {
            RefreshTicket::Waiter(outcome) => outcome
                .await
                .unwrap_or_else(|_| Err(ApiError::Network("token refresh abandoned".to_owned()))),
            RefreshTicket::Leader(lease) => {
                log::debug!("access token rejected, refreshing");
                let outcome = self.refresh_tokens(&refresh_token).await;
                if let Err(e) = &outcome {
                    log::warn!("token refresh failed, logging out: {e}");
                    self.inner.session.logout();
                }
                lease.settle(&outcome);
                outcome
            }
        }
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> Result<String, ApiError> {
        let request = self
            .request(Method::Post, REFRESH_PATH)
            .json(&RefreshRequest { refresh_token })?
            .with_timeout(self.inner.config.refresh_timeout);
        let pair: TokenPair = self.inner.transport.send(&request).await?.error_for_status()?.json()?;
        self.inner.session.set_tokens(&pair);
        Ok(pair.access_token)
    }

    /// Exchange credentials for a token pair and start a session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] (401 for bad credentials) or a
    /// transport/decode error. The session is untouched on failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let request = self.request(Method::Post, LOGIN_PATH).json(&LoginRequest { username, password })?;
        let pair: TokenPair = self.inner.transport.send(&request).await?.error_for_status()?.json()?;
        self.inner.session.set_user(None);
        self.inner.session.set_tokens(&pair);
        Ok(pair)
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`]; also [`ApiError::Decode`] for a body that is
    /// not an `R`.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(self.request(Method::Get, path)).await?.json()
    }

    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn post_json<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        let request = self.request(Method::Post, path).json(body)?;
        self.send(request).await?.json()
    }

    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn put_json<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        let request = self.request(Method::Put, path).json(body)?;
        self.send(request).await?.json()
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.request(Method::Delete, path)).await
    }
}

impl<T: HttpTransport> IdentityApi for ApiClient<T> {
    /// Raw `GET /users/me` with an explicit token; no refresh recovery.
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let mut request = self.request(Method::Get, ME_PATH);
        authorize(&mut request, access_token);
        self.inner.transport.send(&request).await?.error_for_status()?.json()
    }
}
