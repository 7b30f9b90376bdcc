//! Client configuration resolved from build-time environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser has no process environment, so values are baked in at
//! compile time through `option_env!`. Parsing goes through
//! [`ClientConfig::from_lookup`] so it can be exercised with any source.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_ENTRY_ROUTE: &str = "/";
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 30;

/// Durable-storage keys used by the session and router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub token: String,
    pub refresh_token: String,
    pub dynamic_reload: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: "token".to_owned(),
            refresh_token: "refresh_token".to_owned(),
            dynamic_reload: "dynamic-reload".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root every request path is appended to, without a trailing `/`.
    pub base_url: String,
    /// Route unauthenticated navigations are redirected to.
    pub entry_route: String,
    /// Deadline for the token-refresh call. `None` waits indefinitely.
    pub refresh_timeout: Option<Duration>,
    pub storage_keys: StorageKeys,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            entry_route: DEFAULT_ENTRY_ROUTE.to_owned(),
            refresh_timeout: Some(Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS)),
            storage_keys: StorageKeys::default(),
        }
    }
}

impl ClientConfig {
    /// Build config from a key lookup.
    ///
    /// Optional:
    /// - `API_BASE_URL`: default `http://localhost:8000/api/v1`
    /// - `AUTH_ENTRY_ROUTE`: default `/`
    /// - `AUTH_REFRESH_TIMEOUT_SECS`: default 30, `0` disables the timeout
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the timeout is not an integer or the
    /// entry route is not an absolute path.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        let entry_route = lookup("AUTH_ENTRY_ROUTE").unwrap_or_else(|| DEFAULT_ENTRY_ROUTE.to_owned());
        if !entry_route.starts_with('/') {
            return Err(ConfigError::InvalidRoute { key: "AUTH_ENTRY_ROUTE", value: entry_route });
        }

        let refresh_timeout = parse_timeout(lookup("AUTH_REFRESH_TIMEOUT_SECS").as_deref())?;

        Ok(Self { base_url, entry_route, refresh_timeout, storage_keys: StorageKeys::default() })
    }

    /// Build config from values captured at compile time, falling back to
    /// defaults when a value is malformed.
    pub fn from_build_env() -> Self {
        let result = Self::from_lookup(|key| {
            let value = match key {
                "API_BASE_URL" => option_env!("API_BASE_URL"),
                "AUTH_ENTRY_ROUTE" => option_env!("AUTH_ENTRY_ROUTE"),
                "AUTH_REFRESH_TIMEOUT_SECS" => option_env!("AUTH_REFRESH_TIMEOUT_SECS"),
                _ => None,
            };
            value.map(str::to_owned)
        });
        result.unwrap_or_else(|e| {
            log::warn!("invalid client config, using defaults: {e}");
            Self::default()
        })
    }

    /// Absolute URL for an API path such as `/users/me`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn parse_timeout(raw: Option<&str>) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Some(Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS)));
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue { key: "AUTH_REFRESH_TIMEOUT_SECS", value: raw.to_owned() })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
