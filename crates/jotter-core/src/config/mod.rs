//! Backend client configuration.
//!
//! A `ClientConfig` names the hosted Supabase project every screen talks to.
//! Both values are public (the anon key is safe to ship); user credentials
//! never live here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

impl ClientConfig {
    /// Build a validated config. The URL is stored without a trailing slash.
    pub fn new(supabase_url: impl AsRef<str>, supabase_anon_key: impl AsRef<str>) -> Result<Self> {
        let supabase_url = normalize_project_url(supabase_url.as_ref())?;
        let supabase_anon_key = supabase_anon_key.as_ref().trim().to_string();
        if supabase_anon_key.is_empty() {
            return Err(Error::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            request_timeout: default_request_timeout(),
        })
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load `SUPABASE_URL` / `SUPABASE_ANON_KEY` from the environment.
    ///
    /// Returns `Ok(None)` when neither is set and an error when only one is.
    pub fn from_env() -> Result<Option<Self>> {
        let Some((url, anon_key)) = resolve_optional_supabase_config(
            std::env::var(ENV_SUPABASE_URL).ok(),
            std::env::var(ENV_SUPABASE_ANON_KEY).ok(),
        )?
        else {
            return Ok(None);
        };

        Ok(Some(Self::new(url, anon_key)?))
    }

    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }

    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }
}

/// Pair up optional URL and key values, rejecting half-configured input.
pub fn resolve_optional_supabase_config(
    url: Option<String>,
    anon_key: Option<String>,
) -> Result<Option<(String, String)>> {
    let url = normalize_text_option(url);
    let anon_key = normalize_text_option(anon_key);

    match (url, anon_key) {
        (None, None) => Ok(None),
        (Some(url), Some(anon_key)) => Ok(Some((url, anon_key))),
        _ => Err(Error::NotConfigured),
    }
}

/// Strip trailing slashes and any `/auth/v1` or `/rest/v1` suffix.
pub fn normalize_project_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !is_http_url(trimmed) {
        return Err(Error::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }

    let base = trimmed
        .strip_suffix("/auth/v1")
        .or_else(|| trimmed.strip_suffix("/rest/v1"))
        .unwrap_or(trimmed);
    Ok(base.to_string())
}
