//! Error types for jotter-core

use thiserror::Error;

/// Result type alias using jotter-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the backend or preparing a request.
///
/// `Api` carries the backend's own message and renders it verbatim, since
/// screens show it to the user unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// No backend project configured for this client
    #[error("Supabase is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY.")]
    NotConfigured,

    /// Backend configuration present but unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Transport-level failure
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed payload
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure response from the auth or data API
    #[error("{0}")]
    Api(String),

    /// Operation requires a signed-in user
    #[error("You are not signed in")]
    NotSignedIn,

    /// Secure session storage failure
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}
