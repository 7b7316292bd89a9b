//! Client error types

use thiserror::Error;

/// Configuration failures. These are fatal at construction; a client with a
/// placeholder URL must never get as far as a network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Backend URL is empty
    #[error("backend URL is not set")]
    MissingUrl,

    /// Backend URL still carries the config template placeholder
    #[error("backend URL still points at the config template placeholder")]
    PlaceholderUrl,

    /// Backend URL has no usable scheme
    #[error("backend URL must start with http:// or https://, got '{0}'")]
    InvalidUrl(String),

    /// API key is empty
    #[error("backend API key is not set")]
    MissingApiKey,

    /// The HTTP client itself could not be built
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Auth collaborator failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials or token rejected
    #[error("sign-in rejected: {0}")]
    InvalidCredentials(String),

    /// Malformed response body
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Any other auth service failure
    #[error("auth service error: {0}")]
    Provider(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Store collaborator failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Write rejected by the store's access rules
    #[error("permission denied: {0}")]
    Denied(String),

    /// No row matched the id
    #[error("zone not found")]
    NotFound,

    /// Malformed response body
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Any other store-side failure
    #[error("store error: {0}")]
    Provider(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
