//! Client configuration

use crate::error::ConfigError;

/// Marker string shipped in the config template. A URL still containing it
/// means nobody filled the template in.
const TEMPLATE_PLACEHOLDER: &str = "DEIN-PROJEKT";

/// Connection settings for the hosted backend.
///
/// # Environment variables
///
/// All settings can be loaded from the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | BACKEND_URL | http://localhost:54321 | Project base URL of the hosted backend |
/// | BACKEND_ANON_KEY | dev-anon-key | Public API key sent as `apikey` on every request |
/// | BACKEND_TIMEOUT_SECS | 30 | Request timeout in seconds |
///
/// The defaults point at a locally running cloud mock.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Project base URL, e.g. "https://xyzcompany.supabase.co"
    pub base_url: String,

    /// Public API key, sent as the `apikey` header on every request
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a configuration with the default timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: 30,
        }
    }

    /// Load from environment variables, falling back to the local defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:54321".into()),
            api_key: std::env::var("BACKEND_ANON_KEY").unwrap_or_else(|_| "dev-anon-key".into()),
            timeout: std::env::var("BACKEND_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Reject configurations that can never work before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if url.contains(TEMPLATE_PLACEHOLDER) {
            return Err(ConfigError::PlaceholderUrl);
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.base_url.clone()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
