//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PACKLINE_API_URL` - Base URL of the receiving API (e.g. `https://erp.example.com/api/`)
//! - `PACKLINE_API_TOKEN` - Bearer token attached to every request
//!
//! ## Optional
//! - `PACKLINE_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `PACKLINE_TOLERANCE` - Accepted difference between package total and target (default: 0.01)

use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use packline_core::DEFAULT_TOLERANCE;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &["your-", "changeme", "replace", "placeholder", "xxx"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Receiving API client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to
    pub api_url: Url,
    /// Bearer token
    pub api_token: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
    /// Reconciliation tolerance
    pub tolerance: Decimal,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with default timeout and tolerance.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an absolute
    /// `http`/`https` URL.
    pub fn new(api_url: &str, api_token: SecretString) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            api_token,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value is
    /// malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let api_url = parse_api_url(&get_required("PACKLINE_API_URL")?)?;

        let token = get_required("PACKLINE_API_TOKEN")?;
        validate_token(&token, "PACKLINE_API_TOKEN")?;

        let timeout_secs = match lookup("PACKLINE_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("PACKLINE_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let tolerance = match lookup("PACKLINE_TOLERANCE") {
            Some(raw) => parse_tolerance(&raw)?,
            None => DEFAULT_TOLERANCE,
        };

        Ok(Self {
            api_url,
            api_token: SecretString::from(token),
            timeout: Duration::from_secs(timeout_secs),
            tolerance,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL. A trailing slash is added so paths append cleanly.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("PACKLINE_API_URL".to_string(), reason);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_tolerance(raw: &str) -> Result<Decimal, ConfigError> {
    let tolerance = raw.trim().parse::<Decimal>().map_err(|e| {
        ConfigError::InvalidEnvVar("PACKLINE_TOLERANCE".to_string(), e.to_string())
    })?;
    if tolerance.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            "PACKLINE_TOLERANCE".to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(tolerance)
}

/// Reject tokens that are obviously copied from an example file.
fn validate_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = token.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}
