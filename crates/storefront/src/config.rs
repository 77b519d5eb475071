//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MEDUSA_BACKEND_URL` - Medusa store API base URL (default: <http://localhost:9000>)
//! - `MEDUSA_PUBLISHABLE_KEY` - Publishable API key sent as `x-publishable-api-key`
//! - `MEDUSA_REGION_ID` - Region passed to product listing and cart creation
//! - `MEDUSA_PRODUCT_LIMIT` - Page size for product listing (default: 12)
//! - `MEDUSA_MAX_RETRIES` - Extra attempts for transient read failures (default: 3)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_DATA_DIR` - Directory for durable cart/product snapshots (default: .pps-data)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_BACKEND_URL: &str = "http://localhost:9000";
const DEFAULT_PRODUCT_LIMIT: u32 = 12;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Root directory for durable snapshots
    pub data_dir: PathBuf,
    /// Medusa store API configuration
    pub medusa: MedusaConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Medusa store API configuration.
///
/// Implements `Debug` manually so the publishable key is not logged in full.
#[derive(Clone)]
pub struct MedusaConfig {
    /// Base URL of the Medusa backend (no trailing slash)
    pub backend_url: Url,
    /// Publishable API key for store-scoped calls
    pub publishable_key: Option<SecretString>,
    /// Region used for price calculation
    pub region_id: Option<String>,
    /// Number of products requested by the listing call
    pub product_limit: u32,
    /// Extra attempts for reads failing with a network error, 429 or 5xx
    pub max_retries: u32,
}

impl std::fmt::Debug for MedusaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedusaConfig")
            .field("backend_url", &self.backend_url.as_str())
            .field(
                "publishable_key",
                &self
                    .publishable_key
                    .as_ref()
                    .map(|key| redact_key(key.expose_secret())),
            )
            .field("region_id", &self.region_id)
            .field("product_limit", &self.product_limit)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl MedusaConfig {
    /// Configuration pointing at a backend URL with every other setting defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `backend_url` does not parse.
    pub fn for_backend(backend_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: parse_backend_url("MEDUSA_BACKEND_URL", backend_url)?,
            publishable_key: None,
            region_id: None,
            product_limit: DEFAULT_PRODUCT_LIMIT,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let backend_url = get_env_or_default("MEDUSA_BACKEND_URL", DEFAULT_BACKEND_URL);
        Ok(Self {
            backend_url: parse_backend_url("MEDUSA_BACKEND_URL", &backend_url)?,
            publishable_key: get_optional_env("MEDUSA_PUBLISHABLE_KEY").map(SecretString::from),
            region_id: get_optional_env("MEDUSA_REGION_ID"),
            product_limit: parse_env_or_default("MEDUSA_PRODUCT_LIMIT", DEFAULT_PRODUCT_LIMIT)?,
            max_retries: parse_env_or_default("MEDUSA_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = parse_env_or_default("STOREFRONT_PORT", 3000_u16)?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let data_dir = PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", ".pps-data"));

        Ok(Self {
            host,
            port,
            base_url,
            data_dir,
            medusa: MedusaConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Directory holding one subdirectory of cart snapshots per visitor.
    #[must_use]
    pub fn carts_dir(&self) -> PathBuf {
        self.data_dir.join("carts")
    }

    /// Directory holding visitor session records.
    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse and validate the backend base URL.
fn parse_backend_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Keep only a short prefix of a key for diagnostics.
fn redact_key(key: &str) -> String {
    let prefix: String = key.chars().take(6).collect();
    format!("{prefix}…[REDACTED]")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            data_dir: PathBuf::from("/tmp/pps"),
            medusa: MedusaConfig::for_backend("http://localhost:9000").unwrap(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_backend_url_rejects_non_http() {
        let err = MedusaConfig::for_backend("ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(MedusaConfig::for_backend("not a url").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = MedusaConfig::for_backend(DEFAULT_BACKEND_URL).unwrap();
        assert_eq!(config.product_limit, 12);
        assert_eq!(config.max_retries, 3);
        assert!(config.publishable_key.is_none());
    }

    #[test]
    fn test_carts_dir() {
        let config = test_config();
        assert_eq!(config.carts_dir(), PathBuf::from("/tmp/pps/carts"));
        assert!(!config.is_secure());
    }

    #[test]
    fn test_medusa_config_debug_redacts_key() {
        let mut config = MedusaConfig::for_backend("http://localhost:9000").unwrap();
        config.publishable_key = Some(SecretString::from("pk_0123456789abcdef"));

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("localhost:9000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("0123456789abcdef"));
    }
}
