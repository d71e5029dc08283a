//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required for charges
//! - `PIX_GATEWAY_TOKEN` - Payment gateway bearer token (high entropy)
//! - `PIX_GATEWAY_STORE_ID` - Store identifier sent as `Store-Id`
//!
//! The server starts without them and answers charge requests with a
//! configuration error.
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL the checkout posts charges to (default: <http://localhost:3000>)
//! - `PIX_GATEWAY_URL` - Gateway base URL (default: <https://api.fruitfy.io>)
//! - `PIX_GATEWAY_PRODUCT_ID` - Canonical product id forced on every item
//! - `CEP_DIRECTORY_URL` - Postal-code directory (default: <https://viacep.com.br/ws>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;
use vitrine_core::ProductId;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_GATEWAY_URL: &str = "https://api.fruitfy.io";
const DEFAULT_CEP_DIRECTORY_URL: &str = "https://viacep.com.br/ws";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Payment gateway configuration
    pub gateway: GatewayConfig,
    /// Postal-code directory base URL
    pub cep_directory_url: Url,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Payment gateway configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Gateway base URL
    pub base_url: Url,
    /// Bearer token
    pub token: Option<SecretString>,
    /// Store identifier
    pub store_id: Option<String>,
    /// Product id forced on every charged item
    pub product_id: Option<ProductId>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("store_id", &self.store_id)
            .field("product_id", &self.product_id)
            .finish()
    }
}

impl GatewayConfig {
    /// Gateway configuration with only a base URL.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            store_id: None,
            product_id: None,
        }
    }

    /// Token and store id, if both are present.
    #[must_use]
    pub fn credentials(&self) -> Option<(&SecretString, &str)> {
        Some((self.token.as_ref()?, self.store_id.as_deref()?))
    }

    /// Names of the missing credential variables.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.token.is_none() {
            missing.push("PIX_GATEWAY_TOKEN");
        }
        if self.store_id.is_none() {
            missing.push("PIX_GATEWAY_STORE_ID");
        }
        missing
    }

    /// Full URL of the charge endpoint.
    #[must_use]
    pub fn charge_url(&self) -> String {
        format!("{}/api/pix/charge", self.base_url.as_str().trim_end_matches('/'))
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or if the gateway
    /// token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let host = env
            .get_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = env
            .get_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = env.url("STOREFRONT_BASE_URL", "http://localhost:3000")?;

        let gateway = GatewayConfig {
            base_url: env.url("PIX_GATEWAY_URL", DEFAULT_GATEWAY_URL)?,
            token: env.validated_secret("PIX_GATEWAY_TOKEN")?,
            store_id: env.get("PIX_GATEWAY_STORE_ID"),
            product_id: env.get("PIX_GATEWAY_PRODUCT_ID").map(ProductId::from),
        };

        Ok(Self {
            host,
            port,
            base_url,
            gateway,
            cep_directory_url: env.url("CEP_DIRECTORY_URL", DEFAULT_CEP_DIRECTORY_URL)?,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating empty values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a URL variable with a default value.
    fn url(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        Url::parse(&self.get_or_default(key, default))
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Load and validate an optional secret.
    fn validated_secret(&self, key: &str) -> Result<Option<SecretString>, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let secret = SecretString::from(value);
        validate_secret_strength(secret.expose_secret(), key)?;
        Ok(Some(secret))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by the gateway."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOKEN: &str = "fk_live_8Qz3Lm0vR7tYw2Nc5Hd9Jp4K";

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url.as_str(), "http://localhost:3000/");
        assert_eq!(
            config.gateway.charge_url(),
            "https://api.fruitfy.io/api/pix/charge"
        );
        assert_eq!(config.cep_directory_url.as_str(), "https://viacep.com.br/ws");
        assert!(config.gateway.credentials().is_none());
        assert!(config.gateway.product_id.is_none());
    }

    #[test]
    fn test_missing_credentials_are_named() {
        let config = load(&[("PIX_GATEWAY_STORE_ID", "store-42")]).unwrap();
        assert_eq!(config.gateway.missing(), vec!["PIX_GATEWAY_TOKEN"]);

        let config = load(&[("PIX_GATEWAY_TOKEN", TOKEN), ("PIX_GATEWAY_STORE_ID", "  ")]).unwrap();
        assert_eq!(config.gateway.missing(), vec!["PIX_GATEWAY_STORE_ID"]);
    }

    #[test]
    fn test_full_gateway_config() {
        let config = load(&[
            ("PIX_GATEWAY_URL", "http://127.0.0.1:9999/"),
            ("PIX_GATEWAY_TOKEN", TOKEN),
            ("PIX_GATEWAY_STORE_ID", "store-42"),
            ("PIX_GATEWAY_PRODUCT_ID", "prod-canonical"),
        ])
        .unwrap();

        let (token, store_id) = config.gateway.credentials().unwrap();
        assert_eq!(token.expose_secret(), TOKEN);
        assert_eq!(store_id, "store-42");
        assert_eq!(
            config.gateway.product_id,
            Some(ProductId::new("prod-canonical"))
        );
        assert_eq!(
            config.gateway.charge_url(),
            "http://127.0.0.1:9999/api/pix/charge"
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load(&[("STOREFRONT_PORT", "http")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("PIX_GATEWAY_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_placeholder_token_aborts() {
        assert!(matches!(
            load(&[("PIX_GATEWAY_TOKEN", "your-gateway-token")]),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(TOKEN, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_gateway_config_debug_redacts_token() {
        let config = load(&[
            ("PIX_GATEWAY_TOKEN", TOKEN),
            ("PIX_GATEWAY_STORE_ID", "store-42"),
        ])
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("store-42"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(TOKEN));
    }
}
