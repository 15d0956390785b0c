//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DINEHUB_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CLOUDINARY_CLOUD_NAME` - Cloudinary cloud that hosts restaurant images
//! - `CLOUDINARY_API_KEY` - Cloudinary API key
//! - `CLOUDINARY_API_SECRET` - Cloudinary API secret (used to sign uploads)
//!
//! ## Optional
//! - `DINEHUB_HOST` - Bind address (default: 127.0.0.1)
//! - `DINEHUB_PORT` - Listen port (default: 7000)
//! - `DINEHUB_FRONTEND_URL` - Allowed CORS origin (default: any origin)
//! - `DINEHUB_AUTH_SUBJECT_HEADER` - Header carrying the verified auth subject (default: x-auth-subject)
//! - `DINEHUB_MAX_UPLOAD_BYTES` - Maximum restaurant form size (default: 5 MiB)
//! - `DINEHUB_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderName;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default header the upstream auth gateway uses for the verified subject.
pub const DEFAULT_AUTH_SUBJECT_HEADER: &str = "x-auth-subject";

/// Default cap on request bodies for restaurant forms (image included).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

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

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Frontend origin allowed by CORS; `None` allows any origin
    pub frontend_url: Option<Url>,
    /// How callers are identified on protected routes
    pub auth: AuthConfig,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Cloudinary image hosting configuration
    pub cloudinary: CloudinaryConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Caller identification settings.
///
/// Token verification happens upstream; this service only trusts the header
/// the gateway sets after verifying the caller.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Header carrying the verified auth provider subject (`auth0Id`)
    pub subject_header: HeaderName,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            subject_header: HeaderName::from_static(DEFAULT_AUTH_SUBJECT_HEADER),
        }
    }
}

/// Cloudinary configuration.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct CloudinaryConfig {
    /// Cloud name (first path segment of upload URLs)
    pub cloud_name: String,
    /// API key sent with every signed upload
    pub api_key: String,
    /// API secret used to sign uploads
    pub api_secret: SecretString,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("DINEHUB_DATABASE_URL")?;
        let host = parse_env("DINEHUB_HOST", "127.0.0.1")?;
        let port = parse_env("DINEHUB_PORT", "7000")?;
        let frontend_url = get_optional_env("DINEHUB_FRONTEND_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("DINEHUB_FRONTEND_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;
        let auth = AuthConfig::from_env()?;
        let max_upload_bytes = parse_env(
            "DINEHUB_MAX_UPLOAD_BYTES",
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )?;
        let log_json = match get_optional_env("DINEHUB_LOG_FORMAT").as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "DINEHUB_LOG_FORMAT".to_string(),
                    format!("expected `text` or `json`, got `{other}`"),
                ));
            }
        };
        let cloudinary = CloudinaryConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            frontend_url,
            auth,
            max_upload_bytes,
            log_json,
            cloudinary,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the CORS origin (scheme, host and port) of the frontend, if configured.
    #[must_use]
    pub fn frontend_origin(&self) -> Option<String> {
        self.frontend_url
            .as_ref()
            .map(|url| url.origin().ascii_serialization())
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let Some(raw) = get_optional_env("DINEHUB_AUTH_SUBJECT_HEADER") else {
            return Ok(Self::default());
        };
        let subject_header = HeaderName::try_from(raw.trim().to_ascii_lowercase()).map_err(|e| {
            ConfigError::InvalidEnvVar("DINEHUB_AUTH_SUBJECT_HEADER".to_string(), e.to_string())
        })?;
        Ok(Self { subject_header })
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cloud_name: get_required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: get_required_env("CLOUDINARY_API_KEY")?,
            api_secret: get_validated_secret("CLOUDINARY_API_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, using `default` when it is unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_value(key, &raw)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

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
    fn test_cloudinary_style_secret_is_accepted() {
        let result = validate_secret_strength("Qm7vK2pX9tLw4RzB8nHc3JdF6yE", "CLOUDINARY_API_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_placeholder_secret_is_rejected() {
        let err = validate_secret_strength("your-cloudinary-secret", "CLOUDINARY_API_SECRET")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_low_entropy_secret_is_rejected() {
        let result = validate_secret_strength("abababababababab", "CLOUDINARY_API_SECRET");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_value_reports_variable() {
        let err = parse_value::<u16>("DINEHUB_PORT", "seventy").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "DINEHUB_PORT")
        );
        assert_eq!(parse_value::<u16>("DINEHUB_PORT", " 7000 ").unwrap(), 7000);
    }

    #[test]
    fn test_default_auth_header() {
        assert_eq!(AuthConfig::default().subject_header.as_str(), "x-auth-subject");
    }

    #[test]
    fn test_cloudinary_debug_redacts_secret() {
        let config = CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "1234".to_string(),
            api_secret: SecretString::from("Qm7vK2pX9tLw4RzB8nHc3JdF6yE"),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("Qm7vK2pX9tLw4RzB8nHc3JdF6yE"));
    }
}
