//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LEADDESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `LEADDESK_BASE_URL` - Public URL of the API (https enables secure cookies)
//!
//! ## Optional
//! - `LEADDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `LEADDESK_PORT` - Listen port (default: 5001)
//! - `LEADDESK_UPLOAD_DIR` - Where uploads are staged (default: uploads)
//! - `LEADDESK_MAX_UPLOAD_BYTES` - Largest accepted upload (default: 5 MiB)
//! - `LEADDESK_CORS_ORIGIN` - Dashboard origin allowed to call the API with cookies
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)
//!
//! ## Optional (TLS)
//! - `LEADDESK_TLS_CERT` - PEM-encoded certificate chain
//! - `LEADDESK_TLS_KEY` - PEM-encoded private key

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API
    pub base_url: String,
    /// Upload staging
    pub uploads: UploadConfig,
    /// Browser origin allowed by CORS (optional)
    pub cors_origin: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Where and how large uploads may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Directory that holds staged uploads until they are distributed
    pub dir: PathBuf,
    /// Maximum accepted request body for an upload
    pub max_bytes: usize,
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        match (vars("LEADDESK_TLS_CERT"), vars("LEADDESK_TLS_KEY")) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "LEADDESK_TLS_*".to_string(),
                "Both LEADDESK_TLS_CERT and LEADDESK_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

impl UploadConfig {
    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let dir = vars("LEADDESK_UPLOAD_DIR").map_or_else(|| PathBuf::from("uploads"), PathBuf::from);
        let max_bytes = match vars("LEADDESK_MAX_UPLOAD_BYTES") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::InvalidEnvVar(
                        "LEADDESK_MAX_UPLOAD_BYTES".to_string(),
                        "must be greater than zero".to_string(),
                    ));
                }
                Ok(bytes) => bytes,
                Err(e) => {
                    return Err(ConfigError::InvalidEnvVar(
                        "LEADDESK_MAX_UPLOAD_BYTES".to_string(),
                        e.to_string(),
                    ));
                }
            },
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self { dir, max_bytes })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars(vars: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = vars("LEADDESK_DATABASE_URL")
            .or_else(|| vars("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("LEADDESK_DATABASE_URL".to_string()))?;
        let host = vars("LEADDESK_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LEADDESK_HOST".to_string(), e.to_string()))?;
        let port = vars("LEADDESK_PORT")
            .unwrap_or_else(|| "5001".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LEADDESK_PORT".to_string(), e.to_string()))?;
        let base_url = vars("LEADDESK_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("LEADDESK_BASE_URL".to_string()))?;

        let uploads = UploadConfig::from_vars(&vars)?;
        let cors_origin = vars("LEADDESK_CORS_ORIGIN").filter(|origin| !origin.is_empty());
        let sentry_dsn = vars("SENTRY_DSN");
        let sentry_environment = vars("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = vars("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = vars("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let tls = TlsConfig::from_vars(&vars)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            uploads,
            cors_origin,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the API is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}
