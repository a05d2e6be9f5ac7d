//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. Provider credentials are
//! optional: without them the server still starts, but emergency triggers
//! fail with a configuration error.

use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CLIENT_URL: &str = "http://localhost:5500";
const DEFAULT_SMS_TIMEOUT_SECS: u64 = 10;

/// Which user store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Client origin allowed by CORS
    pub client_url: String,
    /// User store selection
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,

    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,

    // --- SMS provider ---
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    /// Sender address for outbound SMS
    pub twilio_phone_number: Option<String>,
    /// Upper bound on a single outbound send
    pub sms_send_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            var(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match non_empty("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT", raw))?,
            None => DEFAULT_PORT,
        };

        let store_backend = match non_empty("STORE_BACKEND").as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("firestore") => StoreBackend::Firestore,
            Some(other) => return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        };

        // Must be at least one second.
        let sms_timeout_secs = match non_empty("SMS_SEND_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::Invalid("SMS_SEND_TIMEOUT_SECS", raw)),
            },
            None => DEFAULT_SMS_TIMEOUT_SECS,
        };

        Ok(Self {
            port,
            client_url: non_empty("CLIENT_URL").unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string()),
            store_backend,
            gcp_project_id: non_empty("GCP_PROJECT_ID").unwrap_or_else(|| "local-dev".to_string()),
            jwt_signing_key: non_empty("JWT_SECRET")
                .ok_or(ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            twilio_account_sid: non_empty("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: non_empty("TWILIO_AUTH_TOKEN"),
            twilio_phone_number: non_empty("TWILIO_PHONE_NUMBER"),
            sms_send_timeout: Duration::from_secs(sms_timeout_secs),
        })
    }

    /// Deterministic config for tests: in-memory store, no SMS provider.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            client_url: DEFAULT_CLIENT_URL.to_string(),
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_phone_number: None,
            sms_send_timeout: Duration::from_secs(2),
        }
    }

    /// Twilio credentials, if both halves are configured.
    pub fn twilio_credentials(&self) -> Option<(&str, &str)> {
        match (&self.twilio_account_sid, &self.twilio_auth_token) {
            (Some(sid), Some(token)) => Some((sid.as_str(), token.as_str())),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
