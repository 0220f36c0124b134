//! Webapp configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Base URL of the hosted Supabase project
//! - `SUPABASE_ANON_KEY` - Anon API key for the PostgREST gateway
//!
//! ## Optional
//! - `LAVKA_HOST` - Bind address (default: 127.0.0.1)
//! - `LAVKA_PORT` - Listen port (default: 3000)
//! - `LAVKA_SESSION_TTL_SECS` - Idle session lifetime (default: 3600)
//! - `SUPABASE_REST_BASE` - Override for the PostgREST base URL
//!   (default: `{SUPABASE_URL}/rest/v1`)
//! - `TELEGRAM_BOT_TOKEN` - Bot token; enables init-data verification and,
//!   together with `TELEGRAM_ORDER_CHAT_ID`, order notifications
//! - `TELEGRAM_ORDER_CHAT_ID` - Chat that receives order summaries
//! - `TELEGRAM_API_BASE` - Bot API base URL (default: <https://api.telegram.org>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! Absence of either required Supabase value is fatal at startup; every
//! Telegram value is optional and its absence only disables the feature it
//! carries.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Webapp application configuration.
#[derive(Debug, Clone)]
pub struct WebappConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Idle lifetime of an in-memory session
    pub session_ttl: Duration,
    /// Supabase persistence gateway configuration
    pub supabase: SupabaseConfig,
    /// Telegram identity/notification configuration
    pub telegram: TelegramConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Supabase (PostgREST) gateway configuration.
///
/// Implements `Debug` manually to redact the anon key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// PostgREST base URL, e.g. `https://xyz.supabase.co/rest/v1`
    pub rest_base: Url,
    /// Anon API key sent as `apikey` and bearer token on every call
    pub anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("rest_base", &self.rest_base.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Telegram configuration.
///
/// Implements `Debug` manually to redact the bot token.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token; `None` disables init-data verification and notifications
    pub bot_token: Option<SecretString>,
    /// Chat that receives order notifications
    pub order_chat_id: Option<i64>,
    /// Bot API base URL; overridable so tests can point at a mock server
    pub api_base: String,
}

impl TelegramConfig {
    /// Whether order notifications can be sent at all.
    #[must_use]
    pub const fn notifications_enabled(&self) -> bool {
        self.bot_token.is_some() && self.order_chat_id.is_some()
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field(
                "bot_token",
                &self.bot_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("order_chat_id", &self.order_chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl WebappConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("LAVKA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LAVKA_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LAVKA_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LAVKA_PORT".to_string(), e.to_string()))?;
        let session_ttl_secs = get_env_or_default("LAVKA_SESSION_TTL_SECS", "3600")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LAVKA_SESSION_TTL_SECS".to_string(), e.to_string())
            })?;

        let supabase = SupabaseConfig::from_env()?;
        let telegram = TelegramConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            session_ttl: Duration::from_secs(session_ttl_secs),
            supabase,
            telegram,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let project_url = get_required_env("SUPABASE_URL")?;
        let project_url = Url::parse(&project_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;

        let rest_base = match get_optional_env("SUPABASE_REST_BASE") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("SUPABASE_REST_BASE".to_string(), e.to_string())
            })?,
            None => {
                let mut base = project_url;
                base.path_segments_mut()
                    .map_err(|()| {
                        ConfigError::InvalidEnvVar(
                            "SUPABASE_URL".to_string(),
                            "cannot be a base".to_string(),
                        )
                    })?
                    .pop_if_empty()
                    .extend(["rest", "v1"]);
                base
            }
        };

        let anon_key = get_required_env("SUPABASE_ANON_KEY").map(SecretString::from)?;

        Ok(Self {
            rest_base,
            anon_key,
        })
    }
}

impl TelegramConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bot_token = get_optional_env("TELEGRAM_BOT_TOKEN").map(SecretString::from);
        let order_chat_id = match get_optional_env("TELEGRAM_ORDER_CHAT_ID") {
            Some(raw) => Some(raw.parse::<i64>().map_err(|e| {
                ConfigError::InvalidEnvVar("TELEGRAM_ORDER_CHAT_ID".to_string(), e.to_string())
            })?),
            None => None,
        };
        let api_base = get_env_or_default("TELEGRAM_API_BASE", "https://api.telegram.org");

        Ok(Self {
            bot_token,
            order_chat_id,
            api_base,
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn supabase_config() -> SupabaseConfig {
        SupabaseConfig {
            rest_base: Url::parse("https://example.supabase.co/rest/v1").unwrap(),
            anon_key: SecretString::from("anon-key-value"),
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = WebappConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            session_ttl: Duration::from_secs(3600),
            supabase: supabase_config(),
            telegram: TelegramConfig {
                bot_token: None,
                order_chat_id: None,
                api_base: "https://api.telegram.org".to_string(),
            },
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_supabase_config_debug_redacts_anon_key() {
        let debug_output = format!("{:?}", supabase_config());
        assert!(debug_output.contains("example.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("anon-key-value"));
    }

    #[test]
    fn test_telegram_config_debug_redacts_token() {
        let config = TelegramConfig {
            bot_token: Some(SecretString::from("123:super-secret-token")),
            order_chat_id: Some(517_453_850),
            api_base: "https://api.telegram.org".to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("517453850"));
        assert!(!debug_output.contains("super-secret-token"));
    }

    #[test]
    fn test_notifications_enabled_requires_both_values() {
        let mut config = TelegramConfig {
            bot_token: Some(SecretString::from("t")),
            order_chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
        };
        assert!(!config.notifications_enabled());
        config.order_chat_id = Some(1);
        assert!(config.notifications_enabled());
        config.bot_token = None;
        assert!(!config.notifications_enabled());
    }
}
