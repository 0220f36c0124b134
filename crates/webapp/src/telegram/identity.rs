//! Identity bootstrap from Telegram Mini App init-data.
//!
//! Requests carry `Authorization: tma <init-data>`. The init-data is a query
//! string signed by Telegram: the `hash` parameter is HMAC-SHA256 over the
//! sorted remaining parameters, keyed by `HMAC_SHA256("WebAppData", bot_token)`.
//!
//! Resolution is deliberately infallible: when the header is absent,
//! unparsable, or fails verification, the fixed placeholder profile is
//! substituted unconditionally and silently, so the rest of the system
//! proceeds uniformly outside a Telegram host. No degraded state is surfaced.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

use lavka_core::TelegramId;

use crate::models::TelegramUser;

type HmacSha256 = Hmac<Sha256>;

/// Init-data older than this is rejected during verification.
const MAX_INIT_DATA_AGE_SECONDS: i64 = 86_400;

/// Host lifecycle calls and chrome colors the webview shim executes once at
/// startup, returned by the bootstrap response.
#[derive(Debug, Clone, Serialize)]
pub struct HostDirectives {
    pub signal_ready: bool,
    pub request_expand: bool,
    pub header_color: String,
    pub background_color: String,
}

impl Default for HostDirectives {
    fn default() -> Self {
        Self {
            signal_ready: true,
            request_expand: true,
            header_color: "#1a1a1a".to_string(),
            background_color: "#1a1a1a".to_string(),
        }
    }
}

/// Why an init-data string was not accepted. Internal only: resolution
/// swallows these and falls back to the placeholder profile.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("missing hash parameter")]
    MissingHash,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("init data is too old ({age_seconds} seconds)")]
    Stale { age_seconds: i64 },
    #[error("missing user parameter")]
    MissingUser,
    #[error("malformed user payload: {0}")]
    MalformedUser(#[from] serde_json::Error),
}

/// The fixed profile used outside a Telegram host.
#[must_use]
pub fn placeholder_user() -> TelegramUser {
    TelegramUser {
        id: TelegramId::new(123_456_789),
        first_name: "Test".to_string(),
        last_name: Some("User".to_string()),
        username: Some("testuser".to_string()),
        language_code: Some("en".to_string()),
    }
}

/// Resolve a profile from an optional init-data string.
///
/// With a bot token configured the signature and age are verified; without
/// one the embedded profile is trusted as-is. Every failure path substitutes
/// the placeholder profile.
#[must_use]
pub fn resolve_identity(
    init_data: Option<&str>,
    bot_token: Option<&SecretString>,
) -> TelegramUser {
    let Some(init_data) = init_data else {
        return placeholder_user();
    };

    let resolved = match bot_token {
        Some(token) => verify_init_data(init_data, token.expose_secret()),
        None => extract_user(init_data),
    };

    match resolved {
        Ok(user) => user,
        Err(error) => {
            tracing::debug!(%error, "init data rejected, using placeholder identity");
            placeholder_user()
        }
    }
}

/// Verify the init-data signature and age, then extract the user profile.
///
/// # Errors
///
/// Returns `IdentityError` when the hash is absent or wrong, the data is
/// stale, or the user payload is missing or malformed.
pub fn verify_init_data(init_data: &str, bot_token: &str) -> Result<TelegramUser, IdentityError> {
    let params = parse_query(init_data);

    let received_hash = params.get("hash").ok_or(IdentityError::MissingHash)?;

    // Data-check-string: all parameters except hash, sorted by key.
    let mut check_pairs: Vec<String> = params
        .iter()
        .filter(|(key, _)| key.as_str() != "hash")
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    check_pairs.sort();
    let data_check_string = check_pairs.join("\n");

    // Secret key: HMAC_SHA256("WebAppData", bot_token)
    let mut secret_key_mac =
        HmacSha256::new_from_slice(b"WebAppData").expect("HMAC can take key of any size");
    secret_key_mac.update(bot_token.as_bytes());
    let secret_key = secret_key_mac.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret_key).expect("HMAC can take key of any size");
    mac.update(data_check_string.as_bytes());
    let calculated_hash = hex::encode(mac.finalize().into_bytes());

    if calculated_hash != *received_hash {
        return Err(IdentityError::SignatureMismatch);
    }

    if let Some(auth_date) = params.get("auth_date").and_then(|v| v.parse::<i64>().ok()) {
        let now = chrono::Utc::now().timestamp();
        let age_seconds = now - auth_date;
        if age_seconds > MAX_INIT_DATA_AGE_SECONDS {
            return Err(IdentityError::Stale { age_seconds });
        }
    }

    user_from_params(&params)
}

/// Extract the user profile without verifying the signature (no bot token
/// configured).
///
/// # Errors
///
/// Returns `IdentityError` when the user payload is missing or malformed.
pub fn extract_user(init_data: &str) -> Result<TelegramUser, IdentityError> {
    user_from_params(&parse_query(init_data))
}

fn parse_query(init_data: &str) -> HashMap<String, String> {
    init_data
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) => {
                    let decoded = urlencoding::decode(value).ok()?;
                    Some((key.to_string(), decoded.to_string()))
                }
                _ => None,
            }
        })
        .collect()
}

fn user_from_params(params: &HashMap<String, String>) -> Result<TelegramUser, IdentityError> {
    let user_json = params.get("user").ok_or(IdentityError::MissingUser)?;
    Ok(serde_json::from_str(user_json)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BOT_TOKEN: &str = "12345:test-bot-token";

    /// Build a correctly signed init-data string, the way Telegram would.
    fn signed_init_data(user_json: &str, auth_date: i64) -> String {
        let pairs = vec![
            ("auth_date".to_string(), auth_date.to_string()),
            ("query_id".to_string(), "AAF0e".to_string()),
            ("user".to_string(), user_json.to_string()),
        ];

        let mut check_pairs: Vec<String> = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        check_pairs.sort();
        let data_check_string = check_pairs.join("\n");

        let mut secret_key_mac = HmacSha256::new_from_slice(b"WebAppData").unwrap();
        secret_key_mac.update(BOT_TOKEN.as_bytes());
        let secret_key = secret_key_mac.finalize().into_bytes();
        let mut mac = HmacSha256::new_from_slice(&secret_key).unwrap();
        mac.update(data_check_string.as_bytes());
        let hash = hex::encode(mac.finalize().into_bytes());

        let mut encoded: Vec<String> = pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect();
        encoded.push(format!("hash={hash}"));
        encoded.join("&")
    }

    #[test]
    fn test_verify_accepts_signed_data() {
        let user_json = r#"{"id":99,"first_name":"Ada","username":"ada"}"#;
        let init_data = signed_init_data(user_json, chrono::Utc::now().timestamp());
        let user = verify_init_data(&init_data, BOT_TOKEN).unwrap();
        assert_eq!(user.id, TelegramId::new(99));
        assert_eq!(user.first_name, "Ada");
    }

    #[test]
    fn test_verify_rejects_tampered_data() {
        let user_json = r#"{"id":99,"first_name":"Ada"}"#;
        let init_data = signed_init_data(user_json, chrono::Utc::now().timestamp());
        let tampered = init_data.replace("Ada", "Eve");
        let result = verify_init_data(&tampered, BOT_TOKEN);
        assert!(matches!(result, Err(IdentityError::SignatureMismatch)));
    }

    #[test]
    fn test_verify_rejects_missing_hash() {
        let result = verify_init_data("user=%7B%22id%22%3A1%7D&auth_date=1", BOT_TOKEN);
        assert!(matches!(result, Err(IdentityError::MissingHash)));
    }

    #[test]
    fn test_verify_rejects_stale_auth_date() {
        let user_json = r#"{"id":99,"first_name":"Ada"}"#;
        let two_days_ago = chrono::Utc::now().timestamp() - 2 * 86_400;
        let init_data = signed_init_data(user_json, two_days_ago);
        let result = verify_init_data(&init_data, BOT_TOKEN);
        assert!(matches!(result, Err(IdentityError::Stale { .. })));
    }

    #[test]
    fn test_extract_without_verification() {
        let init_data =
            "user=%7B%22id%22%3A123456789%2C%22first_name%22%3A%22Test%22%7D&auth_date=1";
        let user = extract_user(init_data).unwrap();
        assert_eq!(user.id, TelegramId::new(123_456_789));
    }

    #[test]
    fn test_resolve_falls_back_to_placeholder() {
        // No header at all
        assert_eq!(resolve_identity(None, None), placeholder_user());

        // Garbage header
        assert_eq!(resolve_identity(Some("not-init-data"), None), placeholder_user());

        // Bad signature with a token configured
        let token = SecretString::from(BOT_TOKEN);
        assert_eq!(
            resolve_identity(Some("user=%7B%22id%22%3A1%7D&hash=deadbeef"), Some(&token)),
            placeholder_user()
        );
    }

    #[test]
    fn test_placeholder_profile_shape() {
        let user = placeholder_user();
        assert_eq!(user.id, TelegramId::new(123_456_789));
        assert_eq!(user.display_name(), "Test User");
        assert_eq!(user.username.as_deref(), Some("testuser"));
        assert_eq!(user.language_code.as_deref(), Some("en"));
    }
}
