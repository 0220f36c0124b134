//! Notification sink: one best-effort `sendMessage` call per placed order.
//!
//! Delivery failure never affects checkout; the caller records the outcome
//! in the receipt and moves on. No retries.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::models::{Address, TelegramUser};
use crate::state::CartLine;

/// Errors from the Bot API call. Observed and logged only.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Bot API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Everything the operator needs to see about one placed order.
#[derive(Debug)]
pub struct OrderSummary<'a> {
    pub lines: &'a [CartLine],
    pub total: i64,
    pub redeemed: Option<i64>,
    pub amount_due: i64,
    pub buyer: &'a TelegramUser,
    pub address: &'a Address,
}

/// Client for the order-notification chat.
#[derive(Clone)]
pub struct OrderNotifier {
    http: reqwest::Client,
    bot_token: SecretString,
    chat_id: i64,
    api_base: String,
}

impl OrderNotifier {
    /// Create a notifier for one bot and destination chat.
    ///
    /// `api_base` is configurable so tests can point it at a mock server.
    #[must_use]
    pub fn new(bot_token: SecretString, chat_id: i64, api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            chat_id,
            api_base,
        }
    }

    /// Push the order summary to the operator chat.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the transport fails or the Bot API answers
    /// with a non-success status.
    pub async fn send_order(&self, summary: &OrderSummary<'_>) -> Result<(), NotifyError> {
        self.send_text(&format_order_summary(summary)).await
    }

    /// Send one Markdown message to the operator chat.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the transport fails or the Bot API answers
    /// with a non-success status.
    pub async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            self.bot_token.expose_secret()
        );
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for OrderNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderNotifier")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Render the human-readable order message.
#[must_use]
pub fn format_order_summary(summary: &OrderSummary<'_>) -> String {
    let items_list = summary
        .lines
        .iter()
        .map(|line| {
            format!(
                "• {} x{} - {}₿",
                line.product.name,
                line.quantity,
                line.product.price.saturating_mul(line.quantity)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let payment_info = match summary.redeemed {
        Some(redeemed) if redeemed > 0 => format!(
            "💰 *Order total:* {}₿\n🚬 *Joints redeemed:* {redeemed}₿\n💳 *Due:* {}₿",
            summary.total, summary.amount_due
        ),
        _ => format!("💰 *Total:* {}₿", summary.amount_due),
    };

    let username = summary
        .buyer
        .username
        .as_deref()
        .unwrap_or("not set");

    format!(
        "🛍️ *New order!*\n\n\
         📦 *Items:*\n{items_list}\n\n\
         {payment_info}\n\n\
         👤 *Buyer:*\n\
         ID: {}\n\
         Name: {}\n\
         Username: @{username}\n\n\
         📍 *Delivery address:*\n\
         {}\n\
         [Open in maps](https://maps.google.com/?q={},{})",
        summary.buyer.id,
        summary.buyer.display_name(),
        summary.address.address_text,
        summary.address.lat,
        summary.address.lng,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use lavka_core::{AddressId, ProductId, TelegramId, UserId};

    use super::*;
    use crate::models::Product;

    fn line(name: &str, price: i64, quantity: i64) -> CartLine {
        CartLine {
            product: Product {
                id: ProductId::generate(),
                name: name.to_string(),
                description: None,
                price,
                image_url: None,
                category: None,
                stock: 10,
                created_at: Utc::now(),
            },
            quantity,
        }
    }

    fn address() -> Address {
        Address {
            id: AddressId::generate(),
            user_id: UserId::generate(),
            title: "Home".to_string(),
            address_text: "1 Main St".to_string(),
            lat: 55.75,
            lng: 37.61,
            created_at: Utc::now(),
        }
    }

    fn buyer() -> TelegramUser {
        TelegramUser {
            id: TelegramId::new(99),
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            username: Some("testuser".to_string()),
            language_code: None,
        }
    }

    #[test]
    fn test_summary_without_redemption() {
        let lines = [line("Widget", 50, 2), line("Gadget", 20, 1)];
        let addr = address();
        let user = buyer();
        let text = format_order_summary(&OrderSummary {
            lines: &lines,
            total: 150,
            redeemed: None,
            amount_due: 150,
            buyer: &user,
            address: &addr,
        });

        assert!(text.contains("• Widget x2 - 100₿"));
        assert!(text.contains("• Gadget x1 - 20₿"));
        assert!(text.contains("💰 *Total:* 150₿"));
        assert!(!text.contains("redeemed"));
        assert!(text.contains("Name: Test User"));
        assert!(text.contains("Username: @testuser"));
        assert!(text.contains("https://maps.google.com/?q=55.75,37.61"));
    }

    #[test]
    fn test_summary_with_redemption_breakdown() {
        let lines = [line("Widget", 50, 2)];
        let addr = address();
        let user = buyer();
        let text = format_order_summary(&OrderSummary {
            lines: &lines,
            total: 130,
            redeemed: Some(40),
            amount_due: 90,
            buyer: &user,
            address: &addr,
        });

        assert!(text.contains("💰 *Order total:* 130₿"));
        assert!(text.contains("🚬 *Joints redeemed:* 40₿"));
        assert!(text.contains("💳 *Due:* 90₿"));
    }

    #[test]
    fn test_summary_without_username() {
        let lines = [line("Widget", 50, 1)];
        let addr = address();
        let mut user = buyer();
        user.username = None;
        let text = format_order_summary(&OrderSummary {
            lines: &lines,
            total: 80,
            redeemed: None,
            amount_due: 80,
            buyer: &user,
            address: &addr,
        });
        assert!(text.contains("Username: @not set"));
    }
}
