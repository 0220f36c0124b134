//! Send a test message to the configured order chat.

use tracing::info;

use lavka_webapp::WebappConfig;
use lavka_webapp::telegram::notify::OrderNotifier;

/// Send one Markdown message through the configured bot.
///
/// # Errors
///
/// Returns an error if notifications are not configured or the Bot API
/// call fails.
pub async fn test_message(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = WebappConfig::from_env()?;

    let (Some(token), Some(chat_id)) = (
        config.telegram.bot_token.clone(),
        config.telegram.order_chat_id,
    ) else {
        return Err(
            "notifications are not configured; set TELEGRAM_BOT_TOKEN and TELEGRAM_ORDER_CHAT_ID"
                .into(),
        );
    };

    let notifier = OrderNotifier::new(token, chat_id, config.telegram.api_base.clone());
    notifier.send_text(text).await?;

    info!(chat_id, "Test message delivered");
    Ok(())
}
