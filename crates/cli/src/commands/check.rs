//! Verify the environment the webapp would start with.
//!
//! Loads the configuration the same way the webapp does, then probes the
//! products resource to confirm the PostgREST gateway answers with the
//! configured anon key.

use tracing::{info, warn};

use lavka_webapp::WebappConfig;
use lavka_webapp::supabase::{ProductStore, SupabaseClient};

/// Run the configuration and connectivity check.
///
/// # Errors
///
/// Returns an error if the configuration is incomplete or the gateway is
/// unreachable.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = WebappConfig::from_env()?;

    info!("Configuration loaded");
    info!("  Bind address: {}", config.socket_addr());
    info!("  PostgREST base: {}", config.supabase.rest_base);
    info!("  Session TTL: {:?}", config.session_ttl);

    if config.telegram.notifications_enabled() {
        info!("  Order notifications: enabled");
    } else {
        warn!("  Order notifications: disabled (no bot token or chat id)");
    }
    if config.telegram.bot_token.is_none() {
        warn!("  Init-data verification: disabled (no bot token)");
    }

    let client = SupabaseClient::new(&config.supabase)?;
    let products = ProductStore::new(&client).list_catalog().await?;
    info!("PostgREST reachable; catalog has {} products", products.len());

    Ok(())
}
