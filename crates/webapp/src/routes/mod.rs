//! HTTP route handlers for the Mini App backend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (probes the products resource)
//!
//! # Session
//! POST /session                - Bootstrap: identity, profile upsert, catalog,
//!                                addresses; returns snapshot + host directives
//! GET  /session                - Current session snapshot
//! POST /session/tab            - Switch the active tab
//! POST /session/joints-modal   - Show/hide the loyalty modal
//!
//! # Catalog
//! GET  /catalog?q=...          - Set the search query, return the filtered catalog
//!
//! # Cart
//! GET  /cart                   - Cart view (lines, subtotal, delivery, total)
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Replace a line's quantity (0 removes)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//!
//! # Addresses
//! GET  /addresses              - Address list
//! POST /addresses              - Create an address
//! POST /addresses/select       - Select the delivery address
//!
//! # Checkout
//! POST /checkout               - Run the checkout orchestrator, return the receipt
//! ```
//!
//! Every request carries `Authorization: tma <init-data>`; the [`Identity`]
//! extractor resolves it (placeholder fallback included) and keys the
//! session registry with the resulting Telegram id.

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod session;

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
};

use crate::config::WebappConfig;
use crate::models::TelegramUser;
use crate::session::SessionRegistry;
use crate::supabase::{StoreError, SupabaseClient};
use crate::telegram::identity::resolve_identity;
use crate::telegram::notify::OrderNotifier;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebappConfig,
    store: SupabaseClient,
    sessions: SessionRegistry,
    notifier: Option<OrderNotifier>,
}

impl AppState {
    /// Create the application state from configuration.
    ///
    /// The notifier exists only when both a bot token and an order chat id
    /// are configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistence client fails to build.
    pub fn new(config: WebappConfig) -> Result<Self, StoreError> {
        let store = SupabaseClient::new(&config.supabase)?;
        let sessions = SessionRegistry::new(config.session_ttl);
        let notifier = match (&config.telegram.bot_token, config.telegram.order_chat_id) {
            (Some(token), Some(chat_id)) => Some(OrderNotifier::new(
                token.clone(),
                chat_id,
                config.telegram.api_base.clone(),
            )),
            _ => None,
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                sessions,
                notifier,
            }),
        })
    }

    /// Get a reference to the webapp configuration.
    #[must_use]
    pub fn config(&self) -> &WebappConfig {
        &self.inner.config
    }

    /// Get a reference to the persistence gateway client.
    #[must_use]
    pub fn store(&self) -> &SupabaseClient {
        &self.inner.store
    }

    /// Get a reference to the session registry.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.inner.sessions
    }

    /// Get the order notifier, if notifications are configured.
    #[must_use]
    pub fn notifier(&self) -> Option<&OrderNotifier> {
        self.inner.notifier.as_ref()
    }
}

/// Extractor resolving the caller's Telegram identity from the
/// `Authorization: tma <init-data>` header.
///
/// Resolution never rejects: an absent, unparsable or unverifiable header
/// yields the fixed placeholder profile.
pub struct Identity(pub TelegramUser);

impl FromRequestParts<AppState> for Identity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let init_data = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("tma "));

        let user = resolve_identity(init_data, state.config().telegram.bot_token.as_ref());
        Ok(Self(user))
    }
}

/// Create all routes for the webapp.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(session::bootstrap).get(session::snapshot))
        .route("/session/tab", post(session::set_tab))
        .route("/session/joints-modal", post(session::set_joints_modal))
        .route("/catalog", get(catalog::search))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/clear", post(cart::clear))
        .route(
            "/addresses",
            get(addresses::list).post(addresses::create),
        )
        .route("/addresses/select", post(addresses::select))
        .route("/checkout", post(checkout::checkout))
}
