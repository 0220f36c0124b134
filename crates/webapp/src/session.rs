//! Per-user session registry and the bootstrap sequence.
//!
//! Sessions are keyed by Telegram user id in a TTL cache. Each entry holds
//! the session state behind its own async mutex, so one user's events run
//! sequentially while different users proceed independently. Cart state is
//! lost on expiry or restart.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tokio::sync::Mutex;

use lavka_core::TelegramId;

use crate::models::{Address, Product, TelegramUser};
use crate::state::{CartLine, SessionState, Tab, Transition, DELIVERY_FEE};
use crate::supabase::{AddressStore, ProductStore, SupabaseClient, UserStore};

/// Shared handle to one user's session state.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// TTL registry of in-memory sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Cache<TelegramId, SessionHandle>,
}

impl SessionRegistry {
    /// Create a registry whose entries expire after `ttl` of inactivity.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder().time_to_idle(ttl).build(),
        }
    }

    /// Get or create the session for one Telegram user.
    pub async fn session(&self, id: TelegramId) -> SessionHandle {
        self.sessions
            .get_with(id, async { Arc::new(Mutex::new(SessionState::default())) })
            .await
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("entries", &self.sessions.entry_count())
            .finish()
    }
}

/// Run the startup sequence for one session: identity in, profile upserted,
/// catalog and addresses loaded.
///
/// Remote failures during bootstrap never fail the call; a catalog failure
/// sets the state error message, profile/address failures are logged and the
/// session keeps its defaults.
#[tracing::instrument(skip_all, fields(telegram_id = user.id.as_i64()))]
pub async fn bootstrap(state: &mut SessionState, store: &SupabaseClient, user: TelegramUser) {
    state.apply(Transition::SetLoading(true));
    state.apply(Transition::SetError(None));
    state.apply(Transition::SetUser(Some(user.clone())));

    let users = UserStore::new(store);
    let persisted = match users.upsert_profile(&user).await {
        Ok(row) => {
            state.apply(Transition::SetJoints(row.joints));
            Some(row)
        }
        Err(error) => {
            tracing::warn!(%error, "profile upsert failed, keeping default balance");
            None
        }
    };

    match ProductStore::new(store).list_catalog().await {
        Ok(products) => state.apply(Transition::SetProducts(products)),
        Err(error) => {
            tracing::warn!(%error, "catalog load failed");
            state.apply(Transition::SetError(Some(
                "Could not load the catalog.".to_string(),
            )));
        }
    }

    if let Some(row) = persisted {
        match AddressStore::new(store).list_for_user(row.id).await {
            Ok(addresses) => state.apply(Transition::SetAddresses(addresses)),
            Err(error) => tracing::warn!(%error, "address load failed"),
        }
    }

    state.apply(Transition::SetLoading(false));
}

/// One cart line as the webview sees it.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product: Product,
    pub quantity: i64,
    pub line_total: i64,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product: line.product.clone(),
            quantity: line.quantity,
            line_total: line.product.price.saturating_mul(line.quantity),
        }
    }
}

/// Serializable view of the whole session state, assembled per response.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<TelegramUser>,
    pub is_authenticated: bool,
    pub joints: i64,
    pub products: Vec<Product>,
    pub cart: Vec<CartLineView>,
    pub cart_count: i64,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub max_redeemable: i64,
    pub addresses: Vec<Address>,
    pub selected_address: Option<Address>,
    pub loading: bool,
    pub current_tab: Tab,
    pub error: Option<String>,
    pub search_query: Option<String>,
    pub show_joints_modal: bool,
}

impl SessionSnapshot {
    /// Capture the current state. The product list is filtered by the
    /// active search query.
    #[must_use]
    pub fn of(state: &SessionState) -> Self {
        Self {
            user: state.user.clone(),
            is_authenticated: state.is_authenticated,
            joints: state.joints,
            products: state.filtered_products().into_iter().cloned().collect(),
            cart: state.cart.iter().map(CartLineView::from).collect(),
            cart_count: state.cart_count(),
            subtotal: state.subtotal(),
            delivery_fee: DELIVERY_FEE,
            total: state.total(),
            max_redeemable: state.max_redeemable(),
            addresses: state.addresses.clone(),
            selected_address: state.selected_address.clone(),
            loading: state.loading,
            current_tab: state.current_tab,
            error: state.error.clone(),
            search_query: state.search_query.clone(),
            show_joints_modal: state.show_joints_modal,
        }
    }
}
