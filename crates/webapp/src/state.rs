//! The application state store: one mutable session state per user, updated
//! exclusively through the closed set of [`Transition`]s.
//!
//! Every transition is a pure, synchronous state mutation; no transition
//! performs I/O. Remote effects (persistence, notification) live in
//! `supabase`, `telegram` and `checkout`, which feed their results back into
//! the state through these same transitions.

use serde::{Deserialize, Serialize};

use lavka_core::ProductId;

use crate::models::{Address, Product, TelegramUser};

/// Flat delivery fee added to every order's total, in minor currency units.
pub const DELIVERY_FEE: i64 = 30;

/// Loyalty balance a session shows before the persisted row has been read.
pub const DEFAULT_JOINTS: i64 = 247;

/// The active screen of the Mini App.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Shop,
    Cart,
    Address,
}

/// One cart line. At most one line exists per product id and the quantity
/// is always >= 1; a quantity update to zero removes the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

/// The closed set of state transitions.
#[derive(Debug, Clone)]
pub enum Transition {
    SetUser(Option<TelegramUser>),
    SetJoints(i64),
    SetProducts(Vec<Product>),
    AddToCart(Product),
    RemoveFromCart(ProductId),
    SetCartQuantity(ProductId, i64),
    ClearCart,
    SetAddresses(Vec<Address>),
    SetSelectedAddress(Option<Address>),
    SetLoading(bool),
    SetTab(Tab),
    SetError(Option<String>),
    SetSearchQuery(Option<String>),
    SetJointsModal(bool),
}

/// The authoritative session state.
///
/// Owned by the session registry behind a per-user mutex; handlers observe
/// it through [`crate::session::SessionSnapshot`] and mutate it only via
/// [`SessionState::apply`].
#[derive(Debug, Clone)]
pub struct SessionState {
    pub user: Option<TelegramUser>,
    pub is_authenticated: bool,
    pub joints: i64,
    pub products: Vec<Product>,
    pub cart: Vec<CartLine>,
    pub addresses: Vec<Address>,
    pub selected_address: Option<Address>,
    pub loading: bool,
    pub current_tab: Tab,
    pub error: Option<String>,
    pub search_query: Option<String>,
    pub show_joints_modal: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            joints: DEFAULT_JOINTS,
            products: Vec::new(),
            cart: Vec::new(),
            addresses: Vec::new(),
            selected_address: None,
            loading: true,
            current_tab: Tab::Shop,
            error: None,
            search_query: None,
            show_joints_modal: false,
        }
    }
}

impl SessionState {
    /// Apply one transition in place.
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::SetUser(user) => {
                self.is_authenticated = user.is_some();
                self.user = user;
            }
            Transition::SetJoints(joints) => self.joints = joints,
            Transition::SetProducts(products) => self.products = products,
            Transition::AddToCart(product) => {
                if let Some(line) = self.cart.iter_mut().find(|l| l.product.id == product.id) {
                    line.quantity += 1;
                } else {
                    self.cart.push(CartLine {
                        product,
                        quantity: 1,
                    });
                }
            }
            Transition::RemoveFromCart(product_id) => {
                self.cart.retain(|l| l.product.id != product_id);
            }
            Transition::SetCartQuantity(product_id, quantity) => {
                if quantity <= 0 {
                    self.cart.retain(|l| l.product.id != product_id);
                } else if let Some(line) =
                    self.cart.iter_mut().find(|l| l.product.id == product_id)
                {
                    line.quantity = quantity;
                }
            }
            Transition::ClearCart => self.cart.clear(),
            Transition::SetAddresses(addresses) => self.addresses = addresses,
            Transition::SetSelectedAddress(address) => self.selected_address = address,
            Transition::SetLoading(loading) => self.loading = loading,
            Transition::SetTab(tab) => self.current_tab = tab,
            Transition::SetError(error) => self.error = error,
            Transition::SetSearchQuery(query) => self.search_query = query,
            Transition::SetJointsModal(visible) => self.show_joints_modal = visible,
        }
    }

    /// Sum of `price * quantity` over all cart lines. Saturates: quantities
    /// come from the client unchecked.
    #[must_use]
    pub fn subtotal(&self) -> i64 {
        self.cart
            .iter()
            .map(|l| l.product.price.saturating_mul(l.quantity))
            .fold(0, i64::saturating_add)
    }

    /// Order total: subtotal plus the flat delivery fee.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.subtotal().saturating_add(DELIVERY_FEE)
    }

    /// Total number of units across all cart lines.
    #[must_use]
    pub fn cart_count(&self) -> i64 {
        self.cart.iter().map(|l| l.quantity).fold(0, i64::saturating_add)
    }

    /// The most loyalty points the user may redeem against the current cart.
    #[must_use]
    pub fn max_redeemable(&self) -> i64 {
        if self.cart.is_empty() {
            return 0;
        }
        self.joints.min(self.total())
    }

    /// Catalog filtered by the current search query: case-insensitive
    /// substring match against product name or description. An empty query
    /// matches everything.
    #[must_use]
    pub fn filtered_products(&self) -> Vec<&Product> {
        let needle = match self.search_query.as_deref() {
            Some(q) if !q.trim().is_empty() => q.trim().to_lowercase(),
            _ => return self.products.iter().collect(),
        };

        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use lavka_core::TelegramId;

    use super::*;

    fn product(name: &str, price: i64) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            description: None,
            price,
            image_url: None,
            category: None,
            stock: 10,
            created_at: Utc::now(),
        }
    }

    fn user() -> TelegramUser {
        TelegramUser {
            id: TelegramId::new(42),
            first_name: "Ada".to_string(),
            last_name: None,
            username: Some("ada".to_string()),
            language_code: Some("en".to_string()),
        }
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert!(state.user.is_none());
        assert!(!state.is_authenticated);
        assert_eq!(state.joints, DEFAULT_JOINTS);
        assert!(state.cart.is_empty());
        assert!(state.loading);
        assert_eq!(state.current_tab, Tab::Shop);
        assert!(state.error.is_none());
        assert!(state.search_query.is_none());
        assert!(!state.show_joints_modal);
    }

    #[test]
    fn test_set_user_derives_is_authenticated() {
        let mut state = SessionState::default();
        state.apply(Transition::SetUser(Some(user())));
        assert!(state.is_authenticated);
        state.apply(Transition::SetUser(None));
        assert!(!state.is_authenticated);
    }

    #[test]
    fn test_repeated_add_accumulates_one_line() {
        let mut state = SessionState::default();
        let p = product("Widget", 50);
        for _ in 0..5 {
            state.apply(Transition::AddToCart(p.clone()));
        }
        assert_eq!(state.cart.len(), 1);
        assert_eq!(state.cart.first().unwrap().quantity, 5);
    }

    #[test]
    fn test_add_preserves_order_and_appends_new_lines() {
        let mut state = SessionState::default();
        let a = product("A", 10);
        let b = product("B", 20);
        state.apply(Transition::AddToCart(a.clone()));
        state.apply(Transition::AddToCart(b.clone()));
        state.apply(Transition::AddToCart(a.clone()));
        let ids: Vec<_> = state.cart.iter().map(|l| l.product.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert_eq!(state.cart.first().unwrap().quantity, 2);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut state = SessionState::default();
        let p = product("Widget", 50);
        state.apply(Transition::AddToCart(p.clone()));
        state.apply(Transition::SetCartQuantity(p.id, 0));
        assert!(state.cart.is_empty());
    }

    #[test]
    fn test_set_quantity_negative_removes_line() {
        let mut state = SessionState::default();
        let p = product("Widget", 50);
        state.apply(Transition::AddToCart(p.clone()));
        state.apply(Transition::SetCartQuantity(p.id, -3));
        assert!(state.cart.is_empty());
    }

    #[test]
    fn test_set_quantity_replaces_quantity() {
        let mut state = SessionState::default();
        let p = product("Widget", 50);
        state.apply(Transition::AddToCart(p.clone()));
        state.apply(Transition::SetCartQuantity(p.id, 7));
        assert_eq!(state.cart.len(), 1);
        assert_eq!(state.cart.first().unwrap().quantity, 7);
    }

    #[test]
    fn test_remove_absent_product_is_noop() {
        let mut state = SessionState::default();
        let p = product("Widget", 50);
        state.apply(Transition::AddToCart(p.clone()));
        state.apply(Transition::RemoveFromCart(ProductId::generate()));
        assert_eq!(state.cart.len(), 1);
    }

    #[test]
    fn test_clear_empty_cart_is_noop() {
        let mut state = SessionState::default();
        state.apply(Transition::ClearCart);
        assert!(state.cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut state = SessionState::default();
        let a = product("A", 50);
        let b = product("B", 20);
        state.apply(Transition::AddToCart(a.clone()));
        state.apply(Transition::AddToCart(a));
        state.apply(Transition::AddToCart(b));
        assert_eq!(state.subtotal(), 120);
        assert_eq!(state.total(), 150);
        assert_eq!(state.cart_count(), 3);
    }

    #[test]
    fn test_totals_saturate_on_extreme_quantity() {
        let mut state = SessionState::default();
        let p = product("Widget", 50);
        state.apply(Transition::AddToCart(p.clone()));
        state.apply(Transition::SetCartQuantity(p.id, i64::MAX));

        assert_eq!(state.subtotal(), i64::MAX);
        assert_eq!(state.total(), i64::MAX);
        assert_eq!(state.cart_count(), i64::MAX);
    }

    #[test]
    fn test_max_redeemable_clamps_to_balance_and_total() {
        let mut state = SessionState::default();
        state.apply(Transition::SetJoints(100));
        assert_eq!(state.max_redeemable(), 0); // empty cart

        state.apply(Transition::AddToCart(product("A", 50)));
        // total = 80, balance = 100 -> clamp to total
        assert_eq!(state.max_redeemable(), 80);

        state.apply(Transition::SetJoints(60));
        assert_eq!(state.max_redeemable(), 60);
    }

    #[test]
    fn test_filter_matches_name_and_description() {
        let mut state = SessionState::default();
        let mut a = product("Green Tea", 10);
        a.description = Some("Loose leaf".to_string());
        let b = product("Coffee", 20);
        state.apply(Transition::SetProducts(vec![a, b]));

        state.apply(Transition::SetSearchQuery(Some("tea".to_string())));
        assert_eq!(state.filtered_products().len(), 1);

        state.apply(Transition::SetSearchQuery(Some("LEAF".to_string())));
        assert_eq!(state.filtered_products().len(), 1);

        state.apply(Transition::SetSearchQuery(Some("cocoa".to_string())));
        assert!(state.filtered_products().is_empty());
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let mut state = SessionState::default();
        state.apply(Transition::SetProducts(vec![
            product("A", 1),
            product("B", 2),
        ]));
        state.apply(Transition::SetSearchQuery(Some("  ".to_string())));
        assert_eq!(state.filtered_products().len(), 2);
        state.apply(Transition::SetSearchQuery(None));
        assert_eq!(state.filtered_products().len(), 2);
    }
}
