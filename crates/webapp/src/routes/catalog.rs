//! Catalog browse/search handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::routes::{AppState, Identity};
use crate::state::Transition;

/// Query parameters for catalog search.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Case-insensitive substring matched against name or description.
    pub q: Option<String>,
}

/// The filtered catalog.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub products: Vec<Product>,
    pub search_query: Option<String>,
}

/// GET /catalog?q=...
///
/// Stores the search query in the session and returns the filtered catalog.
/// An empty query matches everything.
pub async fn search(
    State(state): State<AppState>,
    Identity(user): Identity,
    Query(query): Query<CatalogQuery>,
) -> Json<CatalogResponse> {
    let handle = state.sessions().session(user.id).await;
    let mut session_state = handle.lock().await;

    session_state.apply(Transition::SetSearchQuery(query.q));

    Json(CatalogResponse {
        products: session_state
            .filtered_products()
            .into_iter()
            .cloned()
            .collect(),
        search_query: session_state.search_query.clone(),
    })
}
