//! Persistence gateway: a thin typed facade over the Supabase PostgREST API.
//!
//! The gateway speaks row-oriented reads, inserts and updates against five
//! named collections (`users`, `products`, `addresses`, `orders`,
//! `order_items`). It carries no validation and no business logic; callers
//! own both.
//!
//! PostgREST dialect used here:
//! - reads: `GET {base}/{table}?col=eq.v&select=*`
//! - inserts: `POST` with `Prefer: return=representation`
//! - upsert: `POST {table}?on_conflict=col` with
//!   `Prefer: resolution=merge-duplicates,return=representation`
//! - conditional update: `PATCH {table}?id=eq.X&col=eq.expected`; zero
//!   returned rows means the guard column moved since it was read

pub mod addresses;
pub mod orders;
pub mod products;
pub mod users;

pub use addresses::AddressStore;
pub use orders::OrderStore;
pub use products::ProductStore;
pub use users::UserStore;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::SupabaseConfig;

/// Errors surfaced by the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// PostgREST returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to decode a response body.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// An insert that must return its row returned nothing.
    #[error("Empty reply from {table}")]
    EmptyReply { table: &'static str },
}

/// Row-oriented client for the PostgREST gateway.
///
/// Cheap to clone; the per-table stores borrow it.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    rest_base: Url,
}

impl SupabaseClient {
    /// Create a client with the anon key installed as default headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the key is not
    /// a valid header value.
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        let key = config.anon_key.expose_secret();
        let mut api_key = HeaderValue::from_str(key).map_err(|e| StoreError::Api {
            status: 0,
            message: format!("invalid anon key: {e}"),
        })?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| StoreError::Api {
                status: 0,
                message: format!("invalid anon key: {e}"),
            })?;
        bearer.set_sensitive(true);
        headers.insert("Authorization", bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            rest_base: config.rest_base.clone(),
        })
    }

    fn table_url(&self, table: &str) -> Url {
        let mut url = self.rest_base.clone();
        // rest_base was validated as a non-opaque URL at config load
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(table);
        }
        url
    }

    /// Read rows matching simple equality filters.
    pub async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(query)
            .send()
            .await?;
        Self::decode_rows(table, response).await
    }

    /// Insert one or more rows and return the created representations.
    pub async fn insert_rows<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &'static str,
        query: &[(&str, &str)],
        prefer: &str,
        body: &B,
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .http
            .post(self.table_url(table))
            .query(query)
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;
        Self::decode_rows(table, response).await
    }

    /// Update rows matching the filters and return the affected rows.
    ///
    /// An empty result means no row matched the filters.
    pub async fn patch_rows<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &'static str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .http
            .patch(self.table_url(table))
            .query(query)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        Self::decode_rows(table, response).await
    }

    /// Read the body as text first so API errors keep their payload.
    async fn decode_rows<T: DeserializeOwned>(
        table: &'static str,
        response: reqwest::Response,
    ) -> Result<Vec<T>, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(table, status = status.as_u16(), "PostgREST error body: {body}");
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Take exactly one row out of an insert/read reply.
pub(crate) fn single_row<T>(table: &'static str, rows: Vec<T>) -> Result<T, StoreError> {
    rows.into_iter()
        .next()
        .ok_or(StoreError::EmptyReply { table })
}
