//! Record store abstraction over the hosted persistence provider.
//!
//! The provider is a per-table record store with key filters, upsert
//! and insert. `PostgrestClient` talks to the Supabase REST surface;
//! tests run against an in-memory implementation.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::CloudConfig;

/// Provider transport/storage errors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A column filter in PostgREST predicate form, e.g.
/// `("user_id", "eq.abc")` or `("date", "gte.2026-08-16")`.
pub type Filter<'a> = (&'a str, String);

/// Key-value style record storage with optimistic upsert semantics.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Fetch at most one row matching every filter.
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter<'_>],
    ) -> Result<Option<T>, ProviderError>;

    /// Fetch all rows matching every filter, optionally ordered
    /// (`"column.desc"` / `"column.asc"`) and truncated.
    async fn select_all<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter<'_>],
        order: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<T>, ProviderError>;

    /// Insert-or-replace keyed by the `on_conflict` columns
    /// (comma-separated); returns the stored row.
    async fn upsert<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        table: &str,
        row: &B,
        on_conflict: &str,
    ) -> Result<T, ProviderError>;

    /// Plain insert; returns the stored row.
    async fn insert<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, ProviderError>;
}

/// Supabase PostgREST client.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    client: Client,
    rest_url: String,
    anon_key: String,
}

impl PostgrestClient {
    pub fn new(config: &CloudConfig) -> Self {
        Self {
            client: Client::new(),
            rest_url: format!("{}/rest/v1", config.url),
            anon_key: config.anon_key.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn read_rows<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<Vec<T>, ProviderError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Backend { status, message });
        }
        resp.json().await.map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

impl RecordStore for PostgrestClient {
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter<'_>],
    ) -> Result<Option<T>, ProviderError> {
        let rows: Vec<T> = self
            .select_all(table, filters, None, Some(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn select_all<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter<'_>],
        order: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<T>, ProviderError> {
        let mut req = self
            .request(reqwest::Method::GET, table)
            .query(&[("select", "*")]);
        for (column, predicate) in filters {
            req = req.query(&[(*column, predicate.as_str())]);
        }
        if let Some(order) = order {
            req = req.query(&[("order", order)]);
        }
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit.to_string().as_str())]);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Self::read_rows(resp).await
    }

    async fn upsert<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        table: &str,
        row: &B,
        on_conflict: &str,
    ) -> Result<T, ProviderError> {
        let resp = self
            .request(reqwest::Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header(
                "Prefer",
                "resolution=merge-duplicates,return=representation",
            )
            .json(&[row])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let rows: Vec<T> = Self::read_rows(resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("upsert returned no row".to_string()))
    }

    async fn insert<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, ProviderError> {
        let resp = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let rows: Vec<T> = Self::read_rows(resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("insert returned no row".to_string()))
    }
}
