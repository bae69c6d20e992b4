use crate::auth::AuthContext;
use crate::config::AppConfig;
use crate::errors::{DomainError, DomainResult, ServiceError, ServiceResult};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// `Prefer` header asking PostgREST to echo the written rows
const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// Query filter pair, e.g. `("user_id", "eq.<uuid>")`
pub type Filter = (&'static str, String);

/// `column=eq.value` filter
pub fn eq(column: &'static str, value: impl ToString) -> Filter {
    (column, format!("eq.{}", value.to_string()))
}

/// Filters every owner-scoped request carries
pub fn owned_by(auth: &AuthContext) -> Filter {
    eq("user_id", auth.user_id)
}

/// Filters addressing one row of the current user
pub fn row_of(id: Uuid, auth: &AuthContext) -> Vec<Filter> {
    vec![eq("id", id), owned_by(auth)]
}

/// Thin client for the Supabase REST endpoint (`{base}/rest/v1/{table}`)
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl PostgrestClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> ServiceResult<Self> {
        Self::new(&config.supabase_url, &config.supabase_anon_key, config.http_timeout)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Request with the headers every call needs
    fn request(&self, method: Method, table: &str, filters: &[Filter], auth: &AuthContext) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.anon_key)
            .header("Authorization", auth.bearer())
            .query(filters)
    }

    /// `GET` rows matching `filters`
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
        auth: &AuthContext,
    ) -> DomainResult<Vec<T>> {
        log::debug!("Remote select from {}", table);
        let mut query: Vec<Filter> = vec![("select", "*".to_string())];
        query.extend_from_slice(filters);

        let response = self.request(Method::GET, table, &query, auth).send().await;
        read_json(table, response).await
    }

    /// `POST` one row and return it as stored
    pub async fn insert<B, T>(&self, table: &str, body: &B, auth: &AuthContext) -> DomainResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        log::debug!("Remote insert into {}", table);
        let response = self
            .request(Method::POST, table, &[], auth)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body)
            .send()
            .await;
        first_row(table, read_json(table, response).await?)
    }

    /// `POST` with merge-on-conflict over the `on_conflict` columns
    pub async fn upsert<B, T>(
        &self,
        table: &str,
        on_conflict: &'static str,
        body: &B,
        auth: &AuthContext,
    ) -> DomainResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        log::debug!("Remote upsert into {} on ({})", table, on_conflict);
        let response = self
            .request(Method::POST, table, &[("on_conflict", on_conflict.to_string())], auth)
            .header("Prefer", MERGE_DUPLICATES)
            .json(body)
            .send()
            .await;
        first_row(table, read_json(table, response).await?)
    }

    /// `PATCH` rows matching `filters`, returning the rows that changed
    pub async fn patch<B, T>(
        &self,
        table: &str,
        filters: &[Filter],
        body: &B,
        auth: &AuthContext,
    ) -> DomainResult<Vec<T>>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        log::debug!("Remote patch on {}", table);
        let response = self
            .request(Method::PATCH, table, filters, auth)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body)
            .send()
            .await;
        read_json(table, response).await
    }

    /// `DELETE` rows matching `filters`; returns how many went away
    pub async fn delete(&self, table: &str, filters: &[Filter], auth: &AuthContext) -> DomainResult<usize> {
        log::debug!("Remote delete from {}", table);
        let response = self
            .request(Method::DELETE, table, filters, auth)
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await;
        let rows: Vec<serde_json::Value> = read_json(table, response).await?;
        Ok(rows.len())
    }
}

/// Map transport failures and non-2xx statuses onto `DomainError::External`
async fn read_json<T: DeserializeOwned>(
    table: &str,
    response: Result<Response, reqwest::Error>,
) -> DomainResult<T> {
    let response = response
        .map_err(|e| DomainError::External(format!("Request to {} failed: {}", table, e)))?;

    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| DomainError::External(format!("Invalid response from {}: {}", table, e)))
    } else {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to get error details".to_string());
        Err(DomainError::External(format!(
            "Server returned error {}: {}",
            status, error_text
        )))
    }
}

fn first_row<T>(table: &str, rows: Vec<T>) -> DomainResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DomainError::External(format!("{} returned no rows", table)))
}
