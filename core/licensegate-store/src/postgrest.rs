//! Supabase (PostgREST) store implementation.
//!
//! Talks to the REST interface Supabase exposes under `/rest/v1`. Reads are
//! plain filtered selects; slot claims go through the `claim_activation`
//! database function shipped in `migrations/supabase.sql`, which reads the
//! stored limit and performs the duplicate check, count check and insert
//! inside one transaction.

use crate::error::{StoreError, StoreResult};
use crate::record::{Activation, ClaimOutcome, License};
use crate::store::ActivationStore;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Connection settings for a Supabase project.
#[derive(Clone)]
pub struct PostgrestConfig {
    /// Project URL (e.g. `https://xyz.supabase.co`).
    pub base_url: String,
    /// Service or anon key, sent as `apikey` and bearer token.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl PostgrestConfig {
    /// Creates a config with the default 10 second timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for PostgrestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgrestConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct LicenseRow {
    license_key: String,
    max_devices: i64,
}

/// Store backed by Supabase tables `licenses` and `activations`.
pub struct PostgrestStore {
    config: PostgrestConfig,
    client: Client,
}

impl PostgrestStore {
    /// Creates a store client. Fails if the URL or key is empty.
    pub fn new(config: PostgrestConfig) -> StoreResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(StoreError::Config("store URL is empty".to_string()));
        }
        if config.api_key.is_empty() {
            return Err(StoreError::Config("store access key is empty".to_string()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn rest_url(&self, path: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Api {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::UnexpectedResponse(format!("failed to parse response: {e}")))
}

#[async_trait]
impl ActivationStore for PostgrestStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn find_license(&self, license_key: &str) -> StoreResult<Option<License>> {
        let response = self
            .authed(self.client.get(self.rest_url("licenses")))
            .query(&[
                ("select", "license_key,max_devices".to_string()),
                ("license_key", format!("eq.{license_key}")),
            ])
            .send()
            .await?;

        let mut rows: Vec<LicenseRow> = read_json(response).await?;
        // Same contract as a single-row select: exactly one match or nothing.
        if rows.len() != 1 {
            debug!(license_key, matches = rows.len(), "license lookup not unique");
            return Ok(None);
        }
        let row = rows.remove(0);
        Ok(Some(License::from_stored(row.license_key, row.max_devices)))
    }

    async fn list_activations(&self, license_key: &str) -> StoreResult<Vec<Activation>> {
        let response = self
            .authed(self.client.get(self.rest_url("activations")))
            .query(&[
                ("select", "license_key,pc_id".to_string()),
                ("license_key", format!("eq.{license_key}")),
            ])
            .send()
            .await?;

        read_json(response).await
    }

    async fn claim_slot(&self, license_key: &str, pc_id: &str) -> StoreResult<ClaimOutcome> {
        let body = serde_json::json!({
            "p_license_key": license_key,
            "p_pc_id": pc_id,
        });

        let response = self
            .authed(self.client.post(self.rest_url("rpc/claim_activation")))
            .json(&body)
            .send()
            .await?;

        read_json(response).await
    }
}
