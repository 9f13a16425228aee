// # Zone.eu DNS Provider
//
// DNS provider implementation against the Zone.eu API v2.
//
// Reads go through the core `RecordCache`: a zone's A records are fetched at
// most once per cache TTL, and a successful update refreshes the cached copy
// so the engine sees the new destination without another fetch.
//
// ## API Reference
//
// - List A records: GET `/dns/{domain}/a`
// - Update A record: PUT `/dns/{domain}/a/{id}` with body `{name, destination}`
//   (the response is a list whose first element is the updated record)
//
// Every request carries an HTTP Basic credential from the operator-supplied
// username and API key.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use zddns_core::traits::{ARecord, DnsProvider};
use zddns_core::{Error, RecordCache, Result};

/// Zone.eu API base URL.
const ZONE_API_BASE: &str = "https://api.zone.eu/v2";

/// HTTP timeout for API requests.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Zone.eu DNS provider.
///
/// Holds the HTTP client, the Basic credential, and the record cache for the
/// process lifetime.
pub struct ZoneProvider {
    base_url: String,
    username: String,
    api_key: String,
    client: reqwest::Client,
    cache: RecordCache,
}

// The API key never appears in Debug output.
impl std::fmt::Debug for ZoneProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneProvider")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    name: &'a str,
    destination: String,
}

impl ZoneProvider {
    /// Create a provider for the public Zone.eu API.
    pub fn new(
        username: impl Into<String>,
        api_key: impl Into<String>,
        cache: RecordCache,
    ) -> Result<Self> {
        Self::with_base_url(username, api_key, cache, ZONE_API_BASE)
    }

    /// Create a provider against a non-default API base (self-hosted or
    /// test endpoints).
    pub fn with_base_url(
        username: impl Into<String>,
        api_key: impl Into<String>,
        cache: RecordCache,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let username = username.into();
        let api_key = api_key.into();
        if username.is_empty() || api_key.is_empty() {
            return Err(Error::config("Zone.eu username and API key are required"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            username,
            api_key,
            client,
            cache,
        })
    }

    fn records_url(&self, domain: &str) -> String {
        format!("{}/dns/{}/a", self.base_url, domain)
    }

    fn record_url(&self, domain: &str, id: &str) -> String {
        format!("{}/dns/{}/a/{}", self.base_url, domain, id)
    }

    /// Map a response into its body text, turning non-2xx statuses into the
    /// matching error variant. 401 is its own variant because the engine
    /// terminates on it.
    async fn read_success(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider(status.as_u16(), body));
        }
        response
            .text()
            .await
            .map_err(|e| Error::network(format!("failed to read response body: {e}")))
    }
}

#[async_trait]
impl DnsProvider for ZoneProvider {
    async fn list_records(&self, domain: &str) -> Result<Vec<ARecord>> {
        if let Some(records) = self.cache.get(domain).await {
            return Ok(records);
        }

        let url = self.records_url(domain);
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.api_key))
            .send()
            .await
            .map_err(|e| Error::network(format!("GET {url} failed: {e}")))?;

        let body = Self::read_success(response).await?;
        let records: Vec<ARecord> = serde_json::from_str(&body)?;

        tracing::info!(domain, count = records.len(), "fetched zone A records");
        self.cache.put(domain, records.clone()).await;
        Ok(records)
    }

    async fn update_record(
        &self,
        domain: &str,
        record: &ARecord,
        destination: Ipv4Addr,
    ) -> Result<ARecord> {
        let url = self.record_url(domain, &record.id);
        tracing::debug!("PUT {url} {} {destination}", record.name);

        let response = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.api_key))
            .json(&UpdateRequest {
                name: &record.name,
                destination: destination.to_string(),
            })
            .send()
            .await
            .map_err(|e| Error::network(format!("PUT {url} failed: {e}")))?;

        let body = Self::read_success(response).await?;

        // The update response is a list; its first element is the refreshed
        // record.
        let updated = serde_json::from_str::<Vec<ARecord>>(&body)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::unexpected("update response contained no record"))?;

        self.cache.apply_update(domain, &updated).await;
        tracing::info!("PUT {url} {} {destination} -> OK", updated.name);
        Ok(updated)
    }

    fn provider_name(&self) -> &'static str {
        "zone"
    }
}
