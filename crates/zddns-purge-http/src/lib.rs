// # 1.1.1.1 Purge Client
//
// Invalidates the public 1.1.1.1 resolver's cached A-record entry for a
// domain after its destination changed, so clients re-resolve promptly
// instead of waiting out the old TTL. Invoked by the engine only for targets
// that configured a flushable domain.

use async_trait::async_trait;
use zddns_core::traits::CacheFlusher;
use zddns_core::{Error, Result};

/// Public 1.1.1.1 purge API base URL.
const PURGE_API_BASE: &str = "https://1.1.1.1/api/v1";

/// One-shot calls get a short timeout.
const DEFAULT_HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Resolver-cache purge client for 1.1.1.1.
#[derive(Debug, Clone)]
pub struct PurgeClient {
    base_url: String,
    client: reqwest::Client,
}

impl PurgeClient {
    /// Client against the public purge endpoint.
    pub fn new() -> Self {
        Self::with_base_url(PURGE_API_BASE)
    }

    /// Client against a custom purge endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    fn purge_url(&self) -> String {
        format!("{}/purge", self.base_url)
    }
}

impl Default for PurgeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheFlusher for PurgeClient {
    async fn purge(&self, domain: &str) -> Result<()> {
        let url = self.purge_url();
        tracing::debug!("POST {url}?domain={domain}&type=A");

        let response = self
            .client
            .post(&url)
            .query(&[("domain", domain), ("type", "A")])
            .send()
            .await
            .map_err(|e| Error::network(format!("POST {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!("POST {url} returned {status}")));
        }

        tracing::info!("POST {url}?domain={domain}&type=A -> OK");
        Ok(())
    }
}
