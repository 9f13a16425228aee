// # HTTP IP Resolver
//
// Discovers the caller's current public IPv4 address by asking an external
// echo service. One GET per reconciliation iteration; the engine owns the
// schedule and the retry (the next tick).

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use zddns_core::traits::IpResolver;
use zddns_core::{Error, Result};

/// Default IP echo service. Returns the caller's address as a plain-text
/// body.
const DEFAULT_IP_SERVICE: &str = "https://api.ipify.org";

/// One-shot lookups get a short timeout.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// External IP resolver backed by an HTTP echo service.
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    url: String,
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Resolver against the default service (api.ipify.org).
    pub fn new() -> Self {
        Self::with_url(DEFAULT_IP_SERVICE)
    }

    /// Resolver against a custom echo service.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpIpResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("GET {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!(
                "GET {} returned {status}",
                self.url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("failed to read IP response: {e}")))?;

        let ip = parse_ip(&body)?;
        tracing::info!("GET {} -> {ip}", self.url);
        Ok(ip)
    }
}

fn parse_ip(body: &str) -> Result<Ipv4Addr> {
    let trimmed = body.trim();
    trimmed
        .parse()
        .map_err(|_| Error::unexpected(format!("not an IPv4 address: '{trimmed}'")))
}
