use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::error::Result;

/// Source of the caller's current public IPv4 address.
///
/// Resolution happens once per reconciliation iteration and the result is
/// never cached. Implementations perform a single lookup and report failure
/// as [`Error::Network`](crate::Error::Network); retrying is the engine's
/// business (the next tick is the retry).
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the current external IPv4 address.
    async fn resolve(&self) -> Result<Ipv4Addr>;
}
