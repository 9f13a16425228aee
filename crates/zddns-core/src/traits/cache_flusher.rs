use async_trait::async_trait;

use crate::error::Result;

/// Edge-cache invalidation for a domain whose A record just changed.
///
/// Invoked by the engine only after a successful record update, and only for
/// targets that configured a flushable domain. A purge failure is an
/// iteration-level error: the DNS update stands.
#[async_trait]
pub trait CacheFlusher: Send + Sync {
    /// Purge the cached A-record entry for `domain`.
    async fn purge(&self, domain: &str) -> Result<()>;
}
