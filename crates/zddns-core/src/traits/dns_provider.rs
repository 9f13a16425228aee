use std::net::Ipv4Addr;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// A provider-side DNS A record.
///
/// The provider owns the resource; this is a read-through copy. `id` is
/// opaque and stable across destination updates for the same logical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ARecord {
    /// Opaque provider identifier for the record resource.
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,

    /// Record name, e.g. `www` or `*.m2rt.eu`.
    pub name: String,

    /// IPv4 destination, kept as the provider-supplied string.
    pub destination: String,
}

impl ARecord {
    /// Whether this record already points at `ip`.
    pub fn matches(&self, ip: Ipv4Addr) -> bool {
        self.destination == ip.to_string()
    }
}

// The provider is free to encode record ids as JSON strings or numbers;
// we only ever echo them back into resource paths.
fn opaque_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

/// Authenticated read/write access to one DNS zone's A records.
///
/// Implementations are expected to serve reads through a time-bounded cache
/// ([`RecordCache`](crate::RecordCache)) and to refresh the cached copy on a
/// successful write, so the engine never needs to know whether a lookup hit
/// the wire.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// All A records for `domain`, in provider order.
    async fn list_records(&self, domain: &str) -> Result<Vec<ARecord>>;

    /// First record in `domain` whose name equals `name`.
    ///
    /// `Ok(None)` means the zone has no such record, which callers must
    /// treat as distinct from any transport error.
    async fn find_record(&self, domain: &str, name: &str) -> Result<Option<ARecord>> {
        let records = self.list_records(domain).await?;
        Ok(records.into_iter().find(|r| r.name == name))
    }

    /// Point `record` at `destination`.
    ///
    /// Returns the refreshed record as reported by the provider's update
    /// response.
    async fn update_record(
        &self,
        domain: &str,
        record: &ARecord,
        destination: Ipv4Addr,
    ) -> Result<ARecord>;

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
}
