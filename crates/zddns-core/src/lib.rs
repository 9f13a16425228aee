// # zddns-core
//
// Core library for the zddns dynamic DNS updater.
//
// ## Architecture Overview
//
// - **IpResolver**: trait for discovering the current public IPv4 address
// - **DnsProvider**: trait for reading and updating a zone's A records
// - **CacheFlusher**: trait for purging a resolver's edge cache
// - **RecordCache**: time-bounded read cache over provider record lists
// - **ReconcileEngine**: the fixed-interval reconciliation loop
//
// The engine is the only component with control flow of its own; the traits
// are one-shot collaborators. HTTP implementations live in their own crates
// (`zddns-provider-zone`, `zddns-ip-http`, `zddns-purge-http`) and the
// daemon binary (`zddnsd`) wires everything together.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use cache::RecordCache;
pub use config::{EngineConfig, ReconcileConfig, Target};
pub use engine::{EngineEvent, ReconcileEngine};
pub use error::{Error, Result};
pub use traits::{ARecord, CacheFlusher, DnsProvider, IpResolver};
