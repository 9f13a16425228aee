//! Collaborator seams for the reconciliation engine.
//!
//! The engine talks to the outside world through three traits: an
//! [`IpResolver`] for the current public address, a [`DnsProvider`] for the
//! zone's A records, and a [`CacheFlusher`] for edge-cache invalidation.
//! HTTP implementations live in their own crates.

pub mod cache_flusher;
pub mod dns_provider;
pub mod ip_resolver;

pub use cache_flusher::CacheFlusher;
pub use dns_provider::{ARecord, DnsProvider};
pub use ip_resolver::IpResolver;
