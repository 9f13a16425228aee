//! Test doubles and shared helpers for the reconciliation contract tests.
//!
//! The doubles mirror the three collaborator seams with call counters and
//! fault injection, so each contract file can assert exactly which wire
//! operations an iteration would have issued.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use zddns_core::error::{Error, Result};
use zddns_core::traits::{ARecord, CacheFlusher, DnsProvider, IpResolver};
use zddns_core::{RecordCache, ReconcileConfig, ReconcileEngine, Target};

/// Build an `ARecord` literal.
pub fn record(id: &str, name: &str, destination: &str) -> ARecord {
    ARecord {
        id: id.to_string(),
        name: name.to_string(),
        destination: destination.to_string(),
    }
}

/// Parse a `domain:name[:flushableDomain]` token.
pub fn target(s: &str) -> Target {
    s.parse().expect("valid target token")
}

/// Config with the given targets and iteration interval.
pub fn config_with_interval(targets: Vec<Target>, interval_secs: u64) -> ReconcileConfig {
    let mut config = ReconcileConfig::new(targets);
    config.engine.interval_secs = interval_secs;
    config
}

/// Spawn the engine with a controlled shutdown channel.
///
/// Keep the returned sender alive for as long as the engine should run:
/// dropping it counts as a shutdown signal.
pub fn spawn_engine(engine: ReconcileEngine) -> (JoinHandle<Result<()>>, oneshot::Sender<()>) {
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(rx)).await });
    (handle, tx)
}

struct IpState {
    ip: Mutex<Ipv4Addr>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

/// A controlled IP resolver: the test decides what it returns.
#[derive(Clone)]
pub struct MockIpResolver {
    state: Arc<IpState>,
}

impl MockIpResolver {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            state: Arc::new(IpState {
                ip: Mutex::new(ip),
                failing: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn set_ip(&self, ip: Ipv4Addr) {
        *self.state.ip.lock().unwrap() = ip;
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn resolve_count(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpResolver for MockIpResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(Error::network("simulated lookup failure"));
        }
        Ok(*self.state.ip.lock().unwrap())
    }
}

struct ProviderState {
    zones: Mutex<HashMap<String, Vec<ARecord>>>,
    list_calls: AtomicUsize,
    update_calls: AtomicUsize,
    updates: Mutex<Vec<(String, String, String)>>,
    unauthorized_on_list: AtomicBool,
    unauthorized_on_update: AtomicBool,
    failing_updates: AtomicBool,
}

/// An in-memory DNS provider that records every call.
///
/// Successful updates are applied to the backing zone data, so a repointed
/// record matches on the following iterations.
#[derive(Clone)]
pub struct MockProvider {
    state: Arc<ProviderState>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ProviderState {
                zones: Mutex::new(HashMap::new()),
                list_calls: AtomicUsize::new(0),
                update_calls: AtomicUsize::new(0),
                updates: Mutex::new(Vec::new()),
                unauthorized_on_list: AtomicBool::new(false),
                unauthorized_on_update: AtomicBool::new(false),
                failing_updates: AtomicBool::new(false),
            }),
        }
    }

    pub fn insert_zone(&self, domain: &str, records: Vec<ARecord>) {
        self.state
            .zones
            .lock()
            .unwrap()
            .insert(domain.to_string(), records);
    }

    /// Peek at the provider-side record, bypassing the engine.
    pub fn record(&self, domain: &str, name: &str) -> Option<ARecord> {
        self.state
            .zones
            .lock()
            .unwrap()
            .get(domain)?
            .iter()
            .find(|r| r.name == name)
            .cloned()
    }

    pub fn list_call_count(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.state.update_calls.load(Ordering::SeqCst)
    }

    /// Every successful update as (domain, record name, new destination),
    /// in call order.
    pub fn updates(&self) -> Vec<(String, String, String)> {
        self.state.updates.lock().unwrap().clone()
    }

    pub fn set_unauthorized_on_list(&self, v: bool) {
        self.state.unauthorized_on_list.store(v, Ordering::SeqCst);
    }

    pub fn set_unauthorized_on_update(&self, v: bool) {
        self.state.unauthorized_on_update.store(v, Ordering::SeqCst);
    }

    pub fn set_failing_updates(&self, v: bool) {
        self.state.failing_updates.store(v, Ordering::SeqCst);
    }
}

#[async_trait]
impl DnsProvider for MockProvider {
    async fn list_records(&self, domain: &str) -> Result<Vec<ARecord>> {
        self.state.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.unauthorized_on_list.load(Ordering::SeqCst) {
            return Err(Error::Unauthorized);
        }
        Ok(self
            .state
            .zones
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_record(
        &self,
        domain: &str,
        record: &ARecord,
        destination: Ipv4Addr,
    ) -> Result<ARecord> {
        self.state.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.unauthorized_on_update.load(Ordering::SeqCst) {
            return Err(Error::Unauthorized);
        }
        if self.state.failing_updates.load(Ordering::SeqCst) {
            return Err(Error::provider(502, "simulated provider outage"));
        }

        let updated = ARecord {
            id: record.id.clone(),
            name: record.name.clone(),
            destination: destination.to_string(),
        };

        {
            let mut zones = self.state.zones.lock().unwrap();
            if let Some(records) = zones.get_mut(domain)
                && let Some(slot) = records.iter_mut().find(|r| r.id == record.id)
            {
                *slot = updated.clone();
            }
        }

        self.state.updates.lock().unwrap().push((
            domain.to_string(),
            updated.name.clone(),
            updated.destination.clone(),
        ));

        Ok(updated)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

struct CachingState {
    cache: RecordCache,
    zones: Mutex<HashMap<String, Vec<ARecord>>>,
    fetches: AtomicUsize,
    update_calls: AtomicUsize,
}

/// A provider whose reads go through a real [`RecordCache`], counting the
/// fetches that actually reach the backing zone data. This is the shape the
/// production Zone.eu client has, minus HTTP.
#[derive(Clone)]
pub struct CachingProvider {
    state: Arc<CachingState>,
}

impl CachingProvider {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Arc::new(CachingState {
                cache: RecordCache::new(ttl, 16),
                zones: Mutex::new(HashMap::new()),
                fetches: AtomicUsize::new(0),
                update_calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn insert_zone(&self, domain: &str, records: Vec<ARecord>) {
        self.state
            .zones
            .lock()
            .unwrap()
            .insert(domain.to_string(), records);
    }

    /// Number of reads that missed the cache and hit the backing data.
    pub fn fetch_count(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.state.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsProvider for CachingProvider {
    async fn list_records(&self, domain: &str) -> Result<Vec<ARecord>> {
        if let Some(records) = self.state.cache.get(domain).await {
            return Ok(records);
        }

        self.state.fetches.fetch_add(1, Ordering::SeqCst);
        let records = {
            self.state
                .zones
                .lock()
                .unwrap()
                .get(domain)
                .cloned()
                .unwrap_or_default()
        };
        self.state.cache.put(domain, records.clone()).await;
        Ok(records)
    }

    async fn update_record(
        &self,
        domain: &str,
        record: &ARecord,
        destination: Ipv4Addr,
    ) -> Result<ARecord> {
        self.state.update_calls.fetch_add(1, Ordering::SeqCst);

        let updated = ARecord {
            id: record.id.clone(),
            name: record.name.clone(),
            destination: destination.to_string(),
        };

        {
            let mut zones = self.state.zones.lock().unwrap();
            if let Some(records) = zones.get_mut(domain)
                && let Some(slot) = records.iter_mut().find(|r| r.id == record.id)
            {
                *slot = updated.clone();
            }
        }

        self.state.cache.apply_update(domain, &updated).await;
        Ok(updated)
    }

    fn provider_name(&self) -> &'static str {
        "caching-mock"
    }
}

struct FlusherState {
    purged: Mutex<Vec<String>>,
    failing: AtomicBool,
}

/// A flusher that records every purge attempt.
#[derive(Clone)]
pub struct MockFlusher {
    state: Arc<FlusherState>,
}

impl MockFlusher {
    pub fn new() -> Self {
        Self {
            state: Arc::new(FlusherState {
                purged: Mutex::new(Vec::new()),
                failing: AtomicBool::new(false),
            }),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Domains passed to `purge`, in call order, including failed attempts.
    pub fn purged(&self) -> Vec<String> {
        self.state.purged.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheFlusher for MockFlusher {
    async fn purge(&self, domain: &str) -> Result<()> {
        self.state.purged.lock().unwrap().push(domain.to_string());
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(Error::network("simulated purge failure"));
        }
        Ok(())
    }
}
