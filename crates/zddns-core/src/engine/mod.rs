//! The reconciliation engine.
//!
//! On a fixed interval the engine resolves the current external IP, looks up
//! each configured target's A record through the provider, and issues an
//! update (plus an optional resolver-cache purge) when the destination
//! differs.
//!
//! ## Iteration flow
//!
//! ```text
//! resolve IP ──► for each target ──► find record ──► compare ──┬─ equal: log
//!                                                              └─ differs:
//!                                                                 update,
//!                                                                 then purge?
//! ──► sleep interval ──► repeat
//! ```
//!
//! Failures are contained at the iteration boundary: a failed IP resolution
//! skips the whole iteration, any other per-target error skips only that
//! target, and the next tick is the retry. The single exception is a
//! provider 401, which ends the run so the process can exit non-zero —
//! credentials do not recover on their own.

use std::net::Ipv4Addr;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::{ReconcileConfig, Target};
use crate::error::{Error, Result};
use crate::traits::{CacheFlusher, DnsProvider, IpResolver};

/// Events emitted by the engine for external observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The reconciliation loop started.
    Started { target_count: usize },

    /// The external IP was resolved for this iteration.
    IpResolved { ip: Ipv4Addr },

    /// The external IP could not be resolved; the iteration was skipped.
    IpResolutionFailed { error: String },

    /// A record already pointed at the current IP.
    RecordMatched { domain: String, record: String },

    /// A configured record does not exist at the provider.
    RecordMissing { domain: String, record: String },

    /// A record was repointed at the current IP.
    UpdateSucceeded {
        domain: String,
        record: String,
        previous: String,
        destination: String,
    },

    /// A record update failed; the target stays stale until the next tick.
    UpdateFailed {
        domain: String,
        record: String,
        error: String,
    },

    /// The resolver cache purge for a flushable domain went through.
    PurgeSucceeded { domain: String },

    /// The resolver cache purge failed; the DNS update stands.
    PurgeFailed { domain: String, error: String },

    /// The engine stopped.
    Stopped { reason: String },
}

/// The reconciliation loop.
///
/// Owns its collaborators as trait objects and runs them from one sequential
/// task: every iteration finishes before the interval sleep starts, and no
/// two operations ever run concurrently.
pub struct ReconcileEngine {
    ip_resolver: Box<dyn IpResolver>,
    provider: Box<dyn DnsProvider>,
    flusher: Box<dyn CacheFlusher>,
    targets: Vec<Target>,
    interval: Duration,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl ReconcileEngine {
    /// Create an engine from validated configuration.
    ///
    /// Returns the engine together with the receiving end of its event
    /// channel.
    pub fn new(
        ip_resolver: Box<dyn IpResolver>,
        provider: Box<dyn DnsProvider>,
        flusher: Box<dyn CacheFlusher>,
        config: ReconcileConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            ip_resolver,
            provider,
            flusher,
            targets: config.targets,
            interval: Duration::from_secs(config.engine.interval_secs),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run until a shutdown signal (SIGINT) or a fatal credential error.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run with a controlled shutdown signal instead of SIGINT.
    ///
    /// The loop is otherwise infinite; contract tests use this to stop it
    /// deterministically. Production code should call [`run`](Self::run).
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            target_count: self.targets.len(),
        });
        info!(
            targets = self.targets.len(),
            interval_secs = self.interval.as_secs(),
            provider = self.provider.provider_name(),
            "reconciliation loop started"
        );

        if let Some(mut rx) = shutdown_rx {
            loop {
                self.tick().await?;
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            loop {
                self.tick().await?;
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// One reconciliation iteration. `Err` means the run must end.
    async fn tick(&self) -> Result<()> {
        let current_ip = match self.ip_resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!("external IP resolution failed, skipping iteration: {e}");
                self.emit_event(EngineEvent::IpResolutionFailed {
                    error: e.to_string(),
                });
                return Ok(());
            }
        };
        self.emit_event(EngineEvent::IpResolved { ip: current_ip });

        for target in &self.targets {
            match self.reconcile_target(target, current_ip).await {
                Ok(()) => {}
                Err(e) if e.is_fatal() => {
                    error!(%target, "stopping: {e}");
                    self.emit_event(EngineEvent::Stopped {
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
                Err(e) => {
                    // Target stays stale until the next tick; the rest of
                    // the targets still run.
                    error!(%target, "reconciliation failed: {e}");
                }
            }
        }

        Ok(())
    }

    async fn reconcile_target(&self, target: &Target, current_ip: Ipv4Addr) -> Result<()> {
        let record = self
            .provider
            .find_record(&target.domain, &target.record_name)
            .await?;

        let Some(record) = record else {
            self.emit_event(EngineEvent::RecordMissing {
                domain: target.domain.clone(),
                record: target.record_name.clone(),
            });
            return Err(Error::record_not_found(&target.domain, &target.record_name));
        };

        if record.matches(current_ip) {
            info!(domain = %target.domain, record = %record.name, "IP matches");
            self.emit_event(EngineEvent::RecordMatched {
                domain: target.domain.clone(),
                record: record.name.clone(),
            });
            return Ok(());
        }

        info!(
            domain = %target.domain,
            record = %record.name,
            destination = %record.destination,
            current_ip = %current_ip,
            "IP does not match, updating"
        );

        let updated = match self
            .provider
            .update_record(&target.domain, &record, current_ip)
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                self.emit_event(EngineEvent::UpdateFailed {
                    domain: target.domain.clone(),
                    record: record.name.clone(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        self.emit_event(EngineEvent::UpdateSucceeded {
            domain: target.domain.clone(),
            record: updated.name.clone(),
            previous: record.destination.clone(),
            destination: updated.destination.clone(),
        });

        if let Some(flush_domain) = &target.flushable_domain {
            match self.flusher.purge(flush_domain).await {
                Ok(()) => {
                    self.emit_event(EngineEvent::PurgeSucceeded {
                        domain: flush_domain.clone(),
                    });
                }
                Err(e) => {
                    // The DNS update stands either way.
                    warn!(domain = %flush_domain, "resolver cache purge failed: {e}");
                    self.emit_event(EngineEvent::PurgeFailed {
                        domain: flush_domain.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping event");
        }
    }
}
