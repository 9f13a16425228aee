//! Configuration types for the zddns system.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One unit of reconciliation work: a DNS A record kept pointed at the
/// current external IP, with an optional domain whose resolver cache is
/// purged after an update.
///
/// Parsed from a `domain:name[:flushableDomain]` token, e.g.
/// `m2rt.eu:*.m2rt.eu` or `example.com:www:cdn.example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Zone the record lives in.
    pub domain: String,

    /// Record name inside the zone. Wildcard names are allowed.
    pub record_name: String,

    /// Domain to purge from the resolver cache after a successful update.
    pub flushable_domain: Option<String>,
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Only the first two colons split; the remainder is the flushable
        // domain.
        let mut parts = s.splitn(3, ':');
        let domain = parts.next().unwrap_or_default();
        let record_name = parts.next().ok_or_else(|| {
            Error::config(format!(
                "invalid a-record '{s}': expected 'domain:name[:flushableDomain]'"
            ))
        })?;

        if domain.is_empty() || record_name.is_empty() {
            return Err(Error::config(format!(
                "invalid a-record '{s}': domain and record name must be non-empty"
            )));
        }

        let flushable_domain = parts.next().filter(|d| !d.is_empty()).map(str::to_string);

        Ok(Self {
            domain: domain.to_string(),
            record_name: record_name.to_string(),
            flushable_domain,
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.record_name)
    }
}

/// Engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds slept between reconciliation iterations.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Capacity of the engine's event channel. When full, new events are
    /// dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    10
}

fn default_event_channel_capacity() -> usize {
    64
}

/// Top-level reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Records to keep synchronized, in reconciliation order.
    pub targets: Vec<Target>,

    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ReconcileConfig {
    /// Create a configuration with default engine settings.
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            targets,
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(Error::config(
                "at least one a-record target is required (domain:name[:flushableDomain])",
            ));
        }

        if self.engine.interval_secs == 0 {
            return Err(Error::config("interval must be greater than zero"));
        }

        for target in &self.targets {
            validate_domain_name(&target.domain)?;
            if let Some(flushable) = &target.flushable_domain {
                validate_domain_name(flushable)?;
            }
        }

        Ok(())
    }
}

/// Basic DNS domain name validation per RFC 1035. Not comprehensive, but
/// catches the common operator typos before the first provider call.
pub fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(Error::config("domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(Error::config(format!(
            "domain name too long ({} chars, max 253): {domain}",
            domain.len()
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(Error::config(format!(
                "domain name has an empty label: '{domain}'"
            )));
        }

        if label.len() > 63 {
            return Err(Error::config(format!(
                "domain label too long ({} chars, max 63): '{label}'",
                label.len()
            )));
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err(Error::config(format!(
                "domain label contains invalid characters: '{label}'"
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::config(format!(
                "domain label cannot start or end with a hyphen: '{label}'"
            )));
        }
    }

    Ok(())
}
