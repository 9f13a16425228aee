// # zddnsd - zddns daemon
//
// Thin integration layer: parses CLI flags, reads provider credentials from
// the environment, initializes logging, wires the HTTP collaborators into
// the reconciliation engine, and runs it until a signal or a fatal
// credential error. All reconciliation logic lives in zddns-core.
//
// ## Configuration
//
// Environment variables:
// - `ZONE_USERNAME`, `ZONE_API_KEY`: Zone.eu credentials (required)
// - `ZDDNS_LOG_LEVEL`: trace|debug|info|warn|error (default: info)
//
// Flags:
// - `--interval-seconds N`: seconds between reconciliation passes (default 10)
// - `--zone-cache-ttl-seconds N`: record cache lifetime (default 1800)
// - `--a-record domain:name[:flushableDomain]`: record to manage, repeatable
//
// ## Example
//
// ```bash
// export ZONE_USERNAME=operator
// export ZONE_API_KEY=your_key
//
// zddnsd --a-record 'm2rt.eu:*.m2rt.eu' \
//        --a-record 'example.com:www:cdn.example.com'
// ```

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use zddns_core::{EngineConfig, ReconcileConfig, ReconcileEngine, RecordCache, Target};
use zddns_ip_http::HttpIpResolver;
use zddns_provider_zone::ZoneProvider;
use zddns_purge_http::PurgeClient;

/// Exit codes for the termination scenarios
///
/// - 0: clean shutdown (signal)
/// - 1: startup failure or rejected credentials
/// - 2: unexpected runtime error
#[derive(Debug, Clone, Copy)]
enum ExitStatus {
    CleanShutdown = 0,
    StartupError = 1,
    RuntimeError = 2,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "zddnsd",
    about = "Keeps Zone.eu DNS A records pointed at the current external IP"
)]
struct Cli {
    /// Seconds slept between reconciliation passes.
    #[arg(long, default_value_t = 10)]
    interval_seconds: u64,

    /// How long fetched zone records stay cached, in seconds.
    #[arg(long, default_value_t = 1800)]
    zone_cache_ttl_seconds: u64,

    /// A record to update when the IP changes, as
    /// 'domain:name[:flushableDomain]'. Example: 'm2rt.eu:*.m2rt.eu'.
    /// Can be specified multiple times.
    #[arg(long = "a-record", value_name = "TARGET")]
    a_records: Vec<Target>,
}

/// Zone.eu API credentials, environment-supplied only so they never show up
/// in process listings.
struct Credentials {
    username: String,
    api_key: String,
}

impl Credentials {
    fn from_env() -> Result<Self> {
        Ok(Self {
            username: require_env("ZONE_USERNAME")?,
            api_key: require_env("ZONE_API_KEY")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("missing required environment variable {key}"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.a_records.is_empty() {
        eprintln!(
            "at least one --a-record is required, e.g. --a-record 'm2rt.eu:*.m2rt.eu'"
        );
        return ExitStatus::StartupError.into();
    }

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitStatus::StartupError.into();
        }
    };

    let log_level = env::var("ZDDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!("invalid ZDDNS_LOG_LEVEL '{other}' (trace|debug|info|warn|error)");
            return ExitStatus::StartupError.into();
        }
    };

    // Single-line entries with timestamp, source location, level, message,
    // on stdout.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {e}");
        return ExitStatus::StartupError.into();
    }

    info!("starting zddnsd");

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return ExitStatus::RuntimeError.into();
        }
    };

    match rt.block_on(run_daemon(cli, credentials)) {
        Ok(()) => {
            info!("clean shutdown");
            ExitStatus::CleanShutdown.into()
        }
        Err(e) => {
            // Only startup validation and rejected credentials get here;
            // everything else is absorbed at the iteration boundary.
            error!("{e}");
            ExitStatus::StartupError.into()
        }
    }
}

async fn run_daemon(cli: Cli, credentials: Credentials) -> zddns_core::Result<()> {
    let cache = RecordCache::new(
        Duration::from_secs(cli.zone_cache_ttl_seconds),
        zddns_core::cache::DEFAULT_CAPACITY,
    );
    let provider = ZoneProvider::new(credentials.username, credentials.api_key, cache)?;
    let resolver = HttpIpResolver::new();
    let flusher = PurgeClient::new();

    let config = ReconcileConfig {
        targets: cli.a_records,
        engine: EngineConfig {
            interval_secs: cli.interval_seconds,
            ..EngineConfig::default()
        },
    };

    for target in &config.targets {
        info!(
            %target,
            flushable = target.flushable_domain.as_deref().unwrap_or("-"),
            "managing record"
        );
    }

    let (engine, _events) = ReconcileEngine::new(
        Box::new(resolver),
        Box::new(provider),
        Box::new(flusher),
        config,
    )?;

    engine.run().await
}
