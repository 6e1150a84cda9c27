use anyhow::Context;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{
        self,
        format::{DefaultFields, Format, Full},
        time::ChronoUtc,
    },
    prelude::*,
    EnvFilter,
};

const DEFAULT_FILTER: &str =
    "ipcapi_core=debug,ipcapi_server=debug,ipcapi_client=debug,ipcapi_transport=debug,warn";
const TEST_FILTER: &str = "ipcapi_core=trace,ipcapi_server=trace,debug";

/// `RUST_LOG` when set, `fallback` otherwise.
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn timestamped<S>() -> fmt::Layer<S, DefaultFields, Format<Full, ChronoUtc>> {
    fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_timer(ChronoUtc::rfc_3339())
}

/// Install a global subscriber writing to stderr and to `<log_dir>/<log_prefix>.<date>`,
/// rotated daily.
///
/// File output goes through a background writer; keep the returned guard
/// alive for as long as logs should reach the file. Dropping it flushes.
/// Fails if a global subscriber is already installed.
pub fn init_logging(log_dir: impl AsRef<Path>, log_prefix: &str) -> anyhow::Result<WorkerGuard> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(log_prefix)
        .build(log_dir)
        .with_context(|| format!("opening log file in {}", log_dir.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_FILTER))
        .with(timestamped().with_writer(std::io::stderr))
        .with(timestamped().with_ansi(false).with_writer(file_writer))
        .try_init()
        .context("installing global tracing subscriber")?;

    tracing::info!(dir = %log_dir.display(), prefix = log_prefix, "logging to stderr and daily files");
    Ok(guard)
}

/// Console-only logging for tests. Safe to call more than once.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(TEST_FILTER))
        .with_test_writer()
        .try_init();
}
