//! Logging system configuration and initialization
//!
//! This module provides the tracing setup used by every consumer of the
//! engine:
//! - Console output with an `RUST_LOG`-style env filter
//! - Optional daily-rotated file output next to the executable
//! - Worker guard kept alive for the process lifetime

use std::path::PathBuf;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

// Keeps the non-blocking file writer alive; dropping it would silently stop
// file output.
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Get the log directory relative to the executable location.
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Initialize console-only logging with the default filter.
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,coupang_crawler_v2=debug"));

    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .context("Failed to initialize logging subscriber")?;

    Ok(())
}

/// Initialize logging with console output plus a daily-rotated log file.
pub fn init_logging_with_file(file_prefix: &str) -> Result<()> {
    let log_dir = get_log_directory();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&log_dir, format!("{file_prefix}.log"));
    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,coupang_crawler_v2=debug"));

    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()
        .context("Failed to initialize logging subscriber")?;

    info!("📁 File logging enabled under {}", log_dir.display());
    Ok(())
}
