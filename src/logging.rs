//! Tracing setup for the app shell.
//!
//! The UI layer calls [`init`] once at startup; everything below it just emits
//! `tracing` events. Logs go to a daily-rotated file in the platform data
//! directory so offline sessions can be diagnosed after the fact.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `ICTWIKI_LOG` (env-filter syntax, e.g. `ictwiki_core=debug`),
/// defaulting to `info`. The returned guard must be held for the lifetime of
/// the process or buffered log lines are lost.
pub fn init() -> Result<WorkerGuard> {
  let log_dir = default_log_dir()?;
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&log_dir, "ictwiki.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env("ICTWIKI_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false),
    )
    .try_init()
    .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

  Ok(guard)
}

fn default_log_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("ictwiki").join("logs"))
}
