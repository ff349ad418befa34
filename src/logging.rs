//! Logging module, powered by tracing-subscriber
//!
//! Session events go to an append-only text file, one timestamped line per
//! event. A console layer can be enabled on top of the file layer.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::Config;

/// Build the `EnvFilter` from the configured level.
fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    let directives = format!("{},rustyline=warn", level);
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", directives, e))
}

/// Initialize logging based on configuration.
///
/// Sets up `tracing-subscriber` with:
///  - File layer (plain text, no ANSI colors), appended to `log_path`
///  - Console layer (when `log_to_console` is true)
pub fn init_logging(config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = config.log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("opening log file {}", config.log_path.display()))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(log_file))
        .with_filter(build_env_filter(&config.log_level)?);

    let console_layer = if config.log_to_console {
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(build_env_filter(&config.log_level)?),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!("Session started");
    Ok(())
}
