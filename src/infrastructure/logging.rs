//! Logging system configuration and initialization
//!
//! This module provides the tracing setup with:
//! - Console output and an optional non-blocking log file
//! - Configuration file based log level control, overridable by `RUST_LOG`
//! - Structured JSON file logging (optional)

#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use chrono::Local;
use lazy_static::lazy_static;
use std::path::Path;
use std::sync::Mutex;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub use crate::infrastructure::config::LoggingConfig;

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> =
        Mutex::new(Vec::new());
}

/// Local time with milliseconds and offset
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level plus
/// per-module directives.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    if !config.level.to_lowercase().contains("trace") {
        for (module, level) in &config.module_filters {
            let directive = format!("{}={}", module, level)
                .parse()
                .map_err(|e| anyhow!("Invalid log filter {}={}: {}", module, level, e))?;
            filter = filter.add_directive(directive);
        }
    }
    Ok(filter)
}

/// Initialize logging with custom configuration
///
/// ```bash
/// # Show HTTP client internals as well
/// RUST_LOG="debug,reqwest=debug" ufcstats-harvester scrape
/// ```
pub fn init_logging_with_config(config: &LoggingConfig, log_dir: &Path) -> Result<()> {
    let env_filter = build_env_filter(config)?;

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(LocalTimeFormatter)
            .with_target(false)
    });

    let file_layer = if config.file_output {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        let file_appender = rolling::never(log_dir, &config.file_name);
        let (file_writer, file_guard) = non_blocking(file_appender);
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);

        let layer = fmt::Layer::new()
            .with_writer(file_writer)
            .with_timer(LocalTimeFormatter)
            .with_ansi(false);
        let layer = if config.json_format {
            layer.json().with_target(true).with_line_number(true).boxed()
        } else {
            layer.with_target(false).boxed()
        };
        Some(layer)
    } else {
        None
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!(
        "Logging initialized (level: {}, file: {})",
        config.level,
        if config.file_output {
            log_dir.join(&config.file_name).display().to_string()
        } else {
            "disabled".to_string()
        }
    );
    Ok(())
}
