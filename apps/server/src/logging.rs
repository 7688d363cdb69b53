//! Logging initialization
//!
//! Console output (plain or JSON) plus an optional rolling log file. `RUST_LOG`
//! takes precedence over `logging.level` when set.

use crate::config::LoggingConfig;
use anyhow::Context;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Keeps the non-blocking file writer alive; drop it last to flush logs.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![env_filter.boxed()];

    let console = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };
    layers.push(console);

    let file_guard = if config.file_enabled {
        let appender = match config.file_rotation.as_str() {
            "hourly" => rolling::hourly(&config.file_directory, &config.file_prefix),
            "minutely" => rolling::minutely(&config.file_directory, &config.file_prefix),
            "never" => rolling::never(&config.file_directory, &config.file_prefix),
            _ => rolling::daily(&config.file_directory, &config.file_prefix),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    if config.file_enabled {
        tracing::info!(
            directory = %config.file_directory,
            prefix = %config.file_prefix,
            rotation = %config.file_rotation,
            "File logging enabled"
        );
    }

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
