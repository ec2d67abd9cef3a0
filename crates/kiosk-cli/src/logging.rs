//! Logging initialization.
//!
//! Stdout always gets a human-readable (or JSON) layer. When a log
//! directory is configured, a daily-rolling JSON file layer is added for
//! the audit trail of scans.

use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogConfig, LogFormat};

/// Keeps the non-blocking file writer alive for the lifetime of the program.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level.
///
/// # Errors
///
/// Returns an error if the filter directive cannot be parsed, the log
/// directory cannot be created, or a subscriber is already installed.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let mut layers: Vec<BoxedLayer> = vec![stdout_layer(config.format)];
    if let Some(dir) = &config.dir {
        layers.push(file_layer(dir)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

fn stdout_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(false)
            .with_span_events(FmtSpan::NONE)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_ansi(false)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false)
            .boxed(),
    }
}

fn file_layer(dir: &Path) -> anyhow::Result<BoxedLayer> {
    std::fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, "kiosk");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);

    Ok(tracing_subscriber::fmt::layer()
        .json()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .boxed())
}
