//! Log sink setup.

use anyhow::{Context, Result};
use orderpix_core::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber: optional console output plus a daily
/// rolling log file.
///
/// Each sink has its own filter so the file can keep debug detail while the
/// console stays at `level`. `RUST_LOG` overrides both. Only the newest
/// `max_files` log files are kept. The returned guard flushes the file
/// writer when dropped and must outlive every log call.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.dir)
        .with_context(|| format!("Failed to create log directory {:?}", config.dir))?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .max_log_files(config.max_files)
        .build(&config.dir)
        .with_context(|| format!("Failed to open log file in {:?}", config.dir))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = config.console.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_filter(sink_filter(&config.level))
    });
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(sink_filter(&config.file_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn sink_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
