//! Structured logging setup: pretty console output in development, JSON in
//! production, plus an optional daily-rotating file appender.

use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, prelude::*};

/// Guard returned by [`init`]; dropping it flushes the background file
/// writer. The caller must hold this for the lifetime of the process.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initializes the global tracing subscriber.
///
/// `json` selects JSON formatting (production) over pretty formatting
/// (development). `log_dir`, when set, adds a daily-rotating `tab-server.log`
/// file sink alongside the console.
pub fn init(level: &str, json: bool, log_dir: Option<&str>) -> anyhow::Result<LoggingGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(env_filter);

    let Some(dir) = log_dir else {
        if json {
            registry.with(fmt::layer().json().with_target(true).with_file(true).with_line_number(true)).init();
        } else {
            registry.with(fmt::layer().with_target(true).with_file(true).with_line_number(true)).init();
        }
        return Ok(LoggingGuard { _file_guard: None });
    };

    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(Path::new(dir), "tab-server");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    if json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(writer);
        registry
            .with(fmt::layer().json().with_target(true).with_file(true).with_line_number(true))
            .with(file_layer)
            .init();
    } else {
        let file_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(writer);
        registry
            .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
            .with(file_layer)
            .init();
    }

    Ok(LoggingGuard { _file_guard: Some(guard) })
}
