//! Student report service - renders upstream student records as PDF reports.
//!
//! Logs in to the student backend with the configured account, fetches the
//! requested record and streams back a generated PDF.

mod error;
mod routes;
mod server;

use std::io;
use std::path::Path;

use anyhow::Result;
use student_report_core::{config, Config};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Daily-rotated log file name inside `LOG_DIR`
const LOG_FILE_PREFIX: &str = "student-report.log";

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until shutdown so buffered file logs are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Logging first, so warnings raised while reading the config are not lost
    let _log_guard = init_tracing(config::log_dir_from_env().as_deref());
    let config = Config::from_env()?;

    info!(
        api_url = %config.api_url,
        timeout = ?config.request_timeout,
        log_dir = ?config.log_dir,
        credentials = config.auth_email.is_some() && config.auth_password.is_some(),
        "Configuration loaded"
    );

    server::run_server(config).await
}
