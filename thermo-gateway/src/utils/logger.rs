//! Logging infrastructure
//!
//! Structured logging setup for both interactive and service deployments.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger with defaults (RUST_LOG or "info", stderr)
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with an optional level and daily rolling file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // Add file output if log_dir is provided and exists
    if let Some(dir) = log_dir
        && Path::new(dir).exists()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "thermo-gateway");
        subscriber.with_writer(file_appender).init();
        return;
    }

    subscriber.init();
}
