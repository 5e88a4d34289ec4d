//! Thermo Gateway - thermal printer HTTP gateway over CUPS
//!
//! Translates REST calls into ESC/POS byte sequences and hands them to the
//! OS print spooler as raw jobs. Spooling, queueing and device I/O stay with
//! CUPS; this process holds no mutable state between requests.
//!
//! # Module structure
//!
//! ```text
//! thermo-gateway/src/
//! ├── core/      # config, state, errors, server lifecycle
//! ├── backend/   # PrinterBackend seam: CUPS production impl + test fake
//! ├── api/       # HTTP routes and handlers
//! ├── auth/      # X-API-Key middleware
//! └── utils/     # logging setup
//! ```

pub mod api;
pub mod auth;
pub mod backend;
pub mod core;
pub mod utils;

// Re-export common types
pub use crate::core::{Config, GatewayError, GatewayResult, Server, ServerState};
pub use crate::utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and initialize logging
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

/// Startup banner listing the configured printers
pub fn print_banner(config: &Config) {
    println!("Thermo Gateway v{}", env!("CARGO_PKG_VERSION"));
    println!("ESC/POS over CUPS raw queues (lp/lpstat)");
    println!();
    println!("Configured printers:");
    for (name, queue) in &config.printers {
        println!("  - {} -> {}", name, queue);
    }
    println!();
    println!(
        "Test with: curl 'http://localhost:{}/beep?printer=<name>'",
        config.http_port
    );
}
