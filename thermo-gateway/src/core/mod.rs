//! Core: configuration, errors, shared state, server lifecycle

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{ErrorBody, GatewayError, GatewayResult};
pub use server::Server;
pub use state::ServerState;
