//! API key authentication

mod middleware;

pub use middleware::require_api_key;
