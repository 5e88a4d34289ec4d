//! Utility module - logging setup

pub mod logger;
