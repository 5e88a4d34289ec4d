//! Printer backend capability
//!
//! The gateway never talks to hardware itself; it hands raw bytes to the OS
//! print spooler. This module is the narrow seam over that boundary:
//! [`CupsBackend`] spawns the CUPS command-line tools, [`RecordingBackend`]
//! is a deterministic fake for tests.

mod cups;
mod recording;

pub use cups::CupsBackend;
pub use recording::{RecordingBackend, SubmittedJob};

use async_trait::async_trait;
use thiserror::Error;

/// Enabled/accepting snapshot of a CUPS queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueState {
    /// Queue is enabled (cupsenable)
    pub enabled: bool,
    /// Queue accepts new jobs (cupsaccept)
    pub accepting: bool,
}

impl QueueState {
    /// Enabled and accepting
    pub fn ready() -> Self {
        Self {
            enabled: true,
            accepting: true,
        }
    }
}

/// Backend error types
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("{command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Capability interface over the OS print spooler
///
/// One production implementation (spawns `lp`/`lpstat`) and one recording
/// fake; handlers only ever see this trait.
#[async_trait]
pub trait PrinterBackend: Send + Sync {
    /// Submit raw bytes to a queue, returning the spooler's job id
    async fn submit_raw(&self, queue: &str, data: &[u8]) -> BackendResult<String>;

    /// Queue snapshot; `None` when the queue does not exist
    async fn queue_state(&self, queue: &str) -> BackendResult<Option<QueueState>>;

    /// All queue names known to the spooler
    async fn list_queues(&self) -> BackendResult<Vec<String>>;

    /// Short description for the health endpoint
    fn name(&self) -> &'static str;
}
