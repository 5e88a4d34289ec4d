use std::sync::Arc;

use crate::backend::{CupsBackend, PrinterBackend};
use crate::core::{Config, GatewayError};

/// Server state - cheap-to-clone handles shared by every request
///
/// Holds the immutable configuration and the printer backend behind `Arc`s.
/// No mutable process state lives here; each request is independent.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn PrinterBackend>,
}

impl ServerState {
    /// State with the production CUPS backend
    pub fn new(config: Config) -> Self {
        Self::with_backend(config, Arc::new(CupsBackend::new()))
    }

    /// State with an injected backend (tests use [`crate::backend::RecordingBackend`])
    pub fn with_backend(config: Config, backend: Arc<dyn PrinterBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }

    /// Four-stage printer validation, in strict precedence order
    ///
    /// 1. name is configured -> else `unconfigured_printer`
    /// 2. queue exists in CUPS -> else `not_found`
    /// 3. queue is enabled -> else `disabled`
    /// 4. queue is accepting jobs -> else `not_accepting`
    ///
    /// Returns the CUPS queue name on success. Stage 1 fails before any
    /// backend call is made.
    pub async fn check_printer(&self, name: &str) -> Result<String, GatewayError> {
        let Some(queue) = self.config.queue_for(name) else {
            return Err(GatewayError::UnconfiguredPrinter {
                name: name.to_string(),
                available: self.config.printer_names().join(", "),
            });
        };

        match self.backend.queue_state(queue).await? {
            None => Err(GatewayError::QueueNotFound {
                queue: queue.to_string(),
                fix: format!("lpadmin -p {queue} -E -v <device-uri> -m raw"),
            }),
            Some(state) if !state.enabled => Err(GatewayError::QueueDisabled {
                queue: queue.to_string(),
                fix: format!("cupsenable {queue}"),
            }),
            Some(state) if !state.accepting => Err(GatewayError::QueueNotAccepting {
                queue: queue.to_string(),
                fix: format!("cupsaccept {queue}"),
            }),
            Some(_) => Ok(queue.to_string()),
        }
    }

    /// Validate the printer, then hand the bytes to the spooler verbatim
    pub async fn submit(&self, name: &str, data: Vec<u8>) -> Result<String, GatewayError> {
        let queue = self.check_printer(name).await?;
        let job_id = self.backend.submit_raw(&queue, &data).await?;
        tracing::info!(
            printer = name,
            queue = %queue,
            job_id = %job_id,
            bytes = data.len(),
            "print job submitted"
        );
        Ok(job_id)
    }
}
