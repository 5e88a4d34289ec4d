//! Recording backend - deterministic fake for tests
//!
//! Queue states are scripted per test and every call is recorded, so the
//! four-stage validation precedence can be asserted without a CUPS install.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{BackendResult, PrinterBackend, QueueState};

/// One job handed to the fake spooler, bytes preserved verbatim
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub queue: String,
    pub data: Vec<u8>,
}

/// In-memory [`PrinterBackend`] that records every invocation
#[derive(Debug, Default)]
pub struct RecordingBackend {
    queues: Mutex<BTreeMap<String, QueueState>>,
    jobs: Mutex<Vec<SubmittedJob>>,
    state_queries: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the state of a queue
    pub fn set_queue(&self, queue: &str, state: QueueState) {
        self.queues
            .lock()
            .unwrap()
            .insert(queue.to_string(), state);
    }

    /// Make a queue unknown to the fake spooler
    pub fn remove_queue(&self, queue: &str) {
        self.queues.lock().unwrap().remove(queue);
    }

    /// Jobs submitted so far
    pub fn jobs(&self) -> Vec<SubmittedJob> {
        self.jobs.lock().unwrap().clone()
    }

    /// Queues whose state was queried, in call order
    pub fn state_queries(&self) -> Vec<String> {
        self.state_queries.lock().unwrap().clone()
    }

    /// Total backend invocations of any kind
    pub fn invocation_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
            + self.state_queries.lock().unwrap().len()
            + self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrinterBackend for RecordingBackend {
    async fn submit_raw(&self, queue: &str, data: &[u8]) -> BackendResult<String> {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.push(SubmittedJob {
            queue: queue.to_string(),
            data: data.to_vec(),
        });
        Ok(format!("{}-{}", queue, jobs.len()))
    }

    async fn queue_state(&self, queue: &str) -> BackendResult<Option<QueueState>> {
        self.state_queries.lock().unwrap().push(queue.to_string());
        Ok(self.queues.lock().unwrap().get(queue).copied())
    }

    async fn list_queues(&self) -> BackendResult<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.queues.lock().unwrap().keys().cloned().collect())
    }

    fn name(&self) -> &'static str {
        "recording (test fake)"
    }
}
