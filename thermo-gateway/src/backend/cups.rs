//! CUPS backend - spawns `lp` and `lpstat`
//!
//! Jobs are submitted with `lp -d <queue> -o raw`, bytes piped to stdin, so
//! nothing re-renders the ESC/POS payload. Queue health comes from parsing
//! `lpstat -p` / `lpstat -a` output.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use super::{BackendError, BackendResult, PrinterBackend, QueueState};

/// Production backend over the CUPS command-line tools
#[derive(Debug, Clone)]
pub struct CupsBackend {
    timeout: Duration,
}

impl CupsBackend {
    /// Backend with the default 30s command timeout
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the per-command timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spawn a command, optionally piping data to stdin, and wait for it
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        stdin_data: Option<&[u8]>,
    ) -> BackendResult<std::process::Output> {
        let command_line = format!("{} {}", program, args.join(" "));
        debug!(command = %command_line, "spawning spooler command");

        let mut cmd = Command::new(program);
        cmd.args(args)
            // The lpstat parsers match English output; CUPS localizes
            .env("LC_ALL", "C")
            .stdin(if stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| BackendError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        if let Some(data) = stdin_data
            && let Some(mut stdin) = child.stdin.take()
        {
            stdin.write_all(data).await?;
            // Closing stdin signals end of job data
            drop(stdin);
        }

        tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| BackendError::Timeout {
                command: command_line,
                seconds: self.timeout.as_secs(),
            })?
            .map_err(BackendError::Io)
    }
}

impl Default for CupsBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrinterBackend for CupsBackend {
    #[instrument(skip(self, data), fields(queue = %queue, data_len = data.len()))]
    async fn submit_raw(&self, queue: &str, data: &[u8]) -> BackendResult<String> {
        let output = self.run("lp", &["-d", queue, "-o", "raw"], Some(data)).await?;

        if !output.status.success() {
            return Err(BackendError::CommandFailed {
                command: format!("lp -d {queue} -o raw"),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let job_id = parse_job_id(&stdout).unwrap_or_else(|| stdout.trim().to_string());
        info!(job_id = %job_id, "job handed to spooler");
        Ok(job_id)
    }

    #[instrument(skip(self), fields(queue = %queue))]
    async fn queue_state(&self, queue: &str) -> BackendResult<Option<QueueState>> {
        let printers = self.run("lpstat", &["-p", queue], None).await?;
        if !printers.status.success() {
            let stderr = String::from_utf8_lossy(&printers.stderr);
            if is_unknown_destination(&stderr) {
                return Ok(None);
            }
            return Err(BackendError::CommandFailed {
                command: format!("lpstat -p {queue}"),
                stderr: stderr.trim().to_string(),
            });
        }
        let enabled = parse_lpstat_p(&String::from_utf8_lossy(&printers.stdout));

        let accepting = self.run("lpstat", &["-a", queue], None).await?;
        if !accepting.status.success() {
            return Err(BackendError::CommandFailed {
                command: format!("lpstat -a {queue}"),
                stderr: String::from_utf8_lossy(&accepting.stderr).trim().to_string(),
            });
        }
        let accepting = parse_lpstat_a(&String::from_utf8_lossy(&accepting.stdout));

        Ok(Some(QueueState { enabled, accepting }))
    }

    async fn list_queues(&self) -> BackendResult<Vec<String>> {
        let output = self.run("lpstat", &["-p"], None).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // A spooler with zero queues is not an error condition
            if stderr.to_ascii_lowercase().contains("no destinations") {
                return Ok(Vec::new());
            }
            return Err(BackendError::CommandFailed {
                command: "lpstat -p".into(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(parse_queue_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn name(&self) -> &'static str {
        "cups (lp/lpstat, raw queue submission)"
    }
}

/// Extract the job id from `lp` output: `request id is FRONT-42 (1 file(s))`
fn parse_job_id(stdout: &str) -> Option<String> {
    stdout
        .split("request id is ")
        .nth(1)?
        .split_whitespace()
        .next()
        .map(String::from)
}

/// Does lpstat stderr mean "queue does not exist"?
fn is_unknown_destination(stderr: &str) -> bool {
    let s = stderr.to_ascii_lowercase();
    s.contains("invalid destination") || s.contains("unknown printer")
}

/// `lpstat -p <q>`: `printer q is idle. ...` vs `printer q disabled since ...`
fn parse_lpstat_p(stdout: &str) -> bool {
    stdout
        .lines()
        .find(|line| line.starts_with("printer "))
        .is_some_and(|line| !line.contains(" disabled"))
}

/// `lpstat -a <q>`: `q accepting requests ...` vs `q not accepting requests ...`
fn parse_lpstat_a(stdout: &str) -> bool {
    stdout
        .lines()
        .next()
        .is_some_and(|line| !line.contains("not accepting"))
}

/// `lpstat -p`: one `printer NAME ...` line per queue
fn parse_queue_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.starts_with("printer "))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(String::from)
        .collect()
}
