//! Default command-execution collaborator backed by `tokio::process`.
//!
//! The executor owns the safety limits: a 30-second wall-clock timeout and
//! a 10 MiB cap on captured output. The orchestrator imposes none of its
//! own, and a dispatched command is not cancellable from the stream side.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use relay_core::{CommandExecutor, ExecutionOutcome};

const EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_CAPTURED_OUTPUT: usize = 10 * 1024 * 1024;

pub struct ShellExecutor {
    timeout: Duration,
    max_output_bytes: usize,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self {
            timeout: EXECUTION_TIMEOUT,
            max_output_bytes: MAX_CAPTURED_OUTPUT,
        }
    }

    fn cap(&self, mut output: String) -> String {
        if output.len() <= self.max_output_bytes {
            return output;
        }
        let mut cut = self.max_output_bytes;
        while !output.is_char_boundary(cut) {
            cut -= 1;
        }
        output.truncate(cut);
        output.push_str("\n[output truncated]");
        output
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &str) -> ExecutionOutcome {
        debug!("Executing command: {}", command);

        let run = Command::new("sh").arg("-c").arg(command).output();
        let output = match tokio::time::timeout(self.timeout, run).await {
            Err(_) => {
                return ExecutionOutcome::Error(format!(
                    "Command timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            }
            Ok(Err(e)) => {
                return ExecutionOutcome::Error(format!("Failed to run command: {}", e))
            }
            Ok(Ok(output)) => output,
        };

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            ExecutionOutcome::Stdout(self.cap(stdout))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            let detail = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).into_owned()
            } else {
                stderr
            };
            ExecutionOutcome::Error(self.cap(format!(
                "Command exited with {}: {}",
                output.status,
                detail.trim_end()
            )))
        }
    }
}
