//! Test utilities shared across the workspace.
//! Only compiled when running tests or with the `testing` feature.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::executor::{CommandExecutor, ExecutionOutcome};

/// A mock executor that returns pre-configured outcomes.
pub struct MockExecutor {
    outcomes: Mutex<Vec<ExecutionOutcome>>,
    /// Captured commands (for assertion).
    pub captured_commands: Mutex<Vec<String>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            captured_commands: Mutex::new(Vec::new()),
        }
    }

    /// Queue an outcome to be returned by the next execute() call.
    /// Outcomes are returned in FIFO order (first queued = first returned).
    pub fn queue_stdout(&self, stdout: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(0, ExecutionOutcome::Stdout(stdout.to_string()));
    }

    pub fn queue_error(&self, message: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(0, ExecutionOutcome::Error(message.to_string()));
    }

    /// Get the number of captured commands.
    pub fn command_count(&self) -> usize {
        self.captured_commands.lock().unwrap().len()
    }

    /// Get the last captured command.
    pub fn last_command(&self) -> Option<String> {
        self.captured_commands.lock().unwrap().last().cloned()
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, command: &str) -> ExecutionOutcome {
        self.captured_commands
            .lock()
            .unwrap()
            .push(command.to_string());
        match self.outcomes.lock().unwrap().pop() {
            Some(outcome) => outcome,
            None => ExecutionOutcome::Error("No mock outcome queued".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_executor_fifo() {
        let executor = MockExecutor::new();
        executor.queue_stdout("first");
        executor.queue_error("second");

        assert_eq!(
            executor.execute("ls").await,
            ExecutionOutcome::Stdout("first".into())
        );
        assert_eq!(
            executor.execute("ls").await,
            ExecutionOutcome::Error("second".into())
        );
        assert_eq!(executor.command_count(), 2);
        assert_eq!(executor.last_command().as_deref(), Some("ls"));
    }
}
