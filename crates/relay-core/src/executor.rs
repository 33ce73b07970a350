use async_trait::async_trait;

/// Result of running a command through the execution collaborator.
///
/// Execution failure (non-zero exit, timeout, I/O error) is an outcome,
/// not an `Error`: the dispatcher reports it as user-visible content with
/// normal stream termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Stdout(String),
    Error(String),
}

impl ExecutionOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, ExecutionOutcome::Error(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExecutionOutcome::Stdout(s) => s,
            ExecutionOutcome::Error(s) => s,
        }
    }
}

/// The external command-execution collaborator.
///
/// Implementations enforce their own timeout and captured-output cap; the
/// stream core never imposes limits itself, and once dispatched a call is
/// not cancellable from this side.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str) -> ExecutionOutcome;
}
