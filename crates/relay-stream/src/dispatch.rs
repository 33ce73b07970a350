//! Tool dispatcher: a recovered invocation becomes terminal chunks.
//!
//! `Bash` is the one tool executed here; its outcome — success or failure —
//! is rendered as content with a normal `stop` termination, never as a
//! stream error. Every other tool name is forwarded uninterpreted as the
//! start/args/finish triple so the consumer can dispatch it externally.

use tracing::debug;

use relay_core::{
    CommandExecutor, ExecutionOutcome, FinishReason, KnownTool, Role, ToolInvocation,
    UnifiedChunk,
};

/// Format a command and its captured output (or error) as a fenced block.
pub fn render_execution(command: &str, outcome: &ExecutionOutcome) -> String {
    format!("```\n$ {}\n{}\n```", command, outcome.as_str().trim_end())
}

/// Turn a recovered invocation into the chunks that close the turn.
///
/// The buffered text of the turn has already been discarded by the caller,
/// so the first chunk produced here carries the assistant role.
pub async fn dispatch(
    invocation: ToolInvocation,
    model: &str,
    executor: &dyn CommandExecutor,
) -> Vec<UnifiedChunk> {
    match KnownTool::from(invocation) {
        KnownTool::Bash { command } => {
            let outcome = executor.execute(&command).await;
            if outcome.is_error() {
                debug!("Command failed, reporting as content: {}", command);
            }
            vec![
                UnifiedChunk::text(model, render_execution(&command, &outcome))
                    .with_role(Role::Assistant),
                UnifiedChunk::finish(model, FinishReason::Stop),
            ]
        }
        KnownTool::Other(invocation) => {
            debug!("Forwarding unrecognized tool: {}", invocation.name);
            let args = invocation.arguments_json();
            vec![
                UnifiedChunk::tool_call_start(model, invocation.name).with_role(Role::Assistant),
                UnifiedChunk::tool_call_args(model, args),
                UnifiedChunk::finish(model, FinishReason::ToolCall),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::testing::MockExecutor;

    #[tokio::test]
    async fn test_bash_success_two_chunk_shape() {
        let executor = MockExecutor::new();
        executor.queue_stdout("On branch main\n");

        let chunks = dispatch(ToolInvocation::bash("git status"), "m", &executor).await;
        assert_eq!(chunks.len(), 2);

        let text = chunks[0].text_delta.as_deref().unwrap();
        assert!(text.contains("$ git status"));
        assert!(text.contains("On branch main"));
        assert_eq!(chunks[0].role, Some(Role::Assistant));
        assert_eq!(chunks[1].finish_reason, Some(FinishReason::Stop));
        assert_eq!(executor.last_command().as_deref(), Some("git status"));
    }

    #[tokio::test]
    async fn test_bash_failure_reported_as_content_with_stop() {
        let executor = MockExecutor::new();
        executor.queue_error("fatal: not a git repository");

        let chunks = dispatch(ToolInvocation::bash("git status"), "m", &executor).await;
        let text = chunks[0].text_delta.as_deref().unwrap();
        assert!(text.starts_with("```\n"));
        assert!(text.contains("fatal: not a git repository"));
        // Execution failure still terminates with stop, never tool_call.
        assert_eq!(chunks[1].finish_reason, Some(FinishReason::Stop));
    }

    #[tokio::test]
    async fn test_other_tool_forwarded_without_execution() {
        let executor = MockExecutor::new();
        let invocation = ToolInvocation::new("WebSearch")
            .with_argument("query", serde_json::Value::String("rust".into()));

        let chunks = dispatch(invocation, "m", &executor).await;
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks[0].tool_call_start.as_ref().map(|s| s.name.as_str()),
            Some("WebSearch")
        );
        assert_eq!(chunks[0].role, Some(Role::Assistant));
        let args: serde_json::Value =
            serde_json::from_str(chunks[1].tool_call_args_delta.as_deref().unwrap()).unwrap();
        assert_eq!(args["query"], "rust");
        assert_eq!(chunks[2].finish_reason, Some(FinishReason::ToolCall));
        // Nothing executed.
        assert_eq!(executor.command_count(), 0);
    }

    #[tokio::test]
    async fn test_mutual_exclusion_per_chunk() {
        let executor = MockExecutor::new();
        executor.queue_stdout("ok");
        let mut all = dispatch(ToolInvocation::bash("true"), "m", &executor).await;
        all.extend(
            dispatch(
                ToolInvocation::new("Other"),
                "m",
                &executor,
            )
            .await,
        );
        for chunk in &all {
            assert!(!(chunk.text_delta.is_some() && chunk.is_tool_call()));
        }
    }
}
