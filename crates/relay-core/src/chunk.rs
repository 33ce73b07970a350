use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only role this core ever emits: output chunks always speak for the
/// assistant side of the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    ToolCall,
}

/// Signals that a new tool invocation has begun on the output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallStart {
    pub name: String,
}

/// One increment of a completion turn, independent of the upstream
/// provider. Consumers must treat `text_delta` and the tool-call fields as
/// mutually exclusive, and concatenate `tool_call_args_delta` fragments in
/// arrival order to reconstruct the JSON argument string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedChunk {
    /// Opaque, unique per chunk; used only for observability.
    pub id: String,
    /// Unix timestamp in seconds.
    pub created_at: u64,
    /// The resolved model identifier.
    pub model: String,
    /// Present only on the first chunk of a turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_delta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_start: Option<ToolCallStart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_args_delta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

static CHUNK_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn next_chunk_id() -> String {
    let seq = CHUNK_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("chunk-{:x}-{:x}", unix_seconds(), seq)
}

impl UnifiedChunk {
    fn empty(model: impl Into<String>) -> Self {
        Self {
            id: next_chunk_id(),
            created_at: unix_seconds(),
            model: model.into(),
            role: None,
            text_delta: None,
            tool_call_start: None,
            tool_call_args_delta: None,
            finish_reason: None,
        }
    }

    pub fn text(model: impl Into<String>, delta: impl Into<String>) -> Self {
        Self {
            text_delta: Some(delta.into()),
            ..Self::empty(model)
        }
    }

    pub fn tool_call_start(model: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tool_call_start: Some(ToolCallStart { name: name.into() }),
            ..Self::empty(model)
        }
    }

    pub fn tool_call_args(model: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            tool_call_args_delta: Some(args.into()),
            ..Self::empty(model)
        }
    }

    pub fn finish(model: impl Into<String>, reason: FinishReason) -> Self {
        Self {
            finish_reason: Some(reason),
            ..Self::empty(model)
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_finish(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    /// True if this chunk carries any tool-call field.
    pub fn is_tool_call(&self) -> bool {
        self.tool_call_start.is_some() || self.tool_call_args_delta.is_some()
    }
}

/// A resolved tool call recovered from (or emitted by) a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: serde_json::Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: serde_json::Map::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }

    /// Shorthand for the one dispatched tool: `Bash {command}`.
    pub fn bash(command: impl Into<String>) -> Self {
        Self::new("Bash").with_argument("command", Value::String(command.into()))
    }

    /// The JSON-encoded argument object, as sent in `tool_call_args_delta`.
    pub fn arguments_json(&self) -> String {
        serde_json::to_string(&self.arguments).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Tagged view over the closed set of tools this core knows how to
/// dispatch. Anything unrecognized is forwarded uninterpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum KnownTool {
    Bash { command: String },
    Other(ToolInvocation),
}

impl From<ToolInvocation> for KnownTool {
    fn from(invocation: ToolInvocation) -> Self {
        if invocation.name == "Bash" {
            if let Some(Value::String(command)) = invocation.arguments.get("command") {
                return KnownTool::Bash {
                    command: command.clone(),
                };
            }
        }
        KnownTool::Other(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_ids_unique() {
        let a = UnifiedChunk::text("m", "x");
        let b = UnifiedChunk::text("m", "y");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serialization_field_names() {
        let chunk = UnifiedChunk::text("test-model", "hello")
            .with_role(Role::Assistant)
            .with_finish(FinishReason::Stop);
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["textDelta"], "hello");
        assert_eq!(json["finishReason"], "stop");
        assert!(json.get("toolCallStart").is_none());
    }

    #[test]
    fn test_finish_reason_tool_call_wire_name() {
        let chunk = UnifiedChunk::finish("m", FinishReason::ToolCall);
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["finishReason"], "tool_call");
    }

    #[test]
    fn test_known_tool_bash() {
        let invocation = ToolInvocation::bash("git status");
        match KnownTool::from(invocation) {
            KnownTool::Bash { command } => assert_eq!(command, "git status"),
            other => panic!("expected Bash, got {:?}", other),
        }
    }

    #[test]
    fn test_known_tool_fallback() {
        let invocation = ToolInvocation::new("WebSearch")
            .with_argument("query", Value::String("rust".into()));
        assert!(matches!(KnownTool::from(invocation), KnownTool::Other(_)));
    }

    #[test]
    fn test_bash_without_string_command_is_other() {
        let invocation =
            ToolInvocation::new("Bash").with_argument("command", Value::Bool(true));
        assert!(matches!(KnownTool::from(invocation), KnownTool::Other(_)));
    }
}
