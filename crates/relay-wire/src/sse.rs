//! Event-stream wire parser: OpenAI-compatible SSE, `data: <json>` lines.
//!
//! A line is either the `[DONE]` sentinel, a `data:` line carrying one
//! chat-completion chunk, or noise (`event:` lines, comments, keep-alive
//! blanks) which is ignored. Malformed payloads are skipped and logged,
//! same policy as the NDJSON parser.

use serde::Deserialize;
use tracing::debug;

use crate::event::ProviderEvent;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct SseFrame {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<SseChoice>,
}

#[derive(Debug, Deserialize)]
struct SseChoice {
    #[serde(default)]
    delta: SseDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SseDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Parse one event-stream line. Non-data and malformed lines yield `None`.
pub fn parse_line(line: &str) -> Option<ProviderEvent> {
    let line = line.trim();
    let data = line.strip_prefix(DATA_PREFIX)?.trim_start();

    if data == DONE_SENTINEL {
        return Some(ProviderEvent::final_marker());
    }

    let frame: SseFrame = match serde_json::from_str(data) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("Skipping malformed SSE frame: {} - data: {}", e, data);
            return None;
        }
    };

    let mut event = ProviderEvent {
        model: frame.model,
        ..ProviderEvent::default()
    };
    for choice in frame.choices {
        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                event.content = Some(match event.content.take() {
                    Some(mut acc) => {
                        acc.push_str(&content);
                        acc
                    }
                    None => content,
                });
            }
        }
        if choice.finish_reason.is_some() {
            event.is_final = true;
        }
    }
    Some(event)
}
