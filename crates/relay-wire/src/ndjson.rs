//! NDJSON wire parser: one JSON object per line, Ollama-shaped.
//!
//! Expected frame: `{"model": ..., "message": {"content": ...}, "done": bool}`.
//! A line that fails to parse is skipped and logged — a transient malformed
//! frame must not abort an otherwise-healthy turn.

use serde::Deserialize;
use tracing::debug;

use crate::event::ProviderEvent;

#[derive(Debug, Deserialize)]
struct NdjsonFrame {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<NdjsonMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct NdjsonMessage {
    #[serde(default)]
    content: String,
}

/// Parse one NDJSON line. Blank and malformed lines yield `None`.
pub fn parse_line(line: &str) -> Option<ProviderEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let frame: NdjsonFrame = match serde_json::from_str(line) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("Skipping malformed NDJSON frame: {} - line: {}", e, line);
            return None;
        }
    };

    let content = frame
        .message
        .map(|m| m.content)
        .filter(|c| !c.is_empty());

    Some(ProviderEvent {
        content,
        is_final: frame.done,
        model: frame.model,
    })
}
