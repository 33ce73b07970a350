//! Chunk normalizer: provider-native events -> `UnifiedChunk`.
//!
//! No provider-specific field survives past this boundary. The role is
//! attached exactly once per turn, tracked through an explicit state
//! struct rather than a captured flag so the turn logic is testable
//! without I/O.

use relay_core::{FinishReason, Role, UnifiedChunk};

use crate::event::ProviderEvent;

/// Per-turn normalization state. Starts unset; becomes set after the
/// first content chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnState {
    pub role_sent: bool,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the assistant role to a chunk if no chunk of this turn has
    /// carried it yet.
    pub fn stamp_role(&mut self, chunk: UnifiedChunk) -> UnifiedChunk {
        if self.role_sent {
            chunk
        } else {
            self.role_sent = true;
            chunk.with_role(Role::Assistant)
        }
    }
}

/// Map one provider event onto a unified chunk. Events carrying neither
/// content nor a final marker produce nothing.
pub fn normalize(
    event: ProviderEvent,
    model: &str,
    state: &mut TurnState,
) -> Option<UnifiedChunk> {
    if event.is_empty() {
        return None;
    }

    let mut chunk = match event.content {
        Some(fragment) => {
            let chunk = UnifiedChunk::text(model, fragment);
            state.stamp_role(chunk)
        }
        None => UnifiedChunk::finish(model, FinishReason::Stop),
    };

    if event.is_final && chunk.finish_reason.is_none() {
        chunk = chunk.with_finish(FinishReason::Stop);
    }

    Some(chunk)
}
