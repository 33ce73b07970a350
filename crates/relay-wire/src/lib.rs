//! relay-wire: Frame decoding and provider wire parsing for chat-relay
//!
//! This crate turns raw byte buffers from an upstream response body into
//! normalized `UnifiedChunk`s:
//! - `decoder`: incremental bytes -> complete lines
//! - `ndjson` / `sse`: one decoded line -> a provider-native event
//! - `normalize`: provider-native event -> `UnifiedChunk`

pub mod decoder;
pub mod event;
pub mod ndjson;
pub mod normalize;
pub mod sse;

pub use decoder::LineDecoder;
pub use event::ProviderEvent;
pub use normalize::{normalize, TurnState};

use relay_core::WireFormat;

/// Parse one decoded line with the parser for the given wire format.
///
/// Returns `None` for lines that carry no event: blank lines, non-data
/// SSE lines, and malformed frames (skipped by policy, logged at debug).
pub fn parse_line(format: WireFormat, line: &str) -> Option<ProviderEvent> {
    match format {
        WireFormat::Ndjson => ndjson::parse_line(line),
        WireFormat::EventStream => sse::parse_line(line),
    }
}
