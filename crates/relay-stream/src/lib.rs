//! relay-stream: turn orchestration and tool dispatch for chat-relay.
//!
//! Composes the wire layer and the recovery engine: bytes in, unified
//! chunks out. Buffers the whole turn (a recovered tool call must replace
//! the text that announced it), runs recovery at end-of-turn, and either
//! releases the buffered text or forwards the dispatcher's output.

pub mod dispatch;
pub mod exec;
pub mod orchestrator;

pub use dispatch::{dispatch, render_execution};
pub use exec::ShellExecutor;
pub use orchestrator::{
    response_stream, ByteStream, ChunkStream, Phase, StreamOrchestrator, TurnEngine, TurnOutcome,
};
