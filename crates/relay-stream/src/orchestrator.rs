//! Stream orchestrator: one turn from raw bytes to unified chunks.
//!
//! Chunks normalized during the turn are buffered, never forwarded
//! immediately: recovery can only run once the whole turn is known, and a
//! recovered tool call must replace the buffered text rather than follow
//! it. A turn is processed by one sequential task that suspends only at
//! byte-stream reads; per-turn state lives in the engine, nothing crosses
//! turns.

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use relay_core::{
    CommandExecutor, Error, FinishReason, KnownTool, RelayConfig, Role, ToolInvocation,
    UnifiedChunk, WireFormat,
};
use relay_recovery::recover;
use relay_wire::{normalize, parse_line, LineDecoder, TurnState};

use crate::dispatch::dispatch;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<UnifiedChunk, Error>> + Send>>;

/// Adapt an already-opened HTTP response into the orchestrator's input.
/// The caller has verified the status; only the body matters here.
pub fn response_stream(response: reqwest::Response) -> ByteStream {
    Box::pin(
        response
            .bytes_stream()
            .map(|item| item.map_err(|e| Error::stream(e.to_string()))),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Buffering normalized chunks while accumulating text.
    Streaming,
    /// Final marker seen (or input exhausted); recovery is about to run.
    AwaitingFinal,
    /// A tool call was recovered; the dispatcher owns the rest of the turn.
    Recovering,
    /// No tool call; buffered text is being released.
    Emitting,
    /// Terminal. No further chunks are produced.
    Done,
}

/// Composed result of the non-streaming variant.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub model: String,
    pub content: String,
    pub tool_call: Option<ToolInvocation>,
    pub finish_reason: FinishReason,
}

/// Per-turn state machine. Feed it bytes; when the turn ends, `resolve`
/// produces the chunks to emit. All state is local to one invocation.
pub struct TurnEngine {
    format: WireFormat,
    model: String,
    decoder: LineDecoder,
    state: TurnState,
    buffered: Vec<UnifiedChunk>,
    text: String,
    phase: Phase,
}

impl TurnEngine {
    pub fn new(format: WireFormat, model: impl Into<String>) -> Self {
        Self {
            format,
            model: model.into(),
            decoder: LineDecoder::new(),
            state: TurnState::new(),
            buffered: Vec::new(),
            text: String::new(),
            phase: Phase::Streaming,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn accumulated_text(&self) -> &str {
        &self.text
    }

    pub fn buffered(&self) -> &[UnifiedChunk] {
        &self.buffered
    }

    /// Feed one raw buffer. Returns true once the provider has signaled
    /// completion; callers stop reading at that point.
    pub fn feed(&mut self, bytes: &[u8]) -> bool {
        if self.phase != Phase::Streaming {
            return true;
        }
        for line in self.decoder.feed(bytes) {
            if self.handle_line(&line) {
                return true;
            }
        }
        false
    }

    /// Mark end-of-input. Any buffered partial line is flushed first; a
    /// missing final marker is treated as an implicit one rather than an
    /// error.
    pub fn end_of_input(&mut self) {
        if self.phase != Phase::Streaming {
            return;
        }
        if let Some(line) = self.decoder.finish() {
            if self.handle_line(&line) {
                return;
            }
        }
        debug!("Input ended without final marker; treating as implicit final");
        self.phase = Phase::AwaitingFinal;
    }

    fn handle_line(&mut self, line: &str) -> bool {
        let Some(event) = parse_line(self.format, line) else {
            return false;
        };
        let is_final = event.is_final;
        if let Some(fragment) = event.content.as_deref() {
            self.text.push_str(fragment);
        }
        if let Some(chunk) = normalize(event, &self.model, &mut self.state) {
            self.buffered.push(chunk);
        }
        if is_final {
            debug!("Final marker seen after {} chars", self.text.len());
            self.phase = Phase::AwaitingFinal;
        }
        is_final
    }

    /// Run recovery and close the turn. Returns the chunks to emit plus
    /// the recovered invocation, if any. The buffered chunks are discarded
    /// when a tool call replaces them.
    pub async fn resolve(
        &mut self,
        executor: &dyn CommandExecutor,
    ) -> (Vec<UnifiedChunk>, Option<ToolInvocation>) {
        if self.phase == Phase::Done {
            return (Vec::new(), None);
        }
        if self.phase == Phase::Streaming {
            self.end_of_input();
        }

        let text = std::mem::take(&mut self.text);
        let chunks = match recover(&text) {
            Some(invocation) => {
                self.phase = Phase::Recovering;
                debug!(
                    "Recovered tool call '{}'; discarding {} buffered chunks",
                    invocation.name,
                    self.buffered.len()
                );
                self.buffered.clear();
                let chunks = dispatch(invocation.clone(), &self.model, executor).await;
                self.phase = Phase::Done;
                return (chunks, Some(invocation));
            }
            None => {
                self.phase = Phase::Emitting;
                self.buffered.clear();
                if text.is_empty() {
                    vec![UnifiedChunk::finish(&self.model, FinishReason::Stop)]
                } else {
                    vec![UnifiedChunk::text(&self.model, text)
                        .with_role(Role::Assistant)
                        .with_finish(FinishReason::Stop)]
                }
            }
        };
        self.phase = Phase::Done;
        (chunks, None)
    }
}

/// Orchestrates turns against one resolved provider configuration.
pub struct StreamOrchestrator {
    config: RelayConfig,
    executor: Arc<dyn CommandExecutor>,
}

impl StreamOrchestrator {
    pub fn new(config: RelayConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { config, executor }
    }

    /// Process one streaming turn. An absent body is the one fatal
    /// condition: nothing can be salvaged without a readable stream.
    pub fn stream_turn(&self, body: Option<ByteStream>) -> Result<ChunkStream, Error> {
        let mut stream = body.ok_or_else(|| Error::transport("response body missing"))?;

        let mut engine = TurnEngine::new(self.config.wire_format(), self.config.model.clone());
        let executor = Arc::clone(&self.executor);
        let (tx, rx) = mpsc::channel::<Result<UnifiedChunk, Error>>(100);

        tokio::spawn(async move {
            loop {
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        if engine.feed(&bytes) {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        // A read failure mid-turn is handled like an early
                        // end: flush what we have.
                        warn!("Byte stream error, treating as end of turn: {}", e);
                        break;
                    }
                    None => break,
                }
            }
            // Release the read side before any tool runs.
            drop(stream);

            engine.end_of_input();
            let (chunks, _) = engine.resolve(executor.as_ref()).await;
            for chunk in chunks {
                if tx.send(Ok(chunk)).await.is_err() {
                    return; // consumer went away
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)) as ChunkStream)
    }

    /// Non-streaming variant: same state machine over the whole body,
    /// composed into a single result object.
    pub async fn complete_turn(&self, body: Option<&[u8]>) -> Result<TurnOutcome, Error> {
        let body = body.ok_or_else(|| Error::transport("response body missing"))?;

        let mut engine = TurnEngine::new(self.config.wire_format(), self.config.model.clone());
        engine.feed(body);
        engine.end_of_input();
        let (chunks, tool_call) = engine.resolve(self.executor.as_ref()).await;

        let content: String = chunks
            .iter()
            .filter_map(|c| c.text_delta.as_deref())
            .collect();
        let finish_reason = match &tool_call {
            Some(invocation) if !matches!(KnownTool::from(invocation.clone()), KnownTool::Bash { .. }) => {
                FinishReason::ToolCall
            }
            _ => FinishReason::Stop,
        };

        Ok(TurnOutcome {
            model: self.config.model.clone(),
            content,
            tool_call,
            finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::testing::MockExecutor;

    fn ndjson_engine() -> TurnEngine {
        TurnEngine::new(WireFormat::Ndjson, "test-model")
    }

    #[test]
    fn test_phases_streaming_to_awaiting_final() {
        let mut engine = ndjson_engine();
        assert_eq!(engine.phase(), Phase::Streaming);
        let done = engine.feed(
            b"{\"message\":{\"content\":\"hi\"},\"done\":false}\n{\"done\":true}\n",
        );
        assert!(done);
        assert_eq!(engine.phase(), Phase::AwaitingFinal);
        assert_eq!(engine.accumulated_text(), "hi");
    }

    #[test]
    fn test_chunks_are_buffered_not_forwarded() {
        let mut engine = ndjson_engine();
        engine.feed(b"{\"message\":{\"content\":\"a\"},\"done\":false}\n");
        engine.feed(b"{\"message\":{\"content\":\"b\"},\"done\":false}\n");
        assert_eq!(engine.buffered().len(), 2);
        assert_eq!(engine.phase(), Phase::Streaming);
    }

    #[tokio::test]
    async fn test_resolve_plain_text_single_chunk() {
        let executor = MockExecutor::new();
        let mut engine = ndjson_engine();
        engine.feed(b"{\"message\":{\"content\":\"The decoder keeps bytes.\"},\"done\":true}\n");

        let (chunks, invocation) = engine.resolve(&executor).await;
        assert!(invocation.is_none());
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].text_delta.as_deref(),
            Some("The decoder keeps bytes.")
        );
        assert_eq!(chunks[0].role, Some(Role::Assistant));
        assert_eq!(chunks[0].finish_reason, Some(FinishReason::Stop));
        assert_eq!(engine.phase(), Phase::Done);
        assert_eq!(executor.command_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_replaces_text_with_tool_output() {
        let executor = MockExecutor::new();
        executor.queue_stdout("clean tree\n");
        let mut engine = ndjson_engine();
        engine.feed(b"{\"message\":{\"content\":\"I'll run `git status` now.\"},\"done\":true}\n");

        let (chunks, invocation) = engine.resolve(&executor).await;
        assert_eq!(invocation.unwrap().name, "Bash");
        // The announcing prose is gone; only the execution result remains.
        let text = chunks[0].text_delta.as_deref().unwrap();
        assert!(!text.contains("I'll run"));
        assert!(text.contains("clean tree"));
        assert_eq!(chunks.last().unwrap().finish_reason, Some(FinishReason::Stop));
    }

    #[tokio::test]
    async fn test_resolve_empty_turn() {
        let executor = MockExecutor::new();
        let mut engine = ndjson_engine();
        engine.feed(b"{\"done\":true}\n");
        let (chunks, _) = engine.resolve(&executor).await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].finish_reason, Some(FinishReason::Stop));
        assert_eq!(chunks[0].text_delta, None);
    }

    #[test]
    fn test_implicit_final_on_end_of_input() {
        let mut engine = ndjson_engine();
        engine.feed(b"{\"message\":{\"content\":\"partial turn\"},\"done\":false}\n");
        engine.end_of_input();
        assert_eq!(engine.phase(), Phase::AwaitingFinal);
        assert_eq!(engine.accumulated_text(), "partial turn");
    }
}
