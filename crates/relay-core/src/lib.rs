//! relay-core: Core types and collaborator traits for chat-relay
//!
//! This crate provides the unified chunk data model, the error type, and
//! the interfaces to the external collaborators (configuration and command
//! execution) shared by the rest of the workspace.

pub mod chunk;
pub mod config;
pub mod error;
pub mod executor;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use chunk::{
    FinishReason, KnownTool, Role, ToolCallStart, ToolInvocation, UnifiedChunk,
};
pub use config::{ProviderKind, RelayConfig, WireFormat};
pub use error::Error;
pub use executor::{CommandExecutor, ExecutionOutcome};

pub type Result<T> = std::result::Result<T, Error>;
