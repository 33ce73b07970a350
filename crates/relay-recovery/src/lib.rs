//! relay-recovery: tool-invocation recovery from free-form model output.
//!
//! Providers without native tool calling describe intent in prose ("I'll
//! run `git status`"). This crate inspects the fully accumulated text of a
//! completed turn and synthesizes the structured invocation a well-behaved
//! provider would have emitted. Layered, first match wins:
//!
//! 1. an explicit `<tool_call>` block;
//! 2. the ordered natural-language pattern table;
//! 3. bare git-subcommand mentions inside a `<think>` section;
//! 4. nothing — the text is ordinary content.
//!
//! Known limitation, carried deliberately: the heuristics can misfire on
//! text that merely discusses a command ("you could run git status to
//! check"). There is no confidence scoring.

pub mod explicit;
pub mod patterns;

use tracing::debug;

use relay_core::ToolInvocation;

pub use patterns::DEFAULT_COMMIT_MESSAGE;

const THINK_START: &str = "<think>";
const THINK_END: &str = "</think>";

/// Recover a tool invocation from the accumulated text of one turn.
///
/// Returns `None` when the text should pass through as ordinary content —
/// including the case where an explicit block is present but malformed,
/// which degrades to passthrough rather than falling to the heuristics.
pub fn recover(text: &str) -> Option<ToolInvocation> {
    if explicit::block_present(text) {
        let invocation = explicit::parse_block(text);
        if let Some(ref invocation) = invocation {
            debug!("Recovered explicit invocation: {}", invocation.name);
        }
        return invocation;
    }

    for pattern in patterns::PATTERNS {
        if let Some(command) = (pattern.extract)(text) {
            debug!("Pattern '{}' recovered command: {}", pattern.name, command);
            return Some(ToolInvocation::bash(command));
        }
    }

    if let Some(command) = scan_reasoning_block(text) {
        debug!("Reasoning-block fallback recovered command: {}", command);
        return Some(ToolInvocation::bash(command));
    }

    None
}

/// Re-scan a delimited reasoning section for bare mentions of the four
/// supported git subcommands. Substring containment only, with the same
/// default arguments as the pattern table.
fn scan_reasoning_block(text: &str) -> Option<String> {
    let start = text.find(THINK_START)? + THINK_START.len();
    let end = start + text[start..].find(THINK_END)?;
    let section = &text[start..end];

    if section.contains("status") {
        Some("git status".to_string())
    } else if section.contains("commit") {
        Some(format!("git commit -m \"{}\"", DEFAULT_COMMIT_MESSAGE))
    } else if section.contains("push") {
        Some("git push".to_string())
    } else if section.contains("add") {
        Some("git add .".to_string())
    } else {
        None
    }
}
