//! Explicit invocation block parser.
//!
//! Some models are prompted to emit a structured block instead of a native
//! tool call:
//!
//! ```text
//! <tool_call>
//! name: Bash
//! command: git status
//! </tool_call>
//! ```
//!
//! The body is line-oriented `key: value` pairs. `name` is mandatory;
//! every other key becomes an argument. Values are attempted as JSON so
//! `count: 3` stays a number, falling back to the raw string.

use serde_json::Value;
use tracing::debug;

use relay_core::ToolInvocation;

pub const BLOCK_START: &str = "<tool_call>";
pub const BLOCK_END: &str = "</tool_call>";

/// True if the text carries a complete block (both markers, in order).
pub fn block_present(text: &str) -> bool {
    match text.find(BLOCK_START) {
        Some(start) => text[start + BLOCK_START.len()..].contains(BLOCK_END),
        None => false,
    }
}

/// Parse the first well-formed block. Returns `None` when the block is
/// malformed (no `name` key) — the caller then passes the raw text
/// through as ordinary content.
pub fn parse_block(text: &str) -> Option<ToolInvocation> {
    let start = text.find(BLOCK_START)? + BLOCK_START.len();
    let end = start + text[start..].find(BLOCK_END)?;
    let body = &text[start..end];

    let mut name: Option<String> = None;
    let mut invocation_args = serde_json::Map::new();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, raw_value)) = line.split_once(':') else {
            debug!("Ignoring block line without key: {}", line);
            continue;
        };
        let key = key.trim();
        let raw_value = raw_value.trim();

        if key == "name" {
            name = Some(raw_value.to_string());
        } else {
            let value = serde_json::from_str::<Value>(raw_value)
                .unwrap_or_else(|_| Value::String(raw_value.to_string()));
            invocation_args.insert(key.to_string(), value);
        }
    }

    let name = match name {
        Some(name) if !name.is_empty() => name,
        _ => {
            debug!("Invocation block present but no name; passing text through");
            return None;
        }
    };

    Some(ToolInvocation {
        name,
        arguments: invocation_args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_block() {
        let text = "Sure.\n<tool_call>\nname: Bash\ncommand: git status\n</tool_call>\n";
        let invocation = parse_block(text).unwrap();
        assert_eq!(invocation.name, "Bash");
        assert_eq!(
            invocation.arguments.get("command"),
            Some(&Value::String("git status".into()))
        );
    }

    #[test]
    fn test_json_values_parsed_with_raw_fallback() {
        let text = "<tool_call>\nname: Counter\ncount: 3\nflag: true\npath: src/main.rs\n</tool_call>";
        let invocation = parse_block(text).unwrap();
        assert_eq!(invocation.arguments.get("count"), Some(&Value::from(3)));
        assert_eq!(invocation.arguments.get("flag"), Some(&Value::Bool(true)));
        // `src/main.rs` is not valid JSON, so it stays a raw string.
        assert_eq!(
            invocation.arguments.get("path"),
            Some(&Value::String("src/main.rs".into()))
        );
    }

    #[test]
    fn test_missing_name_degrades_to_none() {
        let text = "<tool_call>\ncommand: rm -rf /\n</tool_call>";
        assert_eq!(parse_block(text), None);
    }

    #[test]
    fn test_block_presence() {
        assert!(block_present("<tool_call>name: x</tool_call>"));
        assert!(!block_present("<tool_call> unterminated"));
        assert!(!block_present("no block at all"));
    }

    #[test]
    fn test_value_may_contain_colons() {
        let text = "<tool_call>\nname: Bash\ncommand: echo a:b:c\n</tool_call>";
        let invocation = parse_block(text).unwrap();
        assert_eq!(
            invocation.arguments.get("command"),
            Some(&Value::String("echo a:b:c".into()))
        );
    }
}
