//! The shared natural-language command pattern table.
//!
//! One ordered, declarative list of matcher/extractor pairs, consumed by
//! `recover()` for both the streaming and non-streaming paths. The first
//! pattern in table order that matches wins; patterns are tried in this
//! fixed priority order, not by specificity. The bare-verb capture is the
//! greediest, so the git detectors outrank it.

use std::sync::LazyLock;

use regex::Regex;

/// Default commit message when the text names no `-m` message.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Changes from Claude Code session";

/// One entry of the pattern table: a name for logging plus an extractor
/// that returns the recovered shell command on a match.
pub struct CommandPattern {
    pub name: &'static str,
    pub extract: fn(&str) -> Option<String>,
}

/// The table, in priority order.
pub static PATTERNS: &[CommandPattern] = &[
    CommandPattern {
        name: "quoted-after-verb",
        extract: extract_quoted_after_verb,
    },
    CommandPattern {
        name: "git-status",
        extract: extract_git_status,
    },
    CommandPattern {
        name: "git-add",
        extract: extract_git_add,
    },
    CommandPattern {
        name: "git-commit",
        extract: extract_git_commit,
    },
    CommandPattern {
        name: "git-push",
        extract: extract_git_push,
    },
    CommandPattern {
        name: "bare-after-verb",
        extract: extract_bare_after_verb,
    },
];

/// Prose words that must not be mistaken for a path or a git ref.
const STOPWORDS: &[&str] = &[
    "to", "the", "a", "an", "all", "any", "my", "our", "your", "these", "those", "them", "it",
    "and", "or", "for", "so", "then", "first", "now", "next", "everything", "changes", "files",
    "with", "before", "after", "command", "this", "that",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token.to_ascii_lowercase().as_str())
}

/// Strip sentence punctuation that clings to a captured token.
fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '!' | '?' | ')' | '(' | '"' | '\''))
}

static QUOTED_AFTER_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:run(?:ning)?|execut(?:e|ing))\b[^`"'\n]*[`"']([^`"'\n]+)[`"']"#)
        .expect("quoted-after-verb regex")
});

fn extract_quoted_after_verb(text: &str) -> Option<String> {
    let captured = QUOTED_AFTER_VERB.captures(text)?.get(1)?.as_str().trim();
    if captured.is_empty() {
        return None;
    }
    Some(captured.to_string())
}

static GIT_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgit\s+status\b").expect("git-status regex"));

fn extract_git_status(text: &str) -> Option<String> {
    GIT_STATUS.is_match(text).then(|| "git status".to_string())
}

// The path capture stops at anything that cannot belong to a path, so a
// token adjoining markup ("src/lib.rs</think>") recovers cleanly.
static GIT_ADD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgit\s+add\b(?:\s+([\w./~*-]+))?").expect("git-add regex"));

fn extract_git_add(text: &str) -> Option<String> {
    let captures = GIT_ADD.captures(text)?;
    let path = captures
        .get(1)
        .map(|m| clean_token(m.as_str()))
        .filter(|t| !t.is_empty() && !is_stopword(t));
    Some(match path {
        Some(path) => format!("git add {}", path),
        // Absent a path, stage all changes.
        None => "git add .".to_string(),
    })
}

static GIT_COMMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgit\s+commit\b").expect("git-commit regex"));

static COMMIT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"-m\s+(?:"([^"]+)"|'([^']+)')"#).expect("commit-message regex")
});

fn extract_git_commit(text: &str) -> Option<String> {
    if !GIT_COMMIT.is_match(text) {
        return None;
    }
    let message = COMMIT_MESSAGE
        .captures(text)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str())
        .unwrap_or(DEFAULT_COMMIT_MESSAGE);
    Some(format!("git commit -m \"{}\"", message))
}

static GIT_PUSH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bgit\s+push\b(.*)").expect("git-push regex"));

static REF_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:--?[\w-]+|[\w@][\w@./:-]*)$").expect("ref-token regex"));

fn extract_git_push(text: &str) -> Option<String> {
    let rest = GIT_PUSH.captures(text)?.get(1).map_or("", |m| m.as_str());
    let mut command = String::from("git push");
    for token in rest.split_whitespace().take(3) {
        let token = clean_token(token);
        if token.is_empty() || is_stopword(token) || !REF_TOKEN.is_match(token) {
            break;
        }
        command.push(' ');
        command.push_str(token);
    }
    Some(command)
}

static BARE_AFTER_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:run|execute)\b\s+((?:git|ls|cat|grep|find|echo|pwd|mkdir|touch|rm|cp|mv|npm|yarn|cargo|python3?|pip|make|docker|curl)\b[^\n.?!]*)",
    )
    .expect("bare-after-verb regex")
});

fn extract_bare_after_verb(text: &str) -> Option<String> {
    let captured = BARE_AFTER_VERB.captures(text)?.get(1)?.as_str().trim();
    if captured.is_empty() {
        return None;
    }
    Some(captured.to_string())
}
