//! Response sanitation and resilient JSON parsing.
//!
//! Model output is untrusted text that usually contains JSON. Sanitation
//! strips markdown wrapping and trims to the outermost object; the
//! resilient parser then tries a fixed sequence of syntactic repairs,
//! re-parsing after each. Repairs are bounded and ordered — if the last
//! one fails the response is declared unrecoverable, never guessed at.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());

static MISSING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([}\]"])\s*\n\s*(["{\[])"#).unwrap());

static ADJACENT_CLOSER_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([}\]])\s*([{\[])").unwrap());

static UNQUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").unwrap());

static SINGLE_QUOTED_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([:,{\[]\s*)'([^']*)'").unwrap());

/// Strips markdown fences and commentary around the JSON payload.
/// Returns the slice from the first `{` to the last `}` when both exist,
/// otherwise the trimmed input.
pub fn sanitize_response(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    let text = text.trim();

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// Parses model output into JSON, applying repairs in a fixed order until
/// one parse succeeds. Returns `None` when no bounded repair recovers a
/// valid document.
pub fn parse_resilient(raw: &str) -> Option<Value> {
    let sanitized = sanitize_response(raw);
    if sanitized.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str(&sanitized) {
        return Some(value);
    }

    // Repairs accumulate: each stage works on the previous stage's output.
    let mut text = sanitized;
    for (name, repair) in REPAIRS {
        text = repair(&text);
        match serde_json::from_str(&text) {
            Ok(value) => {
                debug!(repair = name, "response parsed after repair");
                return Some(value);
            }
            Err(_) => continue,
        }
    }

    warn!("model response not recoverable as JSON");
    None
}

type Repair = fn(&str) -> String;

const REPAIRS: [(&str, Repair); 6] = [
    ("strip_trailing_commas", strip_trailing_commas),
    ("escape_control_characters", escape_control_characters),
    ("insert_missing_commas", insert_missing_commas),
    ("quote_unquoted_keys", quote_unquoted_keys),
    ("rewrite_single_quotes", rewrite_single_quotes),
    ("balance_structure", balance_structure),
];

fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

fn insert_missing_commas(text: &str) -> String {
    let text = ADJACENT_CLOSER_OPENER.replace_all(text, "$1,$2");
    MISSING_COMMA.replace_all(&text, "$1,\n$2").into_owned()
}

/// Escapes literal control characters the model left inside string
/// literals (raw newlines and tabs are the common offenders).
fn escape_control_characters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(ch);
                continue;
            }
            match ch {
                '\\' => {
                    escaped = true;
                    out.push(ch);
                }
                '"' => {
                    in_string = false;
                    out.push(ch);
                }
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => {}
                c if c.is_control() => {}
                c => out.push(c),
            }
        } else {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
        }
    }
    out
}

fn quote_unquoted_keys(text: &str) -> String {
    UNQUOTED_KEY.replace_all(text, "$1\"$2\":").into_owned()
}

fn rewrite_single_quotes(text: &str) -> String {
    SINGLE_QUOTED_VALUE
        .replace_all(text, "$1\"$2\"")
        .into_owned()
}

/// Closes structures a truncated response left open: terminates an
/// unterminated string, drops a trailing partial token (along with any
/// orphaned key it belonged to), then appends the closers the open stack
/// still needs.
fn balance_structure(text: &str) -> String {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&ch) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut out = text.trim_end().to_string();
    if in_string {
        out.push('"');
    } else {
        drop_partial_scalar(&mut out);
    }
    strip_dangling_separator(&mut out);
    for closer in stack.into_iter().rev() {
        out.push(closer);
    }
    out
}

/// Removes a trailing bare token that cannot be a complete JSON scalar:
/// a number cut off mid-write (`12.`, `3e`) or a half-written literal
/// (`tru`). Complete tokens stay.
fn drop_partial_scalar(out: &mut String) {
    let boundary = out
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace() || "{}[],:\"".contains(*c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let token = &out[boundary..];
    if !token.is_empty() && is_partial_scalar(token) {
        out.truncate(boundary);
    }
}

fn is_partial_scalar(token: &str) -> bool {
    if matches!(token, "true" | "false" | "null") {
        return false;
    }
    if ["true", "false", "null"].iter().any(|lit| lit.starts_with(token)) {
        return true;
    }
    token.chars().all(|c| c.is_ascii_digit() || "+-.eE".contains(c))
        && token.ends_with(|c: char| !c.is_ascii_digit())
}

/// A dangling comma or colon before the appended closers would re-break
/// the document; a dangling colon takes its orphaned key with it.
fn strip_dangling_separator(out: &mut String) {
    loop {
        out.truncate(out.trim_end().len());
        if out.ends_with(',') {
            out.pop();
        } else if out.ends_with(':') {
            out.pop();
            out.truncate(out.trim_end().len());
            if out.ends_with('"') {
                drop_trailing_string(out);
            }
        } else {
            break;
        }
    }
}

fn drop_trailing_string(out: &mut String) {
    out.pop();
    while let Some(c) = out.pop() {
        if c == '"' && !out.ends_with('\\') {
            break;
        }
    }
}
