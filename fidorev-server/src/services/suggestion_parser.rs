//! Tolerant parsing of raw model output into a structured suggestion
//!
//! Models are asked for a JSON object with the keys `Action`,
//! `Updated Brand`, `Updated Category`, `Updated Description`, `Reason`,
//! but in practice return fenced JSON, bare JSON, or loose `Key: value`
//! lines. Parsing must never fail the review session: anything
//! unrecognizable degrades to a default `Keep` suggestion whose reason
//! records what went wrong.

use serde_json::Value;

use crate::models::{ReviewAction, Suggestion};

const KEY_ACTION: &str = "Action";
const KEY_BRAND: &str = "Updated Brand";
const KEY_CATEGORY: &str = "Updated Category";
const KEY_DESCRIPTION: &str = "Updated Description";
const KEY_REASON: &str = "Reason";

/// Parse raw model output. Infallible by contract: structured JSON first,
/// then line-oriented `Key: value` fallback, then the default suggestion.
pub fn parse(raw: &str) -> Suggestion {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Suggestion::unavailable("empty model response");
    }

    if let Some(suggestion) = parse_json(trimmed) {
        return suggestion;
    }

    if let Some(suggestion) = parse_lines(trimmed) {
        return suggestion;
    }

    let preview: String = trimmed.chars().take(80).collect();
    Suggestion::unavailable(format!("unparseable model response: {}", preview))
}

/// Strict path: a JSON object, possibly wrapped in a Markdown code fence
/// or surrounded by prose.
fn parse_json(raw: &str) -> Option<Suggestion> {
    let candidate = extract_json_object(raw)?;
    let value: Value = serde_json::from_str(candidate).ok()?;
    let object = value.as_object()?;

    let field = |key: &str| -> String {
        match object.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    };

    Some(Suggestion {
        action: ReviewAction::normalize(&field(KEY_ACTION)),
        brand: field(KEY_BRAND),
        category: field(KEY_CATEGORY),
        description: field(KEY_DESCRIPTION),
        reason: field(KEY_REASON),
    })
}

/// Slice out the outermost `{ ... }` span, if any.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        Some(&raw[start..=end])
    } else {
        None
    }
}

/// Fallback path: scan for `Key: value` lines, each key looked up
/// independently. A value ends at its line boundary; absent keys read as
/// empty. Returns `None` when no known key appears at all.
fn parse_lines(raw: &str) -> Option<Suggestion> {
    let find = |key: &str| -> Option<String> {
        for line in raw.lines() {
            let line = line.trim().trim_start_matches(['-', '*']).trim_start();
            if let Some((candidate, rest)) = line.split_once(':') {
                if candidate.trim().eq_ignore_ascii_case(key) {
                    return Some(rest.trim().to_string());
                }
            }
        }
        None
    };

    let action = find(KEY_ACTION);
    let brand = find(KEY_BRAND);
    let category = find(KEY_CATEGORY);
    let description = find(KEY_DESCRIPTION);
    let reason = find(KEY_REASON);

    if action.is_none()
        && brand.is_none()
        && category.is_none()
        && description.is_none()
        && reason.is_none()
    {
        return None;
    }

    Some(Suggestion {
        action: ReviewAction::normalize(&action.unwrap_or_default()),
        brand: brand.unwrap_or_default(),
        category: category.unwrap_or_default(),
        description: description.unwrap_or_default(),
        reason: reason.unwrap_or_default(),
    })
}
