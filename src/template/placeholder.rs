//! Placeholder detection and generation for template text fields.
//!
//! Positional placeholders are never renumbered: deleting `{{2}}` from
//! `{{1}} {{2}} {{3}}` leaves the gap in place and the next generated token
//! is still `{{4}}`.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use super::types::{BodyExample, ParameterFormat};

lazy_static! {
    static ref POSITIONAL_PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*(\d+)\s*\}\}").expect("positional placeholder pattern");
    static ref ANY_PLACEHOLDER: Regex =
        Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern");
}

/// Highest positional index in `text` plus one (1 when there is none)
pub fn next_positional_index(text: &str) -> u64 {
    let max = POSITIONAL_PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    max.saturating_add(1)
}

/// Next placeholder token to insert into `text`.
///
/// Positional mode ignores `name`. Named mode requires a non-blank name and
/// returns `None` otherwise.
pub fn next_placeholder(text: &str, format: ParameterFormat, name: Option<&str>) -> Option<String> {
    match format {
        ParameterFormat::Positional => Some(format!("{{{{{}}}}}", next_positional_index(text))),
        ParameterFormat::Named => {
            let trimmed = name?.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(format!("{{{{{}}}}}", trimmed))
        }
    }
}

/// Distinct placeholder names in order of first appearance.
///
/// `{{ 1 }}` and `{{1}}` are the same placeholder.
pub fn placeholder_names(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ANY_PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

pub fn detect_placeholder_count(text: &str) -> usize {
    placeholder_names(text).len()
}

/// Generic example row sized to the placeholders in `text`, or `None`
/// when the text has no placeholders.
pub fn body_example_scaffold(text: &str) -> Option<BodyExample> {
    let count = detect_placeholder_count(text);
    if count == 0 {
        return None;
    }
    let row = (1..=count).map(|i| format!("Exemplo {}", i)).collect();
    Some(BodyExample::from_values(row))
}

pub fn is_positional_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_digit())
}

/// True if the text contains a positional placeholder such as `{{1}}`
pub fn has_positional_placeholder(text: &str) -> bool {
    POSITIONAL_PLACEHOLDER.is_match(text)
}

/// Remove every positional placeholder from `text`
pub fn strip_positional_placeholders(text: &str) -> String {
    POSITIONAL_PLACEHOLDER.replace_all(text, "").into_owned()
}

fn byte_offset(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// Insert `insert` at character position `pos` (clamped to the end).
/// Returns the new text and the cursor position after the insertion.
pub fn insert_at(text: &str, pos: usize, insert: &str) -> (String, usize) {
    let at = byte_offset(text, pos);
    let cursor = text[..at].chars().count() + insert.chars().count();
    (format!("{}{}{}", &text[..at], insert, &text[at..]), cursor)
}

/// Wrap the character range `start..end` with `left` and `right`.
/// Returns the new text and the selection covering the original range.
pub fn wrap_selection(
    text: &str,
    start: usize,
    end: usize,
    left: &str,
    right: &str,
) -> (String, usize, usize) {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let from = byte_offset(text, start);
    let to = byte_offset(text, end);
    let shift = left.chars().count();
    let start = text[..from].chars().count();
    let end = text[..to].chars().count();
    (
        format!("{}{}{}{}{}", &text[..from], left, &text[from..to], right, &text[to..]),
        start + shift,
        end + shift,
    )
}
