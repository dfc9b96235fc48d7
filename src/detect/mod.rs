//! Heuristic format detection
//!
//! Purely syntactic and deterministic: the same input always yields the
//! same verdict. Checks run from the most to the least distinctive
//! shape (JSON, XML, TOML, YAML, CSV); the first match wins. Confidence
//! reflects how conclusive the matched evidence is, not a probability.

use crate::format::Format;

/// Verdict of a detection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// `None` when no heuristic matched
    pub format: Option<Format>,
    /// 0.0 (no evidence) to 1.0 (conclusive)
    pub confidence: f32,
}

impl Detection {
    fn unknown() -> Self {
        Self {
            format: None,
            confidence: 0.0,
        }
    }

    fn of(format: Format, confidence: f32) -> Self {
        Self {
            format: Some(format),
            confidence,
        }
    }
}

/// Guess the format of `text` from its syntax
pub fn detect(text: &str) -> Detection {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Detection::unknown();
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        // A strict parse settles it outright
        if serde_json::from_str::<serde::de::IgnoredAny>(trimmed).is_ok() {
            return Detection::of(Format::Json, 0.95);
        }
        // `{` only opens the lenient-JSON family; `[` also opens a TOML
        // section header, so the line heuristics arbitrate below
        if trimmed.starts_with('{') {
            return Detection::of(Format::Json, 0.6);
        }
    }

    if trimmed.starts_with("<?xml") {
        return Detection::of(Format::Xml, 0.9);
    }
    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        return Detection::of(Format::Xml, 0.8);
    }

    let lines: Vec<&str> = trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    if lines.is_empty() {
        return Detection::unknown();
    }

    if looks_like_toml(&lines) {
        return Detection::of(Format::Toml, 0.75);
    }
    if trimmed.starts_with('[') {
        // Bracket-led but neither strict JSON nor a TOML header:
        // lenient-JSON array
        return Detection::of(Format::Json, 0.6);
    }
    if looks_like_yaml(&lines) {
        return Detection::of(Format::Yaml, 0.7);
    }
    if let Some(confidence) = csv_confidence(trimmed) {
        return Detection::of(Format::Csv, confidence);
    }

    Detection::unknown()
}

/// `[section]` headers or a majority of `key = value` lines
fn looks_like_toml(lines: &[&str]) -> bool {
    let mut assignments = 0usize;
    for line in lines {
        if is_toml_header(line) {
            return true;
        }
        if is_toml_assignment(line) {
            assignments += 1;
        }
    }
    assignments * 2 > lines.len()
}

/// `[key.path]` or `[[key.path]]` with key-shaped content only, so a
/// bracketed JSON array never passes as a section header
fn is_toml_header(line: &str) -> bool {
    let inner = line
        .strip_prefix("[[")
        .and_then(|rest| rest.strip_suffix("]]"))
        .or_else(|| line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')));
    match inner {
        Some(inner) => {
            let inner = inner.trim();
            !inner.is_empty()
                && inner.chars().all(|c| {
                    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '"' | '\'' | ' ')
                })
        }
        None => false,
    }
}

fn is_toml_assignment(line: &str) -> bool {
    match line.split_once('=') {
        Some((key, value)) => {
            let key = key.trim();
            !key.is_empty()
                && !value.trim().is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '"')
        }
        None => false,
    }
}

/// Mapping (`key: value`) or sequence (`- item`) lines on top
fn looks_like_yaml(lines: &[&str]) -> bool {
    let mut evidence = 0usize;
    for line in lines {
        if line.starts_with("- ") || *line == "-" {
            evidence += 1;
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            if !key.trim().is_empty() && (value.is_empty() || value.starts_with(' ')) {
                evidence += 1;
            }
        }
    }
    evidence * 2 > lines.len()
}

/// Consistent comma-delimited records
fn csv_confidence(text: &str) -> Option<f32> {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    let first_commas = lines.first()?.matches(',').count();
    if first_commas == 0 {
        return None;
    }
    if lines.len() == 1 {
        return Some(0.5);
    }
    if lines
        .iter()
        .all(|line| line.matches(',').count() == first_commas)
    {
        Some(0.7)
    } else {
        None
    }
}
