//! Format parsers
//!
//! Each submodule exposes `parse(text, options, deadline) -> Value` and
//! reports failures as positioned [`ParseError`]s wrapped in
//! [`ConversionError`]. The repair pass lives here: one bounded rewrite
//! of known-fixable syntax (trailing commas, single-quoted strings)
//! that the engine retries exactly once.

pub mod csv;
pub mod cursor;
pub mod json;
pub mod toml;
pub mod xml;
pub mod yaml;

use crate::error::{ParseError, Severity};
use crate::value::{Number, Value};

/// Best-effort scalar coercion shared by the text-shaped formats
///
/// Applied to XML text content, CSV cells and plain YAML scalars:
/// keywords and numeric literals become typed values, everything else
/// stays a string.
pub fn coerce_scalar(text: &str) -> Value {
    match text {
        "" => Value::String(String::new()),
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match Number::from_literal(text) {
            Some(n) => Value::Number(n),
            None => Value::String(text.to_string()),
        },
    }
}

/// Outcome of the bounded repair pass
#[derive(Debug)]
pub struct Repair {
    pub text: String,
    pub warnings: Vec<ParseError>,
}

/// Apply the enumerated syntax fixes, or return `None` when the input
/// needed none of them
///
/// Fixes, in one pass over the text: trailing commas before `}`/`]` are
/// dropped, and single-quoted strings are rewritten as double-quoted
/// (embedded double quotes escaped). Each applied fix yields one
/// warning carrying the position of its first occurrence.
pub fn repair_source(text: &str) -> Option<Repair> {
    let mut out = String::with_capacity(text.len());
    let mut warnings: Vec<ParseError> = Vec::new();
    let mut trailing_comma_at: Option<(usize, usize)> = None;
    let mut single_quote_at: Option<(usize, usize)> = None;

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut line = 1usize;
    let mut column = 1usize;

    let bump = |c: char, line: &mut usize, column: &mut usize| {
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                // Copy a double-quoted string verbatim
                out.push(c);
                bump(c, &mut line, &mut column);
                i += 1;
                while i < chars.len() {
                    let s = chars[i];
                    out.push(s);
                    bump(s, &mut line, &mut column);
                    i += 1;
                    if s == '\\' && i < chars.len() {
                        let escaped = chars[i];
                        out.push(escaped);
                        bump(escaped, &mut line, &mut column);
                        i += 1;
                    } else if s == '"' {
                        break;
                    }
                }
            }
            '\'' => {
                // Rewrite a single-quoted string as double-quoted
                if single_quote_at.is_none() {
                    single_quote_at = Some((line, column));
                }
                out.push('"');
                bump(c, &mut line, &mut column);
                i += 1;
                while i < chars.len() {
                    let s = chars[i];
                    bump(s, &mut line, &mut column);
                    i += 1;
                    if s == '\\' && i < chars.len() {
                        let escaped = chars[i];
                        if escaped == '\'' {
                            out.push('\'');
                        } else {
                            out.push('\\');
                            out.push(escaped);
                        }
                        bump(escaped, &mut line, &mut column);
                        i += 1;
                    } else if s == '\'' {
                        out.push('"');
                        break;
                    } else if s == '"' {
                        out.push('\\');
                        out.push('"');
                    } else {
                        out.push(s);
                    }
                }
            }
            ',' => {
                // Drop the comma when only whitespace separates it from
                // a closing bracket
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                    if trailing_comma_at.is_none() {
                        trailing_comma_at = Some((line, column));
                    }
                    bump(c, &mut line, &mut column);
                    i += 1;
                } else {
                    out.push(c);
                    bump(c, &mut line, &mut column);
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                bump(c, &mut line, &mut column);
                i += 1;
            }
        }
    }

    if let Some((line, column)) = trailing_comma_at {
        warnings.push(
            ParseError::new("Repaired: removed trailing comma", line, column)
                .with_code("trailing-comma")
                .into_warning(),
        );
    }
    if let Some((line, column)) = single_quote_at {
        warnings.push(
            ParseError::new(
                "Repaired: normalized single-quoted string to double quotes",
                line,
                column,
            )
            .with_code("single-quote")
            .into_warning(),
        );
    }

    if warnings.is_empty() {
        None
    } else {
        debug_assert!(warnings.iter().all(|w| w.severity == Severity::Warning));
        Some(Repair {
            text: out,
            warnings,
        })
    }
}
