//! TOML serializer
//!
//! The top-level value must be an object. Plain members come first,
//! object members become `[section]` headers and arrays of objects
//! become `[[section]]` entries, unless `inline_tables` keeps
//! everything on key = value lines. Null has no TOML representation
//! and is a structure mismatch.

use crate::conversion::config::ConversionOptions;
use crate::conversion::limits::Deadline;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::formatter::{ordered_members, push_unicode_escape, render_number};
use crate::value::{Object, Value};

pub fn serialize(
    value: &Value,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<String> {
    let members = match value.as_object() {
        Some(members) => members,
        None => return Err(mismatch("top-level value must be an object")),
    };
    let mut out = String::new();
    write_table(&mut out, &mut Vec::new(), members, options, deadline)?;
    Ok(out)
}

fn mismatch(reason: &str) -> ConversionError {
    ConversionError::conversion(ConversionErrorKind::structure_mismatch("toml", reason))
}

fn is_table_array(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_object)
}

fn write_table(
    out: &mut String,
    path: &mut Vec<String>,
    members: &Object,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<()> {
    deadline.check()?;
    let ordered = ordered_members(members, options.key_order);

    // Key = value lines precede any section header
    for (key, member) in &ordered {
        match member {
            Value::Object(_) if !options.toml.inline_tables => continue,
            Value::Array(items) if !options.toml.inline_tables && is_table_array(items) => {
                continue;
            }
            _ => {}
        }
        out.push_str(&render_key(key));
        out.push_str(" = ");
        write_inline(out, member, options, deadline)?;
        out.push('\n');
    }

    if options.toml.inline_tables {
        return Ok(());
    }

    for (key, member) in &ordered {
        match member {
            Value::Object(inner) => {
                path.push(key.to_string());
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push('[');
                out.push_str(&render_path(path));
                out.push_str("]\n");
                write_table(out, path, inner, options, deadline)?;
                path.pop();
            }
            Value::Array(items) if is_table_array(items) => {
                path.push(key.to_string());
                for item in items {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str("[[");
                    out.push_str(&render_path(path));
                    out.push_str("]]\n");
                    if let Value::Object(inner) = item {
                        write_table(out, path, inner, options, deadline)?;
                    }
                }
                path.pop();
            }
            _ => {}
        }
    }
    Ok(())
}

fn write_inline(
    out: &mut String,
    value: &Value,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<()> {
    deadline.check()?;
    match value {
        Value::Null => return Err(mismatch("null has no representation")),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&render_number(n, options.number_precision)?),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, item, options, deadline)?;
            }
            out.push(']');
        }
        Value::Object(members) => {
            out.push('{');
            for (i, (key, member)) in ordered_members(members, options.key_order)
                .into_iter()
                .enumerate()
            {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&render_key(key));
                out.push_str(" = ");
                write_inline(out, member, options, deadline)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn render_path(path: &[String]) -> String {
    path.iter()
        .map(|segment| render_key(segment))
        .collect::<Vec<_>>()
        .join(".")
}

fn render_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        let mut out = String::new();
        write_string(&mut out, key);
        out
    }
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => push_unicode_escape(out, c),
            c => out.push(c),
        }
    }
    out.push('"');
}
