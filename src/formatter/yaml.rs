//! YAML serializer
//!
//! Block style by default, flow style on request. Plain scalars are
//! only quoted when the text would otherwise reparse as a different
//! type or collide with YAML syntax; `quote_scalars` forces quotes on
//! every string.

use crate::conversion::config::ConversionOptions;
use crate::conversion::limits::Deadline;
use crate::error::ConversionResult;
use crate::formatter::{ordered_members, render_number};
use crate::parser::coerce_scalar;
use crate::value::Value;

pub fn serialize(
    value: &Value,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<String> {
    if options.yaml.flow_style {
        let mut out = String::new();
        write_flow(&mut out, value, options, deadline)?;
        out.push('\n');
        return Ok(out);
    }
    let mut lines = Vec::new();
    write_block(&mut lines, value, options, 0, deadline)?;
    Ok(lines.join("\n") + "\n")
}

fn write_block(
    lines: &mut Vec<String>,
    value: &Value,
    options: &ConversionOptions,
    indent: usize,
    deadline: &Deadline,
) -> ConversionResult<()> {
    deadline.check()?;
    let pad = " ".repeat(indent);
    match value {
        Value::Array(items) if !items.is_empty() => {
            for item in items {
                match item {
                    // Sequence items open a compact entry on the dash line;
                    // continuation lines align under the first key
                    Value::Object(members) if !members.is_empty() => {
                        let start = lines.len();
                        write_block(lines, item, options, indent + 2, deadline)?;
                        lines[start].replace_range(..indent + 2, &format!("{}- ", pad));
                    }
                    Value::Array(inner) if !inner.is_empty() => {
                        let mut flow = format!("{}- ", pad);
                        write_flow(&mut flow, item, options, deadline)?;
                        lines.push(flow);
                    }
                    other => {
                        lines.push(format!("{}- {}", pad, inline_scalar(other, options)?));
                    }
                }
            }
        }
        Value::Object(members) if !members.is_empty() => {
            for (key, member) in ordered_members(members, options.key_order) {
                let key = render_string(key, options.yaml.quote_scalars);
                match member {
                    Value::Array(items) if !items.is_empty() => {
                        lines.push(format!("{}{}:", pad, key));
                        write_block(lines, member, options, indent + options.yaml.indent, deadline)?;
                    }
                    Value::Object(inner) if !inner.is_empty() => {
                        lines.push(format!("{}{}:", pad, key));
                        write_block(lines, member, options, indent + options.yaml.indent, deadline)?;
                    }
                    other => {
                        lines.push(format!(
                            "{}{}: {}",
                            pad,
                            key,
                            inline_scalar(other, options)?
                        ));
                    }
                }
            }
        }
        other => lines.push(format!("{}{}", pad, inline_scalar(other, options)?)),
    }
    Ok(())
}

/// Single-line rendering for scalars and empty containers
fn inline_scalar(value: &Value, options: &ConversionOptions) -> ConversionResult<String> {
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n, options.number_precision)?,
        Value::String(s) => render_string(s, options.yaml.quote_scalars),
        Value::Array(_) => "[]".to_string(),
        Value::Object(_) => "{}".to_string(),
    })
}

fn write_flow(
    out: &mut String,
    value: &Value,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<()> {
    deadline.check()?;
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flow(out, item, options, deadline)?;
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
                out.push_str(&render_string(key, options.yaml.quote_scalars));
                out.push_str(": ");
                write_flow(out, member, options, deadline)?;
            }
            out.push('}');
        }
        scalar => out.push_str(&inline_scalar(scalar, options)?),
    }
    Ok(())
}

fn render_string(text: &str, force_quotes: bool) -> String {
    if force_quotes || needs_quotes(text) {
        quote(text)
    } else {
        text.to_string()
    }
}

/// Whether a plain scalar would be misread without quotes
fn needs_quotes(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    // Plain text that coerces to null/bool/number must stay a string
    if !matches!(coerce_scalar(text), Value::String(_)) {
        return true;
    }
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        return true;
    }
    let first = match text.chars().next() {
        Some(c) => c,
        None => return true,
    };
    if "&*!|>%@`\"'#,[]{}".contains(first) {
        return true;
    }
    if (first == '-' || first == '?') && (text.len() == 1 || text[1..].starts_with(' ')) {
        return true;
    }
    text.contains(": ")
        || text.ends_with(':')
        || text.contains(" #")
        || text.contains('\n')
        || text.contains('\t')
        || text.contains(',')
        || text.contains('[')
        || text.contains(']')
        || text.contains('{')
        || text.contains('}')
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
