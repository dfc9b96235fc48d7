//! JSON serializer
//!
//! Indentation, quote style, number precision and key ordering all come
//! from the options; minified mode emits no insignificant whitespace.

use crate::conversion::config::{ConversionOptions, OutputStyle, QuoteStyle};
use crate::conversion::limits::Deadline;
use crate::error::ConversionResult;
use crate::formatter::{indent_unit, ordered_members, push_unicode_escape, render_number};
use crate::value::Value;

pub fn serialize(
    value: &Value,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<String> {
    let mut out = String::new();
    write_value(&mut out, value, options, 0, deadline)?;
    Ok(out)
}

fn write_value(
    out: &mut String,
    value: &Value,
    options: &ConversionOptions,
    level: usize,
    deadline: &Deadline,
) -> ConversionResult<()> {
    deadline.check()?;
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&render_number(n, options.number_precision)?),
        Value::String(s) => write_string(out, s, options),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return Ok(());
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                    if options.style == OutputStyle::Compact {
                        out.push(' ');
                    }
                }
                write_newline_indent(out, options, level + 1);
                write_value(out, item, options, level + 1, deadline)?;
            }
            write_newline_indent(out, options, level);
            out.push(']');
        }
        Value::Object(members) => {
            if members.is_empty() {
                out.push_str("{}");
                return Ok(());
            }
            out.push('{');
            for (i, (key, member)) in ordered_members(members, options.key_order)
                .into_iter()
                .enumerate()
            {
                if i > 0 {
                    out.push(',');
                    if options.style == OutputStyle::Compact {
                        out.push(' ');
                    }
                }
                write_newline_indent(out, options, level + 1);
                write_string(out, key, options);
                out.push(':');
                if options.style != OutputStyle::Minified {
                    out.push(' ');
                }
                write_value(out, member, options, level + 1, deadline)?;
            }
            write_newline_indent(out, options, level);
            out.push('}');
        }
    }
    Ok(())
}

fn write_newline_indent(out: &mut String, options: &ConversionOptions, level: usize) {
    if options.style != OutputStyle::Pretty {
        return;
    }
    out.push('\n');
    for _ in 0..level {
        out.push_str(indent_unit(options));
    }
}

fn write_string(out: &mut String, text: &str, options: &ConversionOptions) {
    let quote = options.quotes.char();
    out.push(quote);
    for c in text.chars() {
        match c {
            '"' if options.quotes == QuoteStyle::Double => out.push_str("\\\""),
            '\'' if options.quotes == QuoteStyle::Single => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => push_unicode_escape(out, c),
            c if options.escape_unicode && (c as u32) > 0x7E => push_unicode_escape(out, c),
            c => out.push(c),
        }
    }
    out.push(quote);
}
