//! CSV serializer
//!
//! Accepts an array of objects (or a single object, treated as one
//! row). Columns come from the configured list or from the union of
//! keys in first-seen order. Nested values render as minified JSON
//! inside the cell; anything else is a structure mismatch.

use crate::conversion::config::{ConversionOptions, IndentStyle, OutputStyle};
use crate::conversion::limits::Deadline;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::formatter::render_number;
use crate::value::{Object, Value};

pub fn serialize(
    value: &Value,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<String> {
    let rows: Vec<&Object> = match value {
        Value::Array(items) => {
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                match item.as_object() {
                    Some(row) => rows.push(row),
                    None => {
                        return Err(mismatch("array items must be objects"));
                    }
                }
            }
            rows
        }
        Value::Object(row) => vec![row],
        _ => return Err(mismatch("top-level value must be an array of objects")),
    };

    let columns: Vec<String> = match &options.csv.columns {
        Some(columns) => columns.clone(),
        None => {
            let mut columns: Vec<String> = Vec::new();
            for row in &rows {
                for key in row.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
            columns
        }
    };
    if columns.is_empty() {
        return Err(mismatch("no columns to serialize"));
    }

    let mut out = String::new();
    if options.csv.header {
        write_record(&mut out, columns.iter().map(String::as_str), options);
    }
    for row in rows {
        let mut cells = Vec::with_capacity(columns.len());
        for column in &columns {
            deadline.check()?;
            cells.push(match row.get(column) {
                Some(cell) => render_cell(cell, options, deadline)?,
                None => String::new(),
            });
        }
        write_record(&mut out, cells.iter().map(String::as_str), options);
    }
    Ok(out)
}

fn mismatch(reason: &str) -> ConversionError {
    ConversionError::conversion(ConversionErrorKind::structure_mismatch("csv", reason))
}

fn render_cell(
    value: &Value,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n, options.number_precision)?,
        Value::String(s) => s.clone(),
        // Containers embed as minified JSON
        Value::Array(_) | Value::Object(_) => {
            let mut embedded = options.clone();
            embedded.style = OutputStyle::Minified;
            embedded.indent = IndentStyle::None;
            crate::formatter::json::serialize(value, &embedded, deadline)?
        }
    })
}

fn write_record<'a>(
    out: &mut String,
    cells: impl Iterator<Item = &'a str>,
    options: &ConversionOptions,
) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(options.csv.delimiter);
        }
        write_cell(out, cell, options);
    }
    out.push('\n');
}

fn write_cell(out: &mut String, cell: &str, options: &ConversionOptions) {
    let csv = &options.csv;
    let must_quote = cell.contains(csv.delimiter)
        || cell.contains(csv.quote)
        || cell.contains('\n')
        || cell.contains('\r')
        || cell.starts_with(' ')
        || cell.ends_with(' ');
    if !must_quote {
        out.push_str(cell);
        return;
    }
    out.push(csv.quote);
    for c in cell.chars() {
        if c == csv.quote {
            out.push(csv.quote);
        }
        out.push(c);
    }
    out.push(csv.quote);
}
