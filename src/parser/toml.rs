//! TOML parser
//!
//! Key/value pairs, `[table]` and `[a.b]` headers, `[[array-of-tables]]`
//! headers, arrays, inline tables and basic/literal strings. Dates and
//! multi-line strings are outside the profile and fail with a
//! positioned error.

use crate::conversion::config::ConversionOptions;
use crate::conversion::limits::Deadline;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::parser::cursor::Cursor;
use crate::value::{Number, Object, Value};

pub fn parse(
    text: &str,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<Value> {
    let max_depth = options.limits.max_depth;
    let mut root = Object::new();
    // Path of the table the next key/value lands in
    let mut current_path: Vec<String> = Vec::new();
    let mut saw_content = false;

    for (idx, raw) in text.lines().enumerate() {
        deadline.check()?;
        let number = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        saw_content = true;

        if let Some(header) = line.strip_prefix("[[") {
            let header = header
                .strip_suffix("]]")
                .ok_or_else(|| ConversionError::parse("Malformed table header", number, 1))?;
            let path = parse_path(header, number)?;
            push_array_table(&mut root, &path, number)?;
            current_path = path;
        } else if let Some(header) = line.strip_prefix('[') {
            let header = header
                .strip_suffix(']')
                .ok_or_else(|| ConversionError::parse("Malformed table header", number, 1))?;
            let path = parse_path(header, number)?;
            ensure_table(&mut root, &path, number)?;
            current_path = path;
        } else {
            let (key_part, value_part) = split_key_value(line).ok_or_else(|| {
                ConversionError::parse("Expected 'key = value' pair", number, 1)
            })?;
            let mut path = current_path.clone();
            path.extend(parse_path(key_part, number)?);
            let value = parse_value(value_part.trim(), number, max_depth, deadline)?;
            insert_at_path(&mut root, &path, value, number)?;
        }
    }

    if !saw_content {
        return Err(ConversionError::parse("Empty input", 1, 1));
    }
    Ok(Value::Object(root))
}

fn strip_comment(line: &str) -> &str {
    let mut in_basic = false;
    let mut in_literal = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_basic => escaped = true,
            '"' if !in_literal => in_basic = !in_basic,
            '\'' if !in_basic => in_literal = !in_literal,
            '#' if !in_basic && !in_literal => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Split on the first `=` outside of quotes
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let mut in_basic = false;
    let mut in_literal = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' if !in_literal => in_basic = !in_basic,
            '\'' if !in_basic => in_literal = !in_literal,
            '=' if !in_basic && !in_literal => {
                return Some((line[..i].trim(), &line[i + 1..]));
            }
            _ => {}
        }
    }
    None
}

/// Parse a dotted key path, honoring quoted segments
fn parse_path(text: &str, number: usize) -> ConversionResult<Vec<String>> {
    let mut segments = Vec::new();
    let mut segment = String::new();
    let mut quote: Option<char> = None;
    for c in text.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    segment.push(c);
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '.' => {
                    let trimmed = segment.trim().to_string();
                    if trimmed.is_empty() {
                        return Err(ConversionError::parse("Empty key segment", number, 1));
                    }
                    segments.push(trimmed);
                    segment = String::new();
                }
                _ => segment.push(c),
            },
        }
    }
    if quote.is_some() {
        return Err(ConversionError::parse("Unterminated quoted key", number, 1));
    }
    let trimmed = segment.trim().to_string();
    if trimmed.is_empty() {
        return Err(ConversionError::parse("Empty key segment", number, 1));
    }
    segments.push(trimmed);
    Ok(segments)
}

fn parse_value(
    text: &str,
    number: usize,
    max_depth: usize,
    deadline: &Deadline,
) -> ConversionResult<Value> {
    let mut cursor = Cursor::new(text);
    let value = parse_value_at(&mut cursor, number, 1, max_depth, deadline)?;
    cursor.skip_whitespace();
    if !cursor.is_eof() {
        return Err(ConversionError::parse(
            "Unexpected content after value",
            number,
            cursor.position().column,
        ));
    }
    Ok(value)
}

fn parse_value_at(
    cursor: &mut Cursor,
    number: usize,
    depth: usize,
    max_depth: usize,
    deadline: &Deadline,
) -> ConversionResult<Value> {
    deadline.check()?;
    if depth > max_depth {
        return Err(ConversionError::conversion(
            ConversionErrorKind::DepthExceeded {
                depth,
                limit: max_depth,
            },
        ));
    }
    cursor.skip_whitespace();
    match cursor.peek() {
        Some('"') => {
            if cursor.matches("\"\"\"") {
                return Err(ConversionError::parse(
                    "Multi-line strings are not supported",
                    number,
                    cursor.position().column,
                ));
            }
            parse_basic_string(cursor, number)
        }
        Some('\'') => parse_literal_string(cursor, number),
        Some('[') => {
            cursor.advance();
            let mut items = Vec::new();
            cursor.skip_whitespace();
            if cursor.eat(']') {
                return Ok(Value::Array(items));
            }
            loop {
                items.push(parse_value_at(cursor, number, depth + 1, max_depth, deadline)?);
                cursor.skip_whitespace();
                if cursor.eat(',') {
                    cursor.skip_whitespace();
                    // Trailing comma is legal in TOML arrays
                    if cursor.eat(']') {
                        return Ok(Value::Array(items));
                    }
                    continue;
                }
                if cursor.eat(']') {
                    return Ok(Value::Array(items));
                }
                return Err(ConversionError::parse(
                    "Expected ',' or ']' in array",
                    number,
                    cursor.position().column,
                ));
            }
        }
        Some('{') => {
            cursor.advance();
            let mut members = Object::new();
            cursor.skip_whitespace();
            if cursor.eat('}') {
                return Ok(Value::Object(members));
            }
            loop {
                cursor.skip_whitespace();
                let mut key = String::new();
                while matches!(cursor.peek(), Some(c) if c != '=' && c != ',' && c != '}') {
                    key.push(cursor.advance().unwrap());
                }
                let key = key.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
                if !cursor.eat('=') {
                    return Err(ConversionError::parse(
                        "Expected '=' in inline table",
                        number,
                        cursor.position().column,
                    ));
                }
                let value = parse_value_at(cursor, number, depth + 1, max_depth, deadline)?;
                Value::insert_member(&mut members, key, value);
                cursor.skip_whitespace();
                if cursor.eat(',') {
                    continue;
                }
                if cursor.eat('}') {
                    return Ok(Value::Object(members));
                }
                return Err(ConversionError::parse(
                    "Expected ',' or '}' in inline table",
                    number,
                    cursor.position().column,
                ));
            }
        }
        Some(_) => {
            let mut raw = String::new();
            while matches!(cursor.peek(), Some(c) if !matches!(c, ',' | ']' | '}')) {
                raw.push(cursor.advance().unwrap());
            }
            parse_bare_scalar(raw.trim(), number)
        }
        None => Err(ConversionError::parse("Missing value", number, 1)),
    }
}

fn parse_basic_string(cursor: &mut Cursor, number: usize) -> ConversionResult<Value> {
    cursor.advance(); // opening quote
    let mut out = String::new();
    loop {
        match cursor.advance() {
            Some('"') => return Ok(Value::String(out)),
            Some('\\') => match cursor.advance() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('u') => {
                    let mut code = 0u32;
                    for _ in 0..4 {
                        let digit = cursor
                            .advance()
                            .and_then(|c| c.to_digit(16))
                            .ok_or_else(|| {
                                ConversionError::parse(
                                    "Expected four hex digits after \\u",
                                    number,
                                    cursor.position().column,
                                )
                            })?;
                        code = code * 16 + digit;
                    }
                    out.push(char::from_u32(code).ok_or_else(|| {
                        ConversionError::parse("Invalid \\u escape", number, 1)
                    })?);
                }
                Some(other) => {
                    return Err(ConversionError::parse(
                        format!("Invalid escape '\\{}'", other.escape_default()),
                        number,
                        cursor.position().column,
                    ));
                }
                None => {
                    return Err(ConversionError::parse(
                        "Unterminated string",
                        number,
                        cursor.position().column,
                    ));
                }
            },
            Some(c) => out.push(c),
            None => {
                return Err(ConversionError::parse(
                    "Unterminated string",
                    number,
                    cursor.position().column,
                ));
            }
        }
    }
}

fn parse_literal_string(cursor: &mut Cursor, number: usize) -> ConversionResult<Value> {
    cursor.advance(); // opening quote
    let mut out = String::new();
    loop {
        match cursor.advance() {
            Some('\'') => return Ok(Value::String(out)),
            Some(c) => out.push(c),
            None => {
                return Err(ConversionError::parse(
                    "Unterminated literal string",
                    number,
                    cursor.position().column,
                ));
            }
        }
    }
}

fn parse_bare_scalar(text: &str, number: usize) -> ConversionResult<Value> {
    match text {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "" => return Err(ConversionError::parse("Missing value", number, 1)),
        _ => {}
    }
    // Integer underscores are separators
    let cleaned = text.replace('_', "");
    Number::from_literal(&cleaned)
        .map(Value::Number)
        .ok_or_else(|| {
            ConversionError::parse(format!("Invalid TOML value '{}'", text), number, 1)
        })
}

/// Walk (creating as needed) to the table named by `path`
fn ensure_table<'a>(
    root: &'a mut Object,
    path: &[String],
    number: usize,
) -> ConversionResult<&'a mut Object> {
    let mut table = root;
    for segment in path {
        let entry = table
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Object::new()));
        table = match entry {
            Value::Object(o) => o,
            Value::Array(items) => match items.last_mut() {
                Some(Value::Object(o)) => o,
                _ => {
                    return Err(ConversionError::parse(
                        format!("'{}' is not a table", segment),
                        number,
                        1,
                    ));
                }
            },
            _ => {
                return Err(ConversionError::parse(
                    format!("'{}' is not a table", segment),
                    number,
                    1,
                ));
            }
        };
    }
    Ok(table)
}

/// Append one table to the `[[path]]` array of tables
fn push_array_table(root: &mut Object, path: &[String], number: usize) -> ConversionResult<()> {
    let (last, parents) = match path.split_last() {
        Some(split) => split,
        None => return Err(ConversionError::parse("Empty key path", number, 1)),
    };
    let parent = ensure_table(root, parents, number)?;
    match parent
        .entry(last.clone())
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(items) => {
            items.push(Value::Object(Object::new()));
            Ok(())
        }
        _ => Err(ConversionError::parse(
            format!("'{}' is not an array of tables", last),
            number,
            1,
        )),
    }
}

fn insert_at_path(
    root: &mut Object,
    path: &[String],
    value: Value,
    number: usize,
) -> ConversionResult<()> {
    let (last, parents) = match path.split_last() {
        Some(split) => split,
        None => return Err(ConversionError::parse("Empty key path", number, 1)),
    };
    let table = ensure_table(root, parents, number)?;
    Value::insert_member(table, last.clone(), value);
    Ok(())
}
