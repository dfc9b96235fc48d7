//! YAML parser covering the block/flow profile the engine emits
//!
//! Block mappings and sequences by indentation, flow collections,
//! `#` comments, quoted and plain scalars with standard typing.
//! Anchors, aliases, tags and multi-document streams are outside the
//! profile and fail with a positioned error.

use crate::conversion::config::ConversionOptions;
use crate::conversion::limits::Deadline;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::parser::coerce_scalar;
use crate::parser::cursor::Cursor;
use crate::value::{Object, Value};

pub fn parse(
    text: &str,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<Value> {
    let lines = split_lines(text)?;
    if lines.is_empty() {
        return Err(ConversionError::parse("Empty input", 1, 1));
    }
    let mut parser = YamlParser {
        lines,
        pos: 0,
        max_depth: options.limits.max_depth,
        deadline,
    };
    let value = parser.parse_node(1)?;
    if let Some(line) = parser.current() {
        return Err(ConversionError::parse(
            "Unexpected content after document",
            line.number,
            line.indent + 1,
        ));
    }
    Ok(value)
}

#[derive(Debug, Clone)]
struct Line {
    indent: usize,
    content: String,
    number: usize,
}

/// Strip comments and blank lines, measure indentation
fn split_lines(text: &str) -> ConversionResult<Vec<Line>> {
    let mut lines = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        if raw.trim_start().starts_with('\t') || raw.starts_with('\t') {
            return Err(ConversionError::parse(
                "Tabs are not allowed in YAML indentation",
                number,
                1,
            ));
        }
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        let content = strip_comment(&raw[indent..]).trim_end().to_string();
        if content.is_empty() {
            continue;
        }
        if content.starts_with("---") || content.starts_with("...") {
            if lines.is_empty() && content == "---" {
                // Leading document marker is tolerated
                continue;
            }
            return Err(ConversionError::parse(
                "Multi-document streams are not supported",
                number,
                indent + 1,
            ));
        }
        if content.starts_with('&') || content.starts_with('*') || content.starts_with('!') {
            return Err(ConversionError::parse(
                "Anchors, aliases and tags are not supported",
                number,
                indent + 1,
            ));
        }
        lines.push(Line {
            indent,
            content,
            number,
        });
    }
    Ok(lines)
}

/// Remove a `#` comment that is not inside a quoted scalar
fn strip_comment(content: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for (i, c) in content.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => {
                // A comment must be preceded by whitespace or start the line
                if i == 0 || content[..i].ends_with(' ') {
                    return content[..i].trim_end();
                }
            }
            _ => {}
        }
    }
    content
}

struct YamlParser<'a> {
    lines: Vec<Line>,
    pos: usize,
    max_depth: usize,
    deadline: &'a Deadline,
}

impl YamlParser<'_> {
    fn current(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    fn parse_node(&mut self, depth: usize) -> ConversionResult<Value> {
        self.deadline.check()?;
        if depth > self.max_depth {
            return Err(ConversionError::conversion(
                ConversionErrorKind::DepthExceeded {
                    depth,
                    limit: self.max_depth,
                },
            ));
        }

        let line = match self.current() {
            Some(line) => line.clone(),
            None => return Ok(Value::Null),
        };

        if line.content == "-" || line.content.starts_with("- ") {
            return self.parse_sequence(line.indent, depth);
        }
        if split_mapping_entry(&line.content).is_some() {
            return self.parse_mapping(line.indent, depth);
        }

        // Single scalar document/node
        self.pos += 1;
        parse_scalar(&line.content, line.number, line.indent + 1, self.deadline)
    }

    fn parse_mapping(&mut self, indent: usize, depth: usize) -> ConversionResult<Value> {
        let mut members = Object::new();

        while let Some(line) = self.current().cloned() {
            self.deadline.check()?;
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(ConversionError::parse(
                    "Inconsistent indentation",
                    line.number,
                    line.indent + 1,
                ));
            }
            let (raw_key, rest) = match split_mapping_entry(&line.content) {
                Some(entry) => entry,
                None => {
                    return Err(ConversionError::parse(
                        "Expected 'key: value' entry",
                        line.number,
                        line.indent + 1,
                    ));
                }
            };
            let key = parse_key(raw_key, line.number, line.indent + 1)?;
            self.pos += 1;

            let value = if rest.is_empty() {
                match self.current() {
                    Some(next) if next.indent > indent => self.parse_node(depth + 1)?,
                    // A sequence under a key may sit at the key's own indent
                    Some(next)
                        if next.indent == indent
                            && (next.content == "-" || next.content.starts_with("- ")) =>
                    {
                        self.parse_sequence(indent, depth + 1)?
                    }
                    _ => Value::Null,
                }
            } else {
                parse_scalar(rest, line.number, line.indent + 1, self.deadline)?
            };
            Value::insert_member(&mut members, key, value);
        }

        Ok(Value::Object(members))
    }

    fn parse_sequence(&mut self, indent: usize, depth: usize) -> ConversionResult<Value> {
        let mut items = Vec::new();

        while let Some(line) = self.current().cloned() {
            self.deadline.check()?;
            if line.indent < indent {
                break;
            }
            if line.indent > indent || !(line.content == "-" || line.content.starts_with("- ")) {
                if line.indent == indent {
                    break;
                }
                return Err(ConversionError::parse(
                    "Inconsistent indentation",
                    line.number,
                    line.indent + 1,
                ));
            }

            let rest = line.content[1..].trim_start().to_string();
            if rest.is_empty() {
                self.pos += 1;
                let value = match self.current() {
                    Some(next) if next.indent > indent => self.parse_node(depth + 1)?,
                    _ => Value::Null,
                };
                items.push(value);
            } else if split_mapping_entry(&rest).is_some() {
                // Compact mapping entry: rewrite the line as the first
                // key of a mapping nested two columns deeper
                let item_indent = indent + 2;
                self.lines[self.pos] = Line {
                    indent: item_indent,
                    content: rest,
                    number: line.number,
                };
                items.push(self.parse_mapping(item_indent, depth + 1)?);
            } else {
                self.pos += 1;
                items.push(parse_scalar(
                    &rest,
                    line.number,
                    line.indent + 3,
                    self.deadline,
                )?);
            }
        }

        Ok(Value::Array(items))
    }
}

/// Split `key: value` / `key:`; `None` when the line is not an entry
fn split_mapping_entry(content: &str) -> Option<(&str, &str)> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut bracket_depth = 0usize;
    for (i, c) in content.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '[' | '{' if !in_single && !in_double => bracket_depth += 1,
            ']' | '}' if !in_single && !in_double => {
                bracket_depth = bracket_depth.saturating_sub(1)
            }
            ':' if !in_single && !in_double && bracket_depth == 0 => {
                let rest = &content[i + 1..];
                if rest.is_empty() || rest.starts_with(' ') {
                    return Some((content[..i].trim_end(), rest.trim_start()));
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_key(raw: &str, line: usize, column: usize) -> ConversionResult<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConversionError::parse("Empty mapping key", line, column));
    }
    if (raw.starts_with('"') && raw.ends_with('"') && raw.len() >= 2)
        || (raw.starts_with('\'') && raw.ends_with('\'') && raw.len() >= 2)
    {
        return Ok(unquote(raw, line, column)?);
    }
    Ok(raw.to_string())
}

/// Parse a scalar or a flow collection
fn parse_scalar(
    text: &str,
    line: usize,
    column: usize,
    deadline: &Deadline,
) -> ConversionResult<Value> {
    let text = text.trim();
    if text.starts_with('[') || text.starts_with('{') {
        let mut flow = FlowParser {
            cursor: Cursor::new(text),
            line,
            deadline,
        };
        let value = flow.parse_value()?;
        flow.cursor.skip_whitespace();
        if !flow.cursor.is_eof() {
            return Err(ConversionError::parse(
                "Unexpected content after flow collection",
                line,
                column,
            ));
        }
        return Ok(value);
    }
    if text.starts_with('"') || text.starts_with('\'') {
        return Ok(Value::String(unquote(text, line, column)?));
    }
    if text == "~" {
        return Ok(Value::Null);
    }
    if text.starts_with('&') || text.starts_with('*') || text.starts_with('!') {
        return Err(ConversionError::parse(
            "Anchors, aliases and tags are not supported",
            line,
            column,
        ));
    }
    Ok(coerce_scalar(text))
}

fn unquote(text: &str, line: usize, column: usize) -> ConversionResult<String> {
    let quote = text.chars().next().unwrap_or('"');
    if text.len() < 2 || !text.ends_with(quote) {
        return Err(ConversionError::parse("Unterminated quoted scalar", line, column));
    }
    let inner = &text[1..text.len() - 1];
    if quote == '\'' {
        // Single-quoted style: '' is the only escape
        return Ok(inner.replace("''", "'"));
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('0') => out.push('\0'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => {
                return Err(ConversionError::parse(
                    "Unterminated escape in quoted scalar",
                    line,
                    column,
                ));
            }
        }
    }
    Ok(out)
}

/// Single-line flow collection parser (`[a, b]` / `{k: v}`)
struct FlowParser<'a> {
    cursor: Cursor,
    line: usize,
    deadline: &'a Deadline,
}

impl FlowParser<'_> {
    fn parse_value(&mut self) -> ConversionResult<Value> {
        self.deadline.check()?;
        self.cursor.skip_whitespace();
        match self.cursor.peek() {
            Some('[') => self.parse_flow_sequence(),
            Some('{') => self.parse_flow_mapping(),
            Some('"') | Some('\'') => {
                let raw = self.take_quoted()?;
                Ok(Value::String(unquote(&raw, self.line, 1)?))
            }
            Some(_) => {
                let raw = self.take_plain();
                parse_scalar(&raw, self.line, 1, self.deadline)
            }
            None => Err(self.err("Unexpected end of flow collection")),
        }
    }

    fn parse_flow_sequence(&mut self) -> ConversionResult<Value> {
        self.cursor.advance(); // '['
        let mut items = Vec::new();
        self.cursor.skip_whitespace();
        if self.cursor.eat(']') {
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.cursor.skip_whitespace();
            if self.cursor.eat(',') {
                continue;
            }
            if self.cursor.eat(']') {
                return Ok(Value::Array(items));
            }
            return Err(self.err("Expected ',' or ']' in flow sequence"));
        }
    }

    fn parse_flow_mapping(&mut self) -> ConversionResult<Value> {
        self.cursor.advance(); // '{'
        let mut members = Object::new();
        self.cursor.skip_whitespace();
        if self.cursor.eat('}') {
            return Ok(Value::Object(members));
        }
        loop {
            self.cursor.skip_whitespace();
            let key = match self.cursor.peek() {
                Some('"') | Some('\'') => {
                    let raw = self.take_quoted()?;
                    unquote(&raw, self.line, 1)?
                }
                _ => {
                    let mut key = String::new();
                    while matches!(self.cursor.peek(), Some(c) if c != ':' && c != ',' && c != '}')
                    {
                        key.push(self.cursor.advance().unwrap());
                    }
                    key.trim().to_string()
                }
            };
            self.cursor.skip_whitespace();
            if !self.cursor.eat(':') {
                return Err(self.err("Expected ':' in flow mapping"));
            }
            let value = self.parse_value()?;
            Value::insert_member(&mut members, key, value);
            self.cursor.skip_whitespace();
            if self.cursor.eat(',') {
                continue;
            }
            if self.cursor.eat('}') {
                return Ok(Value::Object(members));
            }
            return Err(self.err("Expected ',' or '}' in flow mapping"));
        }
    }

    fn take_quoted(&mut self) -> ConversionResult<String> {
        let quote = self.cursor.peek().unwrap();
        let mut raw = String::new();
        raw.push(self.cursor.advance().unwrap());
        loop {
            match self.cursor.advance() {
                Some('\\') if quote == '"' => {
                    raw.push('\\');
                    if let Some(escaped) = self.cursor.advance() {
                        raw.push(escaped);
                    }
                }
                Some(c) if c == quote => {
                    raw.push(c);
                    return Ok(raw);
                }
                Some(c) => raw.push(c),
                None => return Err(self.err("Unterminated quoted scalar")),
            }
        }
    }

    fn take_plain(&mut self) -> String {
        let mut raw = String::new();
        while matches!(self.cursor.peek(), Some(c) if !matches!(c, ',' | ']' | '}')) {
            raw.push(self.cursor.advance().unwrap());
        }
        raw.trim().to_string()
    }

    fn err(&self, message: &str) -> ConversionError {
        ConversionError::parse(message, self.line, self.cursor.position().column)
    }
}
