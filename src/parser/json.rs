//! Hand-written recursive-descent parser for JSON and its lenient superset
//!
//! With every [`JsonOptions`] switch off this accepts strict JSON only.
//! The switches gate single-quoted strings, unquoted identifier keys,
//! `//` and `/* */` comments (discarded) and trailing commas. Grammar:
//!
//! ```text
//! value  := object | array | string | number | 'true' | 'false' | 'null'
//! object := '{' (member (',' member)* (',')?)? '}'
//! array  := '[' (value (',' value)* (',')?)? ']'
//! ```

use crate::conversion::config::{ConversionOptions, JsonOptions};
use crate::conversion::limits::Deadline;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::parser::cursor::Cursor;
use crate::value::{Number, Object, Value};

pub fn parse(
    text: &str,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<Value> {
    let mut parser = JsonParser {
        cursor: Cursor::new(text),
        options: options.json,
        max_depth: options.limits.max_depth,
        deadline,
    };

    parser.skip_trivia()?;
    if parser.cursor.is_eof() {
        return Err(parser.cursor.error("Empty input").with_code("empty").into());
    }

    let value = parser.parse_value(1)?;

    parser.skip_trivia()?;
    if !parser.cursor.is_eof() {
        return Err(parser
            .cursor
            .error("Unexpected trailing content after value")
            .with_code("trailing-content")
            .into());
    }
    Ok(value)
}

struct JsonParser<'a> {
    cursor: Cursor,
    options: JsonOptions,
    max_depth: usize,
    deadline: &'a Deadline,
}

impl JsonParser<'_> {
    fn parse_value(&mut self, depth: usize) -> ConversionResult<Value> {
        self.deadline.check()?;
        if depth > self.max_depth {
            return Err(ConversionError::conversion(
                ConversionErrorKind::DepthExceeded {
                    depth,
                    limit: self.max_depth,
                },
            ));
        }

        match self.cursor.peek() {
            Some('{') => self.parse_object(depth),
            Some('[') => self.parse_array(depth),
            Some('"') => Ok(Value::String(self.parse_string('"')?)),
            Some('\'') if self.options.allow_single_quotes => {
                Ok(Value::String(self.parse_string('\'')?))
            }
            Some('\'') => Err(self
                .cursor
                .error("Single-quoted strings are not allowed")
                .with_code("single-quote")
                .into()),
            Some('t') => {
                self.cursor.expect_keyword("true")?;
                Ok(Value::Bool(true))
            }
            Some('f') => {
                self.cursor.expect_keyword("false")?;
                Ok(Value::Bool(false))
            }
            Some('n') => {
                self.cursor.expect_keyword("null")?;
                Ok(Value::Null)
            }
            Some(c) if c == '-' || c.is_ascii_digit() => Ok(Value::Number(self.parse_number()?)),
            Some(c) => Err(self
                .cursor
                .error(format!("Unexpected character '{}'", c.escape_default()))
                .into()),
            None => Err(self.cursor.error("Unexpected end of input").into()),
        }
    }

    fn parse_object(&mut self, depth: usize) -> ConversionResult<Value> {
        self.cursor.advance(); // '{'
        let mut members = Object::new();

        self.skip_trivia()?;
        if self.cursor.eat('}') {
            return Ok(Value::Object(members));
        }

        loop {
            self.skip_trivia()?;
            let key = self.parse_key()?;

            self.skip_trivia()?;
            if !self.cursor.eat(':') {
                return Err(self.cursor.error("Expected ':' after object key").into());
            }

            self.skip_trivia()?;
            let value = self.parse_value(depth + 1)?;
            // Duplicate keys: last write wins
            Value::insert_member(&mut members, key, value);

            self.skip_trivia()?;
            if self.cursor.eat(',') {
                self.skip_trivia()?;
                if self.cursor.peek() == Some('}') {
                    if !self.options.allow_trailing_commas {
                        return Err(self
                            .cursor
                            .error("Trailing comma before '}'")
                            .with_code("trailing-comma")
                            .into());
                    }
                    self.cursor.advance();
                    return Ok(Value::Object(members));
                }
                continue;
            }
            if self.cursor.eat('}') {
                return Ok(Value::Object(members));
            }
            return Err(self
                .cursor
                .error("Expected ',' or '}' in object")
                .into());
        }
    }

    fn parse_array(&mut self, depth: usize) -> ConversionResult<Value> {
        self.cursor.advance(); // '['
        let mut items = Vec::new();

        self.skip_trivia()?;
        if self.cursor.eat(']') {
            return Ok(Value::Array(items));
        }

        loop {
            self.skip_trivia()?;
            items.push(self.parse_value(depth + 1)?);

            self.skip_trivia()?;
            if self.cursor.eat(',') {
                self.skip_trivia()?;
                if self.cursor.peek() == Some(']') {
                    if !self.options.allow_trailing_commas {
                        return Err(self
                            .cursor
                            .error("Trailing comma before ']'")
                            .with_code("trailing-comma")
                            .into());
                    }
                    self.cursor.advance();
                    return Ok(Value::Array(items));
                }
                continue;
            }
            if self.cursor.eat(']') {
                return Ok(Value::Array(items));
            }
            return Err(self.cursor.error("Expected ',' or ']' in array").into());
        }
    }

    fn parse_key(&mut self) -> ConversionResult<String> {
        match self.cursor.peek() {
            Some('"') => Ok(self.parse_string('"')?),
            Some('\'') if self.options.allow_single_quotes => Ok(self.parse_string('\'')?),
            Some(c) if is_identifier_start(c) && self.options.allow_unquoted_keys => {
                let mut key = String::new();
                while matches!(self.cursor.peek(), Some(c) if is_identifier_part(c)) {
                    key.push(self.cursor.advance().unwrap());
                }
                Ok(key)
            }
            Some(c) if is_identifier_start(c) => Err(self
                .cursor
                .error("Unquoted object keys are not allowed")
                .with_code("unquoted-key")
                .into()),
            _ => Err(self.cursor.error("Expected object key").into()),
        }
    }

    fn parse_string(&mut self, quote: char) -> ConversionResult<String> {
        let start = self.cursor.position();
        self.cursor.advance(); // opening quote
        let mut out = String::new();

        loop {
            self.deadline.check()?;
            match self.cursor.advance() {
                None => {
                    return Err(self
                        .cursor
                        .error_at(start, "Unterminated string")
                        .with_code("unterminated-string")
                        .into())
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape(quote)?),
                Some(c) if (c as u32) < 0x20 => {
                    return Err(self
                        .cursor
                        .error("Unescaped control character in string")
                        .into())
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, quote: char) -> ConversionResult<char> {
        match self.cursor.advance() {
            Some('"') => Ok('"'),
            Some('\'') if quote == '\'' => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{0008}'),
            Some('f') => Ok('\u{000C}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.parse_unicode_escape(),
            Some(c) => Err(self
                .cursor
                .error(format!("Invalid escape sequence '\\{}'", c.escape_default()))
                .with_code("bad-escape")
                .into()),
            None => Err(self.cursor.error("Unterminated escape sequence").into()),
        }
    }

    fn parse_unicode_escape(&mut self) -> ConversionResult<char> {
        let high = self.parse_hex4()?;

        // Surrogate pair
        if (0xD800..0xDC00).contains(&high) {
            if self.cursor.matches("\\u") {
                self.cursor.advance();
                self.cursor.advance();
                let low = self.parse_hex4()?;
                if (0xDC00..0xE000).contains(&low) {
                    let combined =
                        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(c) = char::from_u32(combined) {
                        return Ok(c);
                    }
                }
            }
            return Err(self
                .cursor
                .error("Invalid surrogate pair in \\u escape")
                .with_code("bad-escape")
                .into());
        }
        if (0xDC00..0xE000).contains(&high) {
            return Err(self
                .cursor
                .error("Unpaired low surrogate in \\u escape")
                .with_code("bad-escape")
                .into());
        }

        char::from_u32(high)
            .ok_or_else(|| self.cursor.error("Invalid \\u escape").into())
    }

    fn parse_hex4(&mut self) -> ConversionResult<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .cursor
                .advance()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| {
                    ConversionError::from(
                        self.cursor
                            .error("Expected four hex digits after \\u")
                            .with_code("bad-escape"),
                    )
                })?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Greedy number scan: sign, integer part, fraction, exponent
    fn parse_number(&mut self) -> ConversionResult<Number> {
        let start = self.cursor.position();
        let mut literal = String::new();

        if self.cursor.peek() == Some('-') {
            literal.push(self.cursor.advance().unwrap());
        }
        if !matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
            return Err(self.cursor.error_at(start, "Invalid number").into());
        }
        while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
            literal.push(self.cursor.advance().unwrap());
        }
        if self.cursor.peek() == Some('.') {
            literal.push(self.cursor.advance().unwrap());
            if !matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(self
                    .cursor
                    .error_at(start, "Expected digits after decimal point")
                    .into());
            }
            while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                literal.push(self.cursor.advance().unwrap());
            }
        }
        if matches!(self.cursor.peek(), Some('e') | Some('E')) {
            literal.push(self.cursor.advance().unwrap());
            if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                literal.push(self.cursor.advance().unwrap());
            }
            if !matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(self
                    .cursor
                    .error_at(start, "Expected digits in exponent")
                    .into());
            }
            while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                literal.push(self.cursor.advance().unwrap());
            }
        }

        Number::from_literal(&literal).ok_or_else(|| {
            self.cursor
                .error_at(start, format!("Number out of range: {}", literal))
                .into()
        })
    }

    /// Skip whitespace and, when enabled, comments
    fn skip_trivia(&mut self) -> ConversionResult<()> {
        loop {
            self.deadline.check()?;
            self.cursor.skip_whitespace();
            if !self.options.allow_comments {
                if self.cursor.matches("//") || self.cursor.matches("/*") {
                    return Err(self
                        .cursor
                        .error("Comments are not allowed")
                        .with_code("comment")
                        .into());
                }
                return Ok(());
            }
            if self.cursor.matches("//") {
                while matches!(self.cursor.peek(), Some(c) if c != '\n') {
                    self.cursor.advance();
                }
            } else if self.cursor.matches("/*") {
                let start = self.cursor.position();
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    self.deadline.check()?;
                    if self.cursor.matches("*/") {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    if self.cursor.advance().is_none() {
                        return Err(self
                            .cursor
                            .error_at(start, "Unterminated block comment")
                            .into());
                    }
                }
            } else {
                return Ok(());
            }
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
