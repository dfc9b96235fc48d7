//! Position-tracked input cursor shared by the hand-written parsers
//!
//! The cursor owns all lexer state (offset, line, column) as an explicit
//! value created fresh per parse call; nothing survives across calls.

use crate::error::ParseError;

/// A line/column position, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Character cursor over the input text
#[derive(Debug)]
pub struct Cursor {
    chars: Vec<char>,
    offset: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    pub fn peek_at(&self, lookahead: usize) -> Option<char> {
        self.chars.get(self.offset + lookahead).copied()
    }

    /// Consume one character, updating line/column
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.offset).copied()?;
        self.offset += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume `c` if it is next; report whether it was consumed
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Check whether the upcoming characters spell `keyword`
    pub fn matches(&self, keyword: &str) -> bool {
        keyword
            .chars()
            .enumerate()
            .all(|(i, k)| self.peek_at(i) == Some(k))
    }

    /// Consume `keyword` or fail at the current position
    pub fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if !self.matches(keyword) {
            return Err(self.error(format!("Expected '{}'", keyword)));
        }
        for _ in 0..keyword.chars().count() {
            self.advance();
        }
        Ok(())
    }

    /// Consume whitespace characters
    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Build a parse error anchored at the current position
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.line, self.column)
    }

    /// Build a parse error anchored at an earlier recorded position
    pub fn error_at(&self, position: Position, message: impl Into<String>) -> ParseError {
        ParseError::new(message, position.line, position.column)
    }
}
