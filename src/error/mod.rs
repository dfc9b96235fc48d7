//! Error types and handling infrastructure for format conversion

use anyhow::Error;
use std::fmt;

/// Core error kinds for the conversion process
#[derive(Debug, thiserror::Error)]
pub enum ConversionErrorKind {
    #[error("Unsupported format: {name}")]
    UnsupportedFormat { name: String },

    #[error("Input too large: {size} bytes (limit: {limit} bytes)")]
    InputTooLarge { size: usize, limit: usize },

    #[error("Output too large: {size} bytes (limit: {limit} bytes)")]
    OutputTooLarge { size: usize, limit: usize },

    #[error("Nesting too deep: {depth} levels (limit: {limit})")]
    DepthExceeded { depth: usize, limit: usize },

    #[error("Timeout exceeded: {elapsed_ms}ms (limit: {limit_ms}ms)")]
    TimeoutExceeded { elapsed_ms: u64, limit_ms: u64 },

    #[error("Input rejected: {reason}")]
    AbusePattern { reason: String },

    #[error("Cannot serialize to {target}: {reason}")]
    StructureMismatch { target: String, reason: String },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Conversion failed: {message}")]
    ConversionFailed { message: String },
}

impl ConversionErrorKind {
    pub fn unsupported_format(name: impl Into<String>) -> Self {
        Self::UnsupportedFormat { name: name.into() }
    }

    pub fn abuse_pattern(reason: impl Into<String>) -> Self {
        Self::AbusePattern {
            reason: reason.into(),
        }
    }

    pub fn structure_mismatch(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StructureMismatch {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Main error type for conversion operations
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("{kind}")]
    Conversion {
        kind: ConversionErrorKind,
        source: Option<anyhow::Error>,
    },

    #[error(transparent)]
    Other(#[from] Error),
}

impl ConversionError {
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse(ParseError::new(message, line, column))
    }

    pub fn conversion(kind: ConversionErrorKind) -> Self {
        Self::Conversion { kind, source: None }
    }

    pub fn conversion_with_source(kind: ConversionErrorKind, source: anyhow::Error) -> Self {
        Self::Conversion {
            kind,
            source: Some(source),
        }
    }

    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse(err) => {
                format!(
                    "Parse error at line {}, column {}: {}",
                    err.line, err.column, err.message
                )
            }
            Self::Format(err) => format!("Serialization error: {}", err),
            Self::Conversion { kind, .. } => kind.to_string(),
            Self::Other(err) => format!("Unexpected error: {}", err),
        }
    }
}

/// How bad a parse diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Position-carrying parse diagnostic
///
/// Line and column are 1-based. `code` is a short machine-readable
/// identifier so callers can branch on the failure class without
/// string-matching the message.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub code: &'static str,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            severity: Severity::Error,
            code: "malformed",
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }

    /// Downgrade to a warning, used when repair mode fixed the issue
    pub fn into_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

/// Serialization errors
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Invalid structure: {message}")]
    InvalidStructure { message: String },

    #[error("Non-finite number: {message}")]
    NonFiniteNumber { message: String },
}

impl FormatError {
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    pub fn non_finite_number(message: impl Into<String>) -> Self {
        Self::NonFiniteNumber {
            message: message.into(),
        }
    }
}

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Convenience result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Convenience result type for serialization operations
pub type FormatResult<T> = Result<T, FormatError>;
