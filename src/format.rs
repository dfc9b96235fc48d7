//! Supported formats and parse/serialize dispatch

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::conversion::config::ConversionOptions;
use crate::conversion::limits::Deadline;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::value::Value;
use crate::{formatter, parser};

/// A format the engine can read and write
///
/// Lenient-JSON input is not a separate format; the superset switches
/// live in [`crate::conversion::config::JsonOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Xml,
    Yaml,
    Csv,
    Toml,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Json,
        Format::Xml,
        Format::Yaml,
        Format::Csv,
        Format::Toml,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Yaml => "yaml",
            Format::Csv => "csv",
            Format::Toml => "toml",
        }
    }

    /// Parse text in this format into a value tree
    pub fn parse_value(
        &self,
        text: &str,
        options: &ConversionOptions,
        deadline: &Deadline,
    ) -> ConversionResult<Value> {
        match self {
            Format::Json => parser::json::parse(text, options, deadline),
            Format::Xml => parser::xml::parse(text, options, deadline),
            Format::Yaml => parser::yaml::parse(text, options, deadline),
            Format::Csv => parser::csv::parse(text, options, deadline),
            Format::Toml => parser::toml::parse(text, options, deadline),
        }
    }

    /// Serialize a value tree into this format
    pub fn serialize_value(
        &self,
        value: &Value,
        options: &ConversionOptions,
        deadline: &Deadline,
    ) -> ConversionResult<String> {
        match self {
            Format::Json => formatter::json::serialize(value, options, deadline),
            Format::Xml => formatter::xml::serialize(value, options, deadline),
            Format::Yaml => formatter::yaml::serialize(value, options, deadline),
            Format::Csv => formatter::csv::serialize(value, options, deadline),
            Format::Toml => formatter::toml::serialize(value, options, deadline),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "yaml" | "yml" => Ok(Format::Yaml),
            "csv" => Ok(Format::Csv),
            "toml" => Ok(Format::Toml),
            other => Err(ConversionError::conversion(
                ConversionErrorKind::unsupported_format(other),
            )),
        }
    }
}

/// Every format the engine supports, in declaration order
pub fn supported_formats() -> &'static [Format] {
    &Format::ALL
}
