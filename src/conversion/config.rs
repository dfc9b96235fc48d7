//! Configuration options for format conversion

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Overall output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Indented, one element per line
    Pretty,
    /// Single spaces after separators, no indentation
    Compact,
    /// No insignificant whitespace at all
    Minified,
}

/// Indentation unit for pretty output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    TwoSpaces,
    FourSpaces,
    Tab,
    None,
}

impl IndentStyle {
    pub fn unit(&self) -> &'static str {
        match self {
            IndentStyle::TwoSpaces => "  ",
            IndentStyle::FourSpaces => "    ",
            IndentStyle::Tab => "\t",
            IndentStyle::None => "",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "2" | "two" | "2-space" => Ok(IndentStyle::TwoSpaces),
            "4" | "four" | "4-space" => Ok(IndentStyle::FourSpaces),
            "tab" | "\t" => Ok(IndentStyle::Tab),
            "none" | "" => Ok(IndentStyle::None),
            other => Err(format!(
                "Invalid indent '{}'. Use '2-space', '4-space', 'tab', or 'none'",
                other
            )),
        }
    }
}

/// Quote character used for strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Double,
    Single,
}

impl QuoteStyle {
    pub fn char(&self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }
}

/// Serialization-time key ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrder {
    /// Source insertion order
    Preserve,
    Ascending,
    Descending,
}

/// Lenient-JSON superset switches
///
/// With everything off the parser accepts strict JSON only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOptions {
    /// Accept `//` line and `/* */` block comments (discarded)
    pub allow_comments: bool,
    /// Accept a trailing comma before `}` or `]`
    pub allow_trailing_commas: bool,
    /// Accept single-quoted strings
    pub allow_single_quotes: bool,
    /// Accept identifier-shaped unquoted object keys
    pub allow_unquoted_keys: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            allow_comments: false,
            allow_trailing_commas: false,
            allow_single_quotes: false,
            allow_unquoted_keys: false,
        }
    }
}

impl JsonOptions {
    /// Every superset extension enabled
    pub fn lenient() -> Self {
        Self {
            allow_comments: true,
            allow_trailing_commas: true,
            allow_single_quotes: true,
            allow_unquoted_keys: true,
        }
    }
}

/// XML parse/serialize sub-options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlOptions {
    /// Root element used when wrapping non-object values
    pub root_element: String,
    /// Key prefix marking attributes (parse and serialize)
    pub attribute_prefix: String,
    /// Emit the `<?xml ...?>` declaration
    pub declaration: bool,
    /// Preserve CDATA section content as plain text
    pub cdata: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            root_element: "root".to_string(),
            attribute_prefix: "@".to_string(),
            declaration: true,
            cdata: true,
        }
    }
}

/// YAML serialize sub-options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YamlOptions {
    /// Emit flow collections (`[a, b]` / `{k: v}`) instead of block style
    pub flow_style: bool,
    /// Spaces per indentation level
    pub indent: usize,
    /// Quote every string scalar instead of only when required
    pub quote_scalars: bool,
}

impl Default for YamlOptions {
    fn default() -> Self {
        Self {
            flow_style: false,
            indent: 2,
            quote_scalars: false,
        }
    }
}

/// Row-length policy for CSV input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowLength {
    /// Short rows are zipped against the header, surplus cells dropped
    Lenient,
    /// Any row whose cell count differs from the header is an error
    Strict,
}

/// CSV parse/serialize sub-options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOptions {
    pub delimiter: char,
    pub quote: char,
    /// First line is the header; when false `columns` is required
    pub header: bool,
    /// Explicit column order (also a subset filter when serializing)
    pub columns: Option<Vec<String>>,
    pub row_length: RowLength,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            header: true,
            columns: None,
            row_length: RowLength::Lenient,
        }
    }
}

/// TOML serialize sub-options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlOptions {
    /// Render arrays of objects as inline tables instead of `[[table]]`
    pub inline_tables: bool,
}

impl Default for TomlOptions {
    fn default() -> Self {
        Self {
            inline_tables: false,
        }
    }
}

/// Resource limits enforced before, during and after conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum input size in bytes
    pub max_input_bytes: usize,
    /// Maximum serialized output size in bytes
    pub max_output_bytes: usize,
    /// Maximum nesting depth of the parsed tree
    pub max_depth: usize,
    /// Wall-clock deadline for a single conversion, in milliseconds
    pub timeout_ms: u64,
    /// Longest tolerated run of one repeated character
    pub max_repeat_run: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_bytes: 10 * 1024 * 1024, // 10MiB
            max_output_bytes: 10 * 1024 * 1024,
            max_depth: 100,
            timeout_ms: 30_000,
            max_repeat_run: 1000,
        }
    }
}

impl Limits {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Conversion configuration consumed for exactly one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOptions {
    pub style: OutputStyle,
    pub indent: IndentStyle,
    pub quotes: QuoteStyle,
    /// Fractional digits retained when rendering floats
    pub number_precision: usize,
    pub key_order: KeyOrder,
    /// Escape control characters and code points above 0x7E
    pub escape_unicode: bool,
    /// Append one trailing newline to the output
    pub final_newline: bool,
    /// Attempt one bounded pass of syntax fixes on parse failure
    pub repair_mode: bool,
    pub json: JsonOptions,
    pub xml: XmlOptions,
    pub yaml: YamlOptions,
    pub csv: CsvOptions,
    pub toml: TomlOptions,
    pub limits: Limits,
    /// Substrings refused outright before parsing
    pub denylist: Vec<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            style: OutputStyle::Pretty,
            indent: IndentStyle::TwoSpaces,
            quotes: QuoteStyle::Double,
            number_precision: 6,
            key_order: KeyOrder::Preserve,
            escape_unicode: false,
            final_newline: false,
            repair_mode: false,
            json: JsonOptions::default(),
            xml: XmlOptions::default(),
            yaml: YamlOptions::default(),
            csv: CsvOptions::default(),
            toml: TomlOptions::default(),
            limits: Limits::default(),
            denylist: vec!["<script".to_string()],
        }
    }
}

impl ConversionOptions {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for lenient-JSON input with repair enabled
    pub fn lenient() -> Self {
        Self {
            json: JsonOptions::lenient(),
            repair_mode: true,
            ..Default::default()
        }
    }

    /// Configuration producing the smallest possible output
    pub fn minified() -> Self {
        Self {
            style: OutputStyle::Minified,
            indent: IndentStyle::None,
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: OutputStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_indent(mut self, indent: IndentStyle) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_quotes(mut self, quotes: QuoteStyle) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_number_precision(mut self, digits: usize) -> Self {
        self.number_precision = digits;
        self
    }

    pub fn with_key_order(mut self, order: KeyOrder) -> Self {
        self.key_order = order;
        self
    }

    pub fn with_escape_unicode(mut self, enabled: bool) -> Self {
        self.escape_unicode = enabled;
        self
    }

    pub fn with_final_newline(mut self, enabled: bool) -> Self {
        self.final_newline = enabled;
        self
    }

    pub fn with_repair_mode(mut self, enabled: bool) -> Self {
        self.repair_mode = enabled;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_json(mut self, json: JsonOptions) -> Self {
        self.json = json;
        self
    }

    pub fn with_csv(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.number_precision > 17 {
            return Err("Number precision must be 0-17 digits".to_string());
        }

        if self.limits.max_depth == 0 {
            return Err("Max depth must be at least 1".to_string());
        }

        if self.limits.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.limits.max_input_bytes < 1 || self.limits.max_output_bytes < 1 {
            return Err("Size limits must be at least 1 byte".to_string());
        }

        if self.csv.delimiter == self.csv.quote {
            return Err("CSV delimiter and quote character must differ".to_string());
        }

        if !self.csv.header && self.csv.columns.is_none() {
            return Err("CSV without a header line requires an explicit column list".to_string());
        }

        if self.xml.root_element.is_empty() {
            return Err("XML root element name must not be empty".to_string());
        }

        Ok(())
    }
}
