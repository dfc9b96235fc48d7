//! Structured-data format conversion
//!
//! Parses JSON (strict or lenient), XML, YAML, CSV and TOML into one
//! generic value tree and serializes that tree back out in any of the
//! same formats. Conversions run through [`ConversionEngine`], which
//! enforces size, depth and timeout limits, optionally repairs common
//! JSON syntax slips, and reports timing and tree statistics alongside
//! the output.
//!
//! ```
//! use polyconv::{convert, Format};
//!
//! let yaml = convert(r#"{"name": "John", "age": 30}"#, None, Format::Yaml).unwrap();
//! assert_eq!(yaml.content, "name: John\nage: 30\n");
//! ```

pub mod conversion;
pub mod detect;
pub mod error;
pub mod format;
pub mod formatter;
pub mod parser;
pub mod value;

// Re-export commonly used types
pub use conversion::{
    Conversion, ConversionEngine, ConversionMetadata, ConversionOptions, ConversionRequest,
    ConversionStatistics, Limits,
};
pub use detect::{detect as detect_format, Detection};
pub use error::{ConversionError, ConversionErrorKind, ConversionResult, ParseError, Severity};
pub use format::{supported_formats, Format};
pub use value::{Number, Object, TreeStats, Value};

/// Convert with default options
///
/// Passing `source: None` resolves the input format heuristically.
pub fn convert(
    text: &str,
    source: Option<Format>,
    target: Format,
) -> ConversionResult<Conversion> {
    ConversionEngine::new().convert(text, source, target)
}

/// Convert with custom options
pub fn convert_with_options(
    text: &str,
    source: Option<Format>,
    target: Format,
    options: &ConversionOptions,
) -> ConversionResult<Conversion> {
    ConversionEngine::new().convert_with(text, source, target, options)
}
