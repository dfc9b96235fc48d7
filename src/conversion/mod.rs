//! Conversion pipeline: configuration, resource guards, the engine and
//! its result metadata

pub mod config;
pub mod engine;
pub mod limits;
pub mod stats;

pub use config::{
    ConversionOptions, CsvOptions, IndentStyle, JsonOptions, KeyOrder, Limits, OutputStyle,
    QuoteStyle, RowLength, TomlOptions, XmlOptions, YamlOptions,
};
pub use engine::{Conversion, ConversionEngine, ConversionRequest};
pub use limits::Deadline;
pub use stats::{ConversionMetadata, ConversionStatistics};
