//! Conversion orchestrator
//!
//! One pipeline per call: validate options, resolve the source format,
//! run the pre-parse guards, parse (with one repair retry when
//! enabled), check the tree depth, serialize, and assemble metadata.
//! The engine holds no mutable state, so one instance can serve any
//! number of threads.

use log::{debug, warn};
use std::time::{Duration, Instant};

use crate::conversion::config::{ConversionOptions, Limits};
use crate::conversion::limits::{self, Deadline};
use crate::conversion::stats::ConversionMetadata;
use crate::detect;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult, ParseError};
use crate::format::Format;
use crate::parser::repair_source;

/// Outcome of a successful conversion
#[derive(Debug)]
pub struct Conversion {
    /// Serialized output in the target format
    pub content: String,
    /// Repair diagnostics, all `Severity::Warning`
    pub warnings: Vec<ParseError>,
    pub metadata: ConversionMetadata,
}

/// One input to [`ConversionEngine::convert_multiple`]
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    pub text: &'a str,
    /// `None` resolves the format heuristically
    pub source: Option<Format>,
    pub target: Format,
}

/// The conversion entry point
#[derive(Debug, Clone, Default)]
pub struct ConversionEngine {
    defaults: ConversionOptions,
}

impl ConversionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(defaults: ConversionOptions) -> Self {
        Self { defaults }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.defaults
    }

    pub fn set_limits(&mut self, limits: Limits) {
        self.defaults.limits = limits;
    }

    /// Convert using the engine's default options
    pub fn convert(
        &self,
        text: &str,
        source: Option<Format>,
        target: Format,
    ) -> ConversionResult<Conversion> {
        self.convert_with(text, source, target, &self.defaults)
    }

    /// Convert with per-call options
    pub fn convert_with(
        &self,
        text: &str,
        source: Option<Format>,
        target: Format,
        options: &ConversionOptions,
    ) -> ConversionResult<Conversion> {
        options.validate().map_err(|message| {
            ConversionError::conversion(ConversionErrorKind::configuration(message))
        })?;
        limits::check_input_size(text, &options.limits)?;
        limits::scan_for_abuse(text, &options.limits, &options.denylist)?;

        let source = match source {
            Some(format) => format,
            None => {
                let detection = detect::detect(text);
                match detection.format {
                    Some(format) => {
                        debug!(
                            "detected {} input (confidence {:.2})",
                            format, detection.confidence
                        );
                        format
                    }
                    None => {
                        return Err(ConversionError::conversion(
                            ConversionErrorKind::unsupported_format("undetectable input"),
                        ));
                    }
                }
            }
        };

        let deadline = Deadline::from_limits(&options.limits);
        let started = Instant::now();
        let mut warnings = Vec::new();
        let mut repaired = false;

        let value = match source.parse_value(text, options, &deadline) {
            Ok(value) => value,
            Err(original @ ConversionError::Parse(_)) if options.repair_mode => {
                let retry = repair_source(text).and_then(|repair| {
                    source
                        .parse_value(&repair.text, options, &deadline)
                        .ok()
                        .map(|value| (value, repair.warnings))
                });
                match retry {
                    Some((value, repair_warnings)) => {
                        warn!(
                            "parse succeeded after repair ({} fix(es) applied)",
                            repair_warnings.len()
                        );
                        warnings.extend(repair_warnings);
                        repaired = true;
                        value
                    }
                    // Repair changed nothing or did not help; the
                    // original diagnostic is the useful one
                    None => return Err(original),
                }
            }
            Err(error) => return Err(error),
        };
        let parse_time = started.elapsed();

        limits::check_depth(&value, &options.limits)?;
        deadline.check_now()?;

        let serialize_started = Instant::now();
        let mut content = target.serialize_value(&value, options, &deadline)?;
        if options.final_newline && !content.ends_with('\n') {
            content.push('\n');
        }
        limits::check_output_size(&content, &options.limits)?;
        let serialize_time = serialize_started.elapsed();

        let mut metadata =
            ConversionMetadata::new(source, target, text.len(), content.len(), value.stats());
        metadata.parse_time_ms = to_ms(parse_time);
        metadata.serialize_time_ms = to_ms(serialize_time);
        metadata.total_time_ms = to_ms(started.elapsed());
        metadata.repaired = repaired;

        debug!(
            "converted {} -> {} ({} -> {} bytes in {:.2}ms)",
            source, target, metadata.original_size, metadata.converted_size, metadata.total_time_ms
        );

        Ok(Conversion {
            content,
            warnings,
            metadata,
        })
    }

    /// Convert several inputs concurrently, one thread each
    ///
    /// Results come back in request order; one failing input never
    /// affects the others.
    pub fn convert_multiple(
        &self,
        requests: &[ConversionRequest<'_>],
    ) -> Vec<ConversionResult<Conversion>> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = requests
                .iter()
                .map(|request| {
                    scope.spawn(move || self.convert(request.text, request.source, request.target))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(_) => Err(ConversionError::conversion(
                        ConversionErrorKind::ConversionFailed {
                            message: "worker thread panicked".to_string(),
                        },
                    )),
                })
                .collect()
        })
    }
}

fn to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_json_to_yaml() {
        let engine = ConversionEngine::new();
        let result = engine
            .convert(r#"{"name": "John", "age": 30}"#, Some(Format::Json), Format::Yaml)
            .unwrap();
        assert_eq!(result.content, "name: John\nage: 30\n");
        assert_eq!(result.metadata.source_format, Format::Json);
        assert_eq!(result.metadata.target_format, Format::Yaml);
        assert!(result.warnings.is_empty());
        assert!(!result.metadata.repaired);
    }

    #[test]
    fn test_source_detection() {
        let engine = ConversionEngine::with_options(ConversionOptions::minified());
        let result = engine
            .convert("name: John\n", None, Format::Json)
            .unwrap();
        assert_eq!(result.content, r#"{"name":"John"}"#);
        assert_eq!(result.metadata.source_format, Format::Yaml);
    }

    #[test]
    fn test_undetectable_input() {
        let engine = ConversionEngine::new();
        let result = engine.convert("no obvious structure", None, Format::Json);
        assert_matches!(
            result.unwrap_err(),
            ConversionError::Conversion {
                kind: ConversionErrorKind::UnsupportedFormat { .. },
                ..
            }
        );
    }

    #[test]
    fn test_repair_retry() {
        let engine = ConversionEngine::with_options(
            ConversionOptions::minified().with_repair_mode(true),
        );
        let result = engine
            .convert(r#"{"a": 1, "b": 'x',}"#, Some(Format::Json), Format::Json)
            .unwrap();
        assert_eq!(result.content, r#"{"a":1,"b":"x"}"#);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.metadata.repaired);
    }

    #[test]
    fn test_repair_disabled_fails() {
        let engine = ConversionEngine::new();
        let result = engine.convert(r#"{"a": 1,}"#, Some(Format::Json), Format::Json);
        assert_matches!(result.unwrap_err(), ConversionError::Parse(_));
    }

    #[test]
    fn test_final_newline() {
        let engine = ConversionEngine::with_options(
            ConversionOptions::minified().with_final_newline(true),
        );
        let result = engine
            .convert(r#"{"a":1}"#, Some(Format::Json), Format::Json)
            .unwrap();
        assert_eq!(result.content, "{\"a\":1}\n");
    }

    #[test]
    fn test_metadata_counts() {
        let engine = ConversionEngine::new();
        let result = engine
            .convert(r#"{"a": [1, 2]}"#, Some(Format::Json), Format::Json)
            .unwrap();
        assert_eq!(result.metadata.depth, 3);
        assert_eq!(result.metadata.key_count, 1);
        assert_eq!(result.metadata.value_count, 4);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut options = ConversionOptions::default();
        options.limits.max_depth = 0;
        let engine = ConversionEngine::with_options(options);
        let result = engine.convert("{}", Some(Format::Json), Format::Json);
        assert_matches!(
            result.unwrap_err(),
            ConversionError::Conversion {
                kind: ConversionErrorKind::Configuration { .. },
                ..
            }
        );
    }

    #[test]
    fn test_convert_multiple_preserves_order() {
        let engine = ConversionEngine::with_options(ConversionOptions::minified());
        let requests = [
            ConversionRequest {
                text: r#"{"a":1}"#,
                source: Some(Format::Json),
                target: Format::Json,
            },
            ConversionRequest {
                text: "not parseable {",
                source: Some(Format::Json),
                target: Format::Json,
            },
            ConversionRequest {
                text: r#"{"b":2}"#,
                source: Some(Format::Json),
                target: Format::Json,
            },
        ];
        let results = engine.convert_multiple(&requests);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().content, r#"{"a":1}"#);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().content, r#"{"b":2}"#);
    }
}
