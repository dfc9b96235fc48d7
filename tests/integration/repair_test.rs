//! Repair mode behavior through the public API

use assert_matches::assert_matches;
use polyconv::{convert_with_options, ConversionError, ConversionOptions, Format, Severity};

fn repairing() -> ConversionOptions {
    ConversionOptions::minified().with_repair_mode(true)
}

#[test]
fn test_trailing_comma_and_single_quotes_repaired() {
    let result = convert_with_options(
        r#"{"a": 1, "b": 'x',}"#,
        Some(Format::Json),
        Format::Json,
        &repairing(),
    )
    .unwrap();

    assert_eq!(result.content, r#"{"a":1,"b":"x"}"#);
    assert_eq!(result.warnings.len(), 2);
    assert!(result.metadata.repaired);
}

#[test]
fn test_warnings_carry_codes_and_positions() {
    let result = convert_with_options(
        r#"{"a": 'x'}"#,
        Some(Format::Json),
        Format::Json,
        &repairing(),
    )
    .unwrap();

    let warning = &result.warnings[0];
    assert_eq!(warning.code, "single-quote");
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.line, 1);
    assert!(warning.column > 1);
}

#[test]
fn test_same_input_fails_without_repair() {
    let result = convert_with_options(
        r#"{"a": 1,}"#,
        Some(Format::Json),
        Format::Json,
        &ConversionOptions::minified(),
    );
    assert_matches!(result.unwrap_err(), ConversionError::Parse(_));
}

#[test]
fn test_unrepairable_input_keeps_original_error() {
    // Repair only covers trailing commas and single quotes; an
    // unterminated object is reported as-is
    let result = convert_with_options(
        r#"{"a": 1, "b":"#,
        Some(Format::Json),
        Format::Json,
        &repairing(),
    );
    assert_matches!(result.unwrap_err(), ConversionError::Parse(_));
}

#[test]
fn test_clean_input_produces_no_warnings() {
    let result = convert_with_options(
        r#"{"a": 1}"#,
        Some(Format::Json),
        Format::Json,
        &repairing(),
    )
    .unwrap();
    assert!(result.warnings.is_empty());
    assert!(!result.metadata.repaired);
}

#[test]
fn test_repair_preserves_string_contents() {
    // Commas before brackets inside string data must survive
    let result = convert_with_options(
        r#"{"a": ",]", "b": 'x'}"#,
        Some(Format::Json),
        Format::Json,
        &repairing(),
    )
    .unwrap();
    assert_eq!(result.content, r#"{"a":",]","b":"x"}"#);
}

#[test]
fn test_lenient_preset_enables_repair() {
    let options = ConversionOptions::lenient();
    assert!(options.repair_mode);
    let result =
        convert_with_options(r#"{"a": 1,}"#, Some(Format::Json), Format::Json, &options).unwrap();
    assert!(result.metadata.repaired || result.warnings.is_empty());
}
