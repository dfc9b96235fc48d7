//! Resource guard behavior through the public API

use assert_matches::assert_matches;
use polyconv::conversion::Deadline;
use polyconv::{
    convert_with_options, ConversionError, ConversionErrorKind, ConversionOptions, Format, Number,
    Value,
};
use std::time::Duration;

#[test]
fn test_input_too_large() {
    let mut options = ConversionOptions::default();
    options.limits.max_input_bytes = 64;
    let input = format!(r#"{{"a": "{}"}}"#, "xy".repeat(100));

    let result = convert_with_options(&input, Some(Format::Json), Format::Json, &options);
    assert_matches!(
        result.unwrap_err(),
        ConversionError::Conversion {
            kind: ConversionErrorKind::InputTooLarge { limit: 64, .. },
            ..
        }
    );
}

#[test]
fn test_depth_exceeded() {
    let options = ConversionOptions::default();
    assert_eq!(options.limits.max_depth, 100);
    let input = format!("{}1{}", "[".repeat(120), "]".repeat(120));

    let result = convert_with_options(&input, Some(Format::Json), Format::Json, &options);
    assert_matches!(
        result.unwrap_err(),
        ConversionError::Conversion {
            kind: ConversionErrorKind::DepthExceeded { limit: 100, .. },
            ..
        }
    );
}

#[test]
fn test_depth_within_custom_limit() {
    let mut options = ConversionOptions::minified();
    options.limits.max_depth = 10;
    let input = format!("{}1{}", "[".repeat(9), "]".repeat(9));

    let result = convert_with_options(&input, Some(Format::Json), Format::Json, &options);
    assert!(result.is_ok());
}

#[test]
fn test_output_too_large() {
    let mut options = ConversionOptions::default();
    options.limits.max_output_bytes = 16;
    let input = r#"{"key": "a value longer than the output budget"}"#;

    let result = convert_with_options(input, Some(Format::Json), Format::Json, &options);
    assert_matches!(
        result.unwrap_err(),
        ConversionError::Conversion {
            kind: ConversionErrorKind::OutputTooLarge { limit: 16, .. },
            ..
        }
    );
}

#[test]
fn test_repeated_character_run_refused() {
    let options = ConversionOptions::default();
    let input = format!(r#"{{"a": "{}"}}"#, "x".repeat(1500));

    let result = convert_with_options(&input, Some(Format::Json), Format::Json, &options);
    assert_matches!(
        result.unwrap_err(),
        ConversionError::Conversion {
            kind: ConversionErrorKind::AbusePattern { .. },
            ..
        }
    );
}

#[test]
fn test_denylist_refused_case_insensitively() {
    let options = ConversionOptions::default();
    let input = r#"{"html": "<SCRIPT>alert(1)</SCRIPT>"}"#;

    let result = convert_with_options(input, Some(Format::Json), Format::Json, &options);
    assert_matches!(
        result.unwrap_err(),
        ConversionError::Conversion {
            kind: ConversionErrorKind::AbusePattern { .. },
            ..
        }
    );
}

#[test]
fn test_refusal_never_sanitizes() {
    // A refused input produces an error, not cleaned-up output
    let options = ConversionOptions::default();
    let input = r#"{"html": "<script>"}"#;
    assert!(convert_with_options(input, Some(Format::Json), Format::Json, &options).is_err());
}

#[test]
fn test_custom_denylist() {
    let mut options = ConversionOptions::default();
    options.denylist = vec!["forbidden-token".to_string()];

    let blocked = r#"{"a": "forbidden-token"}"#;
    assert!(convert_with_options(blocked, Some(Format::Json), Format::Json, &options).is_err());

    // The default entry no longer applies once replaced
    let allowed = r#"{"html": "<script>"}"#;
    assert!(convert_with_options(allowed, Some(Format::Json), Format::Json, &options).is_ok());
}

#[test]
fn test_timeout_during_serialization() {
    let deadline = Deadline::new(Duration::from_millis(0));
    std::thread::sleep(Duration::from_millis(2));
    // Enough nodes for the cooperative check to read the clock
    let items: Vec<Value> = (0..5000).map(|i| Value::Number(Number::Int(i))).collect();

    let result = Format::Json.serialize_value(
        &Value::Array(items),
        &ConversionOptions::minified(),
        &deadline,
    );
    assert_matches!(
        result.unwrap_err(),
        ConversionError::Conversion {
            kind: ConversionErrorKind::TimeoutExceeded { .. },
            ..
        }
    );
}

#[test]
fn test_zero_limits_rejected_as_configuration() {
    let mut options = ConversionOptions::default();
    options.limits.timeout_ms = 0;

    let result = convert_with_options("{}", Some(Format::Json), Format::Json, &options);
    assert_matches!(
        result.unwrap_err(),
        ConversionError::Conversion {
            kind: ConversionErrorKind::Configuration { .. },
            ..
        }
    );
}
