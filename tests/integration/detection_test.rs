//! Format auto-detection through the public API

use assert_matches::assert_matches;
use polyconv::{
    convert, detect_format, ConversionError, ConversionErrorKind, Format,
};

#[test]
fn test_detects_json() {
    let detection = detect_format(r#"{"a": 1}"#);
    assert_eq!(detection.format, Some(Format::Json));
    assert!(detection.confidence >= 0.9);

    assert_eq!(detect_format("[1, 2, 3]").format, Some(Format::Json));
}

#[test]
fn test_detects_xml() {
    assert_eq!(
        detect_format("<?xml version=\"1.0\"?><root/>").format,
        Some(Format::Xml)
    );
    assert_eq!(
        detect_format("<users><user>John</user></users>").format,
        Some(Format::Xml)
    );
}

#[test]
fn test_detects_yaml() {
    assert_eq!(
        detect_format("name: John\nage: 30\n").format,
        Some(Format::Yaml)
    );
    assert_eq!(detect_format("- one\n- two\n").format, Some(Format::Yaml));
}

#[test]
fn test_detects_csv() {
    assert_eq!(
        detect_format("name,age\nJohn,30\nJane,25\n").format,
        Some(Format::Csv)
    );
}

#[test]
fn test_detects_toml() {
    assert_eq!(
        detect_format("[server]\nhost = \"localhost\"\n").format,
        Some(Format::Toml)
    );
}

#[test]
fn test_engine_autodetects_toml_section_header() {
    // `[` opens the document, but the section header marks it as TOML
    let result = convert("[server]\nhost = \"localhost\"\nport = 8080\n", None, Format::Json)
        .unwrap();
    assert_eq!(result.metadata.source_format, Format::Toml);
    assert_eq!(
        result.content,
        "{\n  \"server\": {\n    \"host\": \"localhost\",\n    \"port\": 8080\n  }\n}"
    );
}

#[test]
fn test_unknown_input_has_zero_confidence() {
    let detection = detect_format("plain prose with no structure");
    assert_eq!(detection.format, None);
    assert_eq!(detection.confidence, 0.0);
}

#[test]
fn test_detection_is_deterministic() {
    let inputs = [
        r#"{"a": 1}"#,
        "<root/>",
        "name: John\n",
        "a,b\n1,2\n",
        "x = 1\ny = 2\n",
        "???",
    ];
    for input in inputs {
        let first = detect_format(input);
        for _ in 0..5 {
            assert_eq!(detect_format(input), first);
        }
    }
}

#[test]
fn test_engine_uses_detection() {
    let result = convert("name: John\n", None, Format::Json).unwrap();
    assert_eq!(result.metadata.source_format, Format::Yaml);
}

#[test]
fn test_engine_rejects_undetectable_input() {
    let result = convert("no structure at all here", None, Format::Json);
    assert_matches!(
        result.unwrap_err(),
        ConversionError::Conversion {
            kind: ConversionErrorKind::UnsupportedFormat { .. },
            ..
        }
    );
}

#[test]
fn test_explicit_source_overrides_detection() {
    // A bare word would never be auto-detected, but an explicit source
    // format skips detection entirely
    let result = convert("value", Some(Format::Yaml), Format::Json).unwrap();
    assert_eq!(result.metadata.source_format, Format::Yaml);
}
