//! End-to-end conversion tests through the public API

use polyconv::conversion::{KeyOrder, OutputStyle};
use polyconv::{convert, convert_with_options, ConversionOptions, Format};
use pretty_assertions::assert_eq;

#[test]
fn test_json_to_yaml() {
    let result = convert(
        r#"{"name": "John", "age": 30, "tags": ["a", "b"]}"#,
        Some(Format::Json),
        Format::Yaml,
    )
    .unwrap();
    assert_eq!(result.content, "name: John\nage: 30\ntags:\n  - a\n  - b\n");
}

#[test]
fn test_yaml_to_json() {
    let options = ConversionOptions::minified();
    let result = convert_with_options(
        "name: John\nage: 30\n",
        Some(Format::Yaml),
        Format::Json,
        &options,
    )
    .unwrap();
    assert_eq!(result.content, r#"{"name":"John","age":30}"#);
}

#[test]
fn test_csv_to_json_with_coercion() {
    let options = ConversionOptions::minified();
    let result = convert_with_options(
        "name,age,active\nJohn,30,true\n",
        Some(Format::Csv),
        Format::Json,
        &options,
    )
    .unwrap();
    assert_eq!(
        result.content,
        r#"[{"name":"John","age":30,"active":true}]"#
    );
}

#[test]
fn test_json_to_csv() {
    let result = convert(
        r#"[{"name": "John", "age": 30}, {"name": "Jane", "age": 25}]"#,
        Some(Format::Json),
        Format::Csv,
    )
    .unwrap();
    assert_eq!(result.content, "name,age\nJohn,30\nJane,25\n");
}

#[test]
fn test_toml_to_json() {
    let options = ConversionOptions::minified();
    let result = convert_with_options(
        "title = \"demo\"\n\n[server]\nport = 8080\n",
        Some(Format::Toml),
        Format::Json,
        &options,
    )
    .unwrap();
    assert_eq!(
        result.content,
        r#"{"title":"demo","server":{"port":8080}}"#
    );
}

#[test]
fn test_xml_to_json() {
    let options = ConversionOptions::minified();
    let result = convert_with_options(
        "<root><name>John</name><age>30</age></root>",
        Some(Format::Xml),
        Format::Json,
        &options,
    )
    .unwrap();
    assert_eq!(result.content, r#"{"name":"John","age":30}"#);
}

#[test]
fn test_pretty_reserialization_is_idempotent() {
    let input = r#"{"a": 1, "b": [true, null]}"#;
    let first = convert(input, Some(Format::Json), Format::Json).unwrap();
    let second = convert(&first.content, Some(Format::Json), Format::Json).unwrap();
    assert_eq!(first.content, second.content);
}

#[test]
fn test_key_sorting() {
    let options = ConversionOptions::minified().with_key_order(KeyOrder::Ascending);
    let result = convert_with_options(
        r#"{"z": 1, "a": 2, "m": 3}"#,
        Some(Format::Json),
        Format::Json,
        &options,
    )
    .unwrap();
    assert_eq!(result.content, r#"{"a":2,"m":3,"z":1}"#);
}

#[test]
fn test_key_order_preserved_by_default() {
    let result = convert(r#"{"z": 1, "a": 2}"#, Some(Format::Json), Format::Json).unwrap();
    assert!(result.content.find("\"z\"").unwrap() < result.content.find("\"a\"").unwrap());
}

#[test]
fn test_compact_style() {
    let options = ConversionOptions::default().with_style(OutputStyle::Compact);
    let result = convert_with_options(
        r#"{"a": 1, "b": 2}"#,
        Some(Format::Json),
        Format::Json,
        &options,
    )
    .unwrap();
    assert_eq!(result.content, r#"{"a": 1, "b": 2}"#);
}

#[test]
fn test_metadata_is_populated() {
    let input = r#"{"user": {"name": "John"}, "tags": ["a", "b"]}"#;
    let result = convert(input, Some(Format::Json), Format::Yaml).unwrap();
    let metadata = &result.metadata;

    assert_eq!(metadata.source_format, Format::Json);
    assert_eq!(metadata.target_format, Format::Yaml);
    assert_eq!(metadata.original_size, input.len());
    assert_eq!(metadata.converted_size, result.content.len());
    assert!(metadata.compression_ratio > 0.0);
    assert_eq!(metadata.depth, 3);
    assert_eq!(metadata.key_count, 3);
    assert!(metadata.total_time_ms >= 0.0);
    assert!(!metadata.repaired);
}

#[test]
fn test_number_integer_distinction_survives() {
    let options = ConversionOptions::minified();
    let result = convert_with_options(
        r#"{"int": 30, "float": 30.0}"#,
        Some(Format::Json),
        Format::Json,
        &options,
    )
    .unwrap();
    assert_eq!(result.content, r#"{"int":30,"float":30.0}"#);
}

#[test]
fn test_lenient_json_input() {
    let options = ConversionOptions::lenient().with_style(OutputStyle::Minified);
    let result = convert_with_options(
        "{a: 1, /* note */ b: 'two',}",
        Some(Format::Json),
        Format::Json,
        &options,
    )
    .unwrap();
    assert_eq!(result.content, r#"{"a":1,"b":"two"}"#);
}
