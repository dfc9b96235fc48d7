//! XML serializer
//!
//! Non-object values are wrapped under the configurable root element;
//! array members repeat their element, array items under a non-object
//! parent use an `item` element. Keys carrying the attribute prefix
//! become attributes, the `#text` key becomes text content.

use crate::conversion::config::{ConversionOptions, OutputStyle};
use crate::conversion::limits::Deadline;
use crate::error::ConversionResult;
use crate::formatter::{indent_unit, ordered_members, render_number};
use crate::parser::xml::TEXT_KEY;
use crate::value::Value;

/// Element name used for array items without a natural key
const ITEM_ELEMENT: &str = "item";

pub fn serialize(
    value: &Value,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<String> {
    let mut out = String::new();
    if options.xml.declaration {
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        break_line(&mut out, options, 0);
    }
    match value {
        // A document has exactly one root; top-level arrays wrap their
        // items in `item` elements instead of repeating the root
        Value::Array(_) => {
            write_wrapped(&mut out, &options.xml.root_element, value, options, 0, deadline)?
        }
        _ => write_element(&mut out, &options.xml.root_element, value, options, 0, deadline)?,
    }
    Ok(out)
}

fn write_element(
    out: &mut String,
    name: &str,
    value: &Value,
    options: &ConversionOptions,
    level: usize,
    deadline: &Deadline,
) -> ConversionResult<()> {
    deadline.check()?;
    match value {
        // Repeated element per item; nested arrays nest an item element
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    break_line(out, options, level);
                }
                match item {
                    Value::Array(_) => {
                        write_wrapped(out, name, item, options, level, deadline)?;
                    }
                    _ => write_element(out, name, item, options, level, deadline)?,
                }
            }
            Ok(())
        }
        Value::Object(_) => write_wrapped(out, name, value, options, level, deadline),
        scalar => {
            out.push('<');
            out.push_str(name);
            match render_scalar(scalar, options)? {
                Some(text) => {
                    out.push('>');
                    out.push_str(&escape_text(&text));
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
                None => out.push_str("/>"),
            }
            Ok(())
        }
    }
}

/// Open `name`, emit attributes/text/children, close it
fn write_wrapped(
    out: &mut String,
    name: &str,
    value: &Value,
    options: &ConversionOptions,
    level: usize,
    deadline: &Deadline,
) -> ConversionResult<()> {
    deadline.check()?;
    let members = match value.as_object() {
        Some(members) => members,
        None => {
            // Arrays reach here when nested inside another array
            out.push('<');
            out.push_str(name);
            out.push('>');
            if let Value::Array(items) = value {
                for item in items {
                    break_line(out, options, level + 1);
                    write_element(out, ITEM_ELEMENT, item, options, level + 1, deadline)?;
                }
            }
            break_line(out, options, level);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
            return Ok(());
        }
    };

    let prefix = &options.xml.attribute_prefix;
    let mut attributes = Vec::new();
    let mut text: Option<String> = None;
    let mut children = Vec::new();
    for (key, member) in ordered_members(members, options.key_order) {
        if let Some(attr_name) = key.strip_prefix(prefix.as_str()) {
            if member.is_scalar() {
                let rendered = render_scalar(member, options)?.unwrap_or_default();
                attributes.push((attr_name.to_string(), rendered));
                continue;
            }
        }
        if key == TEXT_KEY && member.is_scalar() {
            text = render_scalar(member, options)?;
            continue;
        }
        children.push((key, member));
    }

    out.push('<');
    out.push_str(name);
    for (attr_name, attr_value) in &attributes {
        out.push(' ');
        out.push_str(attr_name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(attr_value));
        out.push('"');
    }

    if text.is_none() && children.is_empty() {
        out.push_str("/>");
        return Ok(());
    }
    out.push('>');

    if let Some(text) = &text {
        out.push_str(&escape_text(text));
    }
    if !children.is_empty() {
        for (key, member) in children {
            break_line(out, options, level + 1);
            write_element(out, key, member, options, level + 1, deadline)?;
        }
        break_line(out, options, level);
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
    Ok(())
}

/// Render a scalar to text; `None` stands for an empty element
fn render_scalar(value: &Value, options: &ConversionOptions) -> ConversionResult<Option<String>> {
    Ok(match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(render_number(n, options.number_precision)?),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    })
}

fn break_line(out: &mut String, options: &ConversionOptions, level: usize) {
    if options.style == OutputStyle::Minified {
        return;
    }
    out.push('\n');
    if options.style == OutputStyle::Pretty {
        for _ in 0..level {
            out.push_str(indent_unit(options));
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Object};
    use pretty_assertions::assert_eq;

    fn serialize(value: &Value, options: &ConversionOptions) -> ConversionResult<String> {
        super::serialize(value, options, &Deadline::unbounded())
    }

    fn minified() -> ConversionOptions {
        let mut options = ConversionOptions::minified();
        options.xml.declaration = false;
        options
    }

    #[test]
    fn test_object_document() {
        let mut object = Object::new();
        object.insert("name".to_string(), Value::String("John".to_string()));
        object.insert("age".to_string(), Value::Number(Number::Int(30)));

        let output = serialize(&Value::Object(object), &minified()).unwrap();
        assert_eq!(output, "<root><name>John</name><age>30</age></root>");
    }

    #[test]
    fn test_declaration() {
        let mut options = ConversionOptions::minified();
        options.xml.declaration = true;
        let output = serialize(&Value::Null, &options).unwrap();
        assert_eq!(output, "<?xml version=\"1.0\" encoding=\"UTF-8\"?><root/>");
    }

    #[test]
    fn test_array_repeats_element() {
        let mut object = Object::new();
        object.insert(
            "item".to_string(),
            Value::Array(vec![
                Value::Number(Number::Int(1)),
                Value::Number(Number::Int(2)),
            ]),
        );
        let output = serialize(&Value::Object(object), &minified()).unwrap();
        assert_eq!(output, "<root><item>1</item><item>2</item></root>");
    }

    #[test]
    fn test_top_level_array_uses_item_elements() {
        let value = Value::Array(vec![Value::String("a".to_string()), Value::Bool(true)]);
        let output = serialize(&value, &minified()).unwrap();
        assert_eq!(output, "<root><item>a</item><item>true</item></root>");
    }

    #[test]
    fn test_attributes_and_text() {
        let mut user = Object::new();
        user.insert("@id".to_string(), Value::Number(Number::Int(7)));
        user.insert("#text".to_string(), Value::String("Ann".to_string()));
        let mut object = Object::new();
        object.insert("user".to_string(), Value::Object(user));

        let output = serialize(&Value::Object(object), &minified()).unwrap();
        assert_eq!(output, "<root><user id=\"7\">Ann</user></root>");
    }

    #[test]
    fn test_special_characters_escaped() {
        let mut object = Object::new();
        object.insert("s".to_string(), Value::String("a < b & c".to_string()));
        let output = serialize(&Value::Object(object), &minified()).unwrap();
        assert_eq!(output, "<root><s>a &lt; b &amp; c</s></root>");
    }

    #[test]
    fn test_custom_root_element() {
        let mut options = minified();
        options.xml.root_element = "person".to_string();
        let output = serialize(&Value::Bool(true), &options).unwrap();
        assert_eq!(output, "<person>true</person>");
    }

    #[test]
    fn test_pretty_output() {
        let mut object = Object::new();
        object.insert("a".to_string(), Value::Number(Number::Int(1)));
        let mut options = ConversionOptions::default();
        options.xml.declaration = false;
        let output = serialize(&Value::Object(object), &options).unwrap();
        assert_eq!(output, "<root>\n  <a>1</a>\n</root>");
    }
}
