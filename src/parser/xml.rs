//! XML parser
//!
//! Elements become object keys; repeated same-tag siblings collapse
//! into an array; attributes map to keys under a configurable prefix
//! (default `@`). The document value is the root element's content, so
//! a serialized wrapper element round-trips away. Mixed element/text
//! content keeps its text under the `#text` key.

use crate::conversion::config::{ConversionOptions, XmlOptions};
use crate::conversion::limits::Deadline;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::parser::coerce_scalar;
use crate::parser::cursor::Cursor;
use crate::value::{Object, Value};

/// Key used for text content of elements that also carry attributes
/// or child elements
pub const TEXT_KEY: &str = "#text";

pub fn parse(
    text: &str,
    options: &ConversionOptions,
    deadline: &Deadline,
) -> ConversionResult<Value> {
    let mut parser = XmlParser {
        cursor: Cursor::new(text),
        options: options.xml.clone(),
        max_depth: options.limits.max_depth,
        deadline,
    };

    parser.skip_prolog()?;
    if !matches!(parser.cursor.peek(), Some('<')) {
        return Err(parser.cursor.error("Expected root element").into());
    }
    let (_, value) = parser.parse_element(1)?;

    parser.skip_misc()?;
    if !parser.cursor.is_eof() {
        return Err(parser
            .cursor
            .error("Unexpected content after root element")
            .into());
    }
    Ok(value)
}

struct XmlParser<'a> {
    cursor: Cursor,
    options: XmlOptions,
    max_depth: usize,
    deadline: &'a Deadline,
}

impl XmlParser<'_> {
    fn skip_prolog(&mut self) -> ConversionResult<()> {
        self.cursor.skip_whitespace();
        if self.cursor.matches("<?xml") {
            let start = self.cursor.position();
            loop {
                self.deadline.check()?;
                if self.cursor.matches("?>") {
                    self.cursor.advance();
                    self.cursor.advance();
                    break;
                }
                if self.cursor.advance().is_none() {
                    return Err(self
                        .cursor
                        .error_at(start, "Unterminated XML declaration")
                        .into());
                }
            }
        }
        self.skip_misc()
    }

    /// Skip whitespace and comments between markup
    fn skip_misc(&mut self) -> ConversionResult<()> {
        loop {
            self.deadline.check()?;
            self.cursor.skip_whitespace();
            if self.cursor.matches("<!--") {
                let start = self.cursor.position();
                loop {
                    if self.cursor.matches("-->") {
                        for _ in 0..3 {
                            self.cursor.advance();
                        }
                        break;
                    }
                    if self.cursor.advance().is_none() {
                        return Err(self
                            .cursor
                            .error_at(start, "Unterminated comment")
                            .into());
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self, depth: usize) -> ConversionResult<(String, Value)> {
        self.deadline.check()?;
        if depth > self.max_depth {
            return Err(ConversionError::conversion(
                ConversionErrorKind::DepthExceeded {
                    depth,
                    limit: self.max_depth,
                },
            ));
        }

        let open = self.cursor.position();
        self.cursor.advance(); // '<'
        let name = self.parse_name()?;

        let mut members = Object::new();
        let attributes = self.parse_attributes()?;
        for (key, value) in attributes {
            let prefixed = format!("{}{}", self.options.attribute_prefix, key);
            Value::insert_member(&mut members, prefixed, coerce_scalar(&value));
        }

        if self.cursor.matches("/>") {
            self.cursor.advance();
            self.cursor.advance();
            return Ok((name, finish_element(members, String::new())));
        }
        if !self.cursor.eat('>') {
            return Err(self
                .cursor
                .error_at(open, format!("Malformed start tag '<{}>'", name))
                .into());
        }

        let mut text = String::new();
        loop {
            self.deadline.check()?;
            if self.cursor.matches("</") {
                self.cursor.advance();
                self.cursor.advance();
                let close = self.parse_name()?;
                self.cursor.skip_whitespace();
                if !self.cursor.eat('>') {
                    return Err(self.cursor.error("Malformed closing tag").into());
                }
                if close != name {
                    return Err(self
                        .cursor
                        .error_at(
                            open,
                            format!("Mismatched tags: '<{}>' closed by '</{}>'", name, close),
                        )
                        .into());
                }
                return Ok((name, finish_element(members, text)));
            }
            if self.cursor.matches("<!--") {
                self.skip_misc()?;
                continue;
            }
            if self.cursor.matches("<![CDATA[") {
                let content = self.parse_cdata()?;
                if self.options.cdata {
                    text.push_str(&content);
                }
                continue;
            }
            match self.cursor.peek() {
                Some('<') => {
                    let (child_name, child_value) = self.parse_element(depth + 1)?;
                    append_child(&mut members, child_name, child_value);
                }
                Some(_) => {
                    let chunk = self.parse_text()?;
                    text.push_str(&chunk);
                }
                None => {
                    return Err(self
                        .cursor
                        .error_at(open, format!("Unterminated element '<{}>'", name))
                        .into());
                }
            }
        }
    }

    fn parse_name(&mut self) -> ConversionResult<String> {
        let mut name = String::new();
        while matches!(
            self.cursor.peek(),
            Some(c) if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
        ) {
            name.push(self.cursor.advance().unwrap());
        }
        if name.is_empty() {
            return Err(self.cursor.error("Expected element name").into());
        }
        Ok(name)
    }

    fn parse_attributes(&mut self) -> ConversionResult<Vec<(String, String)>> {
        let mut attributes = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                Some('>') | Some('/') | None => return Ok(attributes),
                _ => {}
            }
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            if !self.cursor.eat('=') {
                return Err(self
                    .cursor
                    .error(format!("Expected '=' after attribute '{}'", name))
                    .into());
            }
            self.cursor.skip_whitespace();
            let quote = match self.cursor.peek() {
                Some(q @ ('"' | '\'')) => {
                    self.cursor.advance();
                    q
                }
                _ => return Err(self.cursor.error("Expected quoted attribute value").into()),
            };
            let start = self.cursor.position();
            let mut raw = String::new();
            loop {
                match self.cursor.advance() {
                    Some(c) if c == quote => break,
                    Some(c) => raw.push(c),
                    None => {
                        return Err(self
                            .cursor
                            .error_at(start, "Unterminated attribute value")
                            .into());
                    }
                }
            }
            attributes.push((name, unescape_entities(&raw)));
        }
    }

    fn parse_cdata(&mut self) -> ConversionResult<String> {
        let start = self.cursor.position();
        for _ in 0.."<![CDATA[".len() {
            self.cursor.advance();
        }
        let mut content = String::new();
        loop {
            self.deadline.check()?;
            if self.cursor.matches("]]>") {
                for _ in 0..3 {
                    self.cursor.advance();
                }
                return Ok(content);
            }
            match self.cursor.advance() {
                Some(c) => content.push(c),
                None => {
                    return Err(self
                        .cursor
                        .error_at(start, "Unterminated CDATA section")
                        .into());
                }
            }
        }
    }

    fn parse_text(&mut self) -> ConversionResult<String> {
        let mut raw = String::new();
        while matches!(self.cursor.peek(), Some(c) if c != '<') {
            self.deadline.check()?;
            raw.push(self.cursor.advance().unwrap());
        }
        Ok(unescape_entities(raw.trim()))
    }
}

/// Fold a parsed element's members and text into a value
fn finish_element(members: Object, text: String) -> Value {
    if members.is_empty() {
        if text.is_empty() {
            Value::Null
        } else {
            coerce_scalar(&text)
        }
    } else {
        let mut members = members;
        if !text.is_empty() {
            Value::insert_member(&mut members, TEXT_KEY.to_string(), coerce_scalar(&text));
        }
        Value::Object(members)
    }
}

/// Add a child element, collapsing repeated tags into an array
fn append_child(members: &mut Object, name: String, value: Value) {
    match members.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::replace(existing, Value::Null);
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            members.insert(name, value);
        }
    }
}

fn unescape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '&' {
            if let Some(end) = chars[i..].iter().position(|&c| c == ';') {
                let entity: String = chars[i + 1..i + end].iter().collect();
                let replacement = match entity.as_str() {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "amp" => Some('&'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ => entity
                        .strip_prefix("#x")
                        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                        .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                        .and_then(char::from_u32),
                };
                if let Some(c) = replacement {
                    out.push(c);
                    i += end + 1;
                    continue;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    fn parse_default(text: &str) -> ConversionResult<Value> {
        parse(text, &ConversionOptions::default(), &Deadline::unbounded())
    }

    #[test]
    fn test_simple_document() {
        let value = parse_default(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<person><name>John</name><age>30</age></person>",
        )
        .unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["name"], Value::String("John".to_string()));
        assert_eq!(object["age"], Value::Number(Number::Int(30)));
    }

    #[test]
    fn test_repeated_siblings_collapse_to_array() {
        let value =
            parse_default("<root><item>1</item><item>2</item><item>3</item></root>").unwrap();
        let object = value.as_object().unwrap();
        let items = object["item"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], Value::Number(Number::Int(3)));
    }

    #[test]
    fn test_attributes_get_prefixed() {
        let value = parse_default(r#"<root><user id="7">Ann</user></root>"#).unwrap();
        let user = value.as_object().unwrap()["user"].as_object().unwrap();
        assert_eq!(user["@id"], Value::Number(Number::Int(7)));
        assert_eq!(user[TEXT_KEY], Value::String("Ann".to_string()));
    }

    #[test]
    fn test_cdata_preserved() {
        let value = parse_default("<root><code><![CDATA[a < b && c]]></code></root>").unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["code"], Value::String("a < b && c".to_string()));
    }

    #[test]
    fn test_entities_unescaped() {
        let value = parse_default("<root><s>a &lt; b &amp; &#65;</s></root>").unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["s"], Value::String("a < b & A".to_string()));
    }

    #[test]
    fn test_empty_element_is_null() {
        let value = parse_default("<root><a/><b></b></root>").unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["a"], Value::Null);
        assert_eq!(object["b"], Value::Null);
    }

    #[test]
    fn test_mismatched_tags() {
        let err = parse_default("<root><a>x</b></root>").unwrap_err();
        assert!(err.user_message().contains("Mismatched tags"));
    }

    #[test]
    fn test_unterminated_element() {
        assert!(parse_default("<root><a>x").is_err());
    }

    #[test]
    fn test_comments_skipped() {
        let value = parse_default("<!-- doc --><root><!-- x --><a>1</a></root>").unwrap();
        assert_eq!(
            value.as_object().unwrap()["a"],
            Value::Number(Number::Int(1))
        );
    }
}
