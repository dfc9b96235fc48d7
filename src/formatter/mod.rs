//! Format serializers
//!
//! Each submodule exposes `serialize(value, options, deadline)`
//! returning the rendered text; the recursive writers count every
//! emitted node against the deadline. Shared concerns live here:
//! number rendering under the configured precision, serialization-time
//! key ordering, and indent handling. Serializers are total for
//! structurally legal trees; the explicit exceptions (CSV/TOML
//! structure mismatches, non-finite floats) surface as typed errors.

pub mod csv;
pub mod json;
pub mod toml;
pub mod xml;
pub mod yaml;

use crate::conversion::config::{ConversionOptions, KeyOrder, OutputStyle};
use crate::error::{FormatError, FormatResult};
use crate::value::{Number, Object, Value};

/// Render a number honoring the integer flag and fractional precision
///
/// Integers render bare; floats keep at least one fractional digit so
/// `30` and `30.0` stay distinguishable after a round trip.
pub fn render_number(number: &Number, precision: usize) -> FormatResult<String> {
    match number {
        Number::Int(i) => Ok(i.to_string()),
        Number::Float(f) => {
            if !f.is_finite() {
                return Err(FormatError::non_finite_number(format!(
                    "{} cannot be serialized",
                    f
                )));
            }
            let rendered = format!("{:.*}", precision.max(1), f);
            let trimmed = rendered.trim_end_matches('0');
            if trimmed.ends_with('.') {
                Ok(format!("{}0", trimmed))
            } else {
                Ok(trimmed.to_string())
            }
        }
    }
}

/// Members of an object in serialization order
///
/// Sorting is applied here, at emit time; the parsed tree is never
/// mutated.
pub fn ordered_members<'a>(members: &'a Object, order: KeyOrder) -> Vec<(&'a str, &'a Value)> {
    let mut entries: Vec<(&str, &Value)> =
        members.iter().map(|(k, v)| (k.as_str(), v)).collect();
    match order {
        KeyOrder::Preserve => {}
        KeyOrder::Ascending => entries.sort_by(|a, b| a.0.cmp(b.0)),
        KeyOrder::Descending => entries.sort_by(|a, b| b.0.cmp(a.0)),
    }
    entries
}

/// Indent string for one nesting level under the configured style
pub fn indent_unit(options: &ConversionOptions) -> &'static str {
    match options.style {
        OutputStyle::Pretty => options.indent.unit(),
        OutputStyle::Compact | OutputStyle::Minified => "",
    }
}

/// Push `\uXXXX` escapes for one character (surrogate pair when needed)
pub fn push_unicode_escape(out: &mut String, c: char) {
    let mut buf = [0u16; 2];
    for unit in c.encode_utf16(&mut buf) {
        out.push_str(&format!("\\u{:04x}", unit));
    }
}
