//! Format-agnostic value tree
//!
//! Every parser produces a `Value` and every serializer consumes one.
//! Objects keep source insertion order; key sorting is applied at
//! serialization time and never mutates a parsed tree.

use indexmap::IndexMap;
use std::fmt;

/// A numeric value that remembers whether it was written as an integer
///
/// Integers representable in 64 bits keep exact magnitude; everything
/// else is carried as `f64` and rendered under the configured precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Int(_))
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(*i),
            Number::Float(_) => None,
        }
    }

    /// Parse a numeric literal, preferring the integer representation
    pub fn from_literal(literal: &str) -> Option<Self> {
        if let Ok(i) = literal.parse::<i64>() {
            return Some(Number::Int(i));
        }
        match literal.parse::<f64>() {
            Ok(f) if f.is_finite() => Some(Number::Float(f)),
            _ => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Insertion-ordered object map
pub type Object = IndexMap<String, Value>;

/// The generic tree all formats convert through
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Object),
}

impl Value {
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Insert with last-write-wins duplicate handling
    ///
    /// `IndexMap::insert` keeps the original key position, so a duplicate
    /// key replaces the value without reordering the object.
    pub fn insert_member(object: &mut Object, key: String, value: Value) {
        object.insert(key, value);
    }

    /// Single-pass structural statistics used by the resource guard
    /// and result metadata
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        collect_stats(self, 1, &mut stats);
        stats
    }

    /// Maximum nesting depth of the tree (scalars count as depth 1)
    pub fn depth(&self) -> usize {
        self.stats().depth
    }
}

/// Depth and cardinality of a value tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Maximum nesting depth; a bare scalar is depth 1
    pub depth: usize,
    /// Total object keys across the tree
    pub key_count: usize,
    /// Total nodes, containers included
    pub value_count: usize,
}

fn collect_stats(value: &Value, depth: usize, stats: &mut TreeStats) {
    stats.depth = stats.depth.max(depth);
    stats.value_count += 1;

    match value {
        Value::Array(items) => {
            for item in items {
                collect_stats(item, depth + 1, stats);
            }
        }
        Value::Object(members) => {
            stats.key_count += members.len();
            for member in members.values() {
                collect_stats(member, depth + 1, stats);
            }
        }
        _ => {}
    }
}
