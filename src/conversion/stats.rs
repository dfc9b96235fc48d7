//! Conversion metadata and aggregate statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::Format;
use crate::value::TreeStats;

/// Per-conversion measurements attached to every successful result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionMetadata {
    pub source_format: Format,
    pub target_format: Format,
    /// Input size in bytes
    pub original_size: usize,
    /// Output size in bytes
    pub converted_size: usize,
    /// Fraction of input bytes saved; negative when the output grew
    pub compression_ratio: f64,
    pub parse_time_ms: f64,
    pub serialize_time_ms: f64,
    pub total_time_ms: f64,
    /// Maximum nesting depth of the parsed tree
    pub depth: usize,
    /// Total object keys across the tree
    pub key_count: usize,
    /// Total nodes, containers included
    pub value_count: usize,
    /// Whether the repair pass was applied before the successful parse
    pub repaired: bool,
}

impl ConversionMetadata {
    pub fn new(
        source_format: Format,
        target_format: Format,
        original_size: usize,
        converted_size: usize,
        tree: TreeStats,
    ) -> Self {
        let compression_ratio = if original_size > 0 {
            (original_size as f64 - converted_size as f64) / original_size as f64
        } else {
            0.0
        };
        Self {
            source_format,
            target_format,
            original_size,
            converted_size,
            compression_ratio,
            parse_time_ms: 0.0,
            serialize_time_ms: 0.0,
            total_time_ms: 0.0,
            depth: tree.depth,
            key_count: tree.key_count,
            value_count: tree.value_count,
            repaired: false,
        }
    }
}

/// Running totals across many conversions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionStatistics {
    pub conversions: usize,
    pub failures: usize,
    pub repaired: usize,
    pub total_input_bytes: usize,
    pub total_output_bytes: usize,
    pub total_time_ms: f64,
    pub last_updated: DateTime<Utc>,
}

impl Default for ConversionStatistics {
    fn default() -> Self {
        Self {
            conversions: 0,
            failures: 0,
            repaired: 0,
            total_input_bytes: 0,
            total_output_bytes: 0,
            total_time_ms: 0.0,
            last_updated: Utc::now(),
        }
    }
}

impl ConversionStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, metadata: &ConversionMetadata) {
        self.conversions += 1;
        if metadata.repaired {
            self.repaired += 1;
        }
        self.total_input_bytes += metadata.original_size;
        self.total_output_bytes += metadata.converted_size;
        self.total_time_ms += metadata.total_time_ms;
        self.last_updated = Utc::now();
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
        self.last_updated = Utc::now();
    }

    /// Fold another set of totals into this one
    pub fn combine(&mut self, other: &ConversionStatistics) {
        self.conversions += other.conversions;
        self.failures += other.failures;
        self.repaired += other.repaired;
        self.total_input_bytes += other.total_input_bytes;
        self.total_output_bytes += other.total_output_bytes;
        self.total_time_ms += other.total_time_ms;
        self.last_updated = self.last_updated.max(other.last_updated);
    }

    /// Mean fraction of input bytes saved across recorded conversions
    pub fn average_compression_ratio(&self) -> f64 {
        if self.total_input_bytes > 0 {
            (self.total_input_bytes as f64 - self.total_output_bytes as f64)
                / self.total_input_bytes as f64
        } else {
            0.0
        }
    }

    pub fn average_time_ms(&self) -> f64 {
        if self.conversions > 0 {
            self.total_time_ms / self.conversions as f64
        } else {
            0.0
        }
    }
}
