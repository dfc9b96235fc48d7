//! Resource guard: size, depth, timeout and abuse-pattern checks
//!
//! Size and abuse checks run before parsing, the depth check runs on the
//! parsed tree, and the output size check runs after serialization. The
//! timeout is cooperative: hot loops call [`Deadline::check`] at a
//! bounded cadence instead of relying on preemption.

use crate::conversion::config::Limits;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::value::Value;
use std::time::{Duration, Instant};

/// Fail if the input exceeds the configured byte limit
pub fn check_input_size(text: &str, limits: &Limits) -> ConversionResult<()> {
    if text.len() > limits.max_input_bytes {
        return Err(ConversionError::conversion(
            ConversionErrorKind::InputTooLarge {
                size: text.len(),
                limit: limits.max_input_bytes,
            },
        ));
    }
    Ok(())
}

/// Fail if the serialized output exceeds the configured byte limit
pub fn check_output_size(text: &str, limits: &Limits) -> ConversionResult<()> {
    if text.len() > limits.max_output_bytes {
        return Err(ConversionError::conversion(
            ConversionErrorKind::OutputTooLarge {
                size: text.len(),
                limit: limits.max_output_bytes,
            },
        ));
    }
    Ok(())
}

/// Fail if the parsed tree nests deeper than the configured limit
pub fn check_depth(value: &Value, limits: &Limits) -> ConversionResult<()> {
    let depth = value.depth();
    if depth > limits.max_depth {
        return Err(ConversionError::conversion(
            ConversionErrorKind::DepthExceeded {
                depth,
                limit: limits.max_depth,
            },
        ));
    }
    Ok(())
}

/// Reject degenerate inputs before parsing
///
/// Two classes are refused outright: runs of one repeated character
/// beyond `max_repeat_run`, and any denylisted substring. Payloads are
/// never sanitized, so the caller always learns the input was refused.
pub fn scan_for_abuse(text: &str, limits: &Limits, denylist: &[String]) -> ConversionResult<()> {
    let mut run = 0usize;
    let mut previous: Option<char> = None;
    for c in text.chars() {
        if previous == Some(c) {
            run += 1;
            if run > limits.max_repeat_run {
                return Err(ConversionError::conversion(
                    ConversionErrorKind::abuse_pattern(format!(
                        "run of more than {} repeated '{}' characters",
                        limits.max_repeat_run,
                        c.escape_default()
                    )),
                ));
            }
        } else {
            previous = Some(c);
            run = 1;
        }
    }

    let lowered = text.to_lowercase();
    for pattern in denylist {
        if lowered.contains(&pattern.to_lowercase()) {
            return Err(ConversionError::conversion(
                ConversionErrorKind::abuse_pattern(format!(
                    "denylisted pattern '{}' present in input",
                    pattern
                )),
            ));
        }
    }

    Ok(())
}

/// How many units of work pass between deadline checks
const CHECK_CADENCE: u32 = 1024;

/// Cooperative wall-clock deadline
///
/// Parsers and serializers call [`Deadline::check`] once per consumed
/// character or emitted node; the actual clock read happens every
/// `CHECK_CADENCE` calls, bounding both overhead and worst-case
/// timeout overshoot.
#[derive(Debug)]
pub struct Deadline {
    started: Instant,
    timeout: Duration,
    ticks: std::cell::Cell<u32>,
}

impl Deadline {
    pub fn new(timeout: Duration) -> Self {
        Self {
            started: Instant::now(),
            timeout,
            ticks: std::cell::Cell::new(0),
        }
    }

    pub fn from_limits(limits: &Limits) -> Self {
        Self::new(limits.timeout())
    }

    /// A deadline that never expires, for standalone parser use
    pub fn unbounded() -> Self {
        Self::new(Duration::from_secs(u64::MAX / 4))
    }

    /// Count one unit of work; read the clock at the check cadence
    pub fn check(&self) -> ConversionResult<()> {
        let ticks = self.ticks.get().wrapping_add(1);
        self.ticks.set(ticks);
        if ticks % CHECK_CADENCE != 0 {
            return Ok(());
        }
        self.check_now()
    }

    /// Unconditional clock read
    pub fn check_now(&self) -> ConversionResult<()> {
        let elapsed = self.started.elapsed();
        if elapsed > self.timeout {
            return Err(ConversionError::conversion(
                ConversionErrorKind::TimeoutExceeded {
                    elapsed_ms: elapsed.as_millis() as u64,
                    limit_ms: self.timeout.as_millis() as u64,
                },
            ));
        }
        Ok(())
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
