//! Scalar coercion
//!
//! The caster delegates every scalar conversion to a [`TypeCoercer`].
//! [`StandardCoercer`] is the built-in implementation: lossless, conservative
//! conversions only, with temporal and UUID types validated as formatted
//! strings rather than parsed into dedicated representations. Swap in a
//! custom coercer through
//! [`CastOptions::coercer`](crate::cast::CastOptions::coercer) to change the
//! rules for a whole cast call, nested embeds included.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::field::{CoercionOptions, ScalarType};
use crate::value::Value;

// ============================================================================
// Pre-compiled Format Patterns
// ============================================================================

/// Date pattern (YYYY-MM-DD)
static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap()
});

/// Time pattern (HH:MM:SS with optional fractional seconds)
/// Note: This validates format only, not valid time ranges
static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d):([0-5]\d)(\.\d{1,9})?$").unwrap()
});

/// ISO 8601 DateTime pattern
static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,9})?(Z|[+-]\d{2}:\d{2})$").unwrap()
});

/// UUID pattern (canonical hyphenated form, any version)
static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

// ============================================================================
// Format Checks
// ============================================================================

/// Check date format (YYYY-MM-DD)
///
/// # Example
/// ```
/// use paramcast::coerce::valid_date;
///
/// assert!(valid_date("2024-03-01"));
/// assert!(!valid_date("01/03/2024"));
/// ```
pub fn valid_date(value: &str) -> bool {
    DATE_REGEX.is_match(value)
}

/// Check time format (HH:MM:SS, optional fractional seconds)
///
/// # Example
/// ```
/// use paramcast::coerce::valid_time;
///
/// assert!(valid_time("23:59:59"));
/// assert!(valid_time("08:30:00.250"));
/// assert!(!valid_time("24:00:00"));
/// ```
pub fn valid_time(value: &str) -> bool {
    TIME_REGEX.is_match(value)
}

/// Check ISO 8601 datetime format
///
/// # Example
/// ```
/// use paramcast::coerce::valid_datetime;
///
/// assert!(valid_datetime("2024-03-01T10:30:00Z"));
/// assert!(valid_datetime("2024-03-01T10:30:00+08:00"));
/// assert!(!valid_datetime("2024-03-01 10:30:00"));
/// ```
pub fn valid_datetime(value: &str) -> bool {
    DATETIME_REGEX.is_match(value)
}

/// Check UUID format (canonical hyphenated form)
///
/// # Example
/// ```
/// use paramcast::coerce::valid_uuid;
///
/// assert!(valid_uuid("550e8400-e29b-41d4-a716-446655440000"));
/// assert!(!valid_uuid("550e8400e29b41d4a716446655440000"));
/// ```
pub fn valid_uuid(value: &str) -> bool {
    UUID_REGEX.is_match(value)
}

// ============================================================================
// TypeCoercer - pluggable conversion capability
// ============================================================================

/// Failed coercion, reported as expected/actual type names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    /// Declared type name
    pub expected: &'static str,
    /// Type name of the supplied value
    pub actual: &'static str,
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, got {}", self.expected, self.actual)
    }
}

impl std::error::Error for CoerceError {}

/// Converts one raw scalar into its declared type
///
/// Implementations must be pure with respect to the inputs: the caster may
/// call them in any order and never retries a failed conversion.
pub trait TypeCoercer: Send + Sync {
    /// Convert `raw` to scalar type `ty`, or explain the mismatch
    fn coerce(
        &self,
        raw: &Value,
        ty: ScalarType,
        options: &CoercionOptions,
    ) -> Result<Value, CoerceError>;
}

/// Shared handle to a coercer
pub type SharedCoercer = Arc<dyn TypeCoercer>;

// ============================================================================
// StandardCoercer - built-in conversion rules
// ============================================================================

/// Built-in coercion rules
///
/// | Target    | Accepted inputs                                   |
/// |-----------|---------------------------------------------------|
/// | string    | string                                            |
/// | integer   | integer, numeric string                           |
/// | float     | float, integer, numeric string                    |
/// | boolean   | boolean, `"true"`/`"false"`/`"1"`/`"0"`           |
/// | date      | string matching `YYYY-MM-DD`                      |
/// | time      | string matching `HH:MM:SS`                        |
/// | datetime  | ISO 8601 string                                   |
/// | uuid      | canonical hyphenated UUID string                  |
///
/// Floats honor an integer `precision` option by rounding to that many
/// decimal places. No other option is interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCoercer;

impl StandardCoercer {
    fn coerce_string(raw: &Value) -> Option<Value> {
        match raw {
            Value::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }

    fn coerce_integer(raw: &Value) -> Option<Value> {
        match raw {
            Value::Int(i) => Some(Value::Int(*i)),
            Value::String(s) => s.parse::<i64>().ok().map(Value::Int),
            _ => None,
        }
    }

    fn coerce_float(raw: &Value, options: &CoercionOptions) -> Option<Value> {
        let parsed = match raw {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|f| f.is_finite())
            .map(|f| Value::Float(apply_precision(f, options)))
    }

    fn coerce_boolean(raw: &Value) -> Option<Value> {
        match raw {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::String(s) => match s.as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }

    fn coerce_formatted(raw: &Value, check: fn(&str) -> bool) -> Option<Value> {
        match raw {
            Value::String(s) if check(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }
}

impl TypeCoercer for StandardCoercer {
    fn coerce(
        &self,
        raw: &Value,
        ty: ScalarType,
        options: &CoercionOptions,
    ) -> Result<Value, CoerceError> {
        let converted = match ty {
            ScalarType::String => Self::coerce_string(raw),
            ScalarType::Integer => Self::coerce_integer(raw),
            ScalarType::Float => Self::coerce_float(raw, options),
            ScalarType::Boolean => Self::coerce_boolean(raw),
            ScalarType::Date => Self::coerce_formatted(raw, valid_date),
            ScalarType::Time => Self::coerce_formatted(raw, valid_time),
            ScalarType::DateTime => Self::coerce_formatted(raw, valid_datetime),
            ScalarType::Uuid => Self::coerce_formatted(raw, valid_uuid),
        };
        converted.ok_or_else(|| CoerceError {
            expected: ty.type_name(),
            actual: raw.type_name(),
        })
    }
}

/// Round to the integer `precision` option when present
fn apply_precision(value: f64, options: &CoercionOptions) -> f64 {
    match options.get("precision") {
        Some(Value::Int(digits)) if (0..=15).contains(digits) => {
            let factor = 10f64.powi(*digits as i32);
            (value * factor).round() / factor
        }
        _ => value,
    }
}
