//! Compiled field descriptors
//!
//! A [`FieldDescriptor`] is the schema compiler's output for one declared
//! field: resolved name, requiredness, kind, and per-field options. The
//! caster and projector walk slices of these; they never see raw schema
//! declarations.

use std::sync::Arc;

use crate::schema::Schema;
use crate::value::Value;

// ============================================================================
// ScalarType - leaf types a field can coerce to
// ============================================================================

/// Scalar target type of a field or array element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
    /// Boolean
    Boolean,
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// Wall-clock time, `HH:MM:SS` with optional fraction
    Time,
    /// ISO 8601 timestamp
    DateTime,
    /// UUID in canonical hyphenated form
    Uuid,
}

impl ScalarType {
    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Uuid => "uuid",
        }
    }
}

// ============================================================================
// FieldKind - shape of a compiled field
// ============================================================================

/// Compiled shape of a field
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Single scalar value
    Scalar(ScalarType),
    /// Homogeneous list of scalars
    Array(ScalarType),
    /// One embedded map cast against a sub-schema
    EmbedOne(Arc<Schema>),
    /// List of embedded maps, each cast against the same sub-schema
    EmbedMany(Arc<Schema>),
}

impl FieldKind {
    /// Embedded fields get relation treatment during casting
    pub fn is_relation(&self) -> bool {
        matches!(self, Self::EmbedOne(_) | Self::EmbedMany(_))
    }

    /// Short name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Array(_) => "array",
            Self::EmbedOne(_) => "embeds_one",
            Self::EmbedMany(_) => "embeds_many",
        }
    }
}

// ============================================================================
// CoercionOptions - opaque per-field options for the coercer
// ============================================================================

/// Options forwarded untouched to the [`TypeCoercer`](crate::coerce::TypeCoercer)
///
/// The engine never interprets these. The standard coercer understands
/// `precision` for floats; custom coercers may define their own keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercionOptions {
    entries: Vec<(String, Value)>,
}

impl CoercionOptions {
    /// Empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an option
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up an option by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// True when no options are set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// FieldDescriptor - one compiled field
// ============================================================================

/// One field of a compiled schema
///
/// Immutable once compiled; schemas hand out shared references only.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Resolved field name, required marker stripped
    pub name: String,
    /// Whether the field must be present and non-null in raw input
    pub required: bool,
    /// Shape and target type
    pub kind: FieldKind,
    /// Default injected at projection time when the field was never set
    pub default: Option<Value>,
    /// Opaque options for the coercer
    pub coercion: CoercionOptions,
}

impl FieldDescriptor {
    /// Embedded fields get relation treatment during casting
    pub fn is_relation(&self) -> bool {
        self.kind.is_relation()
    }
}
