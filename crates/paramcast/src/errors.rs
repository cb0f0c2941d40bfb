//! Error types for schema compilation and casting
//!
//! Compilation problems are programming errors and fail fast through
//! [`SchemaError`]. Casting problems are data errors: they accumulate as
//! [`CastError`] values on the changeset, each one carrying the [`FieldPath`]
//! it was recorded at so nested and indexed failures stay addressable.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

// ============================================================================
// FieldPath - where in the input an error was recorded
// ============================================================================

/// One step in a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named field, e.g. `address`
    Name(String),
    /// List element, e.g. `[2]`
    Index(usize),
}

/// Path from the input root down to a field or list element
///
/// Renders as `a.b[0].c`. The empty path addresses the input root itself,
/// which only happens when the whole input is not a map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Empty path addressing the input root
    pub fn root() -> Self {
        Self::default()
    }

    /// Single-segment path for a top-level field
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Name(name.into())],
        }
    }

    /// Extend with a named field segment
    pub fn join(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Name(name.into()));
        Self { segments }
    }

    /// Extend with a list index segment
    pub fn join_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// True for the empty root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path's segments, outermost first
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Re-root this path under `prefix`
    pub(crate) fn prefixed(&self, prefix: &FieldPath) -> FieldPath {
        if prefix.is_root() {
            return self.clone();
        }
        let mut segments = prefix.segments.clone();
        segments.extend(self.segments.iter().cloned());
        FieldPath { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Name(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// ErrorKind - the closed set of casting failures
// ============================================================================

/// What went wrong at a given path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required field was absent or explicitly null
    MissingRequired,
    /// A scalar value could not be coerced to the declared type
    TypeMismatch {
        /// Declared type name
        expected: &'static str,
        /// Type name of the supplied value
        actual: &'static str,
    },
    /// An embedded field (or the input root) did not have the right shape
    InvalidRelation {
        /// Shape the schema expects, `object` or `array`
        expected: &'static str,
    },
    /// A failure reported by a validation hook
    UserRule {
        /// Machine-readable rule code
        code: String,
        /// Human-readable message
        message: String,
    },
}

impl ErrorKind {
    /// Build a hook-reported error
    pub fn user(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UserRule {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this kind
    pub fn code(&self) -> &str {
        match self {
            Self::MissingRequired => "missing_required",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::InvalidRelation { .. } => "invalid_relation",
            Self::UserRule { code, .. } => code,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => write!(f, "required field is missing"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Self::InvalidRelation { expected } => {
                write!(f, "invalid embedded value, expected {expected}")
            }
            Self::UserRule { message, .. } => write!(f, "{message}"),
        }
    }
}

// ============================================================================
// CastError - one accumulated failure
// ============================================================================

/// A single casting failure, addressed by path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastError {
    /// Where the failure was recorded
    pub path: FieldPath,
    /// What went wrong
    pub kind: ErrorKind,
}

impl CastError {
    /// Build an error at a path
    pub fn new(path: FieldPath, kind: ErrorKind) -> Self {
        Self { path, kind }
    }
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

// ============================================================================
// SchemaError - fail-fast compilation errors
// ============================================================================

/// Error raised while compiling a raw schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Two declarations resolve to the same field name
    #[error("duplicate field `{field}` in schema `{schema}`")]
    DuplicateField {
        /// Schema being compiled
        schema: String,
        /// Offending field name (required marker stripped)
        field: String,
    },

    /// A field name is empty or contains reserved characters
    #[error("invalid field name `{name}` in schema `{schema}`")]
    InvalidFieldName {
        /// Schema being compiled
        schema: String,
        /// Name as declared
        name: String,
    },

    /// A declared default does not fit the field's type
    #[error("invalid default for `{schema}.{field}`: expected {expected}")]
    InvalidDefault {
        /// Schema being compiled
        schema: String,
        /// Field carrying the default
        field: String,
        /// Shape the default must have
        expected: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = FieldPath::field("pets").join_index(2).join("name");
        assert_eq!(path.to_string(), "pets[2].name");
        assert_eq!(FieldPath::root().to_string(), "");
    }

    #[test]
    fn test_path_prefixing() {
        let inner = FieldPath::field("city");
        let lifted = inner.prefixed(&FieldPath::field("address"));
        assert_eq!(lifted.to_string(), "address.city");
        assert_eq!(inner.prefixed(&FieldPath::root()), inner);
    }

    #[test]
    fn test_error_display() {
        let err = CastError::new(
            FieldPath::field("age"),
            ErrorKind::TypeMismatch {
                expected: "integer",
                actual: "string",
            },
        );
        assert_eq!(err.to_string(), "age: expected integer, got string");

        let root = CastError::new(FieldPath::root(), ErrorKind::InvalidRelation { expected: "object" });
        assert_eq!(root.to_string(), "invalid embedded value, expected object");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorKind::MissingRequired.code(), "missing_required");
        assert_eq!(ErrorKind::user("inclusion", "not allowed").code(), "inclusion");
    }

    #[test]
    fn test_error_serialization() {
        let err = CastError::new(
            FieldPath::field("pets").join_index(0).join("age"),
            ErrorKind::TypeMismatch {
                expected: "integer",
                actual: "null",
            },
        );
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "path": "pets[0].age",
                "kind": {
                    "kind": "type_mismatch",
                    "expected": "integer",
                    "actual": "null",
                }
            })
        );
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::DuplicateField {
            schema: "User".to_string(),
            field: "login".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate field `login` in schema `User`");
    }
}
