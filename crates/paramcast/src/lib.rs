//! Paramcast
//!
//! Schema-driven parameter casting and validation.
//!
//! Declare the shape of expected input once, in a terse schema language,
//! and get three things for every raw payload:
//! - **casting**: string-keyed, loosely typed input coerced into declared
//!   scalar types, recursively through embedded maps and lists
//! - **validation**: required checks, type mismatches, and user rules
//!   accumulated as addressable errors, never short-circuiting
//! - **projection**: a deterministic output value layered from pre-existing
//!   data, schema defaults, accepted changes, and explicit nulls
//!
//! The pipeline is `RawSchema` → [`Schema::compile`] → [`cast`], with
//! [`cast_changeset`] and [`project`] exposed separately for callers that
//! want to inspect or amend the intermediate [`Changeset`].
//!
//! # Example
//!
//! ```rust
//! use paramcast::{cast, CastOptions, RawSchema, ScalarType, Schema, Value};
//!
//! let schema = Schema::compile(
//!     RawSchema::new()
//!         .field("login!", ScalarType::String)
//!         .field("age", ScalarType::Integer),
//!     "User",
//! )
//! .unwrap();
//!
//! // numeric strings coerce; unknown keys are ignored
//! let raw = Value::from(serde_json::json!({"login": "kim", "age": "41", "junk": true}));
//! let value = cast(&schema, &raw, &CastOptions::new()).unwrap();
//! assert_eq!(value.get("age"), Some(&Value::Int(41)));
//! assert!(!value.contains_key("junk"));
//!
//! // failures come back as a changeset with every error, not just the first
//! let raw = Value::from(serde_json::json!({"age": "forty-one"}));
//! let changeset = cast(&schema, &raw, &CastOptions::new()).unwrap_err();
//! assert_eq!(changeset.errors().len(), 2);
//! ```

// Public modules
pub mod cast;
pub mod changeset;
pub mod coerce;
pub mod errors;
pub mod field;
pub mod hook;
pub mod project;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use cast::{cast, cast_changeset, CastOptions};
pub use changeset::{Change, Changeset};
pub use coerce::{CoerceError, SharedCoercer, StandardCoercer, TypeCoercer};
pub use errors::{CastError, ErrorKind, FieldPath, PathSegment, SchemaError};
pub use field::{CoercionOptions, FieldDescriptor, FieldKind, ScalarType};
pub use hook::{hook_fn, FnHook, NoopHook, SharedHook, ValidationHook};
pub use project::{deep_merge, project, ProjectMode};
pub use schema::{FieldOptions, FieldSpec, RawSchema, Schema};
pub use value::Value;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
