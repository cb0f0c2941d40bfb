//! The casting engine
//!
//! [`cast`] drives the whole pipeline: walk the schema against the raw
//! input, coerce scalars, recurse into embeds, run the hook, then project
//! the result (or hand back the invalid changeset). [`cast_changeset`] stops
//! before projection for callers that want the intermediate result.
//!
//! Fields are processed in four buckets: required scalars, optional scalars,
//! required embeds, optional embeds. Declaration order is kept within each
//! bucket. Casting never short-circuits; every field is visited and every
//! failure recorded.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::changeset::{Change, Changeset};
use crate::coerce::{SharedCoercer, StandardCoercer};
use crate::errors::{ErrorKind, FieldPath};
use crate::field::{FieldDescriptor, FieldKind, ScalarType};
use crate::hook::SharedHook;
use crate::project::{project_value, ProjectMode};
use crate::schema::Schema;
use crate::value::Value;

// ============================================================================
// CastOptions - per-call configuration
// ============================================================================

/// Per-call casting options
///
/// ```rust
/// use paramcast::{CastOptions, ProjectMode, Value};
///
/// let options = CastOptions::new()
///     .mode(ProjectMode::Struct)
///     .target(Value::Object(vec![("age".to_string(), Value::Int(40))]));
/// # let _ = options;
/// ```
#[derive(Clone, Default)]
pub struct CastOptions {
    mode: ProjectMode,
    hook: Option<SharedHook>,
    target: Option<Value>,
    coercer: Option<SharedCoercer>,
}

impl CastOptions {
    /// Defaults: map-mode output, no target, schema hooks, standard coercer
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the output projection mode
    pub fn mode(mut self, mode: ProjectMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the root schema's hook for this call only
    ///
    /// Nested embeds still run their own schema's hooks.
    pub fn hook(mut self, hook: SharedHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Pre-existing data the cast applies on top of
    pub fn target(mut self, target: Value) -> Self {
        self.target = Some(target);
        self
    }

    /// Replace the coercer for this call, nested embeds included
    pub fn coercer(mut self, coercer: SharedCoercer) -> Self {
        self.coercer = Some(coercer);
        self
    }
}

impl std::fmt::Debug for CastOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CastOptions")
            .field("mode", &self.mode)
            .field("hook", &self.hook.is_some())
            .field("target", &self.target)
            .field("coercer", &self.coercer.is_some())
            .finish()
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Cast raw input against a schema and project the output value
///
/// Returns the projected output on success, or the full invalid changeset
/// with every accumulated error on failure.
pub fn cast(schema: &Arc<Schema>, raw: &Value, options: &CastOptions) -> Result<Value, Changeset> {
    let changeset = cast_changeset(schema, raw, options);
    if !changeset.is_valid() {
        return Err(changeset);
    }
    Ok(project_value(&changeset, options.mode))
}

/// Cast raw input against a schema, stopping before projection
pub fn cast_changeset(schema: &Arc<Schema>, raw: &Value, options: &CastOptions) -> Changeset {
    let coercer: SharedCoercer = options
        .coercer
        .clone()
        .unwrap_or_else(|| Arc::new(StandardCoercer));
    let changeset = cast_level(schema, raw, options.target.clone(), &coercer, options.hook.as_ref());
    debug!(
        schema = schema.name(),
        valid = changeset.is_valid(),
        "cast finished"
    );
    changeset
}

// ============================================================================
// One schema level
// ============================================================================

/// Cast one level: bucket walk, then exactly one hook invocation
fn cast_level(
    schema: &Arc<Schema>,
    raw: &Value,
    target: Option<Value>,
    coercer: &SharedCoercer,
    hook_override: Option<&SharedHook>,
) -> Changeset {
    let target = target.unwrap_or_else(|| schema.zero_value());
    let mut changeset = Changeset::new(schema.clone(), target);

    if raw.as_object().is_some() {
        cast_buckets(&mut changeset, schema, raw, coercer);
    } else {
        changeset.add_error(
            FieldPath::root(),
            ErrorKind::InvalidRelation { expected: "object" },
        );
    }

    match hook_override.or_else(|| schema.hook()) {
        Some(hook) => hook.call(changeset, raw),
        None => changeset,
    }
}

fn cast_buckets(changeset: &mut Changeset, schema: &Schema, raw: &Value, coercer: &SharedCoercer) {
    let (scalars, relations): (Vec<&FieldDescriptor>, Vec<&FieldDescriptor>) =
        schema.fields().iter().partition(|f| !f.is_relation());
    let (required_scalars, optional_scalars): (Vec<_>, Vec<_>) =
        scalars.into_iter().partition(|f| f.required);
    let (required_relations, optional_relations): (Vec<_>, Vec<_>) =
        relations.into_iter().partition(|f| f.required);

    for field in required_scalars
        .into_iter()
        .chain(optional_scalars)
        .chain(required_relations)
        .chain(optional_relations)
    {
        cast_field(changeset, field, raw, coercer);
    }
}

fn cast_field(
    changeset: &mut Changeset,
    field: &FieldDescriptor,
    raw: &Value,
    coercer: &SharedCoercer,
) {
    match raw.get(&field.name) {
        None => {
            // absent required fields with a declared default stay silent:
            // the default fills in at projection time
            if field.required && field.default.is_none() {
                changeset.add_field_error(&field.name, ErrorKind::MissingRequired);
            }
        }
        Some(Value::Null) => {
            changeset.mark_present(&field.name, true);
            if field.required {
                changeset.add_field_error(&field.name, ErrorKind::MissingRequired);
            }
        }
        Some(value) => {
            changeset.mark_present(&field.name, false);
            match &field.kind {
                FieldKind::Scalar(ty) => cast_scalar(changeset, field, value, *ty, coercer),
                FieldKind::Array(ty) => cast_scalar_array(changeset, field, value, *ty, coercer),
                FieldKind::EmbedOne(sub) => cast_embed_one(changeset, field, value, sub, coercer),
                FieldKind::EmbedMany(sub) => cast_embed_many(changeset, field, value, sub, coercer),
            }
        }
    }
}

// ============================================================================
// Field kinds
// ============================================================================

fn cast_scalar(
    changeset: &mut Changeset,
    field: &FieldDescriptor,
    value: &Value,
    ty: ScalarType,
    coercer: &SharedCoercer,
) {
    match coercer.coerce(value, ty, &field.coercion) {
        Ok(cast_value) => changeset.put_change(field.name.clone(), cast_value),
        Err(err) => {
            trace!(
                field = field.name.as_str(),
                expected = err.expected,
                actual = err.actual,
                "scalar coercion failed"
            );
            changeset.add_field_error(
                &field.name,
                ErrorKind::TypeMismatch {
                    expected: err.expected,
                    actual: err.actual,
                },
            );
        }
    }
}

fn cast_scalar_array(
    changeset: &mut Changeset,
    field: &FieldDescriptor,
    value: &Value,
    ty: ScalarType,
    coercer: &SharedCoercer,
) {
    let items = match value.as_list() {
        Some(items) => items,
        None => {
            changeset.add_field_error(
                &field.name,
                ErrorKind::TypeMismatch {
                    expected: "array",
                    actual: value.type_name(),
                },
            );
            return;
        }
    };

    let mut cast_items = Vec::with_capacity(items.len());
    let mut all_ok = true;
    for (index, item) in items.iter().enumerate() {
        match coercer.coerce(item, ty, &field.coercion) {
            Ok(cast_value) => cast_items.push(cast_value),
            Err(err) => {
                all_ok = false;
                changeset.add_error(
                    FieldPath::field(field.name.as_str()).join_index(index),
                    ErrorKind::TypeMismatch {
                        expected: err.expected,
                        actual: err.actual,
                    },
                );
            }
        }
    }
    // an array change lands whole or not at all
    if all_ok {
        changeset.put_change(field.name.clone(), Value::List(cast_items));
    }
}

fn cast_embed_one(
    changeset: &mut Changeset,
    field: &FieldDescriptor,
    value: &Value,
    sub: &Arc<Schema>,
    coercer: &SharedCoercer,
) {
    if value.as_object().is_some() {
        let nested = cast_level(sub, value, None, coercer, None);
        changeset.put_change(field.name.clone(), Change::One(nested));
    } else {
        changeset.add_field_error(
            &field.name,
            ErrorKind::InvalidRelation { expected: "object" },
        );
    }
}

fn cast_embed_many(
    changeset: &mut Changeset,
    field: &FieldDescriptor,
    value: &Value,
    sub: &Arc<Schema>,
    coercer: &SharedCoercer,
) {
    let items = match value.as_list() {
        Some(items) => items,
        None => {
            changeset.add_field_error(
                &field.name,
                ErrorKind::InvalidRelation { expected: "array" },
            );
            return;
        }
    };

    // an empty list does not satisfy a required embed
    if field.required && items.is_empty() {
        changeset.add_field_error(&field.name, ErrorKind::MissingRequired);
    }

    let results: Vec<Changeset> = items
        .iter()
        .map(|item| cast_level(sub, item, None, coercer, None))
        .collect();
    changeset.put_change(field.name.clone(), Change::Many(results));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawSchema;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> Value {
        Value::from(value)
    }

    #[test]
    fn test_root_input_must_be_object() {
        let schema = Schema::compile(
            RawSchema::new().field("a", ScalarType::Integer),
            "Root",
        )
        .unwrap();
        let changeset = cast_changeset(&schema, &raw(json!([1, 2])), &CastOptions::new());
        assert!(!changeset.is_valid());
        let errors = changeset.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].path.is_root());
        assert_eq!(errors[0].kind.code(), "invalid_relation");
    }

    #[test]
    fn test_error_order_follows_buckets() {
        // optional scalar declared first, required scalar second: the
        // required bucket still reports first
        let schema = Schema::compile(
            RawSchema::new()
                .field("nickname", ScalarType::Integer)
                .field("login!", ScalarType::String),
            "User",
        )
        .unwrap();
        let changeset = cast_changeset(
            &schema,
            &raw(json!({ "nickname": true })),
            &CastOptions::new(),
        );
        let errors = changeset.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path.to_string(), "login");
        assert_eq!(errors[1].path.to_string(), "nickname");
    }

    #[test]
    fn test_duplicate_raw_keys_first_wins() {
        let schema = Schema::compile(
            RawSchema::new().field("age", ScalarType::Integer),
            "User",
        )
        .unwrap();
        let input = Value::Object(vec![
            ("age".to_string(), Value::Int(1)),
            ("age".to_string(), Value::Int(2)),
        ]);
        let changeset = cast_changeset(&schema, &input, &CastOptions::new());
        assert_eq!(changeset.change_value("age"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_presence_recorded_per_mention() {
        let schema = Schema::compile(
            RawSchema::new()
                .field("a", ScalarType::Integer)
                .field("b", ScalarType::Integer)
                .field("c", ScalarType::Integer),
            "Presence",
        )
        .unwrap();
        let changeset = cast_changeset(
            &schema,
            &raw(json!({ "a": 1, "b": null })),
            &CastOptions::new(),
        );
        assert!(changeset.mentioned("a"));
        assert!(changeset.explicit_null("b"));
        assert!(!changeset.mentioned("c"));
        assert!(changeset.is_valid());
    }
}
