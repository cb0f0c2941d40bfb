//! Output projection
//!
//! A valid changeset is not the final answer. [`project`] folds four layers
//! into one output value, later layers winning per deep-merged path:
//!
//! 1. the schema's zero shape, deep-merged under the pre-existing target
//! 2. schema defaults, filling slots that are still null
//! 3. accepted changes, embedded results merged recursively
//! 4. explicit nulls, which always win
//!
//! [`ProjectMode::Map`] then drops every field the caller never touched and
//! that has no default or surviving nested content, so the output mirrors
//! the input's sparseness. [`ProjectMode::Struct`] instead emits the full
//! declared shape with untouched fields as null. Keys the target carries
//! beyond the schema pass through untouched in both modes.

use crate::changeset::{Change, Changeset, Presence};
use crate::field::FieldKind;
use crate::schema::Schema;
use crate::value::Value;

// ============================================================================
// ProjectMode
// ============================================================================

/// Output shape selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectMode {
    /// Sparse output: untouched, defaultless fields are omitted
    #[default]
    Map,
    /// Full declared shape: untouched fields surface as null
    Struct,
}

// ============================================================================
// Projection
// ============================================================================

/// Project a changeset into its output value
///
/// Fails with a clone of the changeset when it (or any nested level) is
/// invalid. Projection of a valid changeset cannot fail and is idempotent
/// for a given mode.
pub fn project(changeset: &Changeset, mode: ProjectMode) -> Result<Value, Changeset> {
    if !changeset.is_valid() {
        return Err(changeset.clone());
    }
    Ok(project_value(changeset, mode))
}

pub(crate) fn project_value(changeset: &Changeset, mode: ProjectMode) -> Value {
    let schema = changeset.schema();

    // layer 1: zero shape under pre-existing data
    let mut acc = match changeset.target() {
        target @ Value::Object(_) => deep_merge(schema.zero_value(), target.clone()),
        _ => schema.zero_value(),
    };

    // layer 2: defaults fill slots that are still null
    apply_defaults(&mut acc, schema);

    // layer 3: accepted changes
    for (name, change) in changeset.changes() {
        match change {
            Change::Value(value) => acc.set(name, value.clone()),
            Change::One(nested) => {
                let projected = project_value(nested, mode);
                let current = acc.get(name).cloned().unwrap_or(Value::Null);
                acc.set(name, deep_merge(current, projected));
            }
            Change::Many(list) => {
                let projected: Vec<Value> =
                    list.iter().map(|nested| project_value(nested, mode)).collect();
                let merged = match acc.get(name).cloned() {
                    Some(Value::List(current)) => merge_sequences(current, projected),
                    _ => projected,
                };
                acc.set(name, Value::List(merged));
            }
        }
    }

    // layer 4: explicit nulls win over everything merged so far
    apply_explicit_nulls(&mut acc, changeset);

    match mode {
        ProjectMode::Map => strip_untouched(&mut acc, schema, Some(changeset)),
        ProjectMode::Struct => fill_struct(&mut acc, schema),
    }
    acc
}

// ============================================================================
// Deep merge
// ============================================================================

/// Merge `over` onto `base`
///
/// Objects merge key-wise and recurse; lists merge position-wise with the
/// longer side's tail kept; a null on the `over` side is transparent and
/// keeps `base`; anything else on the `over` side wins.
pub fn deep_merge(base: Value, over: Value) -> Value {
    match (base, over) {
        (base, Value::Null) => base,
        (Value::Object(mut base_entries), Value::Object(over_entries)) => {
            for (key, over_value) in over_entries {
                match base_entries.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, slot)) => {
                        let current = std::mem::replace(slot, Value::Null);
                        *slot = deep_merge(current, over_value);
                    }
                    None => base_entries.push((key, over_value)),
                }
            }
            Value::Object(base_entries)
        }
        (Value::List(base_items), Value::List(over_items)) => {
            Value::List(merge_sequences(base_items, over_items))
        }
        (_, over) => over,
    }
}

fn merge_sequences(base: Vec<Value>, over: Vec<Value>) -> Vec<Value> {
    let mut merged = Vec::with_capacity(base.len().max(over.len()));
    let mut base_iter = base.into_iter();
    let mut over_iter = over.into_iter();
    loop {
        match (base_iter.next(), over_iter.next()) {
            (Some(b), Some(o)) => merged.push(deep_merge(b, o)),
            (Some(b), None) => merged.push(b),
            (None, Some(o)) => merged.push(o),
            (None, None) => break,
        }
    }
    merged
}

// ============================================================================
// Layers
// ============================================================================

/// Fill still-null slots with declared defaults, recursing along embed paths
///
/// A single embed with defaults anywhere beneath it is materialized even
/// when the caller never sent the field. List embeds never materialize from
/// nothing; existing elements still receive their schema's defaults.
fn apply_defaults(acc: &mut Value, schema: &Schema) {
    for field in schema.fields() {
        match &field.kind {
            FieldKind::Scalar(_) | FieldKind::Array(_) => {
                if let Some(default) = &field.default {
                    let unset = matches!(acc.get(&field.name), None | Some(Value::Null));
                    if unset {
                        acc.set(&field.name, default.clone());
                    }
                }
            }
            FieldKind::EmbedOne(sub) => match acc.get(&field.name).cloned() {
                None | Some(Value::Null) => {
                    let mut fresh = Value::Object(Vec::new());
                    apply_defaults(&mut fresh, sub);
                    if matches!(&fresh, Value::Object(entries) if !entries.is_empty()) {
                        acc.set(&field.name, fresh);
                    }
                }
                Some(mut existing @ Value::Object(_)) => {
                    apply_defaults(&mut existing, sub);
                    acc.set(&field.name, existing);
                }
                Some(_) => {}
            },
            FieldKind::EmbedMany(sub) => {
                if let Some(Value::List(items)) = acc.get(&field.name).cloned() {
                    let items: Vec<Value> = items
                        .into_iter()
                        .map(|mut element| {
                            if matches!(element, Value::Object(_)) {
                                apply_defaults(&mut element, sub);
                            }
                            element
                        })
                        .collect();
                    acc.set(&field.name, Value::List(items));
                }
            }
        }
    }
}

fn apply_explicit_nulls(acc: &mut Value, changeset: &Changeset) {
    for (name, presence) in changeset.presence() {
        if *presence == Presence::ExplicitNull {
            acc.set(name, Value::Null);
        }
    }
    for (name, change) in changeset.changes() {
        match change {
            Change::Value(_) => {}
            Change::One(nested) => {
                if let Some(mut existing @ Value::Object(_)) = acc.get(name).cloned() {
                    apply_explicit_nulls(&mut existing, nested);
                    acc.set(name, existing);
                }
            }
            Change::Many(list) => {
                if let Some(Value::List(items)) = acc.get(name).cloned() {
                    let items: Vec<Value> = items
                        .into_iter()
                        .enumerate()
                        .map(|(index, mut element)| {
                            if let (Some(nested), Value::Object(_)) = (list.get(index), &element) {
                                apply_explicit_nulls(&mut element, nested);
                            }
                            element
                        })
                        .collect();
                    acc.set(name, Value::List(items));
                }
            }
        }
    }
}

/// Map-mode pass: drop untouched fields with nothing to show
///
/// A field survives when the caller mentioned it, a change exists for it
/// (hooks may add some), it declares a default, or non-empty nested content
/// remains after recursive stripping. `changeset` is `None` beneath levels
/// the caller never sent, where nothing counts as mentioned.
fn strip_untouched(acc: &mut Value, schema: &Schema, changeset: Option<&Changeset>) {
    if acc.as_object().is_none() {
        return;
    }
    for field in schema.fields() {
        match &field.kind {
            FieldKind::EmbedOne(sub) => {
                if let Some(mut existing @ Value::Object(_)) = acc.get(&field.name).cloned() {
                    let nested = changeset.and_then(|cs| match cs.get_change(&field.name) {
                        Some(Change::One(nested)) => Some(nested),
                        _ => None,
                    });
                    strip_untouched(&mut existing, sub, nested);
                    acc.set(&field.name, existing);
                }
            }
            FieldKind::EmbedMany(sub) => {
                if let Some(Value::List(items)) = acc.get(&field.name).cloned() {
                    let nested = changeset.and_then(|cs| match cs.get_change(&field.name) {
                        Some(Change::Many(list)) => Some(list),
                        _ => None,
                    });
                    let items: Vec<Value> = items
                        .into_iter()
                        .enumerate()
                        .map(|(index, mut element)| {
                            if matches!(element, Value::Object(_)) {
                                let element_cs = nested.and_then(|list| list.get(index));
                                strip_untouched(&mut element, sub, element_cs);
                            }
                            element
                        })
                        .collect();
                    acc.set(&field.name, Value::List(items));
                }
            }
            _ => {}
        }

        let touched = changeset.is_some_and(|cs| {
            cs.mentioned(&field.name) || cs.get_change(&field.name).is_some()
        });
        if touched || field.default.is_some() {
            continue;
        }
        let keeps_structure = match acc.get(&field.name) {
            Some(Value::Object(entries)) => !entries.is_empty(),
            Some(Value::List(items)) => !items.is_empty(),
            _ => false,
        };
        if !keeps_structure {
            acc.remove(&field.name);
        }
    }
}

/// Struct-mode pass: rebuild in declaration order, missing fields as null
fn fill_struct(acc: &mut Value, schema: &Schema) {
    let original = match acc {
        Value::Object(entries) => std::mem::take(entries),
        _ => return,
    };
    let mut rebuilt: Vec<(String, Value)> =
        Vec::with_capacity(original.len().max(schema.fields().len()));
    for field in schema.fields() {
        let mut value = original
            .iter()
            .find(|(name, _)| name == &field.name)
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null);
        match &field.kind {
            FieldKind::EmbedOne(sub) => {
                if matches!(value, Value::Object(_)) {
                    fill_struct(&mut value, sub);
                }
            }
            FieldKind::EmbedMany(sub) => {
                if let Value::List(items) = &mut value {
                    for element in items {
                        if matches!(element, Value::Object(_)) {
                            fill_struct(element, sub);
                        }
                    }
                }
            }
            _ => {}
        }
        rebuilt.push((field.name.clone(), value));
    }
    for (name, value) in original {
        if schema.field(&name).is_none() {
            rebuilt.push((name, value));
        }
    }
    *acc = Value::Object(rebuilt);
}
