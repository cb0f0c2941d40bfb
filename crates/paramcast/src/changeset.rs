//! Changesets: accumulated cast results
//!
//! A [`Changeset`] is what casting one schema level produces: the
//! pre-existing target, the changes that survived coercion, every error met
//! along the way, and a record of which fields the caller actually mentioned.
//! Nothing short-circuits; an invalid changeset still carries all the valid
//! changes it managed to collect.
//!
//! Embedded casts nest as changesets inside [`Change::One`] and
//! [`Change::Many`], so validity is recursive and [`Changeset::errors`]
//! flattens nested failures into full paths like `pets[0].age`.

use std::sync::Arc;

use crate::errors::{CastError, ErrorKind, FieldPath};
use crate::schema::Schema;
use crate::value::Value;

// ============================================================================
// Change - one accepted field change
// ============================================================================

/// An accepted change for one field
#[derive(Debug, Clone)]
pub enum Change {
    /// Coerced scalar or scalar-array value
    Value(Value),
    /// Result of casting one embedded map
    One(Changeset),
    /// Results of casting each element of an embedded list
    Many(Vec<Changeset>),
}

impl From<Value> for Change {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

// ============================================================================
// Presence - how the caller touched a field
// ============================================================================

/// How raw input mentioned a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    /// Key present with a non-null value
    Provided,
    /// Key present and explicitly null
    ExplicitNull,
}

// ============================================================================
// Changeset
// ============================================================================

/// Accumulated result of casting one schema level
#[derive(Debug, Clone)]
pub struct Changeset {
    schema: Arc<Schema>,
    target: Value,
    changes: Vec<(String, Change)>,
    errors: Vec<CastError>,
    presence: Vec<(String, Presence)>,
}

impl Changeset {
    pub(crate) fn new(schema: Arc<Schema>, target: Value) -> Self {
        Self {
            schema,
            target,
            changes: Vec::new(),
            errors: Vec::new(),
            presence: Vec::new(),
        }
    }

    /// Schema this changeset was cast against
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Pre-existing data the changes apply on top of
    pub fn target(&self) -> &Value {
        &self.target
    }

    /// Accepted changes in field-processing order
    pub fn changes(&self) -> &[(String, Change)] {
        &self.changes
    }

    /// Look up a change by field name
    pub fn get_change(&self, name: &str) -> Option<&Change> {
        self.changes.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Look up a scalar change's value by field name
    pub fn change_value(&self, name: &str) -> Option<&Value> {
        match self.get_change(name)? {
            Change::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Insert or replace a change, keeping its original position on replace
    pub fn put_change(&mut self, name: impl Into<String>, change: impl Into<Change>) {
        let name = name.into();
        let change = change.into();
        match self.changes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = change,
            None => self.changes.push((name, change)),
        }
    }

    /// Remove a change, returning it
    pub fn remove_change(&mut self, name: &str) -> Option<Change> {
        let idx = self.changes.iter().position(|(n, _)| n == name)?;
        Some(self.changes.remove(idx).1)
    }

    /// Record an error at an explicit path
    pub fn add_error(&mut self, path: FieldPath, kind: ErrorKind) {
        self.errors.push(CastError::new(path, kind));
    }

    /// Record an error against a top-level field of this level
    pub fn add_field_error(&mut self, name: &str, kind: ErrorKind) {
        self.add_error(FieldPath::field(name), kind);
    }

    /// Errors recorded at this level only, nested levels excluded
    pub fn local_errors(&self) -> &[CastError] {
        &self.errors
    }

    /// All errors, nested ones lifted to full paths from this level
    pub fn errors(&self) -> Vec<CastError> {
        let mut out = Vec::new();
        self.collect_errors(&FieldPath::root(), &mut out);
        out
    }

    fn collect_errors(&self, prefix: &FieldPath, out: &mut Vec<CastError>) {
        for error in &self.errors {
            out.push(CastError::new(error.path.prefixed(prefix), error.kind.clone()));
        }
        for (name, change) in &self.changes {
            match change {
                Change::Value(_) => {}
                Change::One(nested) => nested.collect_errors(&prefix.join(name.as_str()), out),
                Change::Many(list) => {
                    let base = prefix.join(name.as_str());
                    for (index, nested) in list.iter().enumerate() {
                        nested.collect_errors(&base.join_index(index), out);
                    }
                }
            }
        }
    }

    /// Valid when this level and every nested changeset carry no errors
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
            && self.changes.iter().all(|(_, change)| match change {
                Change::Value(_) => true,
                Change::One(nested) => nested.is_valid(),
                Change::Many(list) => list.iter().all(Changeset::is_valid),
            })
    }

    /// Whether raw input mentioned this field at all (any value, null included)
    pub fn mentioned(&self, name: &str) -> bool {
        self.presence.iter().any(|(n, _)| n == name)
    }

    /// Whether raw input set this field to an explicit null
    pub fn explicit_null(&self, name: &str) -> bool {
        self.presence
            .iter()
            .any(|(n, p)| n == name && *p == Presence::ExplicitNull)
    }

    pub(crate) fn mark_present(&mut self, name: &str, null: bool) {
        let presence = if null { Presence::ExplicitNull } else { Presence::Provided };
        self.presence.push((name.to_string(), presence));
    }

    pub(crate) fn presence(&self) -> &[(String, Presence)] {
        &self.presence
    }

    // ========================================================================
    // Hook helpers
    // ========================================================================

    /// Fail `name` with a user rule when its cast value flunks `predicate`
    ///
    /// No-op when the field has no scalar change, so missing optional fields
    /// do not trip value rules.
    pub fn validate_change<F>(&mut self, name: &str, code: &str, message: &str, predicate: F)
    where
        F: FnOnce(&Value) -> bool,
    {
        let failed = match self.change_value(name) {
            Some(value) => !predicate(value),
            None => false,
        };
        if failed {
            self.add_field_error(name, ErrorKind::user(code, message));
        }
    }

    /// Fail `name` with an `inclusion` rule when its cast value is not in `allowed`
    pub fn validate_inclusion(&mut self, name: &str, allowed: &[Value]) {
        let failed = matches!(self.change_value(name), Some(value) if !allowed.contains(value));
        if failed {
            self.add_field_error(name, ErrorKind::user("inclusion", "value is not allowed"));
        }
    }
}
