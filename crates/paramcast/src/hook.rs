//! Validation hooks
//!
//! A hook is the user's chance to inspect and amend a cast result before it
//! is sealed, similar to a changeset pipeline stage. The engine runs exactly
//! one hook per schema level, after structural casting, and treats whatever
//! the hook returns as authoritative.
//!
//! # Example
//!
//! ```rust
//! use paramcast::{hook_fn, RawSchema, ScalarType, Schema};
//!
//! let schema = Schema::compile(
//!     RawSchema::new()
//!         .field("age!", ScalarType::Integer)
//!         .hook(hook_fn(|mut changeset, _raw| {
//!             changeset.validate_change("age", "age_range", "age out of range", |v| {
//!                 matches!(v, paramcast::Value::Int(n) if (0..=130).contains(n))
//!             });
//!             changeset
//!         })),
//!     "Person",
//! )
//! .unwrap();
//! # let _ = schema;
//! ```

use std::sync::Arc;

use crate::changeset::Changeset;
use crate::value::Value;

// ============================================================================
// ValidationHook - one stage, run once per schema level
// ============================================================================

/// User-defined validation stage
///
/// Receives the changeset produced by structural casting together with the
/// raw input for that level. The hook may add errors, rewrite changes, or
/// return the changeset untouched. It is never invoked recursively: embedded
/// levels run their own schema's hook during their own cast.
pub trait ValidationHook: Send + Sync {
    /// Transform the cast result for one schema level
    fn call(&self, changeset: Changeset, raw: &Value) -> Changeset;
}

/// Shared handle to a hook
pub type SharedHook = Arc<dyn ValidationHook>;

// ============================================================================
// Built-in hooks
// ============================================================================

/// Hook that passes the changeset through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl ValidationHook for NoopHook {
    fn call(&self, changeset: Changeset, _raw: &Value) -> Changeset {
        changeset
    }
}

/// Adapter turning a closure into a [`ValidationHook`]
pub struct FnHook<F>
where
    F: Fn(Changeset, &Value) -> Changeset + Send + Sync,
{
    hook_fn: F,
}

impl<F> FnHook<F>
where
    F: Fn(Changeset, &Value) -> Changeset + Send + Sync,
{
    /// Wrap a closure
    pub fn new(hook_fn: F) -> Self {
        Self { hook_fn }
    }
}

impl<F> ValidationHook for FnHook<F>
where
    F: Fn(Changeset, &Value) -> Changeset + Send + Sync,
{
    fn call(&self, changeset: Changeset, raw: &Value) -> Changeset {
        (self.hook_fn)(changeset, raw)
    }
}

/// Create a shared hook from a closure
pub fn hook_fn<F>(f: F) -> SharedHook
where
    F: Fn(Changeset, &Value) -> Changeset + Send + Sync + 'static,
{
    Arc::new(FnHook::new(f))
}
