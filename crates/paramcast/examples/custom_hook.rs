//! Validation hooks and custom coercion
//!
//! Run with: cargo run --example custom_hook

use std::sync::Arc;

use paramcast::{
    cast, hook_fn, CastOptions, CoerceError, CoercionOptions, ErrorKind, RawSchema, ScalarType,
    Schema, StandardCoercer, TypeCoercer, Value,
};
use serde_json::json;

/// Standard rules, but strings come back trimmed
struct TrimmingCoercer;

impl TypeCoercer for TrimmingCoercer {
    fn coerce(
        &self,
        value: &Value,
        ty: ScalarType,
        options: &CoercionOptions,
    ) -> Result<Value, CoerceError> {
        let cast = StandardCoercer.coerce(value, ty, options)?;
        match (ty, cast) {
            (ScalarType::String, Value::String(s)) => Ok(Value::String(s.trim().to_string())),
            (_, other) => Ok(other),
        }
    }
}

fn main() {
    println!("=== Hook Examples ===\n");

    let schema = Schema::compile(
        RawSchema::new()
            .field("login!", ScalarType::String)
            .field("role", ScalarType::String)
            .hook(hook_fn(|mut changeset, raw| {
                // reject fields that must never appear in this payload
                if raw.contains_key("password") {
                    changeset.add_field_error(
                        "password",
                        ErrorKind::user("forbidden", "set passwords through the auth endpoint"),
                    );
                }
                // constrain a cast value
                changeset.validate_inclusion(
                    "role",
                    &[Value::from("user"), Value::from("admin")],
                );
                // derive a change
                if let Some(Value::String(login)) = changeset.change_value("login").cloned() {
                    changeset.put_change("slug", Value::from(format!("u-{login}")));
                }
                changeset
            })),
        "User",
    )
    .expect("schema compiles");

    // 1. The hook accepts and enriches a clean payload
    let raw = Value::from(json!({ "login": "kim", "role": "admin" }));
    match cast(&schema, &raw, &CastOptions::new()) {
        Ok(value) => println!("accepted: {}", serde_json::Value::from(value)),
        Err(changeset) => println!("rejected: {:?}", changeset.errors()),
    }

    // 2. The hook rejects rule violations alongside structural errors
    let raw = Value::from(json!({ "role": "root", "password": "hunter2" }));
    if let Err(changeset) = cast(&schema, &raw, &CastOptions::new()) {
        println!("\nrejected payload:");
        for error in changeset.errors() {
            println!("  [{}] {}", error.kind.code(), error);
        }
    }

    // 3. A custom coercer swaps conversion rules for the whole call
    let options = CastOptions::new().coercer(Arc::new(TrimmingCoercer));
    let raw = Value::from(json!({ "login": "  kim  ", "role": "user" }));
    if let Ok(value) = cast(&schema, &raw, &options) {
        println!("\ntrimmed: {}", serde_json::Value::from(value));
    }
}
