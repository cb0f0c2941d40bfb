//! Basic casting walkthrough
//!
//! Run with: cargo run --example basic_cast

use paramcast::{cast, CastOptions, FieldSpec, ProjectMode, RawSchema, ScalarType, Schema, Value};
use serde_json::json;

fn main() {
    println!("=== Basic Casting Examples ===\n");

    let schema = Schema::compile(
        RawSchema::new()
            .field("login!", ScalarType::String)
            .field("age", ScalarType::Integer)
            .field("role", FieldSpec::scalar(ScalarType::String).default("user"))
            .field(
                "home",
                RawSchema::new()
                    .field("city!", ScalarType::String)
                    .field("zip", ScalarType::String),
            ),
        "User",
    )
    .expect("schema compiles");

    // 1. A clean payload: numeric strings coerce, defaults fill in
    let raw = Value::from(json!({
        "login": "kim",
        "age": "41",
        "home": { "city": "Paris" },
    }));
    match cast(&schema, &raw, &CastOptions::new()) {
        Ok(value) => println!("map output:    {}", serde_json::Value::from(value)),
        Err(changeset) => println!("unexpected errors: {:?}", changeset.errors()),
    }

    // 2. Same payload, struct mode: full declared shape
    let options = CastOptions::new().mode(ProjectMode::Struct);
    if let Ok(value) = cast(&schema, &raw, &options) {
        println!("struct output: {}", serde_json::Value::from(value));
    }

    // 3. A broken payload: every error is collected, none wins
    let raw = Value::from(json!({
        "age": "forty-one",
        "home": { "zip": 75000 },
    }));
    if let Err(changeset) = cast(&schema, &raw, &CastOptions::new()) {
        println!("\nerrors for a broken payload:");
        for error in changeset.errors() {
            println!("  {error}");
        }
    }

    // 4. Applying a cast on top of pre-existing data
    let target = Value::from(json!({
        "login": "kim",
        "home": { "city": "Nice", "zip": "06000" },
    }));
    let options = CastOptions::new().target(target).mode(ProjectMode::Struct);
    let raw = Value::from(json!({ "login": "kim", "home": { "city": "Lyon" } }));
    if let Ok(value) = cast(&schema, &raw, &options) {
        println!("\npartial update over a target:");
        println!("  {}", serde_json::Value::from(value));
    }
}
