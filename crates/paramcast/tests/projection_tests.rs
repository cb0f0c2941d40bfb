//! Output projection tests

use std::sync::Arc;

use paramcast::{
    cast, cast_changeset, hook_fn, project, CastOptions, FieldSpec, ProjectMode, RawSchema,
    ScalarType, Schema, Value,
};
use serde_json::json;

fn raw(value: serde_json::Value) -> Value {
    Value::from(value)
}

fn js(value: Value) -> serde_json::Value {
    serde_json::Value::from(value)
}

fn cast_ok(schema: &Arc<Schema>, input: serde_json::Value, options: &CastOptions) -> Value {
    cast(schema, &raw(input), options).unwrap()
}

// ============================================================================
// Defaults Layer
// ============================================================================

#[test]
fn test_default_fills_absent_field() {
    let schema = Schema::compile(
        RawSchema::new().field("role", FieldSpec::scalar(ScalarType::String).default("user")),
        "Account",
    )
    .unwrap();
    let value = cast_ok(&schema, json!({}), &CastOptions::new());
    assert_eq!(js(value), json!({ "role": "user" }));
}

#[test]
fn test_change_wins_over_default() {
    let schema = Schema::compile(
        RawSchema::new().field("role", FieldSpec::scalar(ScalarType::String).default("user")),
        "Account",
    )
    .unwrap();
    let value = cast_ok(&schema, json!({ "role": "admin" }), &CastOptions::new());
    assert_eq!(js(value), json!({ "role": "admin" }));
}

#[test]
fn test_default_never_clobbers_target_data() {
    let schema = Schema::compile(
        RawSchema::new().field("role", FieldSpec::scalar(ScalarType::String).default("user")),
        "Account",
    )
    .unwrap();
    let options = CastOptions::new().target(raw(json!({ "role": "owner" })));
    let value = cast_ok(&schema, json!({}), &options);
    assert_eq!(js(value), json!({ "role": "owner" }));
}

#[test]
fn test_nested_defaults_materialize_untouched_embed() {
    let schema = Schema::compile(
        RawSchema::new().field(
            "bat",
            RawSchema::new()
                .field("man", FieldSpec::scalar(ScalarType::String).default("BATMAN"))
                .field(
                    "wo",
                    RawSchema::new()
                        .field("man", FieldSpec::scalar(ScalarType::String).default("BATWOMAN")),
                ),
        ),
        "Heroes",
    )
    .unwrap();

    // untouched embeds still surface their full default subtree
    let value = cast_ok(&schema, json!({}), &CastOptions::new());
    assert_eq!(
        js(value),
        json!({ "bat": { "man": "BATMAN", "wo": { "man": "BATWOMAN" } } })
    );

    // a partial write merges over the default subtree, not instead of it
    let value = cast_ok(&schema, json!({ "bat": { "man": "Bruce" } }), &CastOptions::new());
    assert_eq!(
        js(value),
        json!({ "bat": { "man": "Bruce", "wo": { "man": "BATWOMAN" } } })
    );
}

// ============================================================================
// Explicit Nulls
// ============================================================================

#[test]
fn test_explicit_null_beats_default() {
    let schema = Schema::compile(
        RawSchema::new().field("role", FieldSpec::scalar(ScalarType::String).default("user")),
        "Account",
    )
    .unwrap();
    let value = cast_ok(&schema, json!({ "role": null }), &CastOptions::new());
    assert_eq!(js(value), json!({ "role": null }));
}

#[test]
fn test_explicit_null_beats_target_data() {
    let schema = Schema::compile(
        RawSchema::new().field("nickname", ScalarType::String),
        "Account",
    )
    .unwrap();
    let options = CastOptions::new().target(raw(json!({ "nickname": "shadow" })));
    let value = cast_ok(&schema, json!({ "nickname": null }), &options);
    assert_eq!(js(value), json!({ "nickname": null }));
}

#[test]
fn test_explicit_null_inside_embed() {
    let schema = Schema::compile(
        RawSchema::new().field(
            "bat",
            RawSchema::new()
                .field("man", FieldSpec::scalar(ScalarType::String).default("BATMAN"))
                .field(
                    "wo",
                    RawSchema::new()
                        .field("man", FieldSpec::scalar(ScalarType::String).default("BATWOMAN")),
                ),
        ),
        "Heroes",
    )
    .unwrap();
    let value = cast_ok(&schema, json!({ "bat": { "wo": null } }), &CastOptions::new());
    assert_eq!(js(value), json!({ "bat": { "man": "BATMAN", "wo": null } }));
}

// ============================================================================
// Map Mode vs Struct Mode
// ============================================================================

#[test]
fn test_map_mode_omits_untouched_fields() {
    let schema = Schema::compile(
        RawSchema::new()
            .field("login!", ScalarType::String)
            .field("age", ScalarType::Integer),
        "User",
    )
    .unwrap();
    let value = cast_ok(&schema, json!({ "login": "kim" }), &CastOptions::new());
    assert_eq!(js(value), json!({ "login": "kim" }));
}

#[test]
fn test_struct_mode_emits_full_shape() {
    let schema = Schema::compile(
        RawSchema::new()
            .field("login!", ScalarType::String)
            .field("age", ScalarType::Integer)
            .field(
                "home",
                RawSchema::new()
                    .field("city", FieldSpec::scalar(ScalarType::String).default("Paris"))
                    .field("zip", ScalarType::String),
            ),
        "User",
    )
    .unwrap();
    let value = cast_ok(
        &schema,
        json!({ "login": "kim" }),
        &CastOptions::new().mode(ProjectMode::Struct),
    );
    // materialized embeds are zero-filled too
    assert_eq!(
        js(value),
        json!({
            "login": "kim",
            "age": null,
            "home": { "city": "Paris", "zip": null },
        })
    );
}

#[test]
fn test_struct_mode_orders_by_declaration() {
    let schema = Schema::compile(
        RawSchema::new()
            .field("b", ScalarType::Integer)
            .field("a", ScalarType::Integer),
        "Ordered",
    )
    .unwrap();
    let value = cast_ok(
        &schema,
        json!({ "a": 1 }),
        &CastOptions::new().mode(ProjectMode::Struct),
    );
    match value {
        Value::Object(entries) => {
            let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(keys, vec!["b", "a"]);
        }
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn test_empty_list_and_null_and_absent_are_distinct() {
    let schema = Schema::compile(
        RawSchema::new().field(
            "pets",
            FieldSpec::inline_many(RawSchema::new().field("name!", ScalarType::String)),
        ),
        "Owner",
    )
    .unwrap();

    let value = cast_ok(&schema, json!({ "pets": [] }), &CastOptions::new());
    assert_eq!(js(value), json!({ "pets": [] }));

    let value = cast_ok(&schema, json!({ "pets": null }), &CastOptions::new());
    assert_eq!(js(value), json!({ "pets": null }));

    let value = cast_ok(&schema, json!({}), &CastOptions::new());
    assert_eq!(js(value), json!({}));
}

// ============================================================================
// Targets and Merging
// ============================================================================

#[test]
fn test_embed_change_merges_over_target_subtree() {
    let schema = Schema::compile(
        RawSchema::new().field(
            "home",
            RawSchema::new()
                .field("city", ScalarType::String)
                .field("zip", ScalarType::String),
        ),
        "User",
    )
    .unwrap();
    let target = raw(json!({ "home": { "city": "Nice", "zip": "06000" } }));

    // struct mode: the untouched zip survives the partial update
    let options = CastOptions::new().target(target.clone()).mode(ProjectMode::Struct);
    let value = cast_ok(&schema, json!({ "home": { "city": "Paris" } }), &options);
    assert_eq!(js(value), json!({ "home": { "city": "Paris", "zip": "06000" } }));

    // map mode mirrors the caller's sparseness instead
    let options = CastOptions::new().target(target);
    let value = cast_ok(&schema, json!({ "home": { "city": "Paris" } }), &options);
    assert_eq!(js(value), json!({ "home": { "city": "Paris" } }));
}

#[test]
fn test_embed_list_merges_position_wise() {
    let schema = Schema::compile(
        RawSchema::new().field(
            "pets",
            FieldSpec::inline_many(
                RawSchema::new()
                    .field("name!", ScalarType::String)
                    .field("kind", ScalarType::String),
            ),
        ),
        "Owner",
    )
    .unwrap();
    let options = CastOptions::new()
        .target(raw(json!({
            "pets": [
                { "name": "rex", "kind": "dog" },
                { "name": "tom", "kind": "cat" },
            ]
        })))
        .mode(ProjectMode::Struct);
    let value = cast_ok(&schema, json!({ "pets": [{ "name": "bud" }] }), &options);
    assert_eq!(
        js(value),
        json!({
            "pets": [
                { "name": "bud", "kind": "dog" },
                { "name": "tom", "kind": "cat" },
            ]
        })
    );
}

#[test]
fn test_scalar_array_change_replaces_wholesale() {
    let schema = Schema::compile(
        RawSchema::new().field("tags", FieldSpec::array(ScalarType::String)),
        "Post",
    )
    .unwrap();
    let options = CastOptions::new().target(raw(json!({ "tags": ["old", "stale", "gone"] })));
    let value = cast_ok(&schema, json!({ "tags": ["fresh"] }), &options);
    assert_eq!(js(value), json!({ "tags": ["fresh"] }));
}

#[test]
fn test_unknown_target_keys_pass_through() {
    let schema = Schema::compile(
        RawSchema::new().field("login!", ScalarType::String),
        "User",
    )
    .unwrap();
    let options = CastOptions::new().target(raw(json!({ "legacy_id": 7 })));
    let value = cast_ok(&schema, json!({ "login": "kim" }), &options);
    assert_eq!(js(value), json!({ "login": "kim", "legacy_id": 7 }));
}

#[test]
fn test_map_mode_strips_untouched_target_scalars() {
    let schema = Schema::compile(
        RawSchema::new()
            .field("login!", ScalarType::String)
            .field("age", ScalarType::Integer),
        "User",
    )
    .unwrap();
    let options = CastOptions::new().target(raw(json!({ "age": 40 })));
    let value = cast_ok(&schema, json!({ "login": "kim" }), &options);
    // declared but untouched: dropped in map mode, visible in struct mode
    assert_eq!(js(value), json!({ "login": "kim" }));

    let options = CastOptions::new().target(raw(json!({ "age": 40 }))).mode(ProjectMode::Struct);
    let value = cast_ok(&schema, json!({ "login": "kim" }), &options);
    assert_eq!(js(value), json!({ "login": "kim", "age": 40 }));
}

// ============================================================================
// Hooks and Projection
// ============================================================================

#[test]
fn test_hook_change_survives_map_mode() {
    let schema = Schema::compile(
        RawSchema::new()
            .field("login!", ScalarType::String)
            .field("slug", ScalarType::String)
            .hook(hook_fn(|mut changeset, _raw| {
                if let Some(Value::String(login)) = changeset.change_value("login").cloned() {
                    changeset.put_change("slug", Value::from(format!("u-{login}")));
                }
                changeset
            })),
        "User",
    )
    .unwrap();
    let value = cast_ok(&schema, json!({ "login": "kim" }), &CastOptions::new());
    assert_eq!(js(value), json!({ "login": "kim", "slug": "u-kim" }));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_projection_is_idempotent() {
    let schema = Schema::compile(
        RawSchema::new()
            .field("login!", ScalarType::String)
            .field("role", FieldSpec::scalar(ScalarType::String).default("user"))
            .field(
                "home",
                RawSchema::new().field("city", FieldSpec::scalar(ScalarType::String).default("Paris")),
            ),
        "User",
    )
    .unwrap();
    let changeset = cast_changeset(
        &schema,
        &raw(json!({ "login": "kim", "home": {} })),
        &CastOptions::new(),
    );
    assert!(changeset.is_valid());

    for mode in [ProjectMode::Map, ProjectMode::Struct] {
        let first = project(&changeset, mode).unwrap();
        let second = project(&changeset, mode).unwrap();
        assert_eq!(first, second);
    }
}
