//! Schema declaration and compilation
//!
//! Callers describe parameters with a [`RawSchema`]: an ordered list of
//! field declarations, each a name (a trailing `!` marks it required) and a
//! [`FieldSpec`]. [`Schema::compile`] turns that into an immutable
//! [`Schema`] of [`FieldDescriptor`]s, recursively compiling inline embedded
//! schemas and registering them under dotted names such as `User.address`.
//!
//! Compilation fails fast: duplicate names, reserved characters in names,
//! and defaults that do not fit their field's type are programming errors,
//! not data errors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::coerce::{valid_date, valid_datetime, valid_time, valid_uuid};
use crate::errors::SchemaError;
use crate::field::{CoercionOptions, FieldDescriptor, FieldKind, ScalarType};
use crate::hook::SharedHook;
use crate::value::Value;

// ============================================================================
// FieldOptions - per-field knobs shared by every field kind
// ============================================================================

/// Options attached to a field declaration
#[derive(Clone, Debug, Default)]
pub struct FieldOptions {
    /// Default injected at projection time when the field was never set
    pub default: Option<Value>,
    /// Opaque options forwarded to the coercer
    pub coercion: CoercionOptions,
}

// ============================================================================
// FieldSpec - one field declaration
// ============================================================================

/// Shape side of a field declaration
#[derive(Clone)]
enum SpecKind {
    Scalar(ScalarType),
    Array(ScalarType),
    InlineOne(RawSchema),
    InlineMany(RawSchema),
    EmbedsOne(Arc<Schema>),
    EmbedsMany(Arc<Schema>),
}

impl fmt::Debug for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(ty) => write!(f, "Scalar({})", ty.type_name()),
            Self::Array(ty) => write!(f, "Array({})", ty.type_name()),
            Self::InlineOne(_) => write!(f, "InlineOne"),
            Self::InlineMany(_) => write!(f, "InlineMany"),
            Self::EmbedsOne(s) => write!(f, "EmbedsOne({})", s.name()),
            Self::EmbedsMany(s) => write!(f, "EmbedsMany({})", s.name()),
        }
    }
}

/// One field declaration: shape plus options
///
/// Scalar types and raw schemas convert directly, so the builder styles mix:
///
/// ```rust
/// use paramcast::{FieldSpec, RawSchema, ScalarType};
///
/// let raw = RawSchema::new()
///     .field("login!", ScalarType::String)
///     .field("score", FieldSpec::scalar(ScalarType::Float).coercion("precision", 2))
///     .field("address", RawSchema::new().field("city!", ScalarType::String));
/// # let _ = raw;
/// ```
#[derive(Clone, Debug)]
pub struct FieldSpec {
    kind: SpecKind,
    options: FieldOptions,
}

impl FieldSpec {
    fn new(kind: SpecKind) -> Self {
        Self {
            kind,
            options: FieldOptions::default(),
        }
    }

    /// Single scalar field
    pub fn scalar(ty: ScalarType) -> Self {
        Self::new(SpecKind::Scalar(ty))
    }

    /// Homogeneous array of scalars
    pub fn array(ty: ScalarType) -> Self {
        Self::new(SpecKind::Array(ty))
    }

    /// One embedded map, schema declared inline
    pub fn inline_one(raw: RawSchema) -> Self {
        Self::new(SpecKind::InlineOne(raw))
    }

    /// List of embedded maps, schema declared inline
    pub fn inline_many(raw: RawSchema) -> Self {
        Self::new(SpecKind::InlineMany(raw))
    }

    /// One embedded map, reusing an already compiled schema
    pub fn embeds_one(schema: &Arc<Schema>) -> Self {
        Self::new(SpecKind::EmbedsOne(schema.clone()))
    }

    /// List of embedded maps, reusing an already compiled schema
    pub fn embeds_many(schema: &Arc<Schema>) -> Self {
        Self::new(SpecKind::EmbedsMany(schema.clone()))
    }

    /// Attach a projection-time default
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.options.default = Some(value.into());
        self
    }

    /// Attach an opaque coercion option
    pub fn coercion(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.coercion.insert(key, value);
        self
    }
}

impl From<ScalarType> for FieldSpec {
    fn from(ty: ScalarType) -> Self {
        Self::scalar(ty)
    }
}

impl From<RawSchema> for FieldSpec {
    fn from(raw: RawSchema) -> Self {
        Self::inline_one(raw)
    }
}

// ============================================================================
// RawSchema - builder for a schema declaration
// ============================================================================

/// Ordered, uncompiled schema declaration
#[derive(Clone, Default)]
pub struct RawSchema {
    fields: Vec<(String, FieldSpec)>,
    hook: Option<SharedHook>,
}

impl RawSchema {
    /// Empty declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field; a trailing `!` on the name marks it required
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        self.fields.push((name.into(), spec.into()));
        self
    }

    /// Install this schema's validation hook
    pub fn hook(mut self, hook: SharedHook) -> Self {
        self.hook = Some(hook);
        self
    }
}

impl fmt::Debug for RawSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSchema")
            .field("fields", &self.fields.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

// ============================================================================
// Schema - compiled, immutable, shareable
// ============================================================================

/// Compiled schema
///
/// Field order is the declaration order; it drives error ordering and
/// struct-mode output shape. Inline embedded schemas are compiled into their
/// own [`Schema`] values and registered under `Parent.field` paths,
/// reachable through [`Schema::embedded`].
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
    embedded: BTreeMap<String, Arc<Schema>>,
    hook: Option<SharedHook>,
}

impl Schema {
    /// Compile a raw declaration into an immutable schema
    pub fn compile(raw: RawSchema, name: &str) -> Result<Arc<Self>, SchemaError> {
        let schema = Self::compile_inner(raw, name)?;
        Ok(Arc::new(schema))
    }

    fn compile_inner(raw: RawSchema, name: &str) -> Result<Self, SchemaError> {
        let RawSchema { fields: declared, hook } = raw;
        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(declared.len());
        let mut embedded: BTreeMap<String, Arc<Schema>> = BTreeMap::new();

        for (declared_name, spec) in declared {
            let (field_name, required) = split_required(name, &declared_name)?;
            if fields.iter().any(|f| f.name == field_name) {
                return Err(SchemaError::DuplicateField {
                    schema: name.to_string(),
                    field: field_name,
                });
            }

            let FieldSpec { kind: spec_kind, options } = spec;
            let kind = match spec_kind {
                SpecKind::Scalar(ty) => FieldKind::Scalar(ty),
                SpecKind::Array(ty) => FieldKind::Array(ty),
                SpecKind::InlineOne(sub_raw) => {
                    let sub = Self::compile_embedded(sub_raw, name, &field_name, &mut embedded)?;
                    FieldKind::EmbedOne(sub)
                }
                SpecKind::InlineMany(sub_raw) => {
                    let sub = Self::compile_embedded(sub_raw, name, &field_name, &mut embedded)?;
                    FieldKind::EmbedMany(sub)
                }
                SpecKind::EmbedsOne(sub) => FieldKind::EmbedOne(sub),
                SpecKind::EmbedsMany(sub) => FieldKind::EmbedMany(sub),
            };

            let FieldOptions { default, coercion } = options;
            if let Some(default_value) = &default {
                check_default(name, &field_name, &kind, default_value)?;
            }

            fields.push(FieldDescriptor {
                name: field_name,
                required,
                kind,
                default,
                coercion,
            });
        }

        debug!(schema = name, fields = fields.len(), "compiled schema");
        Ok(Self {
            name: name.to_string(),
            fields,
            embedded,
            hook,
        })
    }

    fn compile_embedded(
        sub_raw: RawSchema,
        parent_name: &str,
        field_name: &str,
        registry: &mut BTreeMap<String, Arc<Schema>>,
    ) -> Result<Arc<Schema>, SchemaError> {
        let sub_name = format!("{parent_name}.{field_name}");
        let sub = Arc::new(Self::compile_inner(sub_raw, &sub_name)?);
        for (key, nested) in &sub.embedded {
            registry.insert(key.clone(), nested.clone());
        }
        registry.insert(sub_name, sub.clone());
        Ok(sub)
    }

    /// Schema name; inline embeds carry dotted names like `User.address`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by resolved name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up an inline embedded schema by dotted path
    pub fn embedded(&self, path: &str) -> Option<&Arc<Schema>> {
        self.embedded.get(path)
    }

    /// Dotted paths of all registered inline embedded schemas
    pub fn embedded_paths(&self) -> impl Iterator<Item = &str> {
        self.embedded.keys().map(String::as_str)
    }

    pub(crate) fn hook(&self) -> Option<&SharedHook> {
        self.hook.as_ref()
    }

    /// Zero instance of this schema: every field present and null
    pub fn zero_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|f| (f.name.clone(), Value::Null))
                .collect(),
        )
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("embedded", &self.embedded.keys().collect::<Vec<_>>())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

// ============================================================================
// Declaration checks
// ============================================================================

/// Split the required marker off a declared name and validate the rest
///
/// `.` is reserved for registry paths and `!` for the marker itself.
fn split_required(schema: &str, declared: &str) -> Result<(String, bool), SchemaError> {
    let (base, required) = match declared.strip_suffix('!') {
        Some(base) => (base, true),
        None => (declared, false),
    };
    if base.is_empty() || base.contains('.') || base.contains('!') {
        return Err(SchemaError::InvalidFieldName {
            schema: schema.to_string(),
            name: declared.to_string(),
        });
    }
    Ok((base.to_string(), required))
}

fn check_default(
    schema: &str,
    field: &str,
    kind: &FieldKind,
    default: &Value,
) -> Result<(), SchemaError> {
    let ok = match kind {
        FieldKind::Scalar(ty) => default_matches(*ty, default),
        FieldKind::Array(ty) => match default {
            Value::List(items) => items.iter().all(|item| default_matches(*ty, item)),
            _ => false,
        },
        FieldKind::EmbedOne(_) | FieldKind::EmbedMany(_) => false,
    };
    if ok {
        return Ok(());
    }
    let expected = match kind {
        FieldKind::Scalar(ty) => ty.type_name().to_string(),
        FieldKind::Array(ty) => format!("array of {}", ty.type_name()),
        FieldKind::EmbedOne(_) | FieldKind::EmbedMany(_) => {
            "no default on embedded fields".to_string()
        }
    };
    Err(SchemaError::InvalidDefault {
        schema: schema.to_string(),
        field: field.to_string(),
        expected,
    })
}

fn default_matches(ty: ScalarType, value: &Value) -> bool {
    match ty {
        ScalarType::String => matches!(value, Value::String(_)),
        ScalarType::Integer => matches!(value, Value::Int(_)),
        ScalarType::Float => matches!(value, Value::Float(_) | Value::Int(_)),
        ScalarType::Boolean => matches!(value, Value::Bool(_)),
        ScalarType::Date => matches!(value, Value::String(s) if valid_date(s)),
        ScalarType::Time => matches!(value, Value::String(s) if valid_time(s)),
        ScalarType::DateTime => matches!(value, Value::String(s) if valid_datetime(s)),
        ScalarType::Uuid => matches!(value, Value::String(s) if valid_uuid(s)),
    }
}
