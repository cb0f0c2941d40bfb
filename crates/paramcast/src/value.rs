//! Loosely typed runtime values
//!
//! Everything that flows through the engine is a [`Value`]: raw caller input,
//! cast changes, defaults, and projected output. Objects keep their entries in
//! insertion order so diagnostics read the way the caller wrote the input;
//! lookups always resolve the first occurrence of a key.

// ============================================================================
// Value Enum - Runtime values cast and emitted by the engine
// ============================================================================

/// Runtime value handled by casting and projection
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// String value
    String(String),
    /// List/Array of values
    List(Vec<Value>),
    /// Object/Map (key-value pairs, insertion ordered)
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Get human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// View an object's entries, or `None` for any other variant
    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// View a list's elements, or `None` for any other variant
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// View a string's contents, or `None` for any other variant
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key in an object (first occurrence wins)
    ///
    /// Returns `None` when the key is absent or `self` is not an object.
    /// An entry holding `Value::Null` still returns `Some`; callers that
    /// care about the absent/null distinction check both.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Check whether an object carries a key (any value, including null)
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a key in an object
    ///
    /// Replaces the first occurrence in place to keep entry order stable;
    /// appends when the key is new. No-op on non-object values.
    pub fn set(&mut self, key: &str, value: Value) {
        if let Self::Object(entries) = self {
            match entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, slot)) => *slot = value,
                None => entries.push((key.to_string(), value)),
            }
        }
    }

    /// Remove a key from an object, returning the removed value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if let Self::Object(entries) = self {
            let idx = entries.iter().position(|(k, _)| k == key)?;
            return Some(entries.remove(idx).1);
        }
        None
    }
}

// ============================================================================
// Conversions - ergonomic literals and serde_json interop
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    // u64 beyond i64::MAX with no f64 representation
                    Self::Float(n.as_u64().map(|u| u as f64).unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => {
                serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Int(1).type_name(), "integer");
        assert_eq!(Value::List(vec![]).type_name(), "array");
        assert_eq!(Value::Object(vec![]).type_name(), "object");
    }

    #[test]
    fn test_object_get_first_occurrence_wins() {
        let v = Value::Object(vec![
            ("a".to_string(), Value::Int(1)),
            ("a".to_string(), Value::Int(2)),
        ]);
        assert_eq!(v.get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_object_set_replaces_in_place() {
        let mut v = Value::Object(vec![
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(2)),
        ]);
        v.set("a", Value::Int(9));
        v.set("c", Value::Int(3));
        assert_eq!(
            v,
            Value::Object(vec![
                ("a".to_string(), Value::Int(9)),
                ("b".to_string(), Value::Int(2)),
                ("c".to_string(), Value::Int(3)),
            ])
        );
    }

    #[test]
    fn test_object_remove() {
        let mut v = Value::Object(vec![("a".to_string(), Value::Int(1))]);
        assert_eq!(v.remove("a"), Some(Value::Int(1)));
        assert_eq!(v.remove("a"), None);
        assert!(!v.contains_key("a"));
    }

    #[test]
    fn test_get_on_non_object_is_none() {
        assert_eq!(Value::Int(1).get("a"), None);
        assert!(!Value::Null.contains_key("a"));
    }

    #[test]
    fn test_from_json_round_trip() {
        let raw = json!({
            "name": "kim",
            "age": 41,
            "score": 87.5,
            "admin": false,
            "tags": ["a", "b"],
            "extra": null,
        });
        let value = Value::from(raw.clone());
        assert_eq!(value.get("age"), Some(&Value::Int(41)));
        assert_eq!(value.get("score"), Some(&Value::Float(87.5)));
        assert_eq!(value.get("extra"), Some(&Value::Null));
        assert_eq!(serde_json::Value::from(value), raw);
    }

    #[test]
    fn test_literal_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(5), Value::Int(5));
        assert_eq!(Value::from("x"), Value::String("x".to_string()));
    }
}
