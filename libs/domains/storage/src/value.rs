//! The tagged scalar shared by relational rows and vector metadata.
//!
//! Conversions between kinds never fail: anything that cannot be
//! represented in the requested kind degrades to that kind's zero value.

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypedValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    /// Unix epoch milliseconds
    Timestamp(i64),
    #[default]
    Null,
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string",
            TypedValue::Int(_) => "int",
            TypedValue::Double(_) => "double",
            TypedValue::Bool(_) => "bool",
            TypedValue::Bytes(_) => "bytes",
            TypedValue::Timestamp(_) => "timestamp",
            TypedValue::Null => "null",
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            TypedValue::Int(v) | TypedValue::Timestamp(v) => *v,
            // `as` truncates toward zero and saturates, NaN becomes 0
            TypedValue::Double(v) => *v as i64,
            TypedValue::String(s) => s.trim().parse().unwrap_or(0),
            TypedValue::Bool(b) => i64::from(*b),
            TypedValue::Bytes(_) | TypedValue::Null => 0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            TypedValue::Double(v) => *v,
            TypedValue::Int(v) | TypedValue::Timestamp(v) => *v as f64,
            TypedValue::String(s) => s.trim().parse().unwrap_or(0.0),
            TypedValue::Bool(_) | TypedValue::Bytes(_) | TypedValue::Null => 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            TypedValue::Bool(b) => *b,
            TypedValue::Int(v) => *v != 0,
            TypedValue::Double(v) => *v != 0.0,
            TypedValue::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
            TypedValue::Timestamp(_) | TypedValue::Bytes(_) | TypedValue::Null => false,
        }
    }

    /// Text rendering used for string columns and filter literals.
    pub fn as_string(&self) -> String {
        match self {
            TypedValue::String(s) => s.clone(),
            TypedValue::Int(v) | TypedValue::Timestamp(v) => v.to_string(),
            TypedValue::Double(v) => v.to_string(),
            TypedValue::Bool(b) => b.to_string(),
            TypedValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            TypedValue::Null => String::new(),
        }
    }

    /// True for a string shaped like a JSON object or array that also parses.
    pub fn looks_like_json(s: &str) -> bool {
        let trimmed = s.trim();
        let bracketed = (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']'));
        bracketed && serde_json::from_str::<JsonValue>(trimmed).is_ok()
    }

    /// Maps a JSON value returned by a backend to the closest scalar.
    /// Objects and arrays are kept as their JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => TypedValue::Null,
            JsonValue::Bool(b) => TypedValue::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => TypedValue::Int(i),
                None => TypedValue::Double(n.as_f64().unwrap_or(0.0)),
            },
            JsonValue::String(s) => TypedValue::String(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => TypedValue::String(value.to_string()),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::String(v.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        TypedValue::String(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Int(v)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        TypedValue::Double(v)
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        TypedValue::Bool(v)
    }
}

impl From<Vec<u8>> for TypedValue {
    fn from(v: Vec<u8>) -> Self {
        TypedValue::Bytes(v)
    }
}

impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(TypedValue::Null)
    }
}
