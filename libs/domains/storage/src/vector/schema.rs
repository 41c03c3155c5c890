//! Batch-scoped schema inference for vector metadata.
//!
//! The target collection has no fixed business schema, so each batch is
//! compiled in two passes: [`infer_field_kinds`] fixes a column kind per
//! field from the first non-null value seen in submission order, then
//! [`compile_columns`] coerces every row into those kinds.

use std::collections::BTreeMap;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{StorageError, StorageResult};
use crate::models::VectorData;
use crate::value::TypedValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int64,
    Double,
    Bool,
    Json,
    VarChar,
}

impl FieldKind {
    /// Kind implied by a single value; `None` for null.
    pub fn of(value: &TypedValue) -> Option<Self> {
        let kind = match value {
            TypedValue::Null => return None,
            TypedValue::Int(_) | TypedValue::Timestamp(_) => FieldKind::Int64,
            TypedValue::Double(_) => FieldKind::Double,
            TypedValue::Bool(_) => FieldKind::Bool,
            TypedValue::String(s) if TypedValue::looks_like_json(s) => FieldKind::Json,
            TypedValue::String(_) | TypedValue::Bytes(_) => FieldKind::VarChar,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int64(Vec<i64>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
    Json(Vec<JsonValue>),
    VarChar(Vec<String>),
}

impl ColumnData {
    pub fn kind(&self) -> FieldKind {
        match self {
            ColumnData::Int64(_) => FieldKind::Int64,
            ColumnData::Double(_) => FieldKind::Double,
            ColumnData::Bool(_) => FieldKind::Bool,
            ColumnData::Json(_) => FieldKind::Json,
            ColumnData::VarChar(_) => FieldKind::VarChar,
        }
    }

    /// Cell `row` as JSON, the shape the REST API expects.
    pub fn json_at(&self, row: usize) -> JsonValue {
        match self {
            ColumnData::Int64(v) => v.get(row).copied().map_or(JsonValue::Null, JsonValue::from),
            ColumnData::Double(v) => v.get(row).copied().map_or(JsonValue::Null, JsonValue::from),
            ColumnData::Bool(v) => v.get(row).copied().map_or(JsonValue::Null, JsonValue::from),
            ColumnData::Json(v) => v.get(row).cloned().unwrap_or(JsonValue::Null),
            ColumnData::VarChar(v) => v.get(row).cloned().map_or(JsonValue::Null, JsonValue::from),
        }
    }

    /// Cell `row` back as a typed value.
    pub fn value_at(&self, row: usize) -> TypedValue {
        match self {
            ColumnData::Int64(v) => v.get(row).copied().into(),
            ColumnData::Double(v) => v.get(row).copied().into(),
            ColumnData::Bool(v) => v.get(row).copied().into(),
            ColumnData::Json(v) => v.get(row).map(|j| j.to_string()).into(),
            ColumnData::VarChar(v) => v.get(row).cloned().into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// A batch compiled into column form: the fixed `id`/`vector` columns plus
/// one typed column per metadata field, in field-name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBatch {
    pub ids: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub fields: Vec<Column>,
}

impl ColumnBatch {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.fields.iter().find(|c| c.name == name)
    }
}

/// First pass: field name to column kind.
pub fn infer_field_kinds(vectors: &[VectorData]) -> BTreeMap<String, FieldKind> {
    let mut kinds = BTreeMap::new();
    for vector in vectors {
        for (name, value) in &vector.metadata {
            if kinds.contains_key(name) {
                continue;
            }
            if let Some(kind) = FieldKind::of(value) {
                kinds.insert(name.clone(), kind);
            }
        }
    }
    kinds
}

fn json_cell(value: Option<&TypedValue>) -> JsonValue {
    let empty = || JsonValue::Object(JsonMap::new());
    match value.map(TypedValue::as_string) {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(&text).unwrap_or_else(|_| empty()),
        _ => empty(),
    }
}

fn build_column(name: &str, kind: FieldKind, vectors: &[VectorData]) -> ColumnData {
    let cells = vectors.iter().map(|v| v.metadata.get(name));
    match kind {
        FieldKind::Int64 => ColumnData::Int64(cells.map(|c| c.map_or(0, TypedValue::as_i64)).collect()),
        FieldKind::Double => {
            ColumnData::Double(cells.map(|c| c.map_or(0.0, TypedValue::as_f64)).collect())
        }
        FieldKind::Bool => ColumnData::Bool(cells.map(|c| c.is_some_and(TypedValue::as_bool)).collect()),
        FieldKind::Json => ColumnData::Json(cells.map(json_cell).collect()),
        FieldKind::VarChar => {
            ColumnData::VarChar(cells.map(|c| c.map(TypedValue::as_string).unwrap_or_default()).collect())
        }
    }
}

/// Second pass: materialises the columns. Every embedding must match the
/// collection dimension.
pub fn compile_columns(vectors: &[VectorData], dimension: usize) -> StorageResult<ColumnBatch> {
    if vectors.is_empty() {
        return Err(StorageError::validation("vectors is empty"));
    }

    if let Some(bad) = vectors.iter().find(|v| v.embedding.len() != dimension) {
        return Err(StorageError::validation(format!(
            "vector '{}' has dimension {}, expected {}",
            bad.id,
            bad.embedding.len(),
            dimension
        )));
    }

    let fields = infer_field_kinds(vectors)
        .into_iter()
        .map(|(name, kind)| {
            let data = build_column(&name, kind, vectors);
            Column { name, data }
        })
        .collect();

    Ok(ColumnBatch {
        ids: vectors.iter().map(|v| v.id.clone()).collect(),
        embeddings: vectors.iter().map(|v| v.embedding.clone()).collect(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vector(id: &str) -> VectorData {
        VectorData::new(id, vec![0.0, 1.0])
    }

    #[test]
    fn test_first_non_null_value_decides_kind() {
        let vectors = vec![
            vector("a").with_field("k", TypedValue::Null),
            vector("b"),
            vector("c").with_field("other", "x"),
            vector("d").with_field("k", 3i64),
            vector("e").with_field("k", "later string"),
        ];

        let kinds = infer_field_kinds(&vectors);

        assert_eq!(kinds.get("k"), Some(&FieldKind::Int64));
        assert_eq!(kinds.get("other"), Some(&FieldKind::VarChar));
    }

    #[test]
    fn test_kind_rules() {
        assert_eq!(FieldKind::of(&TypedValue::Timestamp(1)), Some(FieldKind::Int64));
        assert_eq!(FieldKind::of(&TypedValue::Double(1.5)), Some(FieldKind::Double));
        assert_eq!(FieldKind::of(&TypedValue::Bool(true)), Some(FieldKind::Bool));
        assert_eq!(FieldKind::of(&"[1,2,3]".into()), Some(FieldKind::Json));
        assert_eq!(FieldKind::of(&"{\"a\":1}".into()), Some(FieldKind::Json));
        assert_eq!(FieldKind::of(&"hello".into()), Some(FieldKind::VarChar));
        assert_eq!(FieldKind::of(&"{bad json".into()), Some(FieldKind::VarChar));
        assert_eq!(FieldKind::of(&TypedValue::Bytes(b"raw".to_vec())), Some(FieldKind::VarChar));
        assert_eq!(FieldKind::of(&TypedValue::Null), None);
    }

    #[test]
    fn test_mismatched_values_coerce_to_zero() {
        let vectors = vec![
            vector("a").with_field("n", 5i64),
            vector("b").with_field("n", "x"),
        ];

        let batch = compile_columns(&vectors, 2).unwrap();

        assert_eq!(batch.ids, vec!["a", "b"]);
        assert_eq!(batch.fields.len(), 1);
        assert_eq!(batch.fields[0].name, "n");
        assert_eq!(batch.fields[0].data, ColumnData::Int64(vec![5, 0]));
    }

    #[test]
    fn test_missing_cells_get_zero_values() {
        let vectors = vec![
            vector("a")
                .with_field("score", 0.5)
                .with_field("pinned", true)
                .with_field("title", "first"),
            vector("b"),
        ];

        let batch = compile_columns(&vectors, 2).unwrap();

        assert_eq!(batch.column("score").unwrap().data, ColumnData::Double(vec![0.5, 0.0]));
        assert_eq!(batch.column("pinned").unwrap().data, ColumnData::Bool(vec![true, false]));
        assert_eq!(
            batch.column("title").unwrap().data,
            ColumnData::VarChar(vec!["first".to_string(), String::new()])
        );
    }

    #[test]
    fn test_json_cells_default_to_empty_object() {
        let vectors = vec![
            vector("a").with_field("tags", "[\"x\",\"y\"]"),
            vector("b").with_field("tags", "not json"),
            vector("c"),
            vector("d").with_field("tags", ""),
        ];

        let batch = compile_columns(&vectors, 2).unwrap();

        assert_eq!(
            batch.column("tags").unwrap().data,
            ColumnData::Json(vec![json!(["x", "y"]), json!({}), json!({}), json!({})])
        );
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let vectors = vec![vector("a"), VectorData::new("b", vec![1.0, 2.0, 3.0])];

        let err = compile_columns(&vectors, 2).unwrap_err();

        assert_eq!(err.to_string(), "vector 'b' has dimension 3, expected 2");
    }

    #[test]
    fn test_cells_round_trip_through_json_and_values() {
        let column = ColumnData::Json(vec![json!({"a": 1})]);
        assert_eq!(column.json_at(0), json!({"a": 1}));
        assert_eq!(column.value_at(0), TypedValue::from("{\"a\":1}"));
        assert_eq!(ColumnData::Int64(vec![7]).json_at(0), json!(7));
        assert_eq!(ColumnData::Int64(vec![7]).value_at(1), TypedValue::Null);
    }
}
