use std::collections::BTreeMap;

use crate::error::StorageResult;
use crate::value::TypedValue;

/// Field name to value. Ordered so generated SQL and filter expressions are
/// stable for a given input.
pub type Fields = BTreeMap<String, TypedValue>;

// ===== Relational =====

/// Row selection: either a raw boolean expression with positional params,
/// or equality conditions joined with AND. The raw form wins when both are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    pub conditions: Fields,
    pub raw_clause: String,
    pub raw_params: Vec<TypedValue>,
}

impl WhereClause {
    pub fn raw(clause: impl Into<String>, params: Vec<TypedValue>) -> Self {
        Self {
            raw_clause: clause.into(),
            raw_params: params,
            ..Default::default()
        }
    }

    pub fn field_eq(field: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        let mut conditions = Fields::new();
        conditions.insert(field.into(), value.into());
        Self {
            conditions,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw_clause.trim().is_empty() && self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOp {
    pub rows: Vec<Fields>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOp {
    pub set_fields: Fields,
    pub where_clause: Option<WhereClause>,
    pub raw_set: String,
    pub raw_set_params: Vec<TypedValue>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOp {
    pub where_clause: Option<WhereClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOp {
    /// Empty selects every column
    pub fields: Vec<String>,
    pub where_clause: Option<WhereClause>,
    pub order_by: Option<OrderBy>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind {
    Insert(InsertOp),
    Update(UpdateOp),
    Delete(DeleteOp),
    Select(SelectOp),
    /// The request carried no operation this server recognises
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub database: String,
    pub table: String,
    pub kind: OperationKind,
}

impl Operation {
    pub fn new(database: impl Into<String>, table: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutput {
    Inserted(u64),
    Updated(u64),
    Deleted(u64),
    Selected { rows: Vec<Fields>, total: u64 },
}

/// Outcome of one operation, tagged with its position in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    pub index: usize,
    pub outcome: StorageResult<OperationOutput>,
}

// ===== Vector =====

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorData {
    pub id: String,
    pub embedding: Vec<f32>,
    pub metadata: Fields,
}

impl VectorData {
    pub fn new(id: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            embedding,
            metadata: Fields::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.metadata.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorSearch {
    pub query_vector: Vec<f32>,
    /// Values of zero or below mean the default of 10
    pub top_k: i64,
    pub filter: Fields,
    pub filter_expr: String,
    /// Exclusive lower bound on score; 0 disables it
    pub min_score: f32,
    pub output_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorDelete {
    pub ids: Vec<String>,
    pub filter: Fields,
    pub filter_expr: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VectorOperationKind {
    Insert(Vec<VectorData>),
    Upsert(Vec<VectorData>),
    Search(VectorSearch),
    Delete(VectorDelete),
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorOperation {
    pub collection: String,
    pub partition: Option<String>,
    pub kind: VectorOperationKind,
}

impl VectorOperation {
    pub fn new(collection: impl Into<String>, kind: VectorOperationKind) -> Self {
        Self {
            collection: collection.into(),
            partition: None,
            kind,
        }
    }

    pub fn in_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VectorOutput {
    Inserted(u64),
    Upserted(u64),
    Searched(Vec<VectorMatch>),
    Deleted(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorOperationResult {
    pub index: usize,
    pub outcome: StorageResult<VectorOutput>,
}
