use std::collections::HashMap;

use crate::models::{
    DeleteOp, Fields, InsertOp, Operation, OperationKind, OperationOutput, OperationResult, OrderBy,
    Pagination, SelectOp, UpdateOp, VectorData, VectorDelete, VectorMatch, VectorOperation,
    VectorOperationKind, VectorOperationResult, VectorOutput, VectorSearch, WhereClause,
};
use crate::service::BatchReport;
use crate::value::TypedValue;

// Import generated proto types
use rpc::storage::v1 as pb;
use rpc::storage::v1::operation::Operation as ProtoOperationKind;
use rpc::storage::v1::operation_result::Result as ProtoOperationOutput;
use rpc::storage::v1::typed_value::Value as ProtoValue;
use rpc::storage::v1::vector_operation::Operation as ProtoVectorKind;
use rpc::storage::v1::vector_operation_result::Result as ProtoVectorOutput;

/// Counts and indexes are int32 on the wire.
fn saturate_i32<T: TryInto<i32>>(value: T) -> i32 {
    value.try_into().unwrap_or(i32::MAX)
}

// ===== Typed Value =====

impl From<pb::TypedValue> for TypedValue {
    fn from(proto: pb::TypedValue) -> Self {
        match proto.value {
            Some(ProtoValue::StringValue(s)) => TypedValue::String(s),
            Some(ProtoValue::IntValue(i)) => TypedValue::Int(i),
            Some(ProtoValue::DoubleValue(d)) => TypedValue::Double(d),
            Some(ProtoValue::BoolValue(b)) => TypedValue::Bool(b),
            Some(ProtoValue::BytesValue(b)) => TypedValue::Bytes(b),
            Some(ProtoValue::TimestampValue(ms)) => TypedValue::Timestamp(ms),
            Some(ProtoValue::NullValue(_)) | None => TypedValue::Null,
        }
    }
}

impl From<TypedValue> for pb::TypedValue {
    fn from(value: TypedValue) -> Self {
        let value = match value {
            TypedValue::String(s) => ProtoValue::StringValue(s),
            TypedValue::Int(i) => ProtoValue::IntValue(i),
            TypedValue::Double(d) => ProtoValue::DoubleValue(d),
            TypedValue::Bool(b) => ProtoValue::BoolValue(b),
            TypedValue::Bytes(b) => ProtoValue::BytesValue(b),
            TypedValue::Timestamp(ms) => ProtoValue::TimestampValue(ms),
            TypedValue::Null => ProtoValue::NullValue(pb::NullValue::NullValue as i32),
        };
        pb::TypedValue { value: Some(value) }
    }
}

pub fn fields_from_proto(proto: HashMap<String, pb::TypedValue>) -> Fields {
    proto.into_iter().map(|(k, v)| (k, v.into())).collect()
}

pub fn fields_to_proto(fields: Fields) -> HashMap<String, pb::TypedValue> {
    fields.into_iter().map(|(k, v)| (k, v.into())).collect()
}

fn values_from_proto(proto: Vec<pb::TypedValue>) -> Vec<TypedValue> {
    proto.into_iter().map(TypedValue::from).collect()
}

// ===== Relational Requests =====

impl From<pb::WhereClause> for WhereClause {
    fn from(proto: pb::WhereClause) -> Self {
        WhereClause {
            conditions: fields_from_proto(proto.conditions),
            raw_clause: proto.raw_clause,
            raw_params: values_from_proto(proto.raw_params),
        }
    }
}

impl From<pb::InsertOperation> for InsertOp {
    fn from(proto: pb::InsertOperation) -> Self {
        InsertOp {
            rows: proto
                .rows
                .into_iter()
                .map(|row| fields_from_proto(row.fields))
                .collect(),
        }
    }
}

impl From<pb::UpdateOperation> for UpdateOp {
    fn from(proto: pb::UpdateOperation) -> Self {
        UpdateOp {
            set_fields: fields_from_proto(proto.set_fields),
            where_clause: proto.r#where.map(Into::into),
            raw_set: proto.raw_set,
            raw_set_params: values_from_proto(proto.raw_set_params),
        }
    }
}

impl From<pb::DeleteOperation> for DeleteOp {
    fn from(proto: pb::DeleteOperation) -> Self {
        DeleteOp {
            where_clause: proto.r#where.map(Into::into),
        }
    }
}

impl From<pb::SelectOperation> for SelectOp {
    fn from(proto: pb::SelectOperation) -> Self {
        SelectOp {
            fields: proto.fields,
            where_clause: proto.r#where.map(Into::into),
            order_by: proto
                .order_by
                .filter(|o| !o.field.is_empty())
                .map(|o| OrderBy {
                    field: o.field,
                    descending: o.descending,
                }),
            pagination: proto.pagination.map(|p| Pagination {
                limit: i64::from(p.limit),
                offset: i64::from(p.offset),
            }),
        }
    }
}

impl From<pb::Operation> for Operation {
    fn from(proto: pb::Operation) -> Self {
        let kind = match proto.operation {
            Some(ProtoOperationKind::Insert(op)) => OperationKind::Insert(op.into()),
            Some(ProtoOperationKind::Update(op)) => OperationKind::Update(op.into()),
            Some(ProtoOperationKind::Delete(op)) => OperationKind::Delete(op.into()),
            Some(ProtoOperationKind::Select(op)) => OperationKind::Select(op.into()),
            None => OperationKind::Unknown,
        };
        Operation::new(proto.database, proto.table, kind)
    }
}

// ===== Relational Responses =====

impl From<OperationOutput> for ProtoOperationOutput {
    fn from(output: OperationOutput) -> Self {
        match output {
            OperationOutput::Inserted(n) => ProtoOperationOutput::InsertResult(pb::InsertResult {
                inserted_count: saturate_i32(n),
            }),
            OperationOutput::Updated(n) => ProtoOperationOutput::UpdateResult(pb::UpdateResult {
                affected_rows: saturate_i32(n),
            }),
            OperationOutput::Deleted(n) => ProtoOperationOutput::DeleteResult(pb::DeleteResult {
                affected_rows: saturate_i32(n),
            }),
            OperationOutput::Selected { rows, total } => {
                ProtoOperationOutput::SelectResult(pb::SelectResult {
                    rows: rows
                        .into_iter()
                        .map(|row| pb::ResultRow {
                            fields: fields_to_proto(row),
                        })
                        .collect(),
                    total: saturate_i32(total),
                })
            }
        }
    }
}

impl From<OperationResult> for pb::OperationResult {
    fn from(result: OperationResult) -> Self {
        let index = saturate_i32(result.index);
        match result.outcome {
            Ok(output) => pb::OperationResult {
                index,
                success: true,
                error: String::new(),
                result: Some(output.into()),
            },
            Err(err) => pb::OperationResult {
                index,
                success: false,
                error: err.to_string(),
                result: None,
            },
        }
    }
}

impl From<BatchReport<OperationResult>> for pb::ExecuteResponse {
    fn from(report: BatchReport<OperationResult>) -> Self {
        pb::ExecuteResponse {
            results: report.results.into_iter().map(Into::into).collect(),
            success: report.success,
            error: report.error.unwrap_or_default(),
        }
    }
}

// ===== Vector Requests =====

impl From<pb::VectorData> for VectorData {
    fn from(proto: pb::VectorData) -> Self {
        VectorData {
            id: proto.id,
            embedding: proto.vector,
            metadata: fields_from_proto(proto.metadata),
        }
    }
}

fn vectors_from_proto(proto: Vec<pb::VectorData>) -> Vec<VectorData> {
    proto.into_iter().map(VectorData::from).collect()
}

impl From<pb::VectorSearchOperation> for VectorSearch {
    fn from(proto: pb::VectorSearchOperation) -> Self {
        VectorSearch {
            query_vector: proto.query_vector,
            top_k: i64::from(proto.top_k),
            filter: fields_from_proto(proto.filter),
            filter_expr: proto.filter_expr,
            min_score: proto.min_score,
            output_fields: proto.output_fields,
        }
    }
}

impl From<pb::VectorDeleteOperation> for VectorDelete {
    fn from(proto: pb::VectorDeleteOperation) -> Self {
        VectorDelete {
            ids: proto.ids,
            filter: fields_from_proto(proto.filter),
            filter_expr: proto.filter_expr,
        }
    }
}

impl From<pb::VectorOperation> for VectorOperation {
    fn from(proto: pb::VectorOperation) -> Self {
        let kind = match proto.operation {
            Some(ProtoVectorKind::Insert(op)) => {
                VectorOperationKind::Insert(vectors_from_proto(op.vectors))
            }
            Some(ProtoVectorKind::Upsert(op)) => {
                VectorOperationKind::Upsert(vectors_from_proto(op.vectors))
            }
            Some(ProtoVectorKind::Search(op)) => VectorOperationKind::Search(op.into()),
            Some(ProtoVectorKind::Delete(op)) => VectorOperationKind::Delete(op.into()),
            None => VectorOperationKind::Unknown,
        };
        VectorOperation {
            collection: proto.collection,
            partition: Some(proto.partition).filter(|p| !p.trim().is_empty()),
            kind,
        }
    }
}

// ===== Vector Responses =====

impl From<VectorMatch> for pb::VectorMatch {
    fn from(m: VectorMatch) -> Self {
        pb::VectorMatch {
            id: m.id,
            score: m.score,
            metadata: fields_to_proto(m.metadata),
        }
    }
}

impl From<VectorOutput> for ProtoVectorOutput {
    fn from(output: VectorOutput) -> Self {
        match output {
            VectorOutput::Inserted(n) => ProtoVectorOutput::InsertResult(pb::VectorInsertResult {
                inserted_count: saturate_i32(n),
            }),
            VectorOutput::Upserted(n) => ProtoVectorOutput::UpsertResult(pb::VectorUpsertResult {
                upserted_count: saturate_i32(n),
            }),
            VectorOutput::Searched(matches) => {
                ProtoVectorOutput::SearchResult(pb::VectorSearchResult {
                    matches: matches.into_iter().map(Into::into).collect(),
                })
            }
            VectorOutput::Deleted(n) => ProtoVectorOutput::DeleteResult(pb::VectorDeleteResult {
                deleted_count: saturate_i32(n),
            }),
        }
    }
}

impl From<VectorOperationResult> for pb::VectorOperationResult {
    fn from(result: VectorOperationResult) -> Self {
        let index = saturate_i32(result.index);
        match result.outcome {
            Ok(output) => pb::VectorOperationResult {
                index,
                success: true,
                error: String::new(),
                result: Some(output.into()),
            },
            Err(err) => pb::VectorOperationResult {
                index,
                success: false,
                error: err.to_string(),
                result: None,
            },
        }
    }
}

impl From<BatchReport<VectorOperationResult>> for pb::ExecuteVectorResponse {
    fn from(report: BatchReport<VectorOperationResult>) -> Self {
        pb::ExecuteVectorResponse {
            results: report.results.into_iter().map(Into::into).collect(),
            success: report.success,
            error: report.error.unwrap_or_default(),
        }
    }
}
