// @generated
// This file is @generated by prost-build.
/// Tagged scalar used for column values and vector metadata.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypedValue {
    #[prost(oneof = "typed_value::Value", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub value: ::core::option::Option<typed_value::Value>,
}
/// Nested message and enum types in `TypedValue`.
pub mod typed_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(string, tag = "1")]
        StringValue(::prost::alloc::string::String),
        #[prost(int64, tag = "2")]
        IntValue(i64),
        #[prost(double, tag = "3")]
        DoubleValue(f64),
        #[prost(bool, tag = "4")]
        BoolValue(bool),
        #[prost(bytes, tag = "5")]
        BytesValue(::prost::alloc::vec::Vec<u8>),
        /// Unix epoch milliseconds
        #[prost(int64, tag = "6")]
        TimestampValue(i64),
        #[prost(enumeration = "super::NullValue", tag = "7")]
        NullValue(i32),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Row {
    #[prost(map = "string, message", tag = "1")]
    pub fields: ::std::collections::HashMap<::prost::alloc::string::String, TypedValue>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WhereClause {
    /// field = value, joined with AND
    #[prost(map = "string, message", tag = "1")]
    pub conditions: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        TypedValue,
    >,
    /// takes priority over conditions when set
    #[prost(string, tag = "2")]
    pub raw_clause: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub raw_params: ::prost::alloc::vec::Vec<TypedValue>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InsertOperation {
    #[prost(message, repeated, tag = "1")]
    pub rows: ::prost::alloc::vec::Vec<Row>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateOperation {
    #[prost(map = "string, message", tag = "1")]
    pub set_fields: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        TypedValue,
    >,
    #[prost(message, optional, tag = "2")]
    pub r#where: ::core::option::Option<WhereClause>,
    /// takes priority over set_fields when set, e.g. "hits = hits + ?"
    #[prost(string, tag = "3")]
    pub raw_set: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "4")]
    pub raw_set_params: ::prost::alloc::vec::Vec<TypedValue>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteOperation {
    #[prost(message, optional, tag = "1")]
    pub r#where: ::core::option::Option<WhereClause>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OrderBy {
    #[prost(string, tag = "1")]
    pub field: ::prost::alloc::string::String,
    #[prost(bool, tag = "2")]
    pub descending: bool,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Pagination {
    #[prost(int32, tag = "1")]
    pub limit: i32,
    #[prost(int32, tag = "2")]
    pub offset: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SelectOperation {
    #[prost(string, repeated, tag = "1")]
    pub fields: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "2")]
    pub r#where: ::core::option::Option<WhereClause>,
    #[prost(message, optional, tag = "3")]
    pub order_by: ::core::option::Option<OrderBy>,
    #[prost(message, optional, tag = "4")]
    pub pagination: ::core::option::Option<Pagination>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Operation {
    #[prost(string, tag = "1")]
    pub database: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub table: ::prost::alloc::string::String,
    #[prost(oneof = "operation::Operation", tags = "3, 4, 5, 6")]
    pub operation: ::core::option::Option<operation::Operation>,
}
/// Nested message and enum types in `Operation`.
pub mod operation {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Operation {
        #[prost(message, tag = "3")]
        Insert(super::InsertOperation),
        #[prost(message, tag = "4")]
        Update(super::UpdateOperation),
        #[prost(message, tag = "5")]
        Delete(super::DeleteOperation),
        #[prost(message, tag = "6")]
        Select(super::SelectOperation),
    }
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct InsertResult {
    #[prost(int32, tag = "1")]
    pub inserted_count: i32,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct UpdateResult {
    #[prost(int32, tag = "1")]
    pub affected_rows: i32,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct DeleteResult {
    #[prost(int32, tag = "1")]
    pub affected_rows: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResultRow {
    #[prost(map = "string, message", tag = "1")]
    pub fields: ::std::collections::HashMap<::prost::alloc::string::String, TypedValue>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SelectResult {
    #[prost(message, repeated, tag = "1")]
    pub rows: ::prost::alloc::vec::Vec<ResultRow>,
    #[prost(int32, tag = "2")]
    pub total: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OperationResult {
    #[prost(int32, tag = "1")]
    pub index: i32,
    #[prost(bool, tag = "2")]
    pub success: bool,
    #[prost(string, tag = "3")]
    pub error: ::prost::alloc::string::String,
    #[prost(oneof = "operation_result::Result", tags = "4, 5, 6, 7")]
    pub result: ::core::option::Option<operation_result::Result>,
}
/// Nested message and enum types in `OperationResult`.
pub mod operation_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "4")]
        InsertResult(super::InsertResult),
        #[prost(message, tag = "5")]
        UpdateResult(super::UpdateResult),
        #[prost(message, tag = "6")]
        DeleteResult(super::DeleteResult),
        #[prost(message, tag = "7")]
        SelectResult(super::SelectResult),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteRequest {
    #[prost(message, repeated, tag = "1")]
    pub operations: ::prost::alloc::vec::Vec<Operation>,
    #[prost(bool, tag = "2")]
    pub use_transaction: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<OperationResult>,
    #[prost(bool, tag = "2")]
    pub success: bool,
    #[prost(string, tag = "3")]
    pub error: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorData {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(float, repeated, tag = "2")]
    pub vector: ::prost::alloc::vec::Vec<f32>,
    #[prost(map = "string, message", tag = "3")]
    pub metadata: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        TypedValue,
    >,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorInsertOperation {
    #[prost(message, repeated, tag = "1")]
    pub vectors: ::prost::alloc::vec::Vec<VectorData>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorUpsertOperation {
    #[prost(message, repeated, tag = "1")]
    pub vectors: ::prost::alloc::vec::Vec<VectorData>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorSearchOperation {
    #[prost(float, repeated, tag = "1")]
    pub query_vector: ::prost::alloc::vec::Vec<f32>,
    /// defaults to 10 when <= 0
    #[prost(int32, tag = "2")]
    pub top_k: i32,
    #[prost(map = "string, message", tag = "3")]
    pub filter: ::std::collections::HashMap<::prost::alloc::string::String, TypedValue>,
    /// takes priority over filter when set
    #[prost(string, tag = "4")]
    pub filter_expr: ::prost::alloc::string::String,
    /// exclusive threshold, 0 disables
    #[prost(float, tag = "5")]
    pub min_score: f32,
    #[prost(string, repeated, tag = "6")]
    pub output_fields: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorDeleteOperation {
    #[prost(string, repeated, tag = "1")]
    pub ids: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(map = "string, message", tag = "2")]
    pub filter: ::std::collections::HashMap<::prost::alloc::string::String, TypedValue>,
    #[prost(string, tag = "3")]
    pub filter_expr: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorOperation {
    #[prost(string, tag = "1")]
    pub collection: ::prost::alloc::string::String,
    /// created on demand when missing
    #[prost(string, tag = "2")]
    pub partition: ::prost::alloc::string::String,
    #[prost(oneof = "vector_operation::Operation", tags = "3, 4, 5, 6")]
    pub operation: ::core::option::Option<vector_operation::Operation>,
}
/// Nested message and enum types in `VectorOperation`.
pub mod vector_operation {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Operation {
        #[prost(message, tag = "3")]
        Insert(super::VectorInsertOperation),
        #[prost(message, tag = "4")]
        Search(super::VectorSearchOperation),
        #[prost(message, tag = "5")]
        Delete(super::VectorDeleteOperation),
        #[prost(message, tag = "6")]
        Upsert(super::VectorUpsertOperation),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorMatch {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(float, tag = "2")]
    pub score: f32,
    #[prost(map = "string, message", tag = "3")]
    pub metadata: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        TypedValue,
    >,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct VectorInsertResult {
    #[prost(int32, tag = "1")]
    pub inserted_count: i32,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct VectorUpsertResult {
    #[prost(int32, tag = "1")]
    pub upserted_count: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorSearchResult {
    #[prost(message, repeated, tag = "1")]
    pub matches: ::prost::alloc::vec::Vec<VectorMatch>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct VectorDeleteResult {
    #[prost(int32, tag = "1")]
    pub deleted_count: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorOperationResult {
    #[prost(int32, tag = "1")]
    pub index: i32,
    #[prost(bool, tag = "2")]
    pub success: bool,
    #[prost(string, tag = "3")]
    pub error: ::prost::alloc::string::String,
    #[prost(oneof = "vector_operation_result::Result", tags = "4, 5, 6, 7")]
    pub result: ::core::option::Option<vector_operation_result::Result>,
}
/// Nested message and enum types in `VectorOperationResult`.
pub mod vector_operation_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "4")]
        InsertResult(super::VectorInsertResult),
        #[prost(message, tag = "5")]
        SearchResult(super::VectorSearchResult),
        #[prost(message, tag = "6")]
        DeleteResult(super::VectorDeleteResult),
        #[prost(message, tag = "7")]
        UpsertResult(super::VectorUpsertResult),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteVectorRequest {
    #[prost(message, repeated, tag = "1")]
    pub operations: ::prost::alloc::vec::Vec<VectorOperation>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteVectorResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<VectorOperationResult>,
    #[prost(bool, tag = "2")]
    pub success: bool,
    #[prost(string, tag = "3")]
    pub error: ::prost::alloc::string::String,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum NullValue {
    NullValue = 0,
}
impl NullValue {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::NullValue => "NULL_VALUE",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "NULL_VALUE" => Some(Self::NullValue),
            _ => None,
        }
    }
}
include!("storage.v1.tonic.rs");
