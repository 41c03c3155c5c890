use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::Fields;
use crate::vector::schema::ColumnBatch;

/// Rows to insert or upsert, already compiled into typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub collection: String,
    pub partition: Option<String>,
    pub columns: ColumnBatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub collection: String,
    pub partition: Option<String>,
    pub vector: Vec<f32>,
    pub top_k: usize,
    /// Empty means no filter
    pub filter: String,
    pub output_fields: Vec<String>,
}

/// A raw hit. `fields` may still contain the id and vector fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    pub collection: String,
    pub partition: Option<String>,
    pub filter: String,
}

/// Vector store primitives used by the vector executor.
///
/// The store owns collections and their schema; this trait never creates
/// one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorBackend: Send + Sync + 'static {
    async fn has_collection(&self, collection: &str) -> StorageResult<bool>;

    async fn has_partition(&self, collection: &str, partition: &str) -> StorageResult<bool>;

    async fn create_partition(&self, collection: &str, partition: &str) -> StorageResult<()>;

    /// Loads the collection into memory unless it already is.
    async fn ensure_loaded(&self, collection: &str) -> StorageResult<()>;

    /// Returns the number of rows written.
    async fn insert(&self, request: WriteRequest) -> StorageResult<u64>;

    async fn upsert(&self, request: WriteRequest) -> StorageResult<u64>;

    async fn search(&self, request: SearchRequest) -> StorageResult<Vec<SearchHit>>;

    /// Returns the deleted count when the store reports one.
    async fn delete(&self, request: DeleteRequest) -> StorageResult<Option<u64>>;

    /// Makes recent writes visible to search.
    async fn flush(&self, collection: &str) -> StorageResult<()>;
}
