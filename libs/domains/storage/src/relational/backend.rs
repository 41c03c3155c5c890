use async_trait::async_trait;

use crate::error::StorageResult;
use crate::models::Fields;
use crate::relational::builder::SqlStatement;

/// Something statements can run on: a pooled connection or an open
/// transaction.
#[async_trait]
pub trait SqlExecutor: Send {
    /// Runs a write and returns the affected row count.
    async fn execute(&mut self, stmt: &SqlStatement) -> StorageResult<u64>;

    /// Runs a query and decodes every row.
    async fn fetch_all(&mut self, stmt: &SqlStatement) -> StorageResult<Vec<Fields>>;
}

/// An open transaction. Dropping it without commit rolls it back.
#[async_trait]
pub trait SqlTransaction: SqlExecutor + Sized {
    async fn commit(self) -> StorageResult<()>;

    async fn rollback(self) -> StorageResult<()>;
}

/// Connection source for the relational executor.
///
/// Long-lived and shared across concurrent calls.
#[async_trait]
pub trait SqlBackend: Send + Sync + 'static {
    type Conn: SqlExecutor;
    type Tx: SqlTransaction;

    async fn acquire(&self) -> StorageResult<Self::Conn>;

    async fn begin(&self) -> StorageResult<Self::Tx>;
}
