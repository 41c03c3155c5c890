//! Storage Domain Library
//!
//! Backend-agnostic batch execution for two kinds of store: a relational
//! database (MySQL) and a vector database (Milvus).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  StorageService  │  ← batch reports, failure summaries
//! └───┬──────────┬───┘
//!     │          │
//! ┌───▼──────┐ ┌─▼──────────────┐
//! │Relational│ │ VectorExecutor │
//! │ Executor │ └─┬──────────────┘
//! └───┬──────┘   │
//! ┌───▼──────┐ ┌─▼──────────────┐
//! │SqlBackend│ │ VectorBackend  │
//! │ (trait)  │ │   (trait)      │
//! └───┬──────┘ └─┬──────────────┘
//! ┌───▼──────┐ ┌─▼──────────────┐
//! │  MySQL   │ │ Milvus (REST)  │
//! └──────────┘ └────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use domain_storage::{
//!     MilvusClient, MilvusConfig, MySqlBackend, Operation, OperationKind, RelationalExecutor,
//!     SelectOp, StorageService, VectorExecutor,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mysql = MySqlBackend::connect("mysql://root@localhost/app", Duration::from_secs(8)).await?;
//! let milvus = MilvusClient::new(&MilvusConfig::new("localhost:19530"))?;
//!
//! let service = StorageService::new()
//!     .with_relational(RelationalExecutor::new(mysql))
//!     .with_vector(VectorExecutor::new(milvus, 1536));
//!
//! let report = service
//!     .execute(
//!         vec![Operation::new("app", "users", OperationKind::Select(SelectOp::default()))],
//!         false,
//!     )
//!     .await;
//! assert!(report.success);
//! # Ok(())
//! # }
//! ```

pub mod conversions;
pub mod error;
pub mod models;
pub mod relational;
pub mod service;
pub mod summary;
pub mod value;
pub mod vector;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use models::{
    DeleteOp, Fields, InsertOp, Operation, OperationKind, OperationOutput, OperationResult,
    OrderBy, Pagination, SelectOp, UpdateOp, VectorData, VectorDelete, VectorMatch,
    VectorOperation, VectorOperationKind, VectorOperationResult, VectorOutput, VectorSearch,
    WhereClause,
};
pub use relational::{MySqlBackend, RelationalExecutor, SqlBackend, SqlExecutor, SqlStatement, SqlTransaction};
pub use service::{BatchReport, StorageService};
pub use summary::summarize_failures;
pub use value::TypedValue;
pub use vector::{MilvusClient, MilvusConfig, VectorBackend, VectorExecutor};
