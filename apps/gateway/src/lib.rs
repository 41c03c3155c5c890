//! Storage Gateway
//!
//! A gRPC front for batched relational (MySQL) and vector (Milvus) operations.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   ↓ (gRPC, optional Zstd compression)
//! StorageServiceImpl (service.rs)
//!   ↓ (proto ↔ domain conversions)
//! StorageService (domain layer)
//!   ↓
//! ┌────────────────────┬──────────────────┐
//! │ RelationalExecutor │  VectorExecutor  │
//! └────────────────────┴──────────────────┘
//!   ↓                      ↓
//! MySQL (sqlx)         Milvus (REST v2)
//! ```
//!
//! Either backend can be left unconfigured; calls for it then answer with
//! `success = false` and a "client not initialized" error.
//!
//! ## Modules
//!
//! - `server`: configuration, backend connections, server lifecycle
//! - `service`: gRPC service implementation (StorageServiceImpl)

pub mod server;
pub mod service;

// Re-export for convenience
pub use server::{run, serve, shutdown_signal};
pub use service::StorageServiceImpl;
