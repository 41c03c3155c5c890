pub mod backend;
pub mod executor;
pub mod filter;
pub mod milvus;
pub mod schema;

pub use backend::{DeleteRequest, SearchHit, SearchRequest, VectorBackend, WriteRequest};
pub use executor::VectorExecutor;
pub use milvus::{MilvusClient, MilvusConfig};

/// Primary key field every collection must declare.
pub const ID_FIELD: &str = "id";
/// Float vector field every collection must declare.
pub const VECTOR_FIELD: &str = "vector";
pub const DEFAULT_TOP_K: usize = 10;
