//! Shared test utilities for the storage gateway
//!
//! This crate provides reusable test infrastructure:
//! - `RecordingSqlBackend`: relational backend fake that records statements (always available)
//! - `InMemoryVectorStore`: vector backend fake with brute-force L2 search (always available)
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `TestMySql`: MySQL container with automatic cleanup (feature: "mysql")
//!
//! # Features
//!
//! - `mysql`: Enables MySQL container infrastructure (needs Docker)
//! - `all`: Enables all container infrastructure
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_storage::{RelationalExecutor, StorageService, VectorExecutor};
//! use test_utils::{InMemoryVectorStore, RecordingSqlBackend, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_gateway_test() {
//!     let sql = RecordingSqlBackend::new();
//!     let store = InMemoryVectorStore::new().with_collection("memory_vectors");
//!     let service = StorageService::new()
//!         .with_relational(RelationalExecutor::new(sql.clone()))
//!         .with_vector(VectorExecutor::new(store.clone(), 4));
//!
//!     let builder = TestDataBuilder::from_test_name("my_gateway_test");
//!     let doc = builder.vector("doc", 4);
//! }
//! ```
//!
//! ## MySQL Testing
//!
//! Add `features = ["mysql"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["mysql"] }
//! ```

use domain_storage::VectorData;

#[cfg(feature = "mysql")]
mod mysql;
mod sql;
mod vector;

#[cfg(feature = "mysql")]
pub use mysql::TestMySql;
pub use sql::{RecordingConn, RecordingSqlBackend, RecordingTx, SqlEvent};
pub use vector::{InMemoryVectorStore, StoredEntity};

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_insert_vectors");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("my_test");
    /// let name = builder.name("partition", "main");
    /// // Returns: "test_partition_12345_main"
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        // underscores: Milvus partition names reject '-'
        format!("test_{}_{}_{}", prefix, self.seed, suffix)
    }

    /// A deterministic embedding in [0, 1) for `key`.
    pub fn embedding(&self, key: &str, dimension: usize) -> Vec<f32> {
        let mut state = self.seed ^ fnv1a(key);
        (0..dimension)
            .map(|_| {
                // xorshift64
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 40) as f32 / (1u64 << 24) as f32
            })
            .collect()
    }

    /// A vector with a deterministic embedding and no metadata.
    pub fn vector(&self, id: &str, dimension: usize) -> VectorData {
        VectorData::new(id, self.embedding(id, dimension))
    }
}

fn fnv1a(key: &str) -> u64 {
    key.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
