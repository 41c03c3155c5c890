use tracing::{debug, instrument, warn};

use crate::error::{StorageError, StorageResult};
use crate::models::{Operation, OperationResult, VectorOperation, VectorOperationResult};
use crate::relational::{RelationalExecutor, SqlBackend};
use crate::summary::summarize_failures;
use crate::vector::{VectorBackend, VectorExecutor};

/// Outcome of a whole batch as reported to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<T> {
    pub results: Vec<T>,
    pub success: bool,
    /// Batch-fatal error, or the failure summary when some operations failed
    pub error: Option<String>,
}

impl<T> BatchReport<T> {
    pub fn rejected(err: StorageError) -> Self {
        Self {
            results: Vec::new(),
            success: false,
            error: Some(err.to_string()),
        }
    }
}

/// Something with a per-operation outcome that can feed the failure summary.
trait Outcome {
    fn index(&self) -> usize;
    fn failure(&self) -> Option<String>;
}

impl Outcome for OperationResult {
    fn index(&self) -> usize {
        self.index
    }

    fn failure(&self) -> Option<String> {
        self.outcome.as_ref().err().map(ToString::to_string)
    }
}

impl Outcome for VectorOperationResult {
    fn index(&self) -> usize {
        self.index
    }

    fn failure(&self) -> Option<String> {
        self.outcome.as_ref().err().map(ToString::to_string)
    }
}

fn report<T: Outcome>(results: StorageResult<Vec<T>>) -> BatchReport<T> {
    let results = match results {
        Ok(results) => results,
        Err(err) => return BatchReport::rejected(err),
    };

    let error = summarize_failures(
        results
            .iter()
            .filter_map(|r| r.failure().map(|msg| (r.index(), msg))),
    );

    BatchReport {
        success: error.is_none(),
        error,
        results,
    }
}

/// Gateway facade over the two executors. Either backend may be absent, in
/// which case calls for it are rejected without touching the other.
pub struct StorageService<S: SqlBackend, V: VectorBackend> {
    relational: Option<RelationalExecutor<S>>,
    vector: Option<VectorExecutor<V>>,
}

impl<S: SqlBackend, V: VectorBackend> Default for StorageService<S, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SqlBackend, V: VectorBackend> StorageService<S, V> {
    pub fn new() -> Self {
        Self {
            relational: None,
            vector: None,
        }
    }

    pub fn with_relational(mut self, executor: RelationalExecutor<S>) -> Self {
        self.relational = Some(executor);
        self
    }

    pub fn with_vector(mut self, executor: VectorExecutor<V>) -> Self {
        self.vector = Some(executor);
        self
    }

    pub fn relational(&self) -> Option<&RelationalExecutor<S>> {
        self.relational.as_ref()
    }

    pub fn vector(&self) -> Option<&VectorExecutor<V>> {
        self.vector.as_ref()
    }

    #[instrument(skip(self, operations), fields(operations = operations.len()))]
    pub async fn execute(
        &self,
        operations: Vec<Operation>,
        use_transaction: bool,
    ) -> BatchReport<OperationResult> {
        let Some(executor) = &self.relational else {
            warn!("relational batch received but MySQL is not configured");
            return BatchReport::rejected(StorageError::NotInitialized("MySQL"));
        };

        let report = report(executor.execute_batch(operations, use_transaction).await);
        debug!(success = report.success, "relational batch finished");
        report
    }

    #[instrument(skip(self, operations), fields(operations = operations.len()))]
    pub async fn execute_vector(
        &self,
        operations: Vec<VectorOperation>,
    ) -> BatchReport<VectorOperationResult> {
        let Some(executor) = &self.vector else {
            warn!("vector batch received but Milvus is not configured");
            return BatchReport::rejected(StorageError::NotInitialized("Milvus"));
        };

        let report = report(Ok(executor.execute_batch(operations).await));
        debug!(success = report.success, "vector batch finished");
        report
    }
}
