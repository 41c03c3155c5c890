use tracing::{debug, instrument, warn};

use crate::error::{StorageError, StorageResult};
use crate::models::{Operation, OperationKind, OperationOutput, OperationResult};
use crate::relational::backend::{SqlBackend, SqlExecutor, SqlTransaction};
use crate::relational::builder::{
    build_delete, build_insert, build_select, build_update, SqlStatement,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKind {
    Insert,
    Update,
    Delete,
    Select,
}

impl StatementKind {
    fn error_step(self) -> &'static str {
        match self {
            StatementKind::Insert => "batch insert error",
            StatementKind::Update => "update error",
            StatementKind::Delete => "delete error",
            StatementKind::Select => "select error",
        }
    }
}

/// A validated operation, ready to run.
#[derive(Debug)]
struct Plan {
    kind: StatementKind,
    stmt: SqlStatement,
}

fn plan(op: &Operation) -> StorageResult<Plan> {
    let (kind, stmt) = match &op.kind {
        OperationKind::Insert(insert) => (
            StatementKind::Insert,
            build_insert(&op.database, &op.table, insert)?,
        ),
        OperationKind::Update(update) => (
            StatementKind::Update,
            build_update(&op.database, &op.table, update)?,
        ),
        OperationKind::Delete(delete) => (
            StatementKind::Delete,
            build_delete(&op.database, &op.table, delete)?,
        ),
        OperationKind::Select(select) => (
            StatementKind::Select,
            build_select(&op.database, &op.table, select)?,
        ),
        OperationKind::Unknown => {
            return Err(StorageError::validation("unknown operation type"));
        }
    };
    Ok(Plan { kind, stmt })
}

async fn run<E: SqlExecutor>(exec: &mut E, plan: &Plan) -> StorageResult<OperationOutput> {
    let output = match plan.kind {
        StatementKind::Insert => exec.execute(&plan.stmt).await.map(OperationOutput::Inserted),
        StatementKind::Update => exec.execute(&plan.stmt).await.map(OperationOutput::Updated),
        StatementKind::Delete => exec.execute(&plan.stmt).await.map(OperationOutput::Deleted),
        StatementKind::Select => exec.fetch_all(&plan.stmt).await.map(|rows| {
            let total = rows.len() as u64;
            OperationOutput::Selected { rows, total }
        }),
    };
    output.map_err(|e| e.context(plan.kind.error_step()))
}

/// Runs relational batches in submission order.
///
/// Without a transaction every operation runs on its own pooled connection
/// and failures are recorded per index. With a transaction the first failure
/// rolls everything back and fails the whole call.
#[derive(Debug, Clone)]
pub struct RelationalExecutor<B: SqlBackend> {
    backend: B,
}

impl<B: SqlBackend> RelationalExecutor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns one result per operation, or an error when the batch as a
    /// whole is rejected (unknown operation kind, transaction failure).
    #[instrument(skip(self, operations), fields(operations = operations.len()))]
    pub async fn execute_batch(
        &self,
        operations: Vec<Operation>,
        use_transaction: bool,
    ) -> StorageResult<Vec<OperationResult>> {
        if let Some(index) = operations
            .iter()
            .position(|op| matches!(op.kind, OperationKind::Unknown))
        {
            warn!(index, "rejecting batch with unknown operation type");
            return Err(StorageError::UnknownOperation { index });
        }

        if use_transaction {
            self.execute_in_transaction(&operations).await
        } else {
            Ok(self.execute_independently(&operations).await)
        }
    }

    async fn execute_independently(&self, operations: &[Operation]) -> Vec<OperationResult> {
        let mut results = Vec::with_capacity(operations.len());

        for (index, op) in operations.iter().enumerate() {
            let outcome = match plan(op) {
                Ok(plan) => self.run_pooled(&plan).await,
                Err(err) => Err(err),
            };
            if let Err(err) = &outcome {
                warn!(index, table = %op.table, error = %err, "operation failed");
            }
            results.push(OperationResult { index, outcome });
        }

        results
    }

    async fn run_pooled(&self, plan: &Plan) -> StorageResult<OperationOutput> {
        let mut conn = self
            .backend
            .acquire()
            .await
            .map_err(|e| e.context(plan.kind.error_step()))?;
        run(&mut conn, plan).await
    }

    async fn execute_in_transaction(
        &self,
        operations: &[Operation],
    ) -> StorageResult<Vec<OperationResult>> {
        let mut tx = self
            .backend
            .begin()
            .await
            .map_err(|e| StorageError::Transaction(format!("begin tx error: {}", e)))?;

        let mut results = Vec::with_capacity(operations.len());
        for (index, op) in operations.iter().enumerate() {
            let outcome = match plan(op) {
                Ok(plan) => run(&mut tx, &plan).await,
                Err(err) => Err(err),
            };

            match outcome {
                Ok(output) => results.push(OperationResult {
                    index,
                    outcome: Ok(output),
                }),
                Err(err) => {
                    match tx.rollback().await {
                        Ok(()) => warn!(index, error = %err, "transaction rolled back"),
                        Err(rb) => {
                            warn!(index, error = %err, rollback_error = %rb, "transaction rollback failed")
                        }
                    }
                    return Err(StorageError::OperationFailed {
                        index,
                        source: Box::new(err),
                    });
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Transaction(format!("commit tx error: {}", e)))?;
        debug!(operations = results.len(), "transaction committed");

        Ok(results)
    }
}
