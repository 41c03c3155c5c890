use tracing::{debug, instrument, warn};

use crate::error::{StorageError, StorageResult};
use crate::models::{
    VectorDelete, VectorMatch, VectorOperation, VectorOperationKind, VectorOperationResult,
    VectorOutput, VectorSearch,
};
use crate::vector::backend::{DeleteRequest, SearchRequest, VectorBackend, WriteRequest};
use crate::vector::filter::{filter_expression, ids_expression};
use crate::vector::schema::compile_columns;
use crate::vector::{DEFAULT_TOP_K, ID_FIELD, VECTOR_FIELD};

/// A validated vector operation.
#[derive(Debug)]
enum Prepared {
    Insert(WriteRequest),
    Upsert(WriteRequest),
    Search {
        request: SearchRequest,
        min_score: f32,
    },
    Delete {
        request: DeleteRequest,
        /// Used when the store does not report a count
        fallback_count: u64,
    },
}

/// Runs vector batches. Each operation stands alone: failures are recorded
/// against their index and the rest of the batch still runs.
#[derive(Debug, Clone)]
pub struct VectorExecutor<V: VectorBackend> {
    backend: V,
    dimension: usize,
}

impl<V: VectorBackend> VectorExecutor<V> {
    pub fn new(backend: V, dimension: usize) -> Self {
        Self { backend, dimension }
    }

    pub fn backend(&self) -> &V {
        &self.backend
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Fails unless `collection` already exists; collections are never
    /// created from here.
    pub async fn verify_collection(&self, collection: &str) -> StorageResult<()> {
        let exists = self
            .backend
            .has_collection(collection)
            .await
            .map_err(|e| e.context("failed to check collection"))?;
        if !exists {
            return Err(StorageError::Config(format!(
                "collection '{}' does not exist, please create it first with your desired schema",
                collection
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, operations), fields(operations = operations.len()))]
    pub async fn execute_batch(&self, operations: Vec<VectorOperation>) -> Vec<VectorOperationResult> {
        let mut results = Vec::with_capacity(operations.len());

        for (index, op) in operations.into_iter().enumerate() {
            let collection = op.collection.clone();
            let outcome = self.execute_one(op).await;
            if let Err(err) = &outcome {
                warn!(index, %collection, error = %err, "vector operation failed");
            }
            results.push(VectorOperationResult { index, outcome });
        }

        results
    }

    async fn execute_one(&self, op: VectorOperation) -> StorageResult<VectorOutput> {
        let prepared = self.prepare(op)?;

        let (collection, partition) = match &prepared {
            Prepared::Insert(req) | Prepared::Upsert(req) => (&req.collection, &req.partition),
            Prepared::Search { request, .. } => (&request.collection, &request.partition),
            Prepared::Delete { request, .. } => (&request.collection, &request.partition),
        };
        let collection = collection.clone();

        if let Some(partition) = partition {
            self.ensure_partition(&collection, partition)
                .await
                .map_err(|e| e.context("ensure partition error"))?;
        }

        self.backend
            .ensure_loaded(&collection)
            .await
            .map_err(|e| e.context("load collection error"))?;

        match prepared {
            Prepared::Insert(request) => {
                let count = self
                    .backend
                    .insert(request)
                    .await
                    .map_err(|e| e.context("insert error"))?;
                self.flush(&collection).await;
                Ok(VectorOutput::Inserted(count))
            }
            Prepared::Upsert(request) => {
                let count = self
                    .backend
                    .upsert(request)
                    .await
                    .map_err(|e| e.context("upsert error"))?;
                self.flush(&collection).await;
                Ok(VectorOutput::Upserted(count))
            }
            Prepared::Search { request, min_score } => {
                let hits = self
                    .backend
                    .search(request)
                    .await
                    .map_err(|e| e.context("search error"))?;
                let matches = hits
                    .into_iter()
                    .filter(|hit| min_score <= 0.0 || hit.score > min_score)
                    .map(|hit| {
                        let mut metadata = hit.fields;
                        metadata.remove(ID_FIELD);
                        metadata.remove(VECTOR_FIELD);
                        VectorMatch {
                            id: hit.id,
                            score: hit.score,
                            metadata,
                        }
                    })
                    .collect();
                Ok(VectorOutput::Searched(matches))
            }
            Prepared::Delete {
                request,
                fallback_count,
            } => {
                let reported = self
                    .backend
                    .delete(request)
                    .await
                    .map_err(|e| e.context("delete error"))?;
                self.flush(&collection).await;
                Ok(VectorOutput::Deleted(reported.unwrap_or(fallback_count)))
            }
        }
    }

    fn prepare(&self, op: VectorOperation) -> StorageResult<Prepared> {
        if op.collection.trim().is_empty() {
            return Err(StorageError::validation("collection is empty"));
        }
        let collection = op.collection;
        let partition = op.partition.filter(|p| !p.trim().is_empty());

        match op.kind {
            VectorOperationKind::Insert(vectors) => {
                if vectors.is_empty() {
                    return Err(StorageError::validation("insert vectors is empty"));
                }
                let columns = compile_columns(&vectors, self.dimension)
                    .map_err(|e| e.context("build columns error"))?;
                Ok(Prepared::Insert(WriteRequest {
                    collection,
                    partition,
                    columns,
                }))
            }
            VectorOperationKind::Upsert(vectors) => {
                if vectors.is_empty() {
                    return Err(StorageError::validation("upsert vectors is empty"));
                }
                let columns = compile_columns(&vectors, self.dimension)
                    .map_err(|e| e.context("build columns error"))?;
                Ok(Prepared::Upsert(WriteRequest {
                    collection,
                    partition,
                    columns,
                }))
            }
            VectorOperationKind::Search(search) => prepare_search(collection, partition, search),
            VectorOperationKind::Delete(delete) => prepare_delete(collection, partition, delete),
            VectorOperationKind::Unknown => Err(StorageError::validation("unknown operation type")),
        }
    }

    async fn ensure_partition(&self, collection: &str, partition: &str) -> StorageResult<()> {
        let exists = self
            .backend
            .has_partition(collection, partition)
            .await
            .map_err(|e| e.context("failed to check partition"))?;
        if !exists {
            debug!(collection, partition, "creating partition");
            self.backend
                .create_partition(collection, partition)
                .await
                .map_err(|e| e.context("failed to create partition"))?;
        }
        Ok(())
    }

    async fn flush(&self, collection: &str) {
        if let Err(err) = self.backend.flush(collection).await {
            warn!(collection, error = %err, "flush failed, data will be flushed by the store later");
        }
    }
}

fn prepare_search(
    collection: String,
    partition: Option<String>,
    search: VectorSearch,
) -> StorageResult<Prepared> {
    if search.query_vector.is_empty() {
        return Err(StorageError::validation("search query vector is empty"));
    }

    let top_k = usize::try_from(search.top_k)
        .ok()
        .filter(|k| *k > 0)
        .unwrap_or(DEFAULT_TOP_K);
    let output_fields = if search.output_fields.is_empty() {
        vec!["*".to_string()]
    } else {
        search.output_fields
    };

    Ok(Prepared::Search {
        request: SearchRequest {
            collection,
            partition,
            vector: search.query_vector,
            top_k,
            filter: filter_expression(&search.filter, &search.filter_expr),
            output_fields,
        },
        min_score: search.min_score,
    })
}

fn prepare_delete(
    collection: String,
    partition: Option<String>,
    delete: VectorDelete,
) -> StorageResult<Prepared> {
    let (filter, fallback_count) = if !delete.ids.is_empty() {
        (ids_expression(&delete.ids), delete.ids.len() as u64)
    } else {
        (filter_expression(&delete.filter, &delete.filter_expr), 0)
    };

    if filter.trim().is_empty() {
        return Err(StorageError::validation(
            "delete requires ids or filter expression (to prevent accidental full collection deletion)",
        ));
    }

    Ok(Prepared::Delete {
        request: DeleteRequest {
            collection,
            partition,
            filter,
        },
        fallback_count,
    })
}
