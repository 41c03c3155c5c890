//! Storage gRPC service implementation
//!
//! Handlers lean on the From conversions in `domain_storage::conversions`.
//! Operation failures travel in the response body, so every handler answers
//! `Ok`.

use std::sync::Arc;

use domain_storage::{Operation, SqlBackend, StorageService, VectorBackend, VectorOperation};
use rpc::storage::v1::storage_service_server::StorageService as StorageServiceTrait;
use rpc::storage::v1::{ExecuteRequest, ExecuteResponse, ExecuteVectorRequest, ExecuteVectorResponse};
use tonic::{Request, Response, Status};
use tracing::{info, warn};

/// gRPC service implementation for batched storage operations
///
/// Generic over both backends for testability.
pub struct StorageServiceImpl<S: SqlBackend, V: VectorBackend> {
    service: Arc<StorageService<S, V>>,
}

impl<S: SqlBackend, V: VectorBackend> StorageServiceImpl<S, V> {
    pub fn new(service: StorageService<S, V>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn from_shared(service: Arc<StorageService<S, V>>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl<S: SqlBackend, V: VectorBackend> StorageServiceTrait for StorageServiceImpl<S, V> {
    async fn execute(
        &self,
        request: Request<ExecuteRequest>,
    ) -> Result<Response<ExecuteResponse>, Status> {
        let req = request.into_inner();
        let operations: Vec<Operation> = req.operations.into_iter().map(Into::into).collect();
        let count = operations.len();

        let report = self.service.execute(operations, req.use_transaction).await;

        match &report.error {
            None => info!(
                operations = count,
                use_transaction = req.use_transaction,
                "Execute completed"
            ),
            Some(error) => warn!(
                operations = count,
                use_transaction = req.use_transaction,
                error = %error,
                "Execute finished with errors"
            ),
        }

        Ok(Response::new(report.into()))
    }

    async fn execute_vector(
        &self,
        request: Request<ExecuteVectorRequest>,
    ) -> Result<Response<ExecuteVectorResponse>, Status> {
        let req = request.into_inner();
        let operations: Vec<VectorOperation> =
            req.operations.into_iter().map(Into::into).collect();
        let count = operations.len();

        let report = self.service.execute_vector(operations).await;

        match &report.error {
            None => info!(operations = count, "ExecuteVector completed"),
            Some(error) => warn!(
                operations = count,
                error = %error,
                "ExecuteVector finished with errors"
            ),
        }

        Ok(Response::new(report.into()))
    }
}
