//! End-to-end over a loopback gRPC connection.

use std::collections::HashMap;
use std::net::SocketAddr;

use core_config::server::GrpcServerConfig;
use domain_storage::{RelationalExecutor, StorageService, VectorExecutor};
use rpc::storage::v1::storage_service_client::StorageServiceClient;
use rpc::storage::v1::typed_value::Value;
use rpc::storage::v1::vector_operation::Operation as VectorKind;
use rpc::storage::v1::vector_operation_result::Result as VectorOutput;
use rpc::storage::v1::{
    ExecuteRequest, ExecuteVectorRequest, TypedValue, VectorData, VectorInsertOperation,
    VectorOperation, VectorSearchOperation,
};
use storage_gateway::{StorageServiceImpl, serve};
use test_utils::{InMemoryVectorStore, RecordingSqlBackend, TestDataBuilder};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tonic::codec::CompressionEncoding;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

const DIM: usize = 8;

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<eyre::Result<()>>,
}

impl TestServer {
    async fn start(store: InMemoryVectorStore) -> Self {
        let service = StorageService::new()
            .with_relational(RelationalExecutor::new(RecordingSqlBackend::new()))
            .with_vector(VectorExecutor::new(store, DIM));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let config = GrpcServerConfig::default();

        let handle = tokio::spawn(async move {
            serve(StorageServiceImpl::new(service), &config, listener, async {
                let _ = rx.await;
            })
            .await
        });

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

fn text(s: &str) -> TypedValue {
    TypedValue {
        value: Some(Value::StringValue(s.to_string())),
    }
}

#[tokio::test]
async fn test_vector_round_trip_over_grpc() {
    let store = InMemoryVectorStore::new().with_collection("memory_vectors");
    let server = TestServer::start(store.clone()).await;
    let builder = TestDataBuilder::from_test_name("test_vector_round_trip_over_grpc");

    let mut client = StorageServiceClient::connect(server.url())
        .await
        .unwrap()
        .send_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Zstd);

    let target = builder.embedding("target", DIM);
    let vectors = ["target", "a", "b"]
        .iter()
        .map(|id| VectorData {
            id: id.to_string(),
            vector: builder.embedding(id, DIM),
            metadata: HashMap::from([("kind".to_string(), text("memory"))]),
        })
        .collect();

    let response = client
        .execute_vector(ExecuteVectorRequest {
            operations: vec![
                VectorOperation {
                    collection: "memory_vectors".to_string(),
                    partition: String::new(),
                    operation: Some(VectorKind::Insert(VectorInsertOperation { vectors })),
                },
                VectorOperation {
                    collection: "memory_vectors".to_string(),
                    partition: String::new(),
                    operation: Some(VectorKind::Search(VectorSearchOperation {
                        query_vector: target,
                        top_k: 2,
                        ..Default::default()
                    })),
                },
            ],
        })
        .await
        .unwrap()
        .into_inner();

    assert!(response.success, "unexpected error: {}", response.error);
    let Some(VectorOutput::SearchResult(search)) = &response.results[1].result else {
        panic!("expected search result");
    };
    assert_eq!(search.matches.len(), 2);
    assert_eq!(search.matches[0].id, "target");
    assert_eq!(search.matches[0].score, 0.0);
    assert_eq!(search.matches[0].metadata.get("kind"), Some(&text("memory")));

    server.stop().await;
}

#[tokio::test]
async fn test_relational_errors_are_in_band() {
    let server = TestServer::start(InMemoryVectorStore::new()).await;
    let mut client = StorageServiceClient::connect(server.url()).await.unwrap();

    let response = client
        .execute(ExecuteRequest {
            operations: vec![Default::default()],
            use_transaction: false,
        })
        .await
        .unwrap()
        .into_inner();

    assert!(!response.success);
    assert_eq!(response.error, "unknown operation type at index 0");

    server.stop().await;
}

#[tokio::test]
async fn test_health_reports_serving() {
    let server = TestServer::start(InMemoryVectorStore::new()).await;
    let channel = tonic::transport::Endpoint::new(server.url())
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut health = HealthClient::new(channel);

    for service in ["storage.v1.StorageService", ""] {
        let response = health
            .check(HealthCheckRequest {
                service: service.to_string(),
            })
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.status, ServingStatus::Serving as i32);
    }

    server.stop().await;
}
