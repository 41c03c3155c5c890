//! gRPC server initialization and lifecycle management
//!
//! This module handles all server setup:
//! - Tracing initialization
//! - MySQL and Milvus connections (each optional)
//! - gRPC server configuration and startup
//! - Health check service (grpc.health.v1.Health)
//! - Graceful shutdown on SIGINT/SIGTERM

use std::future::Future;

use core_config::database::DatabaseConfig;
use core_config::server::GrpcServerConfig;
use core_config::{Environment, FromEnv};
use domain_storage::{
    MilvusClient, MilvusConfig, MySqlBackend, RelationalExecutor, SqlBackend, StorageService,
    VectorBackend, VectorExecutor,
};
use eyre::{Result, WrapErr};
use rpc::storage::v1::storage_service_server::{SERVICE_NAME, StorageServiceServer};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tonic_health::ServingStatus;
use tonic_health::server::health_reporter;
use tracing::{info, warn};

use crate::service::StorageServiceImpl;

/// Run the gRPC server
///
/// 1. Sets up structured logging (JSON for prod, pretty for dev)
/// 2. Connects the configured backends; an unset address disables a backend
/// 3. Serves until SIGINT/SIGTERM, then closes the MySQL pool
///
/// # Errors
///
/// Returns an error if configuration is invalid, a configured backend cannot
/// be reached, the default Milvus collection is missing, or the listener
/// cannot bind.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let grpc = GrpcServerConfig::from_env().wrap_err("Failed to load gRPC configuration")?;

    let mysql = connect_mysql().await?;
    let vector = connect_milvus().await?;

    let mut service = StorageService::new();
    if let Some(backend) = &mysql {
        service = service.with_relational(RelationalExecutor::new(backend.clone()));
    }
    if let Some(executor) = vector {
        service = service.with_vector(executor);
    }

    let addr = grpc.socket_addr().wrap_err("Invalid gRPC listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;
    info!("StorageService listening on {}", addr);

    serve(
        StorageServiceImpl::new(service),
        &grpc,
        listener,
        shutdown_signal(),
    )
    .await?;

    if let Some(backend) = mysql {
        backend.close().await;
        info!("MySQL pool closed");
    }
    info!("StorageService stopped");

    Ok(())
}

async fn connect_mysql() -> Result<Option<MySqlBackend>> {
    let Some(config) =
        DatabaseConfig::from_env_optional().wrap_err("Failed to load MySQL configuration")?
    else {
        warn!("MYSQL_URL not set, relational operations are disabled");
        return Ok(None);
    };

    info!("Connecting to MySQL...");
    let backend = MySqlBackend::connect(&config.url, config.acquire_timeout)
        .await
        .wrap_err("Failed to connect to MySQL")?;
    info!("Connected to MySQL successfully");

    Ok(Some(backend))
}

async fn connect_milvus() -> Result<Option<VectorExecutor<MilvusClient>>> {
    let Some(config) = MilvusConfig::from_env().wrap_err("Failed to load Milvus configuration")?
    else {
        warn!("MILVUS_ADDR not set, vector operations are disabled");
        return Ok(None);
    };

    info!("Connecting to Milvus at {}...", config.base_url());
    let client = MilvusClient::new(&config).wrap_err("Failed to create Milvus client")?;
    let executor = VectorExecutor::new(client, config.dimension);
    executor
        .verify_collection(&config.collection)
        .await
        .wrap_err("Milvus collection check failed")?;
    info!(
        collection = %config.collection,
        dimension = config.dimension,
        "Connected to Milvus successfully"
    );

    Ok(Some(executor))
}

/// Serves the storage and health services on `listener` until `shutdown`
/// resolves.
pub async fn serve<S, V, F>(
    service: StorageServiceImpl<S, V>,
    config: &GrpcServerConfig,
    listener: TcpListener,
    shutdown: F,
) -> Result<()>
where
    S: SqlBackend,
    V: VectorBackend,
    F: Future<Output = ()>,
{
    // Health reporter for Kubernetes probes
    let (health_reporter, health_service) = health_reporter();
    health_reporter
        .set_service_status(SERVICE_NAME, ServingStatus::Serving)
        .await;
    // Empty service name for generic health checks
    health_reporter
        .set_service_status("", ServingStatus::Serving)
        .await;

    let mut storage = StorageServiceServer::new(service)
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);
    if config.enable_compression {
        storage = storage
            .accept_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Zstd);
        info!("Using Zstd compression");
    }

    Server::builder()
        .timeout(config.request_timeout)
        .add_service(health_service)
        .add_service(storage)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
        .wrap_err("gRPC server failed")?;

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
