//! MySQL test infrastructure
//!
//! Provides a `TestMySql` helper that starts a MySQL container and hands out a
//! connected [`MySqlBackend`].

use std::time::Duration;

use domain_storage::{MySqlBackend, SqlBackend, SqlExecutor, SqlStatement};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mysql::Mysql;

/// Test MySQL wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestMySql;
///
/// # async fn example() {
/// let mysql = TestMySql::new().await;
/// mysql.execute("CREATE TABLE test.users (id INT PRIMARY KEY, name VARCHAR(64))").await;
/// let backend = mysql.backend();
/// # }
/// ```
pub struct TestMySql {
    #[allow(dead_code)]
    container: ContainerAsync<Mysql>,
    backend: MySqlBackend,
    pub connection_string: String,
}

impl TestMySql {
    /// Database created by the container image
    pub const DATABASE: &'static str = "test";

    /// Starts MySQL 8.4 with an empty root password.
    pub async fn new() -> Self {
        let container = Mysql::default()
            .with_tag("8.4")
            .start()
            .await
            .expect("Failed to start MySQL container");

        let host_port = container
            .get_host_port_ipv4(3306)
            .await
            .expect("Failed to get MySQL port");

        let connection_string = format!("mysql://root@127.0.0.1:{}/{}", host_port, Self::DATABASE);

        let backend = MySqlBackend::connect(&connection_string, Duration::from_secs(30))
            .await
            .expect("Failed to connect to test MySQL");

        tracing::info!(port = host_port, "Test MySQL ready");

        Self {
            container,
            backend,
            connection_string,
        }
    }

    /// A backend sharing this container's pool
    pub fn backend(&self) -> MySqlBackend {
        self.backend.clone()
    }

    /// Runs setup SQL (DDL, fixtures) directly on the pool.
    pub async fn execute(&self, sql: &str) {
        let stmt = SqlStatement {
            sql: sql.to_string(),
            params: Vec::new(),
        };
        let mut conn = self
            .backend
            .acquire()
            .await
            .expect("Failed to acquire MySQL connection");
        conn.execute(&stmt)
            .await
            .unwrap_or_else(|e| panic!("Failed to run setup SQL `{}`: {}", sql, e));
    }
}
