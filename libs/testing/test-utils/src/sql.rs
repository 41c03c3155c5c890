//! Recording relational backend
//!
//! `RecordingSqlBackend` implements `SqlBackend` without a database. Every
//! connection, transaction and statement is recorded in order so tests can
//! assert on the exact SQL sent, and failures can be scripted by matching on
//! the statement text.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use domain_storage::{
    Fields, SqlBackend, SqlExecutor, SqlStatement, SqlTransaction, StorageError, StorageResult,
    TypedValue,
};

/// One thing the executor did against the backend
#[derive(Debug, Clone, PartialEq)]
pub enum SqlEvent {
    Acquire,
    Begin,
    Statement {
        sql: String,
        params: Vec<TypedValue>,
        in_transaction: bool,
    },
    Commit,
    Rollback,
}

#[derive(Debug, Default)]
struct Script {
    /// (substring of the SQL, driver error message)
    failures: Vec<(String, String)>,
    /// (substring of the SQL, rows to return)
    rows: Vec<(String, Vec<Fields>)>,
    affected_rows: Option<u64>,
    acquire_error: Option<String>,
    begin_error: Option<String>,
    commit_error: Option<String>,
    rollback_error: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    script: Script,
    events: Vec<SqlEvent>,
}

/// A fake `SqlBackend` that records what it is asked to do.
///
/// Clones share state, so keep one handle for assertions and give another to
/// the executor.
///
/// # Example
///
/// ```
/// use test_utils::RecordingSqlBackend;
///
/// let backend = RecordingSqlBackend::new()
///     .fail_when("INSERT INTO app.audit", "Duplicate entry '1' for key 'PRIMARY'")
///     .affected_rows(3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSqlBackend {
    state: Arc<Mutex<State>>,
}

impl RecordingSqlBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// Statements containing `pattern` fail with `message`.
    pub fn fail_when(self, pattern: &str, message: &str) -> Self {
        self.lock()
            .script
            .failures
            .push((pattern.to_string(), message.to_string()));
        self
    }

    /// Queries containing `pattern` return `rows`.
    pub fn rows_for(self, pattern: &str, rows: Vec<Fields>) -> Self {
        self.lock().script.rows.push((pattern.to_string(), rows));
        self
    }

    /// Affected row count reported by every write. Defaults to one per VALUES
    /// tuple for inserts and one for anything else.
    pub fn affected_rows(self, count: u64) -> Self {
        self.lock().script.affected_rows = Some(count);
        self
    }

    pub fn fail_acquire(self, message: &str) -> Self {
        self.lock().script.acquire_error = Some(message.to_string());
        self
    }

    pub fn fail_begin(self, message: &str) -> Self {
        self.lock().script.begin_error = Some(message.to_string());
        self
    }

    pub fn fail_commit(self, message: &str) -> Self {
        self.lock().script.commit_error = Some(message.to_string());
        self
    }

    pub fn fail_rollback(self, message: &str) -> Self {
        self.lock().script.rollback_error = Some(message.to_string());
        self
    }

    /// Everything recorded so far, in order.
    pub fn events(&self) -> Vec<SqlEvent> {
        self.lock().events.clone()
    }

    /// SQL text of every statement sent, in order.
    pub fn statements(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                SqlEvent::Statement { sql, .. } => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: &SqlEvent) -> usize {
        self.lock().events.iter().filter(|e| *e == event).count()
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().expect("recording backend state poisoned")
}

fn driver_error(message: &str) -> StorageError {
    StorageError::Execution(message.to_string())
}

#[async_trait]
impl SqlBackend for RecordingSqlBackend {
    type Conn = RecordingConn;
    type Tx = RecordingTx;

    async fn acquire(&self) -> StorageResult<RecordingConn> {
        let mut state = self.lock();
        state.events.push(SqlEvent::Acquire);
        if let Some(message) = &state.script.acquire_error {
            return Err(driver_error(message));
        }
        Ok(RecordingConn {
            state: Arc::clone(&self.state),
            in_transaction: false,
        })
    }

    async fn begin(&self) -> StorageResult<RecordingTx> {
        let mut state = self.lock();
        state.events.push(SqlEvent::Begin);
        if let Some(message) = &state.script.begin_error {
            return Err(driver_error(message));
        }
        Ok(RecordingTx(RecordingConn {
            state: Arc::clone(&self.state),
            in_transaction: true,
        }))
    }
}

pub struct RecordingConn {
    state: Arc<Mutex<State>>,
    in_transaction: bool,
}

impl RecordingConn {
    /// Records the statement and returns the scripted failure, if any.
    fn record(&self, stmt: &SqlStatement) -> StorageResult<MutexGuard<'_, State>> {
        let mut state = lock(&self.state);
        state.events.push(SqlEvent::Statement {
            sql: stmt.sql.clone(),
            params: stmt.params.clone(),
            in_transaction: self.in_transaction,
        });
        let failure = state
            .script
            .failures
            .iter()
            .find(|(pattern, _)| stmt.sql.contains(pattern.as_str()))
            .map(|(_, message)| message.clone());
        match failure {
            Some(message) => Err(driver_error(&message)),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl SqlExecutor for RecordingConn {
    async fn execute(&mut self, stmt: &SqlStatement) -> StorageResult<u64> {
        let state = self.record(stmt)?;
        let default_count = if stmt.sql.starts_with("INSERT") {
            // one row per VALUES tuple
            stmt.sql.matches("(").count().saturating_sub(1) as u64
        } else {
            1
        };
        Ok(state.script.affected_rows.unwrap_or(default_count))
    }

    async fn fetch_all(&mut self, stmt: &SqlStatement) -> StorageResult<Vec<Fields>> {
        let state = self.record(stmt)?;
        Ok(state
            .script
            .rows
            .iter()
            .find(|(pattern, _)| stmt.sql.contains(pattern.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

pub struct RecordingTx(RecordingConn);

#[async_trait]
impl SqlExecutor for RecordingTx {
    async fn execute(&mut self, stmt: &SqlStatement) -> StorageResult<u64> {
        self.0.execute(stmt).await
    }

    async fn fetch_all(&mut self, stmt: &SqlStatement) -> StorageResult<Vec<Fields>> {
        self.0.fetch_all(stmt).await
    }
}

#[async_trait]
impl SqlTransaction for RecordingTx {
    async fn commit(self) -> StorageResult<()> {
        let mut state = lock(&self.0.state);
        state.events.push(SqlEvent::Commit);
        match &state.script.commit_error {
            Some(message) => Err(driver_error(message)),
            None => Ok(()),
        }
    }

    async fn rollback(self) -> StorageResult<()> {
        let mut state = lock(&self.0.state);
        state.events.push(SqlEvent::Rollback);
        match &state.script.rollback_error {
            Some(message) => Err(driver_error(message)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(sql: &str) -> SqlStatement {
        SqlStatement {
            sql: sql.to_string(),
            params: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_records_and_scripts_statements() {
        let backend = RecordingSqlBackend::new()
            .fail_when("DELETE", "boom")
            .rows_for("FROM app.users", vec![Fields::new()]);

        let mut conn = backend.acquire().await.unwrap();
        assert_eq!(conn.fetch_all(&stmt("SELECT * FROM app.users")).await.unwrap().len(), 1);
        assert_eq!(
            conn.execute(&stmt("DELETE FROM app.users WHERE id = ?")).await,
            Err(StorageError::Execution("boom".to_string()))
        );
        assert_eq!(
            conn.execute(&stmt("INSERT INTO app.t (a) VALUES (?), (?)")).await,
            Ok(2)
        );

        assert_eq!(backend.events().first(), Some(&SqlEvent::Acquire));
        assert_eq!(backend.statements().len(), 3);
    }

    #[tokio::test]
    async fn test_transaction_events() {
        let backend = RecordingSqlBackend::new().fail_commit("lost connection");

        let mut tx = backend.begin().await.unwrap();
        tx.execute(&stmt("UPDATE app.t SET a = ?")).await.unwrap();
        assert!(tx.commit().await.is_err());

        assert_eq!(backend.count(&SqlEvent::Begin), 1);
        assert_eq!(backend.count(&SqlEvent::Commit), 1);
        assert!(matches!(
            backend.events()[1],
            SqlEvent::Statement { in_transaction: true, .. }
        ));
    }
}
