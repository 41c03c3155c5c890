use thiserror::Error;

/// Errors raised while validating or executing storage operations.
///
/// The `Display` output is what callers see in `OperationResult.error`, so
/// variants render their message without a kind prefix.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Execution(String),

    #[error("{0}")]
    Transaction(String),

    #[error("operation {index} failed: {source}")]
    OperationFailed {
        index: usize,
        #[source]
        source: Box<StorageError>,
    },

    #[error("unknown operation type at index {index}")]
    UnknownOperation { index: usize },

    #[error("{0} client not initialized")]
    NotInitialized(&'static str),

    #[error("milvus error (code {code}): {message}")]
    Milvus { code: i64, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StorageError::Validation(msg.into())
    }

    /// Prefixes the message with the step that failed, e.g. `insert error: ...`.
    pub fn context(self, step: &str) -> Self {
        StorageError::Execution(format!("{}: {}", step, self))
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StorageError::Validation(_) | StorageError::UnknownOperation { .. }
        )
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Execution(err.to_string())
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Execution(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Execution(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_have_no_kind_prefix() {
        let err = StorageError::validation("table is empty");
        assert_eq!(err.to_string(), "table is empty");
        assert!(err.is_validation());
    }

    #[test]
    fn test_context_prefixes_step() {
        let err = StorageError::Execution("Duplicate entry 'a'".to_string()).context("batch insert error");
        assert_eq!(err.to_string(), "batch insert error: Duplicate entry 'a'");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_operation_failed_wraps_source() {
        let err = StorageError::OperationFailed {
            index: 2,
            source: Box::new(StorageError::validation("database is empty")),
        };
        assert_eq!(err.to_string(), "operation 2 failed: database is empty");
    }

    #[test]
    fn test_not_initialized() {
        assert_eq!(
            StorageError::NotInitialized("MySQL").to_string(),
            "MySQL client not initialized"
        );
        assert_eq!(
            StorageError::NotInitialized("Milvus").to_string(),
            "Milvus client not initialized"
        );
    }
}
