use crate::error::{StorageError, StorageResult};

pub const DEFAULT_DIMENSION: usize = 1536;
pub const DEFAULT_COLLECTION: &str = "memory_vectors";

/// Milvus connection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MilvusConfig {
    /// `host:port` or a full `http(s)://` URL of the REST endpoint
    pub addr: String,
    pub token: Option<String>,
    pub db_name: Option<String>,
    pub dimension: usize,
    /// Checked for existence at startup
    pub collection: String,
    pub timeout_secs: u64,
}

impl MilvusConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            token: None,
            db_name: None,
            dimension: DEFAULT_DIMENSION,
            collection: DEFAULT_COLLECTION.to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Base URL with a scheme and without a trailing slash.
    pub fn base_url(&self) -> String {
        let addr = self.addr.trim().trim_end_matches('/');
        if addr.starts_with("http://") || addr.starts_with("https://") {
            addr.to_string()
        } else {
            format!("http://{}", addr)
        }
    }

    /// `None` when `MILVUS_ADDR` is unset, which disables the vector backend.
    pub fn from_env() -> StorageResult<Option<Self>> {
        let Some(addr) = non_blank("MILVUS_ADDR") else {
            return Ok(None);
        };

        let dimension = parse_or("MILVUS_DIMENSION", DEFAULT_DIMENSION)?;
        if dimension == 0 {
            return Err(StorageError::Config("MILVUS_DIMENSION must be positive".to_string()));
        }

        Ok(Some(Self {
            addr,
            token: non_blank("MILVUS_TOKEN"),
            db_name: non_blank("MILVUS_DB_NAME"),
            dimension,
            collection: non_blank("MILVUS_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            timeout_secs: parse_or("MILVUS_TIMEOUT_SECS", 30)?,
        }))
    }
}

fn non_blank(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> StorageResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_blank(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| StorageError::Config(format!("{}: {}", key, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_adds_scheme() {
        assert_eq!(MilvusConfig::new("milvus:19530").base_url(), "http://milvus:19530");
        assert_eq!(
            MilvusConfig::new("https://cloud.example.com/").base_url(),
            "https://cloud.example.com"
        );
    }

    #[test]
    fn test_builders() {
        let config = MilvusConfig::new("localhost:19530")
            .with_token("root:Milvus")
            .with_dimension(4)
            .with_collection("docs");
        assert_eq!(config.token.as_deref(), Some("root:Milvus"));
        assert_eq!(config.dimension, 4);
        assert_eq!(config.collection, "docs");
        assert_eq!(config.timeout_secs, 30);
    }

    const VARS: [&str; 6] = [
        "MILVUS_ADDR",
        "MILVUS_TOKEN",
        "MILVUS_DB_NAME",
        "MILVUS_DIMENSION",
        "MILVUS_COLLECTION",
        "MILVUS_TIMEOUT_SECS",
    ];

    #[test]
    fn test_from_env_disabled_without_addr() {
        temp_env::with_vars_unset(VARS, || {
            assert_eq!(MilvusConfig::from_env().unwrap(), None);
        });
    }

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("MILVUS_ADDR", Some("milvus:19530")),
                ("MILVUS_TOKEN", None),
                ("MILVUS_DB_NAME", None),
                ("MILVUS_DIMENSION", None),
                ("MILVUS_COLLECTION", None),
                ("MILVUS_TIMEOUT_SECS", None),
            ],
            || {
                let config = MilvusConfig::from_env().unwrap().unwrap();
                assert_eq!(config, MilvusConfig::new("milvus:19530"));
                assert_eq!(config.dimension, 1536);
                assert_eq!(config.collection, "memory_vectors");
            },
        );
    }

    #[test]
    fn test_from_env_custom_values() {
        temp_env::with_vars(
            [
                ("MILVUS_ADDR", Some("http://milvus:19530")),
                ("MILVUS_TOKEN", Some("secret")),
                ("MILVUS_DB_NAME", Some("agents")),
                ("MILVUS_DIMENSION", Some("768")),
                ("MILVUS_COLLECTION", Some("notes")),
                ("MILVUS_TIMEOUT_SECS", Some("5")),
            ],
            || {
                let config = MilvusConfig::from_env().unwrap().unwrap();
                assert_eq!(config.token.as_deref(), Some("secret"));
                assert_eq!(config.db_name.as_deref(), Some("agents"));
                assert_eq!(config.dimension, 768);
                assert_eq!(config.collection, "notes");
                assert_eq!(config.timeout_secs, 5);
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_dimension() {
        temp_env::with_vars(
            [("MILVUS_ADDR", Some("milvus:19530")), ("MILVUS_DIMENSION", Some("wide"))],
            || {
                let err = MilvusConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("MILVUS_DIMENSION"));
            },
        );
        temp_env::with_vars(
            [("MILVUS_ADDR", Some("milvus:19530")), ("MILVUS_DIMENSION", Some("0"))],
            || {
                assert!(MilvusConfig::from_env().is_err());
            },
        );
    }
}
