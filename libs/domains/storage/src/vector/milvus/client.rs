//! Milvus over its RESTful v2 API (`/v2/vectordb/...`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map as JsonMap, Value as JsonValue, json};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::models::Fields;
use crate::value::TypedValue;
use crate::vector::backend::{DeleteRequest, SearchHit, SearchRequest, VectorBackend, WriteRequest};
use crate::vector::milvus::config::MilvusConfig;
use crate::vector::schema::ColumnBatch;
use crate::vector::{ID_FIELD, VECTOR_FIELD};

const LOAD_STATE_LOADED: &str = "LoadStateLoaded";
const SEARCH_NPROBE: u32 = 16;
const METRIC_TYPE: &str = "L2";

/// Milvus REST response envelope
#[derive(Debug, Deserialize)]
struct MilvusResponse<T> {
    code: i64,
    data: Option<T>,
    message: Option<String>,
}

impl<T> MilvusResponse<T> {
    fn into_data(self) -> StorageResult<Option<T>> {
        if self.code == 0 {
            Ok(self.data)
        } else {
            Err(StorageError::Milvus {
                code: self.code,
                message: self.message.unwrap_or_else(|| "Unknown error".to_string()),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct HasData {
    has: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadStateData {
    load_state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteData {
    #[serde(alias = "upsertCount")]
    insert_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteData {
    delete_count: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct MilvusClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    db_name: Option<String>,
}

impl MilvusClient {
    pub fn new(config: &MilvusConfig) -> StorageResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::Config(format!("failed to build Milvus HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            token: config.token.clone(),
            db_name: config.db_name.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, mut body: JsonValue) -> StorageResult<Option<T>> {
        if let (Some(db_name), Some(obj)) = (&self.db_name, body.as_object_mut()) {
            obj.insert("dbName".to_string(), json!(db_name));
        }

        let url = format!("{}/v2/vectordb/{}", self.base_url, path);
        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        response.json::<MilvusResponse<T>>().await?.into_data()
    }

    async fn write(&self, path: &str, request: WriteRequest) -> StorageResult<u64> {
        let rows = batch_rows(&request.columns);
        let sent = rows.len() as u64;
        let mut body = json!({
            "collectionName": request.collection,
            "data": rows,
        });
        if let Some(partition) = request.partition {
            body["partitionName"] = json!(partition);
        }

        let data: Option<WriteData> = self.post(path, body).await?;
        Ok(data.and_then(|d| d.insert_count).unwrap_or(sent))
    }
}

#[async_trait]
impl VectorBackend for MilvusClient {
    async fn has_collection(&self, collection: &str) -> StorageResult<bool> {
        let data: Option<HasData> = self
            .post("collections/has", json!({ "collectionName": collection }))
            .await?;
        Ok(data.is_some_and(|d| d.has))
    }

    async fn has_partition(&self, collection: &str, partition: &str) -> StorageResult<bool> {
        let data: Option<HasData> = self
            .post(
                "partitions/has",
                json!({ "collectionName": collection, "partitionName": partition }),
            )
            .await?;
        Ok(data.is_some_and(|d| d.has))
    }

    async fn create_partition(&self, collection: &str, partition: &str) -> StorageResult<()> {
        self.post::<JsonValue>(
            "partitions/create",
            json!({ "collectionName": collection, "partitionName": partition }),
        )
        .await?;
        info!(collection, partition, "created partition");
        Ok(())
    }

    async fn ensure_loaded(&self, collection: &str) -> StorageResult<()> {
        let state: Option<LoadStateData> = self
            .post(
                "collections/get_load_state",
                json!({ "collectionName": collection }),
            )
            .await
            .map_err(|e| e.context("failed to get load state"))?;

        if state.is_some_and(|s| s.load_state == LOAD_STATE_LOADED) {
            return Ok(());
        }

        debug!(collection, "loading collection");
        self.post::<JsonValue>("collections/load", json!({ "collectionName": collection }))
            .await
            .map_err(|e| e.context("failed to load collection"))?;
        Ok(())
    }

    async fn insert(&self, request: WriteRequest) -> StorageResult<u64> {
        self.write("entities/insert", request).await
    }

    async fn upsert(&self, request: WriteRequest) -> StorageResult<u64> {
        self.write("entities/upsert", request).await
    }

    async fn search(&self, request: SearchRequest) -> StorageResult<Vec<SearchHit>> {
        let body = search_body(&request);
        let hits: Option<Vec<JsonMap<String, JsonValue>>> =
            self.post("entities/search", body).await?;
        Ok(hits.unwrap_or_default().into_iter().map(parse_hit).collect())
    }

    async fn delete(&self, request: DeleteRequest) -> StorageResult<Option<u64>> {
        let mut body = json!({
            "collectionName": request.collection,
            "filter": request.filter,
        });
        if let Some(partition) = request.partition {
            body["partitionName"] = json!(partition);
        }

        let data: Option<DeleteData> = self.post("entities/delete", body).await?;
        Ok(data.and_then(|d| d.delete_count))
    }

    async fn flush(&self, collection: &str) -> StorageResult<()> {
        self.post::<JsonValue>("collections/flush", json!({ "collectionName": collection }))
            .await?;
        Ok(())
    }
}

/// Row objects for `entities/insert` and `entities/upsert`.
pub fn batch_rows(batch: &ColumnBatch) -> Vec<JsonValue> {
    (0..batch.len())
        .map(|i| {
            let mut row = JsonMap::new();
            row.insert(ID_FIELD.to_string(), json!(batch.ids[i]));
            row.insert(VECTOR_FIELD.to_string(), json!(batch.embeddings[i]));
            for column in &batch.fields {
                row.insert(column.name.clone(), column.data.json_at(i));
            }
            JsonValue::Object(row)
        })
        .collect()
}

fn search_body(request: &SearchRequest) -> JsonValue {
    let mut body = json!({
        "collectionName": request.collection,
        "data": [request.vector],
        "annsField": VECTOR_FIELD,
        "limit": request.top_k,
        "outputFields": request.output_fields,
        "searchParams": {
            "metricType": METRIC_TYPE,
            "params": { "nprobe": SEARCH_NPROBE },
        },
    });
    if !request.filter.is_empty() {
        body["filter"] = json!(request.filter);
    }
    if let Some(partition) = &request.partition {
        body["partitionNames"] = json!([partition]);
    }
    body
}

fn parse_hit(mut hit: JsonMap<String, JsonValue>) -> SearchHit {
    let score = hit
        .remove("distance")
        .and_then(|d| d.as_f64())
        .unwrap_or(0.0) as f32;

    let id = match hit.get(ID_FIELD) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let fields: Fields = hit
        .iter()
        .map(|(name, value)| (name.clone(), TypedValue::from_json(value)))
        .collect();

    SearchHit { id, score, fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VectorData;
    use crate::vector::schema::compile_columns;

    #[test]
    fn test_batch_rows_include_fixed_and_typed_fields() {
        let vectors = vec![
            VectorData::new("a", vec![0.5, 1.0])
                .with_field("n", 5i64)
                .with_field("tags", "[\"x\"]"),
            VectorData::new("b", vec![0.25, 0.0]).with_field("n", "x"),
        ];
        let batch = compile_columns(&vectors, 2).unwrap();

        let rows = batch_rows(&batch);

        assert_eq!(
            rows,
            vec![
                json!({"id": "a", "vector": [0.5, 1.0], "n": 5, "tags": ["x"]}),
                json!({"id": "b", "vector": [0.25, 0.0], "n": 0, "tags": {}}),
            ]
        );
    }

    #[test]
    fn test_search_body() {
        let request = SearchRequest {
            collection: "memory_vectors".to_string(),
            partition: Some("user_1".to_string()),
            vector: vec![0.5, 0.25],
            top_k: 5,
            filter: "kind == \"note\"".to_string(),
            output_fields: vec!["*".to_string()],
        };

        let body = search_body(&request);

        assert_eq!(
            body,
            json!({
                "collectionName": "memory_vectors",
                "data": [[0.5, 0.25]],
                "annsField": "vector",
                "limit": 5,
                "outputFields": ["*"],
                "searchParams": {"metricType": "L2", "params": {"nprobe": 16}},
                "filter": "kind == \"note\"",
                "partitionNames": ["user_1"],
            })
        );
    }

    #[test]
    fn test_search_body_without_filter_or_partition() {
        let request = SearchRequest {
            collection: "c".to_string(),
            partition: None,
            vector: vec![1.0],
            top_k: 10,
            filter: String::new(),
            output_fields: vec!["*".to_string()],
        };

        let body = search_body(&request);

        assert!(body.get("filter").is_none());
        assert!(body.get("partitionNames").is_none());
    }

    #[test]
    fn test_parse_hit() {
        let raw = json!({
            "id": 42,
            "distance": 0.75,
            "content": "hello",
            "meta": {"k": 1},
            "count": 3,
        });
        let JsonValue::Object(map) = raw else {
            unreachable!()
        };

        let hit = parse_hit(map);

        assert_eq!(hit.id, "42");
        assert_eq!(hit.score, 0.75);
        assert!(!hit.fields.contains_key("distance"));
        assert_eq!(hit.fields.get("content"), Some(&TypedValue::from("hello")));
        assert_eq!(hit.fields.get("meta"), Some(&TypedValue::from("{\"k\":1}")));
        assert_eq!(hit.fields.get("count"), Some(&TypedValue::Int(3)));
        assert_eq!(hit.fields.get("id"), Some(&TypedValue::Int(42)));
    }

    #[test]
    fn test_error_envelope() {
        let resp: MilvusResponse<JsonValue> = serde_json::from_value(json!({
            "code": 1100,
            "message": "collection not found[collection=missing]",
        }))
        .unwrap();

        let err = resp.into_data().unwrap_err();

        assert_eq!(
            err,
            StorageError::Milvus {
                code: 1100,
                message: "collection not found[collection=missing]".to_string()
            }
        );
    }

    #[test]
    fn test_write_count_accepts_upsert_name() {
        let data: WriteData = serde_json::from_value(json!({"upsertCount": 2})).unwrap();
        assert_eq!(data.insert_count, Some(2));
    }
}
