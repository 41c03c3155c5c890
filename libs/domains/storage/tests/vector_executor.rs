//! Vector executor against the in-memory vector store.

use domain_storage::{
    StorageError, TypedValue, VectorData, VectorDelete, VectorExecutor, VectorOperation,
    VectorOperationKind, VectorOutput, VectorSearch,
};
use test_utils::{InMemoryVectorStore, TestDataBuilder};

const COLLECTION: &str = "memory_vectors";
const DIM: usize = 4;

fn executor(store: &InMemoryVectorStore) -> VectorExecutor<InMemoryVectorStore> {
    VectorExecutor::new(store.clone(), DIM)
}

fn insert(vectors: Vec<VectorData>) -> VectorOperation {
    VectorOperation::new(COLLECTION, VectorOperationKind::Insert(vectors))
}

fn search(query: Vec<f32>) -> VectorSearch {
    VectorSearch {
        query_vector: query,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_insert_then_search_in_partition() {
    let store = InMemoryVectorStore::new().with_collection(COLLECTION);
    let executor = executor(&store);
    let builder = TestDataBuilder::from_test_name("test_insert_then_search_in_partition");
    let partition = builder.name("user", "1");

    let vectors = vec![
        VectorData::new("near", vec![0.0, 0.0, 0.0, 0.1])
            .with_field("kind", "note")
            .with_field("meta", "{\"tags\":[\"a\"]}"),
        VectorData::new("far", vec![1.0, 1.0, 1.0, 1.0]).with_field("kind", "note"),
        VectorData::new("other", vec![0.0, 0.0, 0.0, 0.0]).with_field("kind", "task"),
    ];

    let results = executor
        .execute_batch(vec![
            insert(vectors).in_partition(partition.clone()),
            VectorOperation::new(
                COLLECTION,
                VectorOperationKind::Search(VectorSearch {
                    top_k: 5,
                    filter: [("kind".to_string(), TypedValue::from("note"))].into(),
                    ..search(vec![0.0; DIM])
                }),
            )
            .in_partition(partition.clone()),
        ])
        .await;

    assert_eq!(results[0].outcome, Ok(VectorOutput::Inserted(3)));
    assert_eq!(store.partitions(COLLECTION), vec![partition]);
    assert!(store.is_loaded(COLLECTION));
    assert_eq!(store.flushes(COLLECTION), 1);

    let Ok(VectorOutput::Searched(matches)) = &results[1].outcome else {
        panic!("expected search output, got {:?}", results[1].outcome);
    };
    let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["near", "far"]);
    assert!(!matches[0].metadata.contains_key("id"));
    assert_eq!(
        matches[0].metadata.get("meta"),
        Some(&TypedValue::from("{\"tags\":[\"a\"]}"))
    );
}

#[tokio::test]
async fn test_schema_is_inferred_per_batch() {
    let store = InMemoryVectorStore::new().with_collection(COLLECTION);
    let executor = executor(&store);

    let results = executor
        .execute_batch(vec![insert(vec![
            VectorData::new("a", vec![0.0; DIM]).with_field("n", 5i64),
            VectorData::new("b", vec![0.0; DIM]).with_field("n", "x"),
            VectorData::new("c", vec![0.0; DIM]),
        ])])
        .await;

    assert!(results[0].outcome.is_ok());
    let n = |id: &str| store.entity(COLLECTION, id).unwrap().fields.get("n").cloned();
    assert_eq!(n("a"), Some(TypedValue::Int(5)));
    assert_eq!(n("b"), Some(TypedValue::Int(0)));
    assert_eq!(n("c"), Some(TypedValue::Int(0)));
}

#[tokio::test]
async fn test_upsert_replaces_entities() {
    let store = InMemoryVectorStore::new().with_collection(COLLECTION);
    let executor = executor(&store);

    executor
        .execute_batch(vec![insert(vec![
            VectorData::new("a", vec![0.0; DIM]).with_field("v", 1i64),
        ])])
        .await;
    let results = executor
        .execute_batch(vec![VectorOperation::new(
            COLLECTION,
            VectorOperationKind::Upsert(vec![
                VectorData::new("a", vec![1.0; DIM]).with_field("v", 2i64),
            ]),
        )])
        .await;

    assert_eq!(results[0].outcome, Ok(VectorOutput::Upserted(1)));
    assert_eq!(store.len(COLLECTION), 1);
    let entity = store.entity(COLLECTION, "a").unwrap();
    assert_eq!(entity.vector, vec![1.0; DIM]);
    assert_eq!(entity.fields.get("v"), Some(&TypedValue::Int(2)));
}

#[tokio::test]
async fn test_delete_by_ids_and_filter() {
    let store = InMemoryVectorStore::new().with_collection(COLLECTION);
    let executor = executor(&store);
    executor
        .execute_batch(vec![insert(vec![
            VectorData::new("a", vec![0.0; DIM]).with_field("kind", "x"),
            VectorData::new("b", vec![0.0; DIM]).with_field("kind", "y"),
            VectorData::new("c", vec![0.0; DIM]).with_field("kind", "y"),
        ])])
        .await;

    let results = executor
        .execute_batch(vec![
            VectorOperation::new(
                COLLECTION,
                VectorOperationKind::Delete(VectorDelete {
                    ids: vec!["a".to_string(), "missing".to_string()],
                    ..Default::default()
                }),
            ),
            VectorOperation::new(
                COLLECTION,
                VectorOperationKind::Delete(VectorDelete {
                    filter_expr: "kind == \"y\"".to_string(),
                    ..Default::default()
                }),
            ),
        ])
        .await;

    assert_eq!(results[0].outcome, Ok(VectorOutput::Deleted(1)));
    assert_eq!(results[1].outcome, Ok(VectorOutput::Deleted(2)));
    assert_eq!(store.len(COLLECTION), 0);
}

#[tokio::test]
async fn test_delete_count_falls_back_when_not_reported() {
    let store = InMemoryVectorStore::new()
        .with_collection(COLLECTION)
        .without_delete_counts();
    let executor = executor(&store);

    let results = executor
        .execute_batch(vec![
            VectorOperation::new(
                COLLECTION,
                VectorOperationKind::Delete(VectorDelete {
                    ids: vec!["a".to_string(), "b".to_string()],
                    ..Default::default()
                }),
            ),
            VectorOperation::new(
                COLLECTION,
                VectorOperationKind::Delete(VectorDelete {
                    filter: [("kind".to_string(), TypedValue::from("y"))].into(),
                    ..Default::default()
                }),
            ),
        ])
        .await;

    assert_eq!(results[0].outcome, Ok(VectorOutput::Deleted(2)));
    assert_eq!(results[1].outcome, Ok(VectorOutput::Deleted(0)));
}

#[tokio::test]
async fn test_failures_are_isolated_per_operation() {
    let store = InMemoryVectorStore::new()
        .with_collection(COLLECTION)
        .fail("search", "query node unavailable");
    let executor = executor(&store);

    let results = executor
        .execute_batch(vec![
            VectorOperation::new(COLLECTION, VectorOperationKind::Search(search(vec![0.0; DIM]))),
            insert(vec![VectorData::new("a", vec![0.0; DIM])]),
            VectorOperation::new("missing", VectorOperationKind::Search(search(vec![0.0; DIM]))),
            VectorOperation::new(COLLECTION, VectorOperationKind::Unknown),
        ])
        .await;

    assert_eq!(
        results[0].outcome,
        Err(StorageError::Execution(
            "search error: query node unavailable".to_string()
        ))
    );
    assert_eq!(results[1].outcome, Ok(VectorOutput::Inserted(1)));
    assert!(
        results[2]
            .outcome
            .as_ref()
            .unwrap_err()
            .to_string()
            .starts_with("load collection error: ")
    );
    assert_eq!(
        results[3].outcome.as_ref().unwrap_err().to_string(),
        "unknown operation type"
    );
}

#[tokio::test]
async fn test_invalid_operation_never_creates_partition() {
    let store = InMemoryVectorStore::new().with_collection(COLLECTION);
    let executor = executor(&store);

    let results = executor
        .execute_batch(vec![
            insert(vec![VectorData::new("short", vec![0.0; DIM - 1])]).in_partition("p1"),
            VectorOperation::new(COLLECTION, VectorOperationKind::Unknown).in_partition("p2"),
        ])
        .await;

    assert_eq!(
        results[0].outcome.as_ref().unwrap_err().to_string(),
        "build columns error: vector 'short' has dimension 3, expected 4"
    );
    assert!(results[1].outcome.is_err());
    assert!(store.partitions(COLLECTION).is_empty());
}

#[tokio::test]
async fn test_flush_failure_does_not_fail_the_write() {
    let store = InMemoryVectorStore::new()
        .with_collection(COLLECTION)
        .fail("flush", "flush rate limited");
    let executor = executor(&store);

    let results = executor
        .execute_batch(vec![insert(vec![VectorData::new("a", vec![0.0; DIM])])])
        .await;

    assert_eq!(results[0].outcome, Ok(VectorOutput::Inserted(1)));
    assert_eq!(store.len(COLLECTION), 1);
}

#[tokio::test]
async fn test_verify_collection() {
    let store = InMemoryVectorStore::new().with_collection(COLLECTION);
    let executor = executor(&store);

    assert!(executor.verify_collection(COLLECTION).await.is_ok());
    assert_eq!(
        executor.verify_collection("other").await.unwrap_err().to_string(),
        "configuration error: collection 'other' does not exist, please create it first with your desired schema"
    );
}
