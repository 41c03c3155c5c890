use domain_storage::{
    DeleteOp, InsertOp, Operation, OperationKind, RelationalExecutor, SelectOp, StorageService,
    VectorData, VectorExecutor, VectorOperation, VectorOperationKind, WhereClause,
};
use test_utils::{InMemoryVectorStore, RecordingSqlBackend, SqlEvent, TestDataBuilder};

type Service = StorageService<RecordingSqlBackend, InMemoryVectorStore>;

fn insert(table: &str) -> Operation {
    Operation::new(
        "app",
        table,
        OperationKind::Insert(InsertOp {
            rows: vec![[("id".to_string(), 1i64.into())].into()],
        }),
    )
}

fn delete_all() -> Operation {
    Operation::new("app", "users", OperationKind::Delete(DeleteOp::default()))
}

#[tokio::test]
async fn test_relational_summary_lists_every_failure() {
    let sql = RecordingSqlBackend::new().fail_when("app.audit", "Table 'app.audit' doesn't exist");
    let service = Service::new().with_relational(RelationalExecutor::new(sql));

    let report = service
        .execute(vec![insert("users"), insert("audit"), delete_all()], false)
        .await;

    assert!(!report.success);
    assert_eq!(report.results.len(), 3);
    assert!(report.results[0].outcome.is_ok());
    assert_eq!(
        report.error.as_deref(),
        Some(
            "2 operations failed: [1]: batch insert error: Table 'app.audit' doesn't exist; \
             [2]: where clause is required for delete (to prevent accidental full table deletion)"
        )
    );
}

#[tokio::test]
async fn test_transactional_abort_returns_no_results() {
    let sql = RecordingSqlBackend::new();
    let service = Service::new().with_relational(RelationalExecutor::new(sql.clone()));

    let report = service.execute(vec![insert("users"), delete_all()], true).await;

    assert!(!report.success);
    assert!(report.results.is_empty());
    assert_eq!(
        report.error.as_deref(),
        Some("operation 1 failed: where clause is required for delete (to prevent accidental full table deletion)")
    );
    assert_eq!(sql.count(&SqlEvent::Rollback), 1);
}

#[tokio::test]
async fn test_all_successful_batch_has_no_error() {
    let sql = RecordingSqlBackend::new();
    let service = Service::new().with_relational(RelationalExecutor::new(sql));
    let select = Operation::new(
        "app",
        "users",
        OperationKind::Select(SelectOp {
            where_clause: Some(WhereClause::field_eq("id", 1i64)),
            ..Default::default()
        }),
    );

    let report = service.execute(vec![insert("users"), select], true).await;

    assert!(report.success);
    assert_eq!(report.error, None);
    assert_eq!(report.results.len(), 2);
}

#[tokio::test]
async fn test_backends_are_independent() {
    let store = InMemoryVectorStore::new().with_collection("memory_vectors");
    let service = Service::new().with_vector(VectorExecutor::new(store.clone(), 8));
    let builder = TestDataBuilder::from_test_name("test_backends_are_independent");

    let relational = service.execute(vec![insert("users")], false).await;
    assert_eq!(relational.error.as_deref(), Some("MySQL client not initialized"));

    let vector = service
        .execute_vector(vec![VectorOperation::new(
            "memory_vectors",
            VectorOperationKind::Insert(vec![
                builder.vector("a", 8),
                VectorData::new("b", builder.embedding("b", 8)).with_field("kind", "note"),
            ]),
        )])
        .await;
    assert!(vector.success);
    assert_eq!(store.len("memory_vectors"), 2);
}

#[tokio::test]
async fn test_vector_single_failure_message() {
    let store = InMemoryVectorStore::new().with_collection("memory_vectors");
    let service = Service::new().with_vector(VectorExecutor::new(store, 8));

    let report = service
        .execute_vector(vec![VectorOperation::new(
            "memory_vectors",
            VectorOperationKind::Insert(Vec::new()),
        )])
        .await;

    assert_eq!(report.results.len(), 1);
    assert_eq!(
        report.error.as_deref(),
        Some("operation 0 failed: insert vectors is empty")
    );
}
