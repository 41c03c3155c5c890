//! Runs the relational executor against a real MySQL. Needs Docker:
//! `cargo test -p domain_storage --test mysql_integration -- --ignored`

use domain_storage::{
    Fields, InsertOp, Operation, OperationKind, OperationOutput, OrderBy, Pagination,
    RelationalExecutor, SelectOp, TypedValue, UpdateOp, WhereClause,
};
use test_utils::TestMySql;

fn row(id: i64, name: &str, score: f64) -> Fields {
    [
        ("id".to_string(), TypedValue::Int(id)),
        ("name".to_string(), TypedValue::from(name)),
        ("score".to_string(), TypedValue::Double(score)),
    ]
    .into()
}

async fn setup() -> TestMySql {
    let mysql = TestMySql::new().await;
    mysql
        .execute(
            "CREATE TABLE test.people (
                id BIGINT PRIMARY KEY,
                name VARCHAR(64) NOT NULL,
                score DOUBLE,
                active BOOLEAN DEFAULT TRUE,
                visits INT UNSIGNED DEFAULT 0,
                avatar BLOB,
                created_at DATETIME DEFAULT '2024-01-02 03:04:05'
            )",
        )
        .await;
    mysql
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_round_trip_against_mysql() {
    let mysql = setup().await;
    let executor = RelationalExecutor::new(mysql.backend());

    let results = executor
        .execute_batch(
            vec![
                Operation::new(
                    "test",
                    "people",
                    OperationKind::Insert(InsertOp {
                        rows: vec![row(1, "ann", 0.5), row(2, "bob", 1.5)],
                    }),
                ),
                Operation::new(
                    "test",
                    "people",
                    OperationKind::Update(UpdateOp {
                        raw_set: "visits = visits + ?".to_string(),
                        raw_set_params: vec![TypedValue::Int(3)],
                        where_clause: Some(WhereClause::field_eq("id", 2i64)),
                        ..Default::default()
                    }),
                ),
                Operation::new(
                    "test",
                    "people",
                    OperationKind::Select(SelectOp {
                        order_by: Some(OrderBy {
                            field: "id".to_string(),
                            descending: true,
                        }),
                        pagination: Some(Pagination { limit: 1, offset: 0 }),
                        ..Default::default()
                    }),
                ),
            ],
            true,
        )
        .await
        .unwrap();

    assert_eq!(results[0].outcome, Ok(OperationOutput::Inserted(2)));
    assert_eq!(results[1].outcome, Ok(OperationOutput::Updated(1)));

    let Ok(OperationOutput::Selected { rows, total }) = &results[2].outcome else {
        panic!("expected select output");
    };
    assert_eq!(*total, 1);
    let bob = &rows[0];
    assert_eq!(bob.get("id"), Some(&TypedValue::Int(2)));
    assert_eq!(bob.get("name"), Some(&TypedValue::from("bob")));
    assert_eq!(bob.get("score"), Some(&TypedValue::Double(1.5)));
    assert_eq!(bob.get("active"), Some(&TypedValue::Bool(true)));
    assert_eq!(bob.get("visits"), Some(&TypedValue::Int(3)));
    assert_eq!(bob.get("avatar"), Some(&TypedValue::Null));
    assert_eq!(
        bob.get("created_at"),
        Some(&TypedValue::Timestamp(1_704_164_645_000))
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_failed_transaction_leaves_no_rows() {
    let mysql = setup().await;
    let executor = RelationalExecutor::new(mysql.backend());
    let insert = |id| {
        Operation::new(
            "test",
            "people",
            OperationKind::Insert(InsertOp {
                rows: vec![row(id, "dup", 0.0)],
            }),
        )
    };

    let err = executor
        .execute_batch(vec![insert(7), insert(7)], true)
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("operation 1 failed: batch insert error: "));

    let results = executor
        .execute_batch(
            vec![Operation::new("test", "people", OperationKind::Select(SelectOp::default()))],
            false,
        )
        .await
        .unwrap();
    assert_eq!(
        results[0].outcome,
        Ok(OperationOutput::Selected {
            rows: Vec::new(),
            total: 0
        })
    );
}
