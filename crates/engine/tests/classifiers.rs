use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountKind, CreateAccountCmd, Engine, EngineError, RecordTransactionCmd, TransactionKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, email, name, password) VALUES (?, ?, ?, ?)",
        vec![
            "alice".into(),
            "alice@example.com".into(),
            "Alice".into(),
            "password".into(),
        ],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

#[tokio::test]
async fn duplicate_category_names_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_category("alice", "Groceries", None, None, None)
        .await
        .unwrap();
    let result = engine
        .create_category("alice", "Groceries", None, None, None)
        .await;
    assert!(matches!(result, Err(EngineError::Conflict(_))));
}

#[tokio::test]
async fn category_delete_is_rejected_while_referenced() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .create_account(
            CreateAccountCmd::new("alice", "Checking", AccountKind::Bank).balance_minor(10_000),
        )
        .await
        .unwrap();
    let category = engine
        .create_category("alice", "Groceries", None, None, None)
        .await
        .unwrap();

    let detail = engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            TransactionKind::Expense,
            1_500,
            Utc::now(),
            account.id,
            category.id,
        ))
        .await
        .unwrap();

    let result = engine.delete_category("alice", category.id).await;
    assert!(matches!(result, Err(EngineError::Conflict(_))));

    engine
        .remove_transaction("alice", detail.transaction.id)
        .await
        .unwrap();
    engine.delete_category("alice", category.id).await.unwrap();
    assert!(engine.list_categories("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn income_source_delete_is_rejected_while_referenced() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .create_account(CreateAccountCmd::new("alice", "Checking", AccountKind::Bank))
        .await
        .unwrap();
    let source = engine
        .create_income_source("alice", "Salary", None, None)
        .await
        .unwrap();

    engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            TransactionKind::Income,
            100_000,
            Utc::now(),
            account.id,
            source.id,
        ))
        .await
        .unwrap();

    let result = engine.delete_income_source("alice", source.id).await;
    assert!(matches!(result, Err(EngineError::Conflict(_))));
}

#[tokio::test]
async fn rename_keeps_names_unique_per_user() {
    let (engine, _db) = engine_with_db().await;

    let groceries = engine
        .create_category("alice", "Groceries", None, None, None)
        .await
        .unwrap();
    engine
        .create_category("alice", "Transport", None, None, None)
        .await
        .unwrap();

    let result = engine
        .update_category("alice", groceries.id, Some("Transport"), None, None, None)
        .await;
    assert!(matches!(result, Err(EngineError::Conflict(_))));

    let renamed = engine
        .update_category("alice", groceries.id, Some("Food"), None, None, None)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Food");
}

#[tokio::test]
async fn category_budget_must_be_positive() {
    let (engine, _db) = engine_with_db().await;

    let result = engine
        .create_category("alice", "Groceries", None, None, Some(0))
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));

    let category = engine
        .create_category("alice", "Groceries", None, None, Some(30_000))
        .await
        .unwrap();
    assert_eq!(category.budget_minor, Some(30_000));

    // Clearing the budget is allowed.
    let category = engine
        .update_category("alice", category.id, None, None, None, Some(None))
        .await
        .unwrap();
    assert_eq!(category.budget_minor, None);
}
