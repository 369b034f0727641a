use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountKind, CreateAccountCmd, Engine, EngineError, RecordTransactionCmd, TransactionKind,
    UpdateAccountCmd,
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
async fn first_account_becomes_default() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .create_account(CreateAccountCmd::new("alice", "Checking", AccountKind::Bank))
        .await
        .unwrap();
    assert!(first.is_default);

    let second = engine
        .create_account(CreateAccountCmd::new("alice", "Wallet", AccountKind::Cash))
        .await
        .unwrap();
    assert!(!second.is_default);
}

#[tokio::test]
async fn create_with_default_flag_demotes_siblings() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .create_account(CreateAccountCmd::new("alice", "Checking", AccountKind::Bank))
        .await
        .unwrap();
    let second = engine
        .create_account(
            CreateAccountCmd::new("alice", "Savings", AccountKind::Bank).is_default(true),
        )
        .await
        .unwrap();
    assert!(second.is_default);

    let accounts = engine.list_accounts("alice").await.unwrap();
    let defaults: Vec<_> = accounts.iter().filter(|a| a.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, second.id);
    assert!(!accounts.iter().find(|a| a.id == first.id).unwrap().is_default);
}

#[tokio::test]
async fn set_default_account_is_exclusive() {
    let (engine, _db) = engine_with_db().await;

    let mut ids = Vec::new();
    for name in ["Checking", "Savings", "Wallet"] {
        let account = engine
            .create_account(CreateAccountCmd::new("alice", name, AccountKind::Bank))
            .await
            .unwrap();
        ids.push(account.id);
    }

    for target in [ids[1], ids[2], ids[0]] {
        let account = engine.set_default_account("alice", target).await.unwrap();
        assert!(account.is_default);

        let accounts = engine.list_accounts("alice").await.unwrap();
        let defaults: Vec<_> = accounts.iter().filter(|a| a.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, target);
    }
}

#[tokio::test]
async fn manual_balance_override_becomes_the_new_baseline() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .create_account(
            CreateAccountCmd::new("alice", "Checking", AccountKind::Bank).balance_minor(10_000),
        )
        .await
        .unwrap();

    let account = engine
        .update_account(UpdateAccountCmd::new("alice", account.id).balance_minor(99_950))
        .await
        .unwrap();
    assert_eq!(account.balance_minor, 99_950);

    // Subsequent ledger writes adjust from the new baseline.
    let source = engine
        .create_income_source("alice", "Salary", None, None)
        .await
        .unwrap();
    let detail = engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            TransactionKind::Income,
            50,
            Utc::now(),
            account.id,
            source.id,
        ))
        .await
        .unwrap();
    assert_eq!(detail.account.balance_minor, 100_000);
}

#[tokio::test]
async fn delete_is_rejected_while_transactions_reference_the_account() {
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
            2_000,
            Utc::now(),
            account.id,
            category.id,
        ))
        .await
        .unwrap();

    let result = engine.delete_account("alice", account.id).await;
    assert!(matches!(result, Err(EngineError::Conflict(_))));

    engine
        .remove_transaction("alice", detail.transaction.id)
        .await
        .unwrap();
    engine.delete_account("alice", account.id).await.unwrap();

    let result = engine.account("alice", account.id).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn deleting_the_default_promotes_the_oldest_remaining() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .create_account(CreateAccountCmd::new("alice", "Checking", AccountKind::Bank))
        .await
        .unwrap();
    let second = engine
        .create_account(CreateAccountCmd::new("alice", "Savings", AccountKind::Bank))
        .await
        .unwrap();
    assert!(first.is_default);

    engine.delete_account("alice", first.id).await.unwrap();

    let account = engine.account("alice", second.id).await.unwrap();
    assert!(account.is_default);
}

#[tokio::test]
async fn blank_account_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let result = engine
        .create_account(CreateAccountCmd::new("alice", "   ", AccountKind::Bank))
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));
}

#[tokio::test]
async fn unknown_user_cannot_create_accounts() {
    let (engine, _db) = engine_with_db().await;

    let result = engine
        .create_account(CreateAccountCmd::new("mallory", "Checking", AccountKind::Bank))
        .await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}
