use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{CreateGoalCmd, Engine, EngineError, GoalKind, UpdateGoalCmd};
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
async fn goal_round_trip() {
    let (engine, _db) = engine_with_db().await;

    let deadline = Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap();
    let goal = engine
        .create_goal(
            CreateGoalCmd::new("alice", "Emergency fund", 100_000, GoalKind::Custom)
                .current_amount_minor(25_000)
                .deadline(deadline),
        )
        .await
        .unwrap();
    assert_eq!(goal.current_amount_minor, 25_000);
    assert!(!goal.is_completed);

    let fetched = engine.goal("alice", goal.id).await.unwrap();
    assert_eq!(fetched, goal);

    engine.delete_goal("alice", goal.id).await.unwrap();
    let result = engine.goal("alice", goal.id).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn completion_is_derived_from_amounts() {
    let (engine, _db) = engine_with_db().await;

    let goal = engine
        .create_goal(CreateGoalCmd::new("alice", "Holiday", 50_000, GoalKind::Yearly))
        .await
        .unwrap();
    assert!(!goal.is_completed);

    let goal = engine
        .update_goal(UpdateGoalCmd::new("alice", goal.id).current_amount_minor(50_000))
        .await
        .unwrap();
    assert!(goal.is_completed);

    let goal = engine
        .update_goal(UpdateGoalCmd::new("alice", goal.id).current_amount_minor(10_000))
        .await
        .unwrap();
    assert!(!goal.is_completed);
    assert_eq!(goal.progress_percent(), 20);
}

#[tokio::test]
async fn target_must_be_positive() {
    let (engine, _db) = engine_with_db().await;

    let result = engine
        .create_goal(CreateGoalCmd::new("alice", "Broken", 0, GoalKind::Monthly))
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));

    let goal = engine
        .create_goal(CreateGoalCmd::new("alice", "Holiday", 50_000, GoalKind::Yearly))
        .await
        .unwrap();
    let result = engine
        .update_goal(UpdateGoalCmd::new("alice", goal.id).target_amount_minor(-1))
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));
}
