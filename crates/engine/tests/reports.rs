use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Account, AccountKind, Category, CreateAccountCmd, CreateGoalCmd, Engine, GoalKind,
    IncomeSource, RecordTransactionCmd, ReportRange, TransactionKind, TransactionListFilter,
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

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

async fn seed_fixtures(engine: &Engine) -> (Account, Category, IncomeSource) {
    let account = engine
        .create_account(CreateAccountCmd::new("alice", "Checking", AccountKind::Bank))
        .await
        .unwrap();
    let category = engine
        .create_category("alice", "Groceries", None, None, None)
        .await
        .unwrap();
    let source = engine
        .create_income_source("alice", "Salary", None, None)
        .await
        .unwrap();
    (account, category, source)
}

async fn record(
    engine: &Engine,
    kind: TransactionKind,
    amount_minor: i64,
    occurred_at: DateTime<Utc>,
    account: &Account,
    classifier_id: uuid::Uuid,
) {
    engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            kind,
            amount_minor,
            occurred_at,
            account.id,
            classifier_id,
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn dashboard_metrics_aggregate_per_period() {
    let (engine, _db) = engine_with_db().await;
    let (account, category, source) = seed_fixtures(&engine).await;
    let now = at(2026, 8, 15);

    record(&engine, TransactionKind::Income, 100_000, at(2026, 8, 5), &account, source.id).await;
    record(&engine, TransactionKind::Expense, 30_000, at(2026, 8, 10), &account, category.id).await;
    record(&engine, TransactionKind::Expense, 20_000, at(2026, 2, 3), &account, category.id).await;
    record(&engine, TransactionKind::Income, 50_000, at(2025, 6, 1), &account, source.id).await;

    let metrics = engine.dashboard_metrics("alice", now).await.unwrap();
    assert_eq!(metrics.total_balance_minor, 100_000);

    assert_eq!(metrics.lifetime.income_minor, 150_000);
    assert_eq!(metrics.lifetime.expenses_minor, 50_000);
    assert_eq!(metrics.lifetime.savings_minor, 100_000);

    assert_eq!(metrics.this_month.income_minor, 100_000);
    assert_eq!(metrics.this_month.expenses_minor, 30_000);

    assert_eq!(metrics.this_year.income_minor, 100_000);
    assert_eq!(metrics.this_year.expenses_minor, 50_000);
    assert_eq!(metrics.this_year.savings_minor, 50_000);
}

#[tokio::test]
async fn low_balance_accounts_are_flagged() {
    let (engine, _db) = engine_with_db().await;

    let low = engine
        .create_account(
            CreateAccountCmd::new("alice", "Wallet", AccountKind::Cash).balance_minor(4_999),
        )
        .await
        .unwrap();
    // Exactly at the threshold is not flagged; the comparison is strict.
    engine
        .create_account(
            CreateAccountCmd::new("alice", "Checking", AccountKind::Bank).balance_minor(5_000),
        )
        .await
        .unwrap();

    let metrics = engine.dashboard_metrics("alice", Utc::now()).await.unwrap();
    let flagged: Vec<_> = metrics
        .low_balance_accounts
        .iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(flagged, vec![low.id]);
}

#[tokio::test]
async fn monthly_goals_below_three_quarters_raise_alerts() {
    let (engine, _db) = engine_with_db().await;

    let behind = engine
        .create_goal(
            CreateGoalCmd::new("alice", "Emergency fund", 10_000, GoalKind::Monthly)
                .current_amount_minor(2_000),
        )
        .await
        .unwrap();
    engine
        .create_goal(
            CreateGoalCmd::new("alice", "Holiday", 10_000, GoalKind::Monthly)
                .current_amount_minor(8_000),
        )
        .await
        .unwrap();
    engine
        .create_goal(
            CreateGoalCmd::new("alice", "House", 1_000_000, GoalKind::Yearly)
                .current_amount_minor(0),
        )
        .await
        .unwrap();

    let metrics = engine.dashboard_metrics("alice", Utc::now()).await.unwrap();
    assert_eq!(metrics.goal_alerts.len(), 1);
    assert_eq!(metrics.goal_alerts[0].goal.id, behind.id);
    assert_eq!(metrics.goal_alerts[0].progress_percent, 20);
    assert!(metrics.goal_alerts[0].at_risk);

    // The dashboard also carries every goal with its derived progress,
    // not just the ones behind schedule.
    assert_eq!(metrics.goals.len(), 3);
    let holiday = metrics
        .goals
        .iter()
        .find(|overview| overview.goal.name == "Holiday")
        .unwrap();
    assert_eq!(holiday.progress_percent, 80);
    assert!(!holiday.at_risk);
}

#[tokio::test]
async fn category_breakdown_orders_by_total_and_falls_back() {
    let (engine, db) = engine_with_db().await;
    let (account, groceries, _source) = seed_fixtures(&engine).await;
    let transport = engine
        .create_category("alice", "Transport", None, None, None)
        .await
        .unwrap();

    record(&engine, TransactionKind::Expense, 4_000, at(2026, 8, 2), &account, groceries.id).await;
    record(&engine, TransactionKind::Expense, 3_000, at(2026, 8, 9), &account, groceries.id).await;
    record(&engine, TransactionKind::Expense, 1_000, at(2026, 8, 4), &account, transport.id).await;
    record(&engine, TransactionKind::Expense, 500, at(2026, 8, 6), &account, transport.id).await;

    // Orphan one expense to exercise the fallback slice.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE transactions SET category_id = NULL \
         WHERE user_id = ? AND amount_minor = ?",
        vec!["alice".into(), 500i64.into()],
    ))
    .await
    .unwrap();

    let slices = engine
        .category_breakdown("alice", at(2026, 8, 1), at(2026, 9, 1))
        .await
        .unwrap();

    let names: Vec<_> = slices.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Groceries", "Transport", "Uncategorised"]);
    assert_eq!(slices[0].total_minor, 7_000);
    assert_eq!(slices[0].transaction_count, 2);
    assert_eq!(slices[1].total_minor, 1_000);
    assert_eq!(slices[2].total_minor, 500);
}

#[tokio::test]
async fn trend_covers_six_months_oldest_first() {
    let (engine, _db) = engine_with_db().await;
    let (account, category, source) = seed_fixtures(&engine).await;
    let now = at(2026, 3, 15);

    record(&engine, TransactionKind::Income, 10_000, at(2026, 1, 10), &account, source.id).await;
    record(&engine, TransactionKind::Expense, 2_500, at(2026, 3, 2), &account, category.id).await;
    // Outside the window, must not appear.
    record(&engine, TransactionKind::Expense, 9_999, at(2025, 9, 1), &account, category.id).await;

    let trend = engine.income_expense_trend("alice", now).await.unwrap();
    assert_eq!(trend.len(), 6);

    let labels: Vec<_> = trend.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["Oct", "Nov", "Dec", "Jan", "Feb", "Mar"]);
    assert_eq!(trend[0].year, 2025);
    assert_eq!(trend[5].year, 2026);

    let january = &trend[3];
    assert_eq!(january.income_minor, 10_000);
    assert_eq!(january.expenses_minor, 0);

    let march = &trend[5];
    assert_eq!(march.income_minor, 0);
    assert_eq!(march.expenses_minor, 2_500);
}

#[tokio::test]
async fn report_summary_counts_by_kind() {
    let (engine, _db) = engine_with_db().await;
    let (account, category, source) = seed_fixtures(&engine).await;
    let now = at(2026, 8, 20);

    record(&engine, TransactionKind::Income, 100_000, at(2026, 8, 1), &account, source.id).await;
    record(&engine, TransactionKind::Expense, 10_000, at(2026, 8, 5), &account, category.id).await;
    record(&engine, TransactionKind::Expense, 5_000, at(2026, 8, 12), &account, category.id).await;
    record(&engine, TransactionKind::Expense, 7_777, at(2026, 7, 12), &account, category.id).await;

    let summary = engine
        .report_summary("alice", ReportRange::ThisMonth, now)
        .await
        .unwrap();
    assert_eq!(summary.income_minor, 100_000);
    assert_eq!(summary.expenses_minor, 15_000);
    assert_eq!(summary.net_minor, 85_000);
    assert_eq!(summary.income_count, 1);
    assert_eq!(summary.expense_count, 2);

    let summary = engine
        .report_summary("alice", ReportRange::LastMonth, now)
        .await
        .unwrap();
    assert_eq!(summary.expenses_minor, 7_777);
    assert_eq!(summary.expense_count, 1);
}

#[tokio::test]
async fn listing_paginates_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let (account, category, _source) = seed_fixtures(&engine).await;

    for day in 1..=5 {
        record(
            &engine,
            TransactionKind::Expense,
            1_000 * i64::from(day),
            at(2026, 8, day),
            &account,
            category.id,
        )
        .await;
    }

    let filter = TransactionListFilter::default();
    let page = engine
        .list_transactions("alice", 2, None, &filter)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].transaction.amount_minor, 5_000);
    assert_eq!(page.items[1].transaction.amount_minor, 4_000);
    let cursor = page.next_cursor.expect("expected another page");

    let page = engine
        .list_transactions("alice", 2, Some(&cursor), &filter)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].transaction.amount_minor, 3_000);
    let cursor = page.next_cursor.expect("expected another page");

    let page = engine
        .list_transactions("alice", 2, Some(&cursor), &filter)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].transaction.amount_minor, 1_000);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn listing_filters_by_kind_and_window() {
    let (engine, _db) = engine_with_db().await;
    let (account, category, source) = seed_fixtures(&engine).await;

    record(&engine, TransactionKind::Income, 100_000, at(2026, 8, 1), &account, source.id).await;
    record(&engine, TransactionKind::Expense, 10_000, at(2026, 8, 5), &account, category.id).await;
    record(&engine, TransactionKind::Expense, 5_000, at(2026, 7, 5), &account, category.id).await;

    let filter = TransactionListFilter {
        kind: Some(TransactionKind::Expense),
        from: Some(at(2026, 8, 1)),
        ..Default::default()
    };
    let page = engine
        .list_transactions("alice", 10, None, &filter)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].transaction.amount_minor, 10_000);
    assert_eq!(page.items[0].classifier.name, "Groceries");
}
