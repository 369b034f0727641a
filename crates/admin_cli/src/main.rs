use std::error::Error;
use std::str::FromStr;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use engine::{
    AccountKind, CreateAccountCmd, Engine, MoneyCents, RecordTransactionCmd, TransactionKind,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub email: String,
        pub name: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "centaver_admin")]
#[command(about = "Admin utilities for Centaver (bootstrap users/accounts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./centaver.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Account(Account),
    Category(Category),
    Source(Source),
    Record(RecordArgs),
    Metrics(MetricsArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    password: String,
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    List(OwnerArgs),
    SetDefault(AccountIdArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
    /// One of: bank, cash, custom.
    #[arg(long, default_value = "bank")]
    kind: String,
    /// Opening balance, e.g. "125.50".
    #[arg(long, default_value = "0")]
    balance: String,
    #[arg(long)]
    default: bool,
}

#[derive(Args, Debug)]
struct OwnerArgs {
    #[arg(long)]
    owner: String,
}

#[derive(Args, Debug)]
struct AccountIdArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    account_id: Uuid,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create(ClassifierCreateArgs),
}

#[derive(Args, Debug)]
struct Source {
    #[command(subcommand)]
    command: SourceCommand,
}

#[derive(Subcommand, Debug)]
enum SourceCommand {
    Create(ClassifierCreateArgs),
}

#[derive(Args, Debug)]
struct ClassifierCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[arg(long)]
    owner: String,
    /// One of: income, expense.
    #[arg(long)]
    kind: String,
    /// Amount, e.g. "42.90".
    #[arg(long)]
    amount: String,
    #[arg(long)]
    account_id: Uuid,
    /// Category id for expenses, income source id for incomes.
    #[arg(long)]
    classifier_id: Uuid,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct MetricsArgs {
    #[arg(long)]
    owner: String,
}

fn parse_account_kind(raw: &str) -> Result<AccountKind, String> {
    AccountKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_transaction_kind(raw: &str) -> Result<TransactionKind, String> {
    TransactionKind::try_from(raw).map_err(|err| err.to_string())
}

async fn connect(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "centaver_admin=info,engine=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let db = connect(&cli.database_url).await?;
    let engine = Engine::builder().database(db.clone()).build().await?;

    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Create(args) => {
                let model = users::ActiveModel {
                    id: Set(args.id.clone()),
                    email: Set(args.email),
                    name: Set(args.name),
                    password: Set(args.password),
                };
                users::Entity::insert(model).exec(&db).await?;
                println!("created user {}", args.id);
            }
        },
        Command::Account(account) => match account.command {
            AccountCommand::Create(args) => {
                let kind = parse_account_kind(&args.kind)?;
                let balance = MoneyCents::from_str(&args.balance)?;
                let account = engine
                    .create_account(
                        CreateAccountCmd::new(&args.owner, &args.name, kind)
                            .balance_minor(balance.cents())
                            .is_default(args.default),
                    )
                    .await?;
                println!("created account {} ({})", account.id, account.name);
            }
            AccountCommand::List(args) => {
                for account in engine.list_accounts(&args.owner).await? {
                    let marker = if account.is_default { "*" } else { " " };
                    println!(
                        "{marker} {} {:<20} {:>12}",
                        account.id,
                        account.name,
                        MoneyCents::new(account.balance_minor).to_string(),
                    );
                }
            }
            AccountCommand::SetDefault(args) => {
                let account = engine
                    .set_default_account(&args.owner, args.account_id)
                    .await?;
                println!("default account is now {}", account.name);
            }
        },
        Command::Category(category) => match category.command {
            CategoryCommand::Create(args) => {
                let category = engine
                    .create_category(&args.owner, &args.name, None, None, None)
                    .await?;
                println!("created category {} ({})", category.id, category.name);
            }
        },
        Command::Source(source) => match source.command {
            SourceCommand::Create(args) => {
                let source = engine
                    .create_income_source(&args.owner, &args.name, None, None)
                    .await?;
                println!("created income source {} ({})", source.id, source.name);
            }
        },
        Command::Record(args) => {
            let kind = parse_transaction_kind(&args.kind)?;
            let amount = MoneyCents::from_str(&args.amount)?;
            let mut cmd = RecordTransactionCmd::new(
                &args.owner,
                kind,
                amount.cents(),
                Utc::now(),
                args.account_id,
                args.classifier_id,
            );
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }
            let detail = engine.record_transaction(cmd).await?;
            println!(
                "recorded {} {} -> balance {}",
                kind.as_str(),
                amount,
                MoneyCents::new(detail.account.balance_minor),
            );
        }
        Command::Metrics(args) => {
            let metrics = engine.dashboard_metrics(&args.owner, Utc::now()).await?;
            println!(
                "total balance: {}",
                MoneyCents::new(metrics.total_balance_minor)
            );
            println!(
                "this month: +{} -{} (saved {})",
                MoneyCents::new(metrics.this_month.income_minor),
                MoneyCents::new(metrics.this_month.expenses_minor),
                MoneyCents::new(metrics.this_month.savings_minor),
            );
            println!(
                "this year:  +{} -{} (saved {})",
                MoneyCents::new(metrics.this_year.income_minor),
                MoneyCents::new(metrics.this_year.expenses_minor),
                MoneyCents::new(metrics.this_year.savings_minor),
            );
            for account in &metrics.low_balance_accounts {
                println!(
                    "low balance: {} ({})",
                    account.name,
                    MoneyCents::new(account.balance_minor)
                );
            }
            for alert in &metrics.goal_alerts {
                println!(
                    "goal behind: {} at {}%",
                    alert.goal.name, alert.progress_percent
                );
            }
        }
    }

    Ok(())
}
