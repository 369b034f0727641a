//! Ledger engine for a personal finance tracker.
//!
//! The engine owns every mutation of accounts, transactions, classifiers
//! and saving goals, scoped per user. Its core guarantee: an account's
//! stored balance always equals the net effect of the transactions that
//! reference it (plus manual overrides), because transaction writes and
//! balance adjustments commit in the same database transaction or not at
//! all.

pub use accounts::{Account, AccountKind};
pub use categories::Category;
pub use commands::{
    AmendTransactionCmd, CreateAccountCmd, CreateGoalCmd, RecordTransactionCmd, UpdateAccountCmd,
    UpdateGoalCmd,
};
pub use error::EngineError;
pub use income_sources::IncomeSource;
pub use money::MoneyCents;
pub use ops::{
    CategorySlice, DashboardMetrics, Engine, EngineBuilder, GoalOverview, MonthlySlice,
    PeriodTotals, ReportRange, ReportSummary, TransactionListFilter, TransactionPage,
};
pub use saving_goals::{GoalKind, SavingGoal};
pub use transactions::{Classifier, Transaction, TransactionDetail, TransactionKind};

mod accounts;
mod categories;
mod commands;
mod error;
mod income_sources;
mod money;
mod ops;
mod saving_goals;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
