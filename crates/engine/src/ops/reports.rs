//! Read-side rollups: dashboard metrics, category breakdown, trends and
//! period reports.
//!
//! Everything here is derived from the accounts and transactions tables at
//! query time. Aggregations run as SQL SUM/COUNT statements so the numbers
//! reflect whatever the ledger last committed.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, Statement, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    Account, EngineError, GoalKind, ResultEngine, SavingGoal, TransactionKind, accounts,
    saving_goals,
};

use super::Engine;

/// Accounts strictly below this balance (in minor units) trigger a
/// low-balance alert on the dashboard.
pub(crate) const LOW_BALANCE_ALERT_MINOR: i64 = 5_000;

/// How many months the income/expense trend looks back, current month
/// included.
const TREND_MONTHS: i32 = 6;

/// A reporting period, resolved against "now" at query time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportRange {
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
    Last30Days,
    Custom {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl ReportRange {
    /// Resolve to a concrete `[from, to)` window in UTC.
    pub fn resolve(self, now: DateTime<Utc>) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        let (year, month) = (now.year(), now.month());
        match self {
            Self::ThisMonth => {
                let (next_year, next_month) = next_month(year, month);
                Ok((month_start(year, month)?, month_start(next_year, next_month)?))
            }
            Self::LastMonth => {
                let (prev_year, prev_month) = previous_month(year, month);
                Ok((month_start(prev_year, prev_month)?, month_start(year, month)?))
            }
            Self::ThisYear => Ok((month_start(year, 1)?, month_start(year + 1, 1)?)),
            Self::LastYear => Ok((month_start(year - 1, 1)?, month_start(year, 1)?)),
            Self::Last30Days => Ok((now - Duration::days(30), now)),
            Self::Custom { from, to } => {
                if from >= to {
                    return Err(EngineError::Validation(
                        "invalid range: from must be < to".to_string(),
                    ));
                }
                Ok((from, to))
            }
        }
    }
}

/// Income, expense and savings totals for one window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub income_minor: i64,
    pub expenses_minor: i64,
    /// `income - expenses`; negative when the period overspent.
    pub savings_minor: i64,
}

/// Aggregated dashboard state for one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Sum of all account balances.
    pub total_balance_minor: i64,
    pub lifetime: PeriodTotals,
    pub this_month: PeriodTotals,
    pub this_year: PeriodTotals,
    /// Accounts below the low-balance threshold.
    pub low_balance_accounts: Vec<Account>,
    /// Every goal of the user with its derived progress.
    pub goals: Vec<GoalOverview>,
    /// Monthly goals currently below 75% of their target.
    pub goal_alerts: Vec<GoalOverview>,
}

/// A saving goal with its derived progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalOverview {
    pub goal: SavingGoal,
    pub progress_percent: i64,
    pub at_risk: bool,
}

/// Expense total for one category over a window.
///
/// Transactions whose category cannot be resolved fall into an
/// "Uncategorised" slice instead of disappearing from the total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub total_minor: i64,
    pub transaction_count: i64,
}

/// One month of the income/expense trend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySlice {
    /// Short month label, e.g. `"Jan"`.
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub income_minor: i64,
    pub expenses_minor: i64,
}

/// Totals and counts over one resolved reporting period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub income_minor: i64,
    pub expenses_minor: i64,
    pub net_minor: i64,
    pub income_count: i64,
    pub expense_count: i64,
}

impl Engine {
    /// Compute the dashboard rollup for a user.
    pub async fn dashboard_metrics(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<DashboardMetrics> {
        let total_balance_minor = self.total_balance(user_id).await?;
        let lifetime = self.period_totals(user_id, None).await?;

        let (month_from, month_to) = ReportRange::ThisMonth.resolve(now)?;
        let this_month = self.period_totals(user_id, Some((month_from, month_to))).await?;

        let (year_from, year_to) = ReportRange::ThisYear.resolve(now)?;
        let this_year = self.period_totals(user_id, Some((year_from, year_to))).await?;

        let low_balance_accounts = self.low_balance_accounts(user_id).await?;
        let goals = self.goal_overviews(user_id).await?;
        let goal_alerts = goals
            .iter()
            .filter(|overview| {
                overview.goal.kind == GoalKind::Monthly
                    && !overview.goal.is_completed
                    && overview.at_risk
            })
            .cloned()
            .collect();

        Ok(DashboardMetrics {
            total_balance_minor,
            lifetime,
            this_month,
            this_year,
            low_balance_accounts,
            goals,
            goal_alerts,
        })
    }

    /// Per-category expense totals over `[from, to)`, largest first.
    pub async fn category_breakdown(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ResultEngine<Vec<CategorySlice>> {
        if from >= to {
            return Err(EngineError::Validation(
                "invalid range: from must be < to".to_string(),
            ));
        }

        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(c.name, 'Uncategorised') AS name, \
                    c.icon AS icon, c.color AS color, \
                    COALESCE(SUM(t.amount_minor), 0) AS total_minor, \
                    COUNT(*) AS transaction_count \
             FROM transactions t \
             LEFT JOIN categories c ON c.id = t.category_id \
             WHERE t.user_id = ? AND t.kind = ? AND t.occurred_at >= ? AND t.occurred_at < ? \
             GROUP BY COALESCE(c.name, 'Uncategorised'), c.icon, c.color \
             ORDER BY total_minor DESC",
            [
                user_id.into(),
                TransactionKind::Expense.as_str().into(),
                from.into(),
                to.into(),
            ],
        );

        let rows = self.database.query_all(stmt).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(CategorySlice {
                name: row.try_get("", "name")?,
                icon: row.try_get("", "icon")?,
                color: row.try_get("", "color")?,
                total_minor: row.try_get("", "total_minor")?,
                transaction_count: row.try_get("", "transaction_count")?,
            });
        }
        Ok(out)
    }

    /// Income and expense totals for the last six months, oldest first,
    /// current month included.
    pub async fn income_expense_trend(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<MonthlySlice>> {
        let mut out = Vec::with_capacity(TREND_MONTHS as usize);
        for offset in (0..TREND_MONTHS).rev() {
            let (year, month) = shift_month(now.year(), now.month(), -offset);
            let from = month_start(year, month)?;
            let (next_year, next_month) = next_month(year, month);
            let to = month_start(next_year, next_month)?;

            let totals = self.period_totals(user_id, Some((from, to))).await?;
            let label = from.format("%b").to_string();
            out.push(MonthlySlice {
                label,
                year,
                month,
                income_minor: totals.income_minor,
                expenses_minor: totals.expenses_minor,
            });
        }
        Ok(out)
    }

    /// Totals and counts over a reporting period.
    pub async fn report_summary(
        &self,
        user_id: &str,
        range: ReportRange,
        now: DateTime<Utc>,
    ) -> ResultEngine<ReportSummary> {
        let (from, to) = range.resolve(now)?;
        let totals = self.period_totals(user_id, Some((from, to))).await?;
        let income_count = self
            .count_kind(user_id, TransactionKind::Income, Some((from, to)))
            .await?;
        let expense_count = self
            .count_kind(user_id, TransactionKind::Expense, Some((from, to)))
            .await?;

        Ok(ReportSummary {
            from,
            to,
            income_minor: totals.income_minor,
            expenses_minor: totals.expenses_minor,
            net_minor: totals.savings_minor,
            income_count,
            expense_count,
        })
    }

    async fn total_balance(&self, user_id: &str) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(balance_minor), 0) AS sum FROM accounts WHERE user_id = ?",
            [user_id.into()],
        );
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }

    async fn period_totals(
        &self,
        user_id: &str,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> ResultEngine<PeriodTotals> {
        let income_minor = self
            .sum_kind(user_id, TransactionKind::Income, window)
            .await?;
        let expenses_minor = self
            .sum_kind(user_id, TransactionKind::Expense, window)
            .await?;
        Ok(PeriodTotals {
            income_minor,
            expenses_minor,
            savings_minor: income_minor - expenses_minor,
        })
    }

    async fn sum_kind(
        &self,
        user_id: &str,
        kind: TransactionKind,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let (window_cond, window_args) = window_clause(window);
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
                 FROM transactions \
                 WHERE user_id = ? AND kind = ?{window_cond}"
            ),
            {
                let mut values: Vec<Value> = vec![user_id.into(), kind.as_str().into()];
                values.extend(window_args);
                values
            },
        );
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }

    async fn count_kind(
        &self,
        user_id: &str,
        kind: TransactionKind,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let (window_cond, window_args) = window_clause(window);
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COUNT(*) AS count \
                 FROM transactions \
                 WHERE user_id = ? AND kind = ?{window_cond}"
            ),
            {
                let mut values: Vec<Value> = vec![user_id.into(), kind.as_str().into()];
                values.extend(window_args);
                values
            },
        );
        let row = self.database.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "count").ok()).unwrap_or(0))
    }

    async fn low_balance_accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .filter(accounts::Column::BalanceMinor.lt(LOW_BALANCE_ALERT_MINOR))
            .order_by_asc(accounts::Column::BalanceMinor)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }

    async fn goal_overviews(&self, user_id: &str) -> ResultEngine<Vec<GoalOverview>> {
        let models = saving_goals::Entity::find()
            .filter(saving_goals::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(saving_goals::Column::Name)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let goal = SavingGoal::try_from(model)?;
            let progress_percent = goal.progress_percent();
            let at_risk = goal.is_at_risk();
            out.push(GoalOverview {
                goal,
                progress_percent,
                at_risk,
            });
        }
        Ok(out)
    }
}

fn window_clause(window: Option<(DateTime<Utc>, DateTime<Utc>)>) -> (&'static str, Vec<Value>) {
    match window {
        Some((from, to)) => (
            " AND occurred_at >= ? AND occurred_at < ?",
            vec![from.into(), to.into()],
        ),
        None => ("", Vec::new()),
    }
}

fn month_start(year: i32, month: u32) -> ResultEngine<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::Validation(format!("invalid month: {year}-{month}")))?;
    Ok(DateTime::from_naive_utc_and_offset(
        date.and_time(NaiveTime::MIN),
        Utc,
    ))
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// Shift a `(year, month)` pair by a number of months (negative = back).
fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 + delta;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn month_shifts_cross_year_boundaries() {
        assert_eq!(shift_month(2026, 2, -3), (2025, 11));
        assert_eq!(shift_month(2025, 12, 1), (2026, 1));
        assert_eq!(shift_month(2026, 1, -1), (2025, 12));
        assert_eq!(shift_month(2026, 6, 0), (2026, 6));
    }

    #[test]
    fn range_resolution_brackets_the_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (from, to) = ReportRange::ThisMonth.resolve(now).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap());

        let (from, to) = ReportRange::LastYear.resolve(now).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn custom_range_must_be_ordered() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let from = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let result = ReportRange::Custom { from, to: from }.resolve(now);
        assert!(result.is_err());
    }
}
