//! Command structs for engine operations.
//!
//! These types group parameters for write operations (record/amend,
//! account and goal maintenance), keeping call sites readable and
//! avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AccountKind, GoalKind, TransactionKind};

/// Record a new income or expense transaction.
#[derive(Clone, Debug)]
pub struct RecordTransactionCmd {
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub account_id: Uuid,
    /// Category for expenses, income source for incomes.
    pub classifier_id: Uuid,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub merchant: Option<String>,
}

impl RecordTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        account_id: Uuid,
        classifier_id: Uuid,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            amount_minor,
            occurred_at,
            account_id,
            classifier_id,
            description: None,
            notes: None,
            merchant: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }
}

/// Amend an existing transaction.
///
/// Unset fields are left untouched. Amount and account changes are
/// reconciled against account balances atomically.
#[derive(Clone, Debug)]
pub struct AmendTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,

    pub amount_minor: Option<i64>,
    pub account_id: Option<Uuid>,
    pub classifier_id: Option<Uuid>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub merchant: Option<String>,
}

impl AmendTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            amount_minor: None,
            account_id: None,
            classifier_id: None,
            occurred_at: None,
            description: None,
            notes: None,
            merchant: None,
        }
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn classifier_id(mut self, classifier_id: Uuid) -> Self {
        self.classifier_id = Some(classifier_id);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }
}

/// Create an account.
#[derive(Clone, Debug)]
pub struct CreateAccountCmd {
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub balance_minor: i64,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_default: bool,
}

impl CreateAccountCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            kind,
            balance_minor: 0,
            bank_name: None,
            account_number: None,
            icon: None,
            color: None,
            is_default: false,
        }
    }

    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = balance_minor;
        self
    }

    #[must_use]
    pub fn bank_name(mut self, bank_name: impl Into<String>) -> Self {
        self.bank_name = Some(bank_name.into());
        self
    }

    #[must_use]
    pub fn account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn is_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

/// Update an account's descriptive fields or manually override its balance.
///
/// A manual balance override is not reconciled against transactions; it
/// simply becomes the new baseline.
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub user_id: String,
    pub account_id: Uuid,

    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub balance_minor: Option<i64>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, account_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            name: None,
            kind: None,
            balance_minor: None,
            bank_name: None,
            account_number: None,
            icon: None,
            color: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: AccountKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = Some(balance_minor);
        self
    }

    #[must_use]
    pub fn bank_name(mut self, bank_name: impl Into<String>) -> Self {
        self.bank_name = Some(bank_name.into());
        self
    }

    #[must_use]
    pub fn account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Create a saving goal.
#[derive(Clone, Debug)]
pub struct CreateGoalCmd {
    pub user_id: String,
    pub name: String,
    pub target_amount_minor: i64,
    pub kind: GoalKind,
    pub current_amount_minor: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CreateGoalCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        target_amount_minor: i64,
        kind: GoalKind,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            target_amount_minor,
            kind,
            current_amount_minor: 0,
            deadline: None,
            icon: None,
            color: None,
        }
    }

    #[must_use]
    pub fn current_amount_minor(mut self, current_amount_minor: i64) -> Self {
        self.current_amount_minor = current_amount_minor;
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Update a saving goal.
#[derive(Clone, Debug)]
pub struct UpdateGoalCmd {
    pub user_id: String,
    pub goal_id: Uuid,

    pub name: Option<String>,
    pub target_amount_minor: Option<i64>,
    pub current_amount_minor: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
    pub kind: Option<GoalKind>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_completed: Option<bool>,
}

impl UpdateGoalCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, goal_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            goal_id,
            name: None,
            target_amount_minor: None,
            current_amount_minor: None,
            deadline: None,
            kind: None,
            icon: None,
            color: None,
            is_completed: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn target_amount_minor(mut self, target_amount_minor: i64) -> Self {
        self.target_amount_minor = Some(target_amount_minor);
        self
    }

    #[must_use]
    pub fn current_amount_minor(mut self, current_amount_minor: i64) -> Self {
        self.current_amount_minor = Some(current_amount_minor);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: GoalKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn is_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(is_completed);
        self
    }
}
