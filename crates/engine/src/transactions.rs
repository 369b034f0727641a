//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense event against exactly one
//! account. Its balance effect is derived from the kind: income adds the
//! amount, expense subtracts it. Every mutation goes through the ledger
//! engine so the referenced account balance and the transaction row commit
//! together.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Account, EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Signed balance contribution of an amount of this kind.
    ///
    /// `amount_minor` is the stored (strictly positive) amount; the result is
    /// the delta the referenced account balance receives.
    pub fn signed_amount(self, amount_minor: i64) -> i64 {
        match self {
            Self::Income => amount_minor,
            Self::Expense => -amount_minor,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub kind: TransactionKind,
    /// Strictly positive amount in minor units; the sign comes from `kind`.
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Merchant is only meaningful for expenses.
    pub merchant: Option<String>,
    pub account_id: Uuid,
    /// Category for expenses, income source for incomes.
    pub classifier_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        account_id: Uuid,
        classifier_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            amount_minor,
            occurred_at,
            description: None,
            notes: None,
            merchant: None,
            account_id,
            classifier_id,
            created_at,
        })
    }

    /// Signed balance contribution of this transaction.
    pub fn signed_amount(&self) -> i64 {
        self.kind.signed_amount(self.amount_minor)
    }
}

/// The category or income source a transaction is tagged with, flattened for
/// display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// A transaction joined with its account and classifier, as returned by the
/// write operations and the listing API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub account: Account,
    pub classifier: Classifier,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub merchant: Option<String>,
    pub account_id: String,
    pub category_id: Option<String>,
    pub source_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
    #[sea_orm(
        belongs_to = "super::income_sources::Entity",
        from = "Column::SourceId",
        to = "super::income_sources::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    IncomeSources,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::income_sources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IncomeSources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        let (category_id, source_id) = match tx.kind {
            TransactionKind::Expense => (Some(tx.classifier_id.to_string()), None),
            TransactionKind::Income => (None, Some(tx.classifier_id.to_string())),
        };
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            description: ActiveValue::Set(tx.description.clone()),
            notes: ActiveValue::Set(tx.notes.clone()),
            merchant: ActiveValue::Set(tx.merchant.clone()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            category_id: ActiveValue::Set(category_id),
            source_id: ActiveValue::Set(source_id),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = TransactionKind::try_from(model.kind.as_str())?;
        let classifier_raw = match kind {
            TransactionKind::Expense => model.category_id.as_deref(),
            TransactionKind::Income => model.source_id.as_deref(),
        };
        let classifier_raw = classifier_raw.ok_or_else(|| {
            EngineError::Validation(format!(
                "transaction {} has no classifier for kind {}",
                model.id,
                kind.as_str()
            ))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: model.user_id,
            kind,
            amount_minor: model.amount_minor,
            occurred_at: model.occurred_at,
            description: model.description,
            notes: model.notes,
            merchant: model.merchant,
            account_id: parse_uuid(&model.account_id, "account")?,
            classifier_id: parse_uuid(classifier_raw, "classifier")?,
            created_at: model.created_at,
        })
    }
}
