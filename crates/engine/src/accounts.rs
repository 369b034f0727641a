//! The module contains the `Account` struct and its implementation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// The kind of place money is held in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Bank,
    Cash,
    Custom,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::Custom => "custom",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "bank" => Ok(Self::Bank),
            "cash" => Ok(Self::Cash),
            "custom" => Ok(Self::Custom),
            other => Err(EngineError::Validation(format!(
                "invalid account kind: {other}"
            ))),
        }
    }
}

/// A monetary account.
///
/// An account is a representation of a bank account, a physical wallet or any
/// other custom place money is held in. Its `balance_minor` field is
/// denormalized: the ledger engine keeps it equal to the net effect of every
/// recorded transaction referencing the account (plus manual overrides).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, generated once and persisted as a string.
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Balance in minor units (cents).
    pub balance_minor: i64,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        user_id: String,
        name: String,
        kind: AccountKind,
        balance_minor: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            kind,
            bank_name: None,
            account_number: None,
            icon: None,
            color: None,
            balance_minor,
            is_default: false,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub balance_minor: i64,
    pub is_default: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            user_id: ActiveValue::Set(account.user_id.clone()),
            name: ActiveValue::Set(account.name.clone()),
            kind: ActiveValue::Set(account.kind.as_str().to_string()),
            bank_name: ActiveValue::Set(account.bank_name.clone()),
            account_number: ActiveValue::Set(account.account_number.clone()),
            icon: ActiveValue::Set(account.icon.clone()),
            color: ActiveValue::Set(account.color.clone()),
            balance_minor: ActiveValue::Set(account.balance_minor),
            is_default: ActiveValue::Set(account.is_default),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            user_id: model.user_id,
            name: model.name,
            kind: AccountKind::try_from(model.kind.as_str())?,
            bank_name: model.bank_name,
            account_number: model.account_number,
            icon: model.icon,
            color: model.color,
            balance_minor: model.balance_minor,
            is_default: model.is_default,
            created_at: model.created_at,
        })
    }
}
