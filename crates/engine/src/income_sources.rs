//! Income sources: the classifier counterpart of categories, for incomes.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl IncomeSource {
    pub fn new(user_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            icon: None,
            color: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "income_sources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&IncomeSource> for ActiveModel {
    fn from(source: &IncomeSource) -> Self {
        Self {
            id: ActiveValue::Set(source.id.to_string()),
            user_id: ActiveValue::Set(source.user_id.clone()),
            name: ActiveValue::Set(source.name.clone()),
            icon: ActiveValue::Set(source.icon.clone()),
            color: ActiveValue::Set(source.color.clone()),
        }
    }
}

impl TryFrom<Model> for IncomeSource {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "income source")?,
            user_id: model.user_id,
            name: model.name,
            icon: model.icon,
            color: model.color,
        })
    }
}
