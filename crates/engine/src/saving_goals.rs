//! Saving goals.
//!
//! Goals are tracked manually (`current_amount_minor` is edited by the
//! owner); they never feed back into account balances. The dashboard
//! rollups read them for progress and at-risk alerts.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Monthly,
    Yearly,
    Custom,
}

impl GoalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
        }
    }
}

impl TryFrom<&str> for GoalKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "custom" => Ok(Self::Custom),
            other => Err(EngineError::Validation(format!("invalid goal kind: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingGoal {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub kind: GoalKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_completed: bool,
}

impl SavingGoal {
    pub fn new(user_id: String, name: String, target_amount_minor: i64, kind: GoalKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            target_amount_minor,
            current_amount_minor: 0,
            deadline: None,
            kind,
            icon: None,
            color: None,
            is_completed: false,
        }
    }

    /// Progress towards the target as a percentage, capped at 100.
    pub fn progress_percent(&self) -> i64 {
        if self.target_amount_minor <= 0 {
            return 0;
        }
        let raw = (self.current_amount_minor.max(0) * 100 + self.target_amount_minor / 2)
            / self.target_amount_minor;
        raw.min(100)
    }

    /// Whether the goal is below 75% of its target.
    pub fn is_at_risk(&self) -> bool {
        if self.target_amount_minor <= 0 {
            return false;
        }
        self.current_amount_minor.max(0) * 4 < self.target_amount_minor * 3
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "saving_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub deadline: Option<DateTimeUtc>,
    pub kind: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_completed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingGoal> for ActiveModel {
    fn from(goal: &SavingGoal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id.to_string()),
            user_id: ActiveValue::Set(goal.user_id.clone()),
            name: ActiveValue::Set(goal.name.clone()),
            target_amount_minor: ActiveValue::Set(goal.target_amount_minor),
            current_amount_minor: ActiveValue::Set(goal.current_amount_minor),
            deadline: ActiveValue::Set(goal.deadline),
            kind: ActiveValue::Set(goal.kind.as_str().to_string()),
            icon: ActiveValue::Set(goal.icon.clone()),
            color: ActiveValue::Set(goal.color.clone()),
            is_completed: ActiveValue::Set(goal.is_completed),
        }
    }
}

impl TryFrom<Model> for SavingGoal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "saving goal")?,
            user_id: model.user_id,
            name: model.name,
            target_amount_minor: model.target_amount_minor,
            current_amount_minor: model.current_amount_minor,
            deadline: model.deadline,
            kind: GoalKind::try_from(model.kind.as_str())?,
            icon: model.icon,
            color: model.color,
            is_completed: model.is_completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(current: i64, target: i64) -> SavingGoal {
        let mut goal = SavingGoal::new(
            "u1".to_string(),
            "Emergency fund".to_string(),
            target,
            GoalKind::Monthly,
        );
        goal.current_amount_minor = current;
        goal
    }

    #[test]
    fn progress_is_rounded_and_capped() {
        assert_eq!(goal(0, 10_000).progress_percent(), 0);
        assert_eq!(goal(5_000, 10_000).progress_percent(), 50);
        assert_eq!(goal(7_490, 10_000).progress_percent(), 75);
        assert_eq!(goal(15_000, 10_000).progress_percent(), 100);
        assert_eq!(goal(100, 0).progress_percent(), 0);
    }

    #[test]
    fn at_risk_below_three_quarters() {
        assert!(goal(7_499, 10_000).is_at_risk());
        assert!(!goal(7_500, 10_000).is_at_risk());
        assert!(!goal(0, 0).is_at_risk());
    }
}
