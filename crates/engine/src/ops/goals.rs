//! Saving-goal maintenance.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    CreateGoalCmd, ResultEngine, SavingGoal, UpdateGoalCmd, saving_goals,
    util::{ensure_positive_amount, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a saving goal.
    pub async fn create_goal(&self, cmd: CreateGoalCmd) -> ResultEngine<SavingGoal> {
        let name = normalize_required_name(&cmd.name, "goal name")?;
        ensure_positive_amount(cmd.target_amount_minor, "target_amount_minor")?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &cmd.user_id).await?;

            let mut goal = SavingGoal::new(
                cmd.user_id.clone(),
                name,
                cmd.target_amount_minor,
                cmd.kind,
            );
            goal.current_amount_minor = cmd.current_amount_minor.max(0);
            goal.deadline = cmd.deadline;
            goal.icon = cmd.icon;
            goal.color = cmd.color;
            goal.is_completed = goal.current_amount_minor >= goal.target_amount_minor;

            saving_goals::ActiveModel::from(&goal).insert(&db_tx).await?;
            info!(goal_id = %goal.id, user_id = %goal.user_id, "saving goal created");
            Ok(goal)
        })
    }

    /// Update a saving goal.
    ///
    /// Completion is recomputed whenever amounts change, unless the caller
    /// sets it explicitly.
    pub async fn update_goal(&self, cmd: UpdateGoalCmd) -> ResultEngine<SavingGoal> {
        if let Some(target) = cmd.target_amount_minor {
            ensure_positive_amount(target, "target_amount_minor")?;
        }

        with_tx!(self, |db_tx| {
            let model = self
                .require_goal_owned(&db_tx, &cmd.user_id, cmd.goal_id)
                .await?;
            let mut goal = SavingGoal::try_from(model.clone())?;

            if let Some(name) = &cmd.name {
                goal.name = normalize_required_name(name, "goal name")?;
            }
            if let Some(target) = cmd.target_amount_minor {
                goal.target_amount_minor = target;
            }
            if let Some(current) = cmd.current_amount_minor {
                goal.current_amount_minor = current.max(0);
            }
            if let Some(deadline) = cmd.deadline {
                goal.deadline = Some(deadline);
            }
            if let Some(kind) = cmd.kind {
                goal.kind = kind;
            }
            if let Some(icon) = cmd.icon {
                goal.icon = Some(icon);
            }
            if let Some(color) = cmd.color {
                goal.color = Some(color);
            }
            goal.is_completed = match cmd.is_completed {
                Some(explicit) => explicit,
                None => goal.current_amount_minor >= goal.target_amount_minor,
            };

            let mut active = saving_goals::ActiveModel::from(&goal);
            active.id = ActiveValue::Unchanged(model.id);
            let model = active.update(&db_tx).await?;
            SavingGoal::try_from(model)
        })
    }

    /// Delete a saving goal.
    pub async fn delete_goal(&self, user_id: &str, goal_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal_owned(&db_tx, user_id, goal_id).await?;
            saving_goals::ActiveModel::from(model).delete(&db_tx).await?;
            info!(goal_id = %goal_id, user_id = %user_id, "saving goal deleted");
            Ok(())
        })
    }

    /// Fetch one saving goal by id.
    pub async fn goal(&self, user_id: &str, goal_id: Uuid) -> ResultEngine<SavingGoal> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal_owned(&db_tx, user_id, goal_id).await?;
            SavingGoal::try_from(model)
        })
    }

    /// List the user's saving goals, sorted by name.
    pub async fn list_goals(&self, user_id: &str) -> ResultEngine<Vec<SavingGoal>> {
        let models = saving_goals::Entity::find()
            .filter(saving_goals::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(saving_goals::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(SavingGoal::try_from).collect()
    }
}
