//! Category and income-source maintenance.
//!
//! Classifiers are reference data: they carry no balance, so their writes
//! never touch the ledger. Deletion is refused while transactions still
//! point at them, which keeps every stored transaction resolvable.

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    Category, EngineError, IncomeSource, ResultEngine, categories, income_sources, transactions,
    util::{normalize_required_name, ensure_positive_amount},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create an expense category.
    pub async fn create_category(
        &self,
        user_id: &str,
        name: &str,
        icon: Option<String>,
        color: Option<String>,
        budget_minor: Option<i64>,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category name")?;
        if let Some(budget_minor) = budget_minor {
            ensure_positive_amount(budget_minor, "budget_minor")?;
        }

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            self.require_unique_category_name(&db_tx, user_id, &name, None)
                .await?;

            let mut category = Category::new(user_id.to_string(), name);
            category.icon = icon;
            category.color = color;
            category.budget_minor = budget_minor;

            categories::ActiveModel::from(&category).insert(&db_tx).await?;
            info!(category_id = %category.id, user_id = %user_id, "category created");
            Ok(category)
        })
    }

    /// Rename a category or change its presentation/budget.
    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: Uuid,
        name: Option<&str>,
        icon: Option<String>,
        color: Option<String>,
        budget_minor: Option<Option<i64>>,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_category_owned(&db_tx, user_id, category_id)
                .await?;

            let mut active: categories::ActiveModel = model.into();
            if let Some(name) = name {
                let name = normalize_required_name(name, "category name")?;
                self.require_unique_category_name(&db_tx, user_id, &name, Some(category_id))
                    .await?;
                active.name = ActiveValue::Set(name);
            }
            if let Some(icon) = icon {
                active.icon = ActiveValue::Set(Some(icon));
            }
            if let Some(color) = color {
                active.color = ActiveValue::Set(Some(color));
            }
            if let Some(budget_minor) = budget_minor {
                if let Some(budget_minor) = budget_minor {
                    ensure_positive_amount(budget_minor, "budget_minor")?;
                }
                active.budget_minor = ActiveValue::Set(budget_minor);
            }

            let model = active.update(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// Delete a category. Rejected while expenses still reference it.
    pub async fn delete_category(&self, user_id: &str, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_category_owned(&db_tx, user_id, category_id)
                .await?;

            let referenced = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category_id.to_string()))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::Conflict(format!(
                    "category has {referenced} transactions"
                )));
            }

            categories::ActiveModel::from(model).delete(&db_tx).await?;
            info!(category_id = %category_id, user_id = %user_id, "category deleted");
            Ok(())
        })
    }

    /// List the user's categories, sorted by name.
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Category::try_from).collect()
    }

    /// Create an income source.
    pub async fn create_income_source(
        &self,
        user_id: &str,
        name: &str,
        icon: Option<String>,
        color: Option<String>,
    ) -> ResultEngine<IncomeSource> {
        let name = normalize_required_name(name, "income source name")?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            self.require_unique_source_name(&db_tx, user_id, &name, None)
                .await?;

            let mut source = IncomeSource::new(user_id.to_string(), name);
            source.icon = icon;
            source.color = color;

            income_sources::ActiveModel::from(&source).insert(&db_tx).await?;
            info!(source_id = %source.id, user_id = %user_id, "income source created");
            Ok(source)
        })
    }

    /// Rename an income source or change its presentation.
    pub async fn update_income_source(
        &self,
        user_id: &str,
        source_id: Uuid,
        name: Option<&str>,
        icon: Option<String>,
        color: Option<String>,
    ) -> ResultEngine<IncomeSource> {
        with_tx!(self, |db_tx| {
            let model = self.require_source_owned(&db_tx, user_id, source_id).await?;

            let mut active: income_sources::ActiveModel = model.into();
            if let Some(name) = name {
                let name = normalize_required_name(name, "income source name")?;
                self.require_unique_source_name(&db_tx, user_id, &name, Some(source_id))
                    .await?;
                active.name = ActiveValue::Set(name);
            }
            if let Some(icon) = icon {
                active.icon = ActiveValue::Set(Some(icon));
            }
            if let Some(color) = color {
                active.color = ActiveValue::Set(Some(color));
            }

            let model = active.update(&db_tx).await?;
            IncomeSource::try_from(model)
        })
    }

    /// Delete an income source. Rejected while incomes still reference it.
    pub async fn delete_income_source(&self, user_id: &str, source_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_source_owned(&db_tx, user_id, source_id).await?;

            let referenced = transactions::Entity::find()
                .filter(transactions::Column::SourceId.eq(source_id.to_string()))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::Conflict(format!(
                    "income source has {referenced} transactions"
                )));
            }

            income_sources::ActiveModel::from(model).delete(&db_tx).await?;
            info!(source_id = %source_id, user_id = %user_id, "income source deleted");
            Ok(())
        })
    }

    /// List the user's income sources, sorted by name.
    pub async fn list_income_sources(&self, user_id: &str) -> ResultEngine<Vec<IncomeSource>> {
        let models = income_sources::Entity::find()
            .filter(income_sources::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(income_sources::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(IncomeSource::try_from).collect()
    }

    async fn require_unique_category_name(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .filter(categories::Column::Name.eq(name.to_string()));
        if let Some(except) = except {
            query = query.filter(categories::Column::Id.ne(except.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::Conflict(format!(
                "category '{name}' already exists"
            )));
        }
        Ok(())
    }

    async fn require_unique_source_name(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = income_sources::Entity::find()
            .filter(income_sources::Column::UserId.eq(user_id.to_string()))
            .filter(income_sources::Column::Name.eq(name.to_string()));
        if let Some(except) = except {
            query = query.filter(income_sources::Column::Id.ne(except.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::Conflict(format!(
                "income source '{name}' already exists"
            )));
        }
        Ok(())
    }
}
