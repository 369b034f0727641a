use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    Classifier, EngineError, ResultEngine, TransactionKind, accounts, categories, income_sources,
    saving_goals, transactions, users, util::parse_uuid,
};

use super::Engine;

/// Generates a `require_*_owned` lookup for an entity scoped by `user_id`.
///
/// A row that exists but belongs to another user is reported as not found,
/// so ownership is never leaked through error messages.
macro_rules! impl_require_owned {
    ($require_fn:ident, $entity:path, $model:path, $user_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            target_id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(target_id.to_string())
                .filter($user_col.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(
        require_account_owned,
        accounts::Entity,
        accounts::Model,
        accounts::Column::UserId,
        "account"
    );

    impl_require_owned!(
        require_category_owned,
        categories::Entity,
        categories::Model,
        categories::Column::UserId,
        "category"
    );

    impl_require_owned!(
        require_source_owned,
        income_sources::Entity,
        income_sources::Model,
        income_sources::Column::UserId,
        "income source"
    );

    impl_require_owned!(
        require_goal_owned,
        saving_goals::Entity,
        saving_goals::Model,
        saving_goals::Column::UserId,
        "saving goal"
    );

    impl_require_owned!(
        require_transaction_owned,
        transactions::Entity,
        transactions::Model,
        transactions::Column::UserId,
        "transaction"
    );

    /// Look up the classifier for a transaction kind: a category for
    /// expenses, an income source for incomes. Both are scoped by owner.
    pub(super) async fn require_classifier_owned(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        kind: TransactionKind,
        classifier_id: Uuid,
    ) -> ResultEngine<Classifier> {
        match kind {
            TransactionKind::Expense => {
                let model = self.require_category_owned(db, user_id, classifier_id).await?;
                Ok(Classifier {
                    id: parse_uuid(&model.id, "category")?,
                    name: model.name,
                    icon: model.icon,
                    color: model.color,
                })
            }
            TransactionKind::Income => {
                let model = self.require_source_owned(db, user_id, classifier_id).await?;
                Ok(Classifier {
                    id: parse_uuid(&model.id, "income source")?,
                    name: model.name,
                    icon: model.icon,
                    color: model.color,
                })
            }
        }
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::NotFound("user".to_string()));
        }
        Ok(())
    }
}
