use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    Account, CreateAccountCmd, EngineError, ResultEngine, UpdateAccountCmd, accounts, transactions,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Apply a signed balance delta to an account as a single conditional
    /// UPDATE.
    ///
    /// The increment happens in the database, never read-modify-write in
    /// memory, so concurrent writers compose instead of clobbering each
    /// other. Zero rows affected means the account vanished since it was
    /// checked; the caller's transaction then rolls back.
    pub(super) async fn adjust_balance(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        account_id: Uuid,
        delta_minor: i64,
    ) -> ResultEngine<()> {
        if delta_minor == 0 {
            return Ok(());
        }
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(delta_minor),
            )
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("account".to_string()));
        }
        Ok(())
    }

    /// Create an account.
    ///
    /// The first account a user creates becomes the default automatically;
    /// an explicit `is_default` also demotes existing siblings, in the same
    /// transaction as the insert.
    pub async fn create_account(&self, cmd: CreateAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_name(&cmd.name, "account name")?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &cmd.user_id).await?;

            let existing = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(cmd.user_id.clone()))
                .count(&db_tx)
                .await?;

            let mut account = Account::new(
                cmd.user_id.clone(),
                name,
                cmd.kind,
                cmd.balance_minor,
                Utc::now(),
            );
            account.bank_name = normalize_optional_text(cmd.bank_name);
            account.account_number = normalize_optional_text(cmd.account_number);
            account.icon = cmd.icon;
            account.color = cmd.color;
            account.is_default = cmd.is_default || existing == 0;

            if account.is_default && existing > 0 {
                self.clear_default_flags(&db_tx, &cmd.user_id, None).await?;
            }

            accounts::ActiveModel::from(&account).insert(&db_tx).await?;

            info!(account_id = %account.id, user_id = %account.user_id, "account created");
            Ok(account)
        })
    }

    /// Update an account's descriptive fields or override its balance.
    ///
    /// A balance override is taken as-is: it becomes the new baseline and is
    /// not reconciled against existing transactions.
    pub async fn update_account(&self, cmd: UpdateAccountCmd) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, &cmd.user_id, cmd.account_id)
                .await?;

            let mut active: accounts::ActiveModel = model.into();
            if let Some(name) = &cmd.name {
                active.name = ActiveValue::Set(normalize_required_name(name, "account name")?);
            }
            if let Some(kind) = cmd.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(balance_minor) = cmd.balance_minor {
                active.balance_minor = ActiveValue::Set(balance_minor);
            }
            if cmd.bank_name.is_some() {
                active.bank_name = ActiveValue::Set(normalize_optional_text(cmd.bank_name));
            }
            if cmd.account_number.is_some() {
                active.account_number =
                    ActiveValue::Set(normalize_optional_text(cmd.account_number));
            }
            if let Some(icon) = cmd.icon {
                active.icon = ActiveValue::Set(Some(icon));
            }
            if let Some(color) = cmd.color {
                active.color = ActiveValue::Set(Some(color));
            }

            let model = active.update(&db_tx).await?;
            Account::try_from(model)
        })
    }

    /// Delete an account.
    ///
    /// Deletion is rejected while transactions still reference the account;
    /// removing them first (reconciling each balance effect) is the only
    /// supported path.
    pub async fn delete_account(&self, user_id: &str, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, user_id, account_id)
                .await?;

            let referenced = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id.to_string()))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::Conflict(format!(
                    "account has {referenced} transactions"
                )));
            }

            let was_default = model.is_default;
            accounts::ActiveModel::from(model).delete(&db_tx).await?;

            // Promote the oldest remaining account so a default always exists
            // while the user has any account at all.
            if was_default {
                let next = accounts::Entity::find()
                    .filter(accounts::Column::UserId.eq(user_id.to_string()))
                    .order_by_asc(accounts::Column::CreatedAt)
                    .one(&db_tx)
                    .await?;
                if let Some(next) = next {
                    let mut active: accounts::ActiveModel = next.into();
                    active.is_default = ActiveValue::Set(true);
                    active.update(&db_tx).await?;
                }
            }

            info!(account_id = %account_id, user_id = %user_id, "account deleted");
            Ok(())
        })
    }

    /// Mark one account as the default, demoting every sibling.
    ///
    /// Demotion and promotion commit together, so exactly one default
    /// survives no matter how calls interleave.
    pub async fn set_default_account(
        &self,
        user_id: &str,
        account_id: Uuid,
    ) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            self.require_account_owned(&db_tx, user_id, account_id)
                .await?;

            self.clear_default_flags(&db_tx, user_id, Some(account_id))
                .await?;

            let result = accounts::Entity::update_many()
                .col_expr(accounts::Column::IsDefault, Expr::value(true))
                .filter(accounts::Column::Id.eq(account_id.to_string()))
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::NotFound("account".to_string()));
            }

            let model = self
                .require_account_owned(&db_tx, user_id, account_id)
                .await?;
            Account::try_from(model)
        })
    }

    async fn clear_default_flags(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = accounts::Entity::update_many()
            .col_expr(accounts::Column::IsDefault, Expr::value(false))
            .filter(accounts::Column::UserId.eq(user_id.to_string()));
        if let Some(except) = except {
            query = query.filter(accounts::Column::Id.ne(except.to_string()));
        }
        query.exec(db).await?;
        Ok(())
    }

    /// Fetch one account by id.
    pub async fn account(&self, user_id: &str, account_id: Uuid) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, user_id, account_id)
                .await?;
            Account::try_from(model)
        })
    }

    /// List the user's accounts, oldest first.
    pub async fn list_accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(accounts::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }
}
