//! Transaction writes: record, amend, remove.
//!
//! Every operation here pairs the transaction-row change with the matching
//! account balance adjustment inside one database transaction. If any step
//! fails, the whole unit rolls back and neither side is visible.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    Account, AmendTransactionCmd, RecordTransactionCmd, ResultEngine, Transaction,
    TransactionDetail, TransactionKind, transactions,
    util::{ensure_positive_amount, normalize_optional_text},
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Record a new income or expense.
    ///
    /// The row insert and the account balance adjustment commit together:
    /// `+amount` for income, `-amount` for expense.
    pub async fn record_transaction(
        &self,
        cmd: RecordTransactionCmd,
    ) -> ResultEngine<TransactionDetail> {
        with_tx!(self, |db_tx| {
            self.require_account_owned(&db_tx, &cmd.user_id, cmd.account_id)
                .await?;
            let classifier = self
                .require_classifier_owned(&db_tx, &cmd.user_id, cmd.kind, cmd.classifier_id)
                .await?;

            let mut tx = Transaction::new(
                cmd.user_id.clone(),
                cmd.kind,
                cmd.amount_minor,
                cmd.occurred_at,
                cmd.account_id,
                cmd.classifier_id,
                Utc::now(),
            )?;
            tx.description = normalize_optional_text(cmd.description);
            tx.notes = normalize_optional_text(cmd.notes);
            tx.merchant = match cmd.kind {
                TransactionKind::Expense => normalize_optional_text(cmd.merchant),
                TransactionKind::Income => None,
            };

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            self.adjust_balance(&db_tx, &cmd.user_id, tx.account_id, tx.signed_amount())
                .await?;

            let account = self
                .fetch_account(&db_tx, &cmd.user_id, tx.account_id)
                .await?;

            info!(
                transaction_id = %tx.id,
                user_id = %tx.user_id,
                kind = tx.kind.as_str(),
                amount_minor = tx.amount_minor,
                "transaction recorded"
            );
            Ok(TransactionDetail {
                transaction: tx,
                account,
                classifier,
            })
        })
    }

    /// Amend an existing transaction.
    ///
    /// Balance reconciliation takes exactly one of two branches:
    ///
    /// - account switch: the old account is refunded the full old effect and
    ///   the new account receives the full new effect;
    /// - same account: a single net delta (`new - old` signed effect) is
    ///   applied, so an unchanged amount touches nothing.
    ///
    /// The kind is immutable; removing and re-recording is the way to flip
    /// an expense into an income.
    pub async fn amend_transaction(
        &self,
        cmd: AmendTransactionCmd,
    ) -> ResultEngine<TransactionDetail> {
        if let Some(amount_minor) = cmd.amount_minor {
            ensure_positive_amount(amount_minor, "amount_minor")?;
        }

        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_owned(&db_tx, &cmd.user_id, cmd.transaction_id)
                .await?;
            let old = Transaction::try_from(model.clone())?;

            let new_amount = cmd.amount_minor.unwrap_or(old.amount_minor);
            let new_account_id = cmd.account_id.unwrap_or(old.account_id);
            let new_classifier_id = cmd.classifier_id.unwrap_or(old.classifier_id);

            if new_account_id != old.account_id {
                self.require_account_owned(&db_tx, &cmd.user_id, new_account_id)
                    .await?;
                self.adjust_balance(
                    &db_tx,
                    &cmd.user_id,
                    old.account_id,
                    -old.signed_amount(),
                )
                .await?;
                self.adjust_balance(
                    &db_tx,
                    &cmd.user_id,
                    new_account_id,
                    old.kind.signed_amount(new_amount),
                )
                .await?;
            } else {
                let delta = old.kind.signed_amount(new_amount) - old.signed_amount();
                self.adjust_balance(&db_tx, &cmd.user_id, old.account_id, delta)
                    .await?;
            }

            let classifier = self
                .require_classifier_owned(&db_tx, &cmd.user_id, old.kind, new_classifier_id)
                .await?;

            let mut active: transactions::ActiveModel = model.into();
            active.amount_minor = ActiveValue::Set(new_amount);
            active.account_id = ActiveValue::Set(new_account_id.to_string());
            match old.kind {
                TransactionKind::Expense => {
                    active.category_id = ActiveValue::Set(Some(new_classifier_id.to_string()));
                }
                TransactionKind::Income => {
                    active.source_id = ActiveValue::Set(Some(new_classifier_id.to_string()));
                }
            }
            if let Some(occurred_at) = cmd.occurred_at {
                active.occurred_at = ActiveValue::Set(occurred_at);
            }
            if cmd.description.is_some() {
                active.description = ActiveValue::Set(normalize_optional_text(cmd.description));
            }
            if cmd.notes.is_some() {
                active.notes = ActiveValue::Set(normalize_optional_text(cmd.notes));
            }
            if cmd.merchant.is_some() && old.kind == TransactionKind::Expense {
                active.merchant = ActiveValue::Set(normalize_optional_text(cmd.merchant));
            }
            let model = active.update(&db_tx).await?;
            let tx = Transaction::try_from(model)?;

            let account = self
                .fetch_account(&db_tx, &cmd.user_id, tx.account_id)
                .await?;

            info!(
                transaction_id = %tx.id,
                user_id = %tx.user_id,
                amount_minor = tx.amount_minor,
                "transaction amended"
            );
            Ok(TransactionDetail {
                transaction: tx,
                account,
                classifier,
            })
        })
    }

    /// Remove a transaction, reversing its balance effect.
    ///
    /// Removing an expense credits the account back; removing an income
    /// debits it. Row delete and reversal commit together.
    pub async fn remove_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_owned(&db_tx, user_id, transaction_id)
                .await?;
            let tx = Transaction::try_from(model.clone())?;

            transactions::ActiveModel::from(model).delete(&db_tx).await?;
            self.adjust_balance(&db_tx, user_id, tx.account_id, -tx.signed_amount())
                .await?;

            info!(
                transaction_id = %transaction_id,
                user_id = %user_id,
                "transaction removed"
            );
            Ok(())
        })
    }

    /// Fetch one transaction with its account and classifier.
    pub async fn transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<TransactionDetail> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_owned(&db_tx, user_id, transaction_id)
                .await?;
            let tx = Transaction::try_from(model)?;
            let account = self.fetch_account(&db_tx, user_id, tx.account_id).await?;
            let classifier = self
                .require_classifier_owned(&db_tx, user_id, tx.kind, tx.classifier_id)
                .await?;
            Ok(TransactionDetail {
                transaction: tx,
                account,
                classifier,
            })
        })
    }

    async fn fetch_account(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        account_id: Uuid,
    ) -> ResultEngine<Account> {
        let model = self.require_account_owned(db, user_id, account_id).await?;
        Account::try_from(model)
    }
}

#[cfg(test)]
mod tests {
    use crate::TransactionKind;

    #[test]
    fn signed_amount_follows_kind() {
        assert_eq!(TransactionKind::Income.signed_amount(2_500), 2_500);
        assert_eq!(TransactionKind::Expense.signed_amount(2_500), -2_500);
    }

    #[test]
    fn same_account_amend_is_a_single_delta() {
        // Expense 80.00 amended to 50.00 must credit the account 30.00.
        let old = TransactionKind::Expense.signed_amount(8_000);
        let new = TransactionKind::Expense.signed_amount(5_000);
        assert_eq!(new - old, 3_000);
    }
}
