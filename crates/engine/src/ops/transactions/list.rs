use std::collections::HashMap;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Account, Classifier, EngineError, ResultEngine, Transaction, TransactionDetail,
    TransactionKind, accounts, categories, income_sources, transactions, util::parse_uuid,
};

use super::super::{Engine, with_tx};

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// If present, only transactions of this kind are returned.
    pub kind: Option<TransactionKind>,
    /// If present, only transactions against this account are returned.
    pub account_id: Option<Uuid>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from >= to {
            return Err(EngineError::Validation(
                "invalid range: from must be < to".to_string(),
            ));
        }
    }
    Ok(())
}

/// One page of transactions, newest first, with an opaque cursor for the
/// next page.
#[derive(Clone, Debug)]
pub struct TransactionPage {
    pub items: Vec<TransactionDetail>,
    pub next_cursor: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    occurred_at: DateTime<Utc>,
    transaction_id: String,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::Validation("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::Validation("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::Validation("invalid transactions cursor".to_string()))
    }
}

impl Engine {
    /// Lists the user's transactions, with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(occurred_at DESC, transaction_id
    /// DESC)`. Each item carries the referenced account and classifier,
    /// resolved in bulk.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultEngine<TransactionPage> {
        validate_list_filter(filter)?;

        with_tx!(self, |db_tx| {
            let limit_plus_one = limit.saturating_add(1);
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = TransactionsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::OccurredAt.lt(cursor.occurred_at))
                        .add(
                            Condition::all()
                                .add(transactions::Column::OccurredAt.eq(cursor.occurred_at))
                                .add(transactions::Column::Id.lt(cursor.transaction_id)),
                        ),
                );
            }
            if let Some(from) = filter.from {
                query = query.filter(transactions::Column::OccurredAt.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(transactions::Column::OccurredAt.lt(to));
            }
            if let Some(kind) = filter.kind {
                query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
            }
            if let Some(account_id) = filter.account_id {
                query = query.filter(transactions::Column::AccountId.eq(account_id.to_string()));
            }

            let rows: Vec<transactions::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut txs: Vec<Transaction> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                txs.push(Transaction::try_from(model)?);
            }

            let accounts = self.load_accounts_by_id(&db_tx, user_id, &txs).await?;
            let classifiers = self.load_classifiers_by_id(&db_tx, user_id, &txs).await?;

            let mut items = Vec::with_capacity(txs.len());
            for tx in txs {
                let account = accounts
                    .get(&tx.account_id)
                    .cloned()
                    .ok_or_else(|| EngineError::NotFound("account".to_string()))?;
                let classifier = classifiers
                    .get(&tx.classifier_id)
                    .cloned()
                    .ok_or_else(|| EngineError::NotFound("classifier".to_string()))?;
                items.push(TransactionDetail {
                    transaction: tx,
                    account,
                    classifier,
                });
            }

            let next_cursor = items.last().map(|detail| TransactionsCursor {
                occurred_at: detail.transaction.occurred_at,
                transaction_id: detail.transaction.id.to_string(),
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok(TransactionPage { items, next_cursor })
        })
    }

    async fn load_accounts_by_id(
        &self,
        db: &sea_orm::DatabaseTransaction,
        user_id: &str,
        txs: &[Transaction],
    ) -> ResultEngine<HashMap<Uuid, Account>> {
        let ids: Vec<String> = txs.iter().map(|tx| tx.account_id.to_string()).collect();
        let mut out = HashMap::new();
        if ids.is_empty() {
            return Ok(out);
        }
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .filter(accounts::Column::Id.is_in(ids))
            .all(db)
            .await?;
        for model in models {
            let account = Account::try_from(model)?;
            out.insert(account.id, account);
        }
        Ok(out)
    }

    async fn load_classifiers_by_id(
        &self,
        db: &sea_orm::DatabaseTransaction,
        user_id: &str,
        txs: &[Transaction],
    ) -> ResultEngine<HashMap<Uuid, Classifier>> {
        let mut category_ids: Vec<String> = Vec::new();
        let mut source_ids: Vec<String> = Vec::new();
        for tx in txs {
            match tx.kind {
                TransactionKind::Expense => category_ids.push(tx.classifier_id.to_string()),
                TransactionKind::Income => source_ids.push(tx.classifier_id.to_string()),
            }
        }

        let mut out = HashMap::new();
        if !category_ids.is_empty() {
            let models = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .filter(categories::Column::Id.is_in(category_ids))
                .all(db)
                .await?;
            for model in models {
                let id = parse_uuid(&model.id, "category")?;
                out.insert(
                    id,
                    Classifier {
                        id,
                        name: model.name,
                        icon: model.icon,
                        color: model.color,
                    },
                );
            }
        }
        if !source_ids.is_empty() {
            let models = income_sources::Entity::find()
                .filter(income_sources::Column::UserId.eq(user_id.to_string()))
                .filter(income_sources::Column::Id.is_in(source_ids))
                .all(db)
                .await?;
            for model in models {
                let id = parse_uuid(&model.id, "income source")?;
                out.insert(
                    id,
                    Classifier {
                        id,
                        name: model.name,
                        icon: model.icon,
                        color: model.color,
                    },
                );
            }
        }
        Ok(out)
    }
}
