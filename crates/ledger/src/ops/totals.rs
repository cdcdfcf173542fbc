use sea_orm::{Condition, QueryOrder, QuerySelect, prelude::*};

use crate::{Money, ResultLedger, TipTransaction, transactions};

use super::Ledger;

impl Ledger {
    /// Total amount the account has sent; `0.00` when it never sent.
    pub async fn total_sent(&self, username: &str) -> ResultLedger<Money> {
        self.sum_amount(transactions::Column::FromUsername, username)
            .await
    }

    /// Total amount the account has received; `0.00` when it never received.
    pub async fn total_received(&self, username: &str) -> ResultLedger<Money> {
        self.sum_amount(transactions::Column::ToUsername, username)
            .await
    }

    /// Most recent transfers referencing the account as sender or receiver,
    /// newest first.
    pub async fn history(&self, username: &str, limit: u64) -> ResultLedger<Vec<TipTransaction>> {
        let models = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::FromUsername.eq(username))
                    .add(transactions::Column::ToUsername.eq(username)),
            )
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(limit)
            .all(&self.database)
            .await?;
        models.into_iter().map(TipTransaction::try_from).collect()
    }

    async fn sum_amount(
        &self,
        column: transactions::Column,
        username: &str,
    ) -> ResultLedger<Money> {
        let total: Option<Option<i64>> = transactions::Entity::find()
            .select_only()
            .column_as(transactions::Column::AmountMinor.sum(), "total")
            .filter(column.eq(username))
            .into_tuple()
            .one(&self.database)
            .await?;
        Ok(Money::new(total.flatten().unwrap_or(0)))
    }
}
