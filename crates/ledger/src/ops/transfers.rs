use sea_orm::{ConnectionTrait, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    LedgerError, Money, ResultLedger, SendTipCmd, TipTransaction, accounts, transactions,
};

use super::{Ledger, RETRY_BASE_DELAY, STORE_ATTEMPTS, with_tx};

/// Outcome of a committed transfer.
///
/// The totals are informational post-commit reads for reply formatting;
/// they are not part of the atomic guarantee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TipReceipt {
    pub transaction_id: Uuid,
    pub total_sent: Money,
    pub total_received: Money,
}

impl Ledger {
    /// Validate and execute a transfer.
    ///
    /// Validation short-circuits in order: self-transfer, below minimum,
    /// above maximum; only then does the store get involved. No rejection
    /// path produces any state change.
    ///
    /// A command whose `context` already committed is replayed
    /// idempotently: the original transaction id comes back and no money
    /// moves again.
    pub async fn send_tip(&self, cmd: SendTipCmd) -> ResultLedger<TipReceipt> {
        if cmd.from_user == cmd.to_user {
            return Err(LedgerError::SelfTransfer);
        }
        if cmd.amount < self.config.min_tip() {
            return Err(LedgerError::BelowMinimum(self.config.min_tip()));
        }
        if cmd.amount > self.config.max_tip() {
            return Err(LedgerError::AboveMaximum(self.config.max_tip()));
        }

        let mut attempt = 0;
        let transaction_id = loop {
            attempt += 1;
            match self.apply_transfer(&cmd).await {
                Ok(id) => break id,
                Err(err) if err.is_unique_violation() => {
                    // Lost a duplicate-context race after our dedup check;
                    // the earlier commit stands.
                    match find_by_context(&self.database, &cmd.context).await? {
                        Some(id) => break id,
                        None => return Err(err),
                    }
                }
                Err(err) if err.is_retryable() && attempt < STORE_ATTEMPTS => {
                    tracing::warn!(
                        from = %cmd.from_user,
                        to = %cmd.to_user,
                        attempt,
                        "transfer hit storage contention, retrying: {err}"
                    );
                    tokio::time::sleep(RETRY_BASE_DELAY * attempt).await;
                }
                Err(err) if err.is_retryable() => {
                    return Err(LedgerError::Unavailable(err.to_string()));
                }
                Err(err) => return Err(err),
            }
        };

        let total_sent = self.total_sent(&cmd.from_user).await?;
        let total_received = self.total_received(&cmd.to_user).await?;
        Ok(TipReceipt {
            transaction_id,
            total_sent,
            total_received,
        })
    }

    /// One atomic unit: dedup check, conditional debit, credit, record.
    /// Either all effects commit or the transaction rolls back on drop.
    async fn apply_transfer(&self, cmd: &SendTipCmd) -> ResultLedger<Uuid> {
        let amount_minor = cmd.amount.minor();
        with_tx!(self, |db_tx| {
            if let Some(id) = find_by_context(&db_tx, &cmd.context).await? {
                return Ok(id);
            }

            // Funds check and debit are one conditional statement, so two
            // concurrent transfers from the same account cannot both
            // observe a sufficient balance.
            let debit = accounts::Entity::update_many()
                .col_expr(
                    accounts::Column::Balance,
                    Expr::col(accounts::Column::Balance).sub(amount_minor),
                )
                .filter(accounts::Column::Username.eq(cmd.from_user.as_str()))
                .filter(accounts::Column::Balance.gte(amount_minor))
                .exec(&db_tx)
                .await?;
            if debit.rows_affected == 0 {
                let sender = accounts::Entity::find_by_id(cmd.from_user.as_str())
                    .one(&db_tx)
                    .await?;
                return Err(match sender {
                    Some(_) => LedgerError::InsufficientFunds(cmd.from_user.clone()),
                    None => LedgerError::KeyNotFound(cmd.from_user.clone()),
                });
            }

            let credit = accounts::Entity::update_many()
                .col_expr(
                    accounts::Column::Balance,
                    Expr::col(accounts::Column::Balance).add(amount_minor),
                )
                .filter(accounts::Column::Username.eq(cmd.to_user.as_str()))
                .exec(&db_tx)
                .await?;
            if credit.rows_affected == 0 {
                return Err(LedgerError::KeyNotFound(cmd.to_user.clone()));
            }

            let tx = TipTransaction::new(
                cmd.from_user.clone(),
                cmd.to_user.clone(),
                cmd.amount,
                cmd.context.clone(),
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx.id)
        })
    }
}

async fn find_by_context<C: ConnectionTrait>(
    conn: &C,
    context: &str,
) -> ResultLedger<Option<Uuid>> {
    let existing = transactions::Entity::find()
        .filter(transactions::Column::Context.eq(context))
        .one(conn)
        .await?;
    match existing {
        Some(model) => Uuid::parse_str(&model.id)
            .map(Some)
            .map_err(|_| LedgerError::KeyNotFound("transaction not exists".to_string())),
        None => Ok(None),
    }
}
