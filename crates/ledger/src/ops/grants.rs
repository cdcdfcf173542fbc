use sea_orm::{TransactionTrait, prelude::*, sea_query::Expr};

use crate::{LedgerError, Money, ResultLedger, accounts};

use super::{Ledger, with_tx};

impl Ledger {
    /// Administrative top-off: raises every balance below the initial
    /// grant back to it. Returns how many accounts were topped off.
    ///
    /// This and [`Ledger::grant`] are the only operations that create
    /// value; transfers only move it.
    pub async fn top_off(&self) -> ResultLedger<u64> {
        let grant = self.config.initial_grant().minor();
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Balance, Expr::value(grant))
            .filter(accounts::Column::Balance.lt(grant))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    /// Administrative grant: add `amount` to one account's balance.
    /// Returns the new balance.
    pub async fn grant(&self, username: &str, amount: Money) -> ResultLedger<Money> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "grant amount must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let credited = accounts::Entity::update_many()
                .col_expr(
                    accounts::Column::Balance,
                    Expr::col(accounts::Column::Balance).add(amount.minor()),
                )
                .filter(accounts::Column::Username.eq(username))
                .exec(&db_tx)
                .await?;
            if credited.rows_affected == 0 {
                return Err(LedgerError::KeyNotFound(username.to_string()));
            }
            let model = accounts::Entity::find_by_id(username)
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::KeyNotFound(username.to_string()))?;
            Ok(Money::new(model.balance))
        })
    }
}
