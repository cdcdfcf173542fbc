use sea_orm::{TransactionTrait, prelude::*};

use crate::{Account, LedgerError, Money, ResultLedger, accounts};

use super::{Ledger, RETRY_BASE_DELAY, STORE_ATTEMPTS, with_tx};

impl Ledger {
    /// Fetch an account by username.
    pub async fn account(&self, username: &str) -> ResultLedger<Account> {
        let model = accounts::Entity::find_by_id(username)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound(username.to_string()))?;
        Ok(model.into())
    }

    /// Current balance; `KeyNotFound` when the account does not exist.
    pub async fn balance(&self, username: &str) -> ResultLedger<Money> {
        Ok(self.account(username).await?.balance)
    }

    /// Low-level creation: fails with `ExistingKey` for a known username.
    ///
    /// Most callers want [`Ledger::ensure_account`], which absorbs the
    /// duplicate case.
    pub async fn create_account(&self, username: &str, balance: Money) -> ResultLedger<Account> {
        if username.trim().is_empty() {
            return Err(LedgerError::InvalidAmount(
                "username must not be empty".to_string(),
            ));
        }
        if balance.is_negative() {
            return Err(LedgerError::InvalidAmount(
                "balance must be >= 0".to_string(),
            ));
        }
        let account = Account::new(username, balance);
        let entry = accounts::ActiveModel::from(&account);
        with_tx!(self, |db_tx| {
            let exists = accounts::Entity::find_by_id(username)
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(LedgerError::ExistingKey(username.to_string()));
            }
            entry.insert(&db_tx).await?;
            Ok(account)
        })
    }

    /// Creation-on-first-use: creates the account with the initial grant if
    /// absent, a no-op returning the existing account otherwise.
    ///
    /// Safe under concurrent calls for the same username: exactly one
    /// creation wins and the losers observe the winner's row, with the
    /// balance untouched. Storage contention between racing creators is
    /// retried a bounded number of times.
    pub async fn ensure_account(&self, username: &str) -> ResultLedger<Account> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_ensure_account(username).await {
                Ok(account) => return Ok(account),
                Err(err) if err.is_retryable() && attempt < STORE_ATTEMPTS => {
                    tracing::warn!(
                        username,
                        attempt,
                        "account creation hit storage contention, retrying: {err}"
                    );
                    tokio::time::sleep(RETRY_BASE_DELAY * attempt).await;
                }
                Err(err) if err.is_retryable() => {
                    return Err(LedgerError::Unavailable(err.to_string()));
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_ensure_account(&self, username: &str) -> ResultLedger<Account> {
        if let Some(model) = accounts::Entity::find_by_id(username)
            .one(&self.database)
            .await?
        {
            return Ok(model.into());
        }

        match self
            .create_account(username, self.config.initial_grant())
            .await
        {
            Ok(account) => Ok(account),
            // Lost the creation race: another caller inserted between our
            // read and our insert.
            Err(err) if matches!(err, LedgerError::ExistingKey(_)) || err.is_unique_violation() => {
                self.account(username).await
            }
            Err(err) => Err(err),
        }
    }
}
