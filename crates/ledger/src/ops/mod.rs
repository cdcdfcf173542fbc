use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{LedgerConfig, ResultLedger};

mod accounts;
mod grants;
mod totals;
mod transfers;

pub use transfers::TipReceipt;

/// Attempts before a retryable storage failure becomes `Unavailable`.
pub(crate) const STORE_ATTEMPTS: u32 = 3;
pub(crate) const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The account ledger: store, account manager and transfer engine in one
/// handle over a pooled database connection.
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
    config: LedgerConfig,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// The thresholds this ledger was built with.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
    config: LedgerConfig,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Pass the transfer thresholds; defaults apply when omitted.
    pub fn config(mut self, config: LedgerConfig) -> LedgerBuilder {
        self.config = config;
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
            config: self.config,
        })
    }
}
