//! Account ledger and transfer engine.
//!
//! The ledger owns the consistency of balances: accounts are created once
//! with an initial grant, transfers move value atomically between two
//! accounts while recording an append-only transaction, and balances can
//! never go negative or be double-spent under concurrent callers.
//!
//! The entry point is [`Ledger`], built from a SeaORM
//! [`DatabaseConnection`] and a validated [`LedgerConfig`]:
//!
//! ```rust,no_run
//! # async fn build(db: sea_orm::DatabaseConnection) -> Result<(), ledger::LedgerError> {
//! use ledger::{Ledger, LedgerConfig};
//!
//! let ledger = Ledger::builder()
//!     .database(db)
//!     .config(LedgerConfig::default())
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub use accounts::Account;
pub use commands::SendTipCmd;
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use money::Money;
pub use ops::{Ledger, LedgerBuilder, TipReceipt};
pub use transactions::TipTransaction;

mod accounts;
mod commands;
mod config;
mod error;
mod money;
mod ops;
mod transactions;

type ResultLedger<T> = Result<T, LedgerError>;
