//! The module contains the errors the ledger can throw.
//!
//! Rejection reasons are closed variants so callers can exhaustively map
//! every case to a user-facing reply:
//!
//! - [`SelfTransfer`], [`BelowMinimum`], [`AboveMaximum`] are validation
//!   rejections (no state change, not a system fault).
//! - [`InsufficientFunds`] is a business-rule rejection (no state change).
//! - [`Unavailable`] is a transient storage failure surfaced after the
//!   bounded retry budget is exhausted.
//!
//!  [`SelfTransfer`]: LedgerError::SelfTransfer
//!  [`BelowMinimum`]: LedgerError::BelowMinimum
//!  [`AboveMaximum`]: LedgerError::AboveMaximum
//!  [`InsufficientFunds`]: LedgerError::InsufficientFunds
//!  [`Unavailable`]: LedgerError::Unavailable
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::Money;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Sender and receiver are the same account")]
    SelfTransfer,
    #[error("Amount is below the minimum of {0}")]
    BelowMinimum(Money),
    #[error("Amount is above the maximum of {0}")]
    AboveMaximum(Money),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl LedgerError {
    /// Whether retrying the failed operation can succeed.
    ///
    /// Covers pool-acquire timeouts and SQLite writer-lock contention; a
    /// validation or business rejection is never retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::Database(DbErr::ConnectionAcquire(_)) => true,
            LedgerError::Database(err) => {
                let message = err.to_string();
                message.contains("database is locked")
                    || message.contains("database table is locked")
                    || message.contains("busy")
            }
            _ => false,
        }
    }

    pub(crate) fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            LedgerError::Database(err)
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        )
    }
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SelfTransfer, Self::SelfTransfer) => true,
            (Self::BelowMinimum(a), Self::BelowMinimum(b)) => a == b,
            (Self::AboveMaximum(a), Self::AboveMaximum(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidConfig(a), Self::InvalidConfig(b)) => a == b,
            (Self::Unavailable(a), Self::Unavailable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
