//! Ledger thresholds, loaded once at startup and passed into the builder
//! as an immutable value.

use crate::{LedgerError, Money, ResultLedger};

/// Transfer thresholds and the grant given to every new account.
///
/// All three values are validated at construction: each must be strictly
/// positive and `min_tip <= max_tip`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    initial_grant: Money,
    min_tip: Money,
    max_tip: Money,
}

impl LedgerConfig {
    pub fn new(initial_grant: Money, min_tip: Money, max_tip: Money) -> ResultLedger<Self> {
        if !initial_grant.is_positive() {
            return Err(LedgerError::InvalidConfig(
                "initial_grant must be > 0".to_string(),
            ));
        }
        if !min_tip.is_positive() {
            return Err(LedgerError::InvalidConfig(
                "min_tip must be > 0".to_string(),
            ));
        }
        if !max_tip.is_positive() {
            return Err(LedgerError::InvalidConfig(
                "max_tip must be > 0".to_string(),
            ));
        }
        if min_tip > max_tip {
            return Err(LedgerError::InvalidConfig(
                "min_tip must be <= max_tip".to_string(),
            ));
        }
        Ok(Self {
            initial_grant,
            min_tip,
            max_tip,
        })
    }

    /// Balance granted to an account when it is first created.
    #[must_use]
    pub const fn initial_grant(&self) -> Money {
        self.initial_grant
    }

    /// Smallest transferable amount.
    #[must_use]
    pub const fn min_tip(&self) -> Money {
        self.min_tip
    }

    /// Largest transferable amount.
    #[must_use]
    pub const fn max_tip(&self) -> Money {
        self.max_tip
    }
}

impl Default for LedgerConfig {
    /// 20.00 starting grant, tips between 0.10 and 10.00.
    fn default() -> Self {
        Self {
            initial_grant: Money::new(20_00),
            min_tip: Money::new(10),
            max_tip: Money::new(10_00),
        }
    }
}
