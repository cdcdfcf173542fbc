//! Command structs for ledger write operations.
//!
//! These types group parameters for transfers, keeping call sites readable
//! and avoiding long argument lists.

use crate::Money;

/// Transfer `amount` from `from_user` to `to_user`.
///
/// `context` is the opaque reference to the originating message; the store
/// deduplicates on it, so retrying the same command never double-applies.
#[derive(Clone, Debug)]
pub struct SendTipCmd {
    pub from_user: String,
    pub to_user: String,
    pub amount: Money,
    pub context: String,
}

impl SendTipCmd {
    #[must_use]
    pub fn new(
        from_user: impl Into<String>,
        to_user: impl Into<String>,
        amount: Money,
        context: impl Into<String>,
    ) -> Self {
        Self {
            from_user: from_user.into(),
            to_user: to_user.into(),
            amount,
            context: context.into(),
        }
    }
}
