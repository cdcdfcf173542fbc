//! Account primitives.
//!
//! An `Account` is a ledger entry keyed by the opaque username handle the
//! messaging platform supplies. The balance is only ever mutated through
//! the atomic transfer, account creation, and the explicit top-off grant.

use sea_orm::{ActiveValue, entity::prelude::*};

use crate::Money;

/// A user account holding a tip balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub balance: Money,
}

impl Account {
    pub fn new(username: impl Into<String>, balance: Money) -> Self {
        Self {
            username: username.into(),
            balance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub balance: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            username: ActiveValue::Set(account.username.clone()),
            balance: ActiveValue::Set(account.balance.minor()),
        }
    }
}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            username: model.username,
            balance: Money::new(model.balance),
        }
    }
}
