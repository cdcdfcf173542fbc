//! Transaction primitives.
//!
//! A `TipTransaction` is the append-only record of one completed transfer:
//! exactly one `-amount`/`+amount` balance adjustment pair. Rows are never
//! mutated or deleted, and the `context` column carries the originating
//! message reference used for audit and at-most-once deduplication.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{LedgerError, Money, ResultLedger};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TipTransaction {
    pub id: Uuid,
    pub from_username: String,
    pub to_username: String,
    pub amount: Money,
    pub context: String,
    pub created_at: DateTime<Utc>,
}

impl TipTransaction {
    pub fn new(
        from_username: String,
        to_username: String,
        amount: Money,
        context: String,
    ) -> ResultLedger<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            from_username,
            to_username,
            amount,
            context,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "tip_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_username: String,
    pub to_username: String,
    pub amount_minor: i64,
    pub context: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TipTransaction> for ActiveModel {
    fn from(tx: &TipTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            from_username: ActiveValue::Set(tx.from_username.clone()),
            to_username: ActiveValue::Set(tx.to_username.clone()),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            context: ActiveValue::Set(tx.context.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for TipTransaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("transaction not exists".to_string()))?,
            from_username: model.from_username,
            to_username: model.to_username,
            amount: Money::new(model.amount_minor),
            context: model.context,
            created_at: model.created_at,
        })
    }
}
