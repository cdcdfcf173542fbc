//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for the tip ledger:
//!
//! - `accounts`: one row per user handle, holding the balance in minor units
//! - `tip_transactions`: append-only transfer records; the unique `context`
//!   index is the at-most-once deduplication key

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Username,
    Balance,
}

#[derive(Iden)]
enum TipTransactions {
    Table,
    Id,
    FromUsername,
    ToUsername,
    AmountMinor,
    Context,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Balance)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TipTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TipTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TipTransactions::FromUsername)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TipTransactions::ToUsername)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TipTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TipTransactions::Context).string().not_null())
                    .col(
                        ColumnDef::new(TipTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tip_transactions-from_username")
                            .from(TipTransactions::Table, TipTransactions::FromUsername)
                            .to(Accounts::Table, Accounts::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tip_transactions-to_username")
                            .from(TipTransactions::Table, TipTransactions::ToUsername)
                            .to(Accounts::Table, Accounts::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-tip_transactions-context")
                    .table(TipTransactions::Table)
                    .col(TipTransactions::Context)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tip_transactions-from_username")
                    .table(TipTransactions::Table)
                    .col(TipTransactions::FromUsername)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tip_transactions-to_username")
                    .table(TipTransactions::Table)
                    .col(TipTransactions::ToUsername)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TipTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        Ok(())
    }
}
