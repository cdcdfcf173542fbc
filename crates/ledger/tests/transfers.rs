use std::sync::Arc;

use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use ledger::{Ledger, LedgerConfig, LedgerError, Money, SendTipCmd};
use migration::MigratorTrait;

async fn ledger_with_db(config: LedgerConfig) -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder()
        .database(db)
        .config(config)
        .build()
        .await
        .unwrap()
}

async fn default_ledger() -> Ledger {
    ledger_with_db(LedgerConfig::default()).await
}

// Concurrent tests need a real file so every pooled connection sees the
// same database.
async fn ledger_with_file_db(config: LedgerConfig) -> (Ledger, DatabaseConnection) {
    let root =
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("ledger_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder()
        .database(db.clone())
        .config(config)
        .build()
        .await
        .unwrap();
    (ledger, db)
}

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

fn tip(from: &str, to: &str, amount: &str, context: &str) -> SendTipCmd {
    SendTipCmd::new(from, to, money(amount), context)
}

#[tokio::test]
async fn ensure_account_creates_with_initial_grant() {
    let ledger = default_ledger().await;

    let account = ledger.ensure_account("alice").await.unwrap();
    assert_eq!(account.username, "alice");
    assert_eq!(account.balance, money("20"));
}

#[tokio::test]
async fn ensure_account_is_idempotent() {
    let ledger = default_ledger().await;

    ledger.ensure_account("alice").await.unwrap();
    ledger.ensure_account("bob").await.unwrap();
    ledger.send_tip(tip("alice", "bob", "2", "t1_a")).await.unwrap();

    // A later ensure must observe the spent balance, not re-grant.
    let account = ledger.ensure_account("alice").await.unwrap();
    assert_eq!(account.balance, money("18"));
}

#[tokio::test]
async fn create_account_rejects_duplicates() {
    let ledger = default_ledger().await;

    ledger.create_account("alice", money("20")).await.unwrap();
    let err = ledger.create_account("alice", money("20")).await.unwrap_err();
    assert_eq!(err, LedgerError::ExistingKey("alice".to_string()));
}

#[tokio::test]
async fn balance_of_unknown_account_is_not_found() {
    let ledger = default_ledger().await;

    let err = ledger.balance("ghost").await.unwrap_err();
    assert_eq!(err, LedgerError::KeyNotFound("ghost".to_string()));
}

#[tokio::test]
async fn transfer_moves_value_and_records_one_transaction() {
    let ledger = default_ledger().await;
    ledger.ensure_account("alice").await.unwrap();
    ledger.ensure_account("bob").await.unwrap();

    let receipt = ledger.send_tip(tip("alice", "bob", "2", "t1_a")).await.unwrap();
    assert_eq!(receipt.total_sent, money("2"));
    assert_eq!(receipt.total_received, money("2"));

    assert_eq!(ledger.balance("alice").await.unwrap(), money("18"));
    assert_eq!(ledger.balance("bob").await.unwrap(), money("22"));
    assert_eq!(ledger.total_sent("alice").await.unwrap(), money("2"));
    assert_eq!(ledger.total_received("bob").await.unwrap(), money("2"));
    assert_eq!(ledger.total_sent("bob").await.unwrap(), Money::ZERO);
    assert_eq!(ledger.total_received("alice").await.unwrap(), Money::ZERO);

    let history = ledger.history("alice", 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from_username, "alice");
    assert_eq!(history[0].to_username, "bob");
    assert_eq!(history[0].amount, money("2"));
    assert_eq!(history[0].context, "t1_a");
}

#[tokio::test]
async fn transfers_conserve_total_value() {
    let ledger = default_ledger().await;
    for user in ["alice", "bob", "carol"] {
        ledger.ensure_account(user).await.unwrap();
    }

    ledger.send_tip(tip("alice", "bob", "5", "t1_a")).await.unwrap();
    ledger.send_tip(tip("bob", "carol", "7.5", "t1_b")).await.unwrap();
    ledger.send_tip(tip("carol", "alice", "0.1", "t1_c")).await.unwrap();

    let total = ledger.balance("alice").await.unwrap()
        + ledger.balance("bob").await.unwrap()
        + ledger.balance("carol").await.unwrap();
    assert_eq!(total, money("60"));
}

#[tokio::test]
async fn self_transfer_is_rejected_regardless_of_amount() {
    let ledger = default_ledger().await;
    ledger.ensure_account("alice").await.unwrap();

    let err = ledger.send_tip(tip("alice", "alice", "1", "t1_a")).await.unwrap_err();
    assert_eq!(err, LedgerError::SelfTransfer);
    let err = ledger.send_tip(tip("alice", "alice", "999", "t1_b")).await.unwrap_err();
    assert_eq!(err, LedgerError::SelfTransfer);

    assert_eq!(ledger.balance("alice").await.unwrap(), money("20"));
    assert!(ledger.history("alice", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn bounds_are_enforced_without_state_change() {
    let ledger = default_ledger().await;
    ledger.ensure_account("alice").await.unwrap();
    ledger.ensure_account("bob").await.unwrap();

    let err = ledger.send_tip(tip("alice", "bob", "0.05", "t1_a")).await.unwrap_err();
    assert_eq!(err, LedgerError::BelowMinimum(money("0.1")));

    let err = ledger.send_tip(tip("alice", "bob", "11", "t1_b")).await.unwrap_err();
    assert_eq!(err, LedgerError::AboveMaximum(money("10")));

    assert_eq!(ledger.balance("alice").await.unwrap(), money("20"));
    assert_eq!(ledger.balance("bob").await.unwrap(), money("20"));
    assert!(ledger.history("alice", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn insufficient_funds_leaves_balances_untouched() {
    let config = LedgerConfig::new(money("5"), money("0.1"), money("10")).unwrap();
    let ledger = ledger_with_db(config).await;
    ledger.ensure_account("alice").await.unwrap();
    ledger.ensure_account("bob").await.unwrap();

    ledger.send_tip(tip("alice", "bob", "3", "t1_a")).await.unwrap();
    let err = ledger.send_tip(tip("alice", "bob", "3", "t1_b")).await.unwrap_err();
    assert_eq!(err, LedgerError::InsufficientFunds("alice".to_string()));

    assert_eq!(ledger.balance("alice").await.unwrap(), money("2"));
    assert_eq!(ledger.balance("bob").await.unwrap(), money("8"));
    assert_eq!(ledger.history("bob", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn transfer_from_unknown_account_is_not_found() {
    let ledger = default_ledger().await;
    ledger.ensure_account("bob").await.unwrap();

    let err = ledger.send_tip(tip("ghost", "bob", "1", "t1_a")).await.unwrap_err();
    assert_eq!(err, LedgerError::KeyNotFound("ghost".to_string()));
    assert_eq!(ledger.balance("bob").await.unwrap(), money("20"));
}

#[tokio::test]
async fn transfer_to_unknown_account_is_not_found() {
    let ledger = default_ledger().await;
    ledger.ensure_account("alice").await.unwrap();

    let err = ledger.send_tip(tip("alice", "ghost", "1", "t1_a")).await.unwrap_err();
    assert_eq!(err, LedgerError::KeyNotFound("ghost".to_string()));
    // The debit rolled back with the rest of the unit.
    assert_eq!(ledger.balance("alice").await.unwrap(), money("20"));
}

#[tokio::test]
async fn replayed_context_does_not_double_apply() {
    let ledger = default_ledger().await;
    ledger.ensure_account("alice").await.unwrap();
    ledger.ensure_account("bob").await.unwrap();

    let first = ledger.send_tip(tip("alice", "bob", "2", "t1_a")).await.unwrap();
    let replay = ledger.send_tip(tip("alice", "bob", "2", "t1_a")).await.unwrap();

    assert_eq!(first.transaction_id, replay.transaction_id);
    assert_eq!(ledger.balance("alice").await.unwrap(), money("18"));
    assert_eq!(ledger.balance("bob").await.unwrap(), money("22"));
    assert_eq!(ledger.history("alice", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_transfers_cannot_overdraw() {
    let config = LedgerConfig::new(money("5"), money("0.1"), money("10")).unwrap();
    let (ledger, _db) = ledger_with_file_db(config).await;
    ledger.ensure_account("alice").await.unwrap();
    ledger.ensure_account("bob").await.unwrap();

    let ledger = Arc::new(ledger);
    let first = {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move { ledger.send_tip(tip("alice", "bob", "3", "t1_a")).await })
    };
    let second = {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move { ledger.send_tip(tip("alice", "bob", "3", "t1_b")).await })
    };

    let outcomes = [first.await.unwrap(), second.await.unwrap()];
    let successes = outcomes.iter().filter(|o| o.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of two 3-tips from a 5 balance may land");
    let failure = outcomes.iter().find_map(|o| o.as_ref().err()).unwrap();
    assert_eq!(*failure, LedgerError::InsufficientFunds("alice".to_string()));

    assert_eq!(ledger.balance("alice").await.unwrap(), money("2"));
    assert_eq!(ledger.balance("bob").await.unwrap(), money("8"));
}

#[tokio::test]
async fn concurrent_ensure_creates_exactly_one_account() {
    let (ledger, _db) = ledger_with_file_db(LedgerConfig::default()).await;

    let ledger = Arc::new(ledger);
    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move { ledger.ensure_account("carol").await })
        })
        .collect();
    for task in tasks {
        let account = task.await.unwrap().unwrap();
        assert_eq!(account.username, "carol");
    }

    // One grant only, no inflation from the racing creators.
    assert_eq!(ledger.balance("carol").await.unwrap(), money("20"));
}

#[tokio::test]
async fn top_off_restores_only_depleted_accounts() {
    let ledger = default_ledger().await;
    ledger.ensure_account("alice").await.unwrap();
    ledger.ensure_account("bob").await.unwrap();
    ledger.send_tip(tip("alice", "bob", "5", "t1_a")).await.unwrap();

    let topped = ledger.top_off().await.unwrap();
    assert_eq!(topped, 1);
    assert_eq!(ledger.balance("alice").await.unwrap(), money("20"));
    // Above the grant already; left alone.
    assert_eq!(ledger.balance("bob").await.unwrap(), money("25"));
}

#[tokio::test]
async fn grant_adds_to_balance() {
    let ledger = default_ledger().await;
    ledger.ensure_account("alice").await.unwrap();

    let new_balance = ledger.grant("alice", money("1.5")).await.unwrap();
    assert_eq!(new_balance, money("21.5"));

    let err = ledger.grant("ghost", money("1")).await.unwrap_err();
    assert_eq!(err, LedgerError::KeyNotFound("ghost".to_string()));
}
