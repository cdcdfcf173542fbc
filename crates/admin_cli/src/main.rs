use std::error::Error;

use clap::{Args, Parser, Subcommand};
use ledger::{Ledger, LedgerConfig, Money};
use migration::MigratorTrait;
use sea_orm::Database;

#[derive(Parser, Debug)]
#[command(name = "tipjar_admin")]
#[command(about = "Admin utilities for the tipjar ledger (accounts, grants, top-off)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tipjar.db?mode=rwc"
    )]
    database_url: String,

    /// Thresholds; keep these in sync with the bot's settings so amount
    /// validation behaves the same.
    #[arg(long, default_value = "20")]
    initial_grant: String,
    #[arg(long, default_value = "0.1")]
    min_tip: String,
    #[arg(long, default_value = "10")]
    max_tip: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    /// Add to one account's balance.
    Grant(GrantArgs),
    /// Raise every balance below the initial grant back to it.
    TopOff,
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    Show(AccountShowArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    username: String,
    /// Starting balance; defaults to the initial grant.
    #[arg(long)]
    balance: Option<String>,
}

#[derive(Args, Debug)]
struct AccountShowArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct GrantArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    amount: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    let config = LedgerConfig::new(
        cli.initial_grant.parse()?,
        cli.min_tip.parse()?,
        cli.max_tip.parse()?,
    )?;
    let ledger = Ledger::builder()
        .database(db)
        .config(config)
        .build()
        .await?;

    match cli.command {
        Command::Account(account) => match account.command {
            AccountCommand::Create(args) => {
                let balance = match args.balance {
                    Some(raw) => raw.parse::<Money>()?,
                    None => ledger.config().initial_grant(),
                };
                let account = ledger.create_account(&args.username, balance).await?;
                println!(
                    "created account {} with balance {}",
                    account.username, account.balance
                );
            }
            AccountCommand::Show(args) => {
                let account = ledger.account(&args.username).await?;
                let sent = ledger.total_sent(&args.username).await?;
                let received = ledger.total_received(&args.username).await?;
                println!("account:  {}", account.username);
                println!("balance:  {}", account.balance);
                println!("sent:     {sent}");
                println!("received: {received}");
                for tx in ledger.history(&args.username, 10).await? {
                    println!(
                        "  {} {} -> {} {} ({})",
                        tx.created_at.format("%Y-%m-%d %H:%M"),
                        tx.from_username,
                        tx.to_username,
                        tx.amount,
                        tx.context
                    );
                }
            }
        },
        Command::Grant(args) => {
            let new_balance = ledger.grant(&args.username, args.amount.parse()?).await?;
            println!(
                "granted {} to {}, new balance {}",
                args.amount, args.username, new_balance
            );
        }
        Command::TopOff => {
            let count = ledger.top_off().await?;
            println!("topped off {count} accounts");
        }
    }

    Ok(())
}
