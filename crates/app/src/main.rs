use std::time::Duration;

use chrono::{Datelike, Weekday};
use ledger::{Ledger, LedgerConfig, LedgerError};
use migration::{Migrator, MigratorTrait};
use reddit_bot::{Bot, MarkProcessed, RedditConfig};

mod runfile;
mod settings;

const RUNNING_FILE: &str = "tipjar.running";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tipjar={level},reddit_bot={level},ledger={level}",
            level = settings.app.level
        ))
        .init();

    let remove_stale = settings.app.environment == "DEV";
    let Some(run_file) = runfile::RunFile::acquire(RUNNING_FILE, remove_stale)? else {
        tracing::error!("tip bot already running! Will not start.");
        return Ok(());
    };

    let database = parse_database(&settings.database).await?;
    let ledger_config = parse_ledger_config(&settings.ledger)?;
    let ledger = Ledger::builder()
        .database(database)
        .config(ledger_config)
        .build()
        .await?;

    let poll_interval = Duration::from_secs(
        settings
            .reddit
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
    );
    let mark_processed: MarkProcessed = settings
        .dispatch
        .as_ref()
        .and_then(|dispatch| dispatch.mark_processed.as_deref())
        .map(str::parse)
        .transpose()?
        .unwrap_or_default();

    let reddit = RedditConfig {
        client_id: settings.reddit.client_id.clone(),
        client_secret: settings.reddit.client_secret.clone(),
        username: settings.reddit.username.clone(),
        password: settings.reddit.password.clone(),
        user_agent: settings
            .reddit
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("Tip Bot by /u/{}", settings.reddit.username)),
    };

    let mut builder = Bot::builder()
        .reddit(reddit)
        .ledger(ledger)
        .mark_processed(mark_processed);
    if let Some(dev_user) = settings.alerts.as_ref().and_then(|a| a.dev_user.clone()) {
        builder = builder.dev_user(dev_user);
    }
    let mut bot = builder.build()?;

    if topoff_due(settings.topoff.as_ref()) {
        tracing::info!("Topping off accounts");
        bot.top_off_accounts().await;
    }

    tracing::info!("start");
    while run_file.still_held() {
        tracing::info!("Start Main Loop");
        if let Err(err) = bot.check_inbox().await {
            tracing::error!("Unknown Exception in Main Loop: {err}");
            bot.alert_dev("Unknown Exception in Main Loop", &format!("Error: {err}"))
                .await;
        }
        tracing::info!("End Main Loop");
        tokio::time::sleep(poll_interval).await;
    }
    tracing::info!("end");

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match &config.path {
        None => String::from("sqlite::memory:"),
        Some(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn parse_ledger_config(settings: &settings::LedgerSettings) -> Result<LedgerConfig, LedgerError> {
    LedgerConfig::new(
        settings.initial_grant.parse()?,
        settings.min_tip.parse()?,
        settings.max_tip.parse()?,
    )
}

fn topoff_due(topoff: Option<&settings::TopOff>) -> bool {
    let Some(topoff) = topoff else {
        return false;
    };
    if !topoff.enabled {
        return false;
    }
    let configured = topoff.weekday.as_deref().unwrap_or("monday");
    match configured.parse::<Weekday>() {
        Ok(weekday) => chrono::Local::now().weekday() == weekday,
        Err(_) => {
            tracing::error!("invalid topoff weekday: {configured}");
            false
        }
    }
}
