//! Reddit dispatch bot.
//!
//! The bot is a thin dispatcher: it pulls unread inbox items, interprets
//! the command, drives the ledger and relays the outcome back to the
//! sender. All ledger invariants live in the `ledger` crate.

use ledger::Ledger;

pub use api::{ApiError, InboxMessage, RedditConfig};

mod api;
mod commands;
mod handlers;
mod ui;

pub use commands::{Command, parse_command};

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Ledger(#[from] ledger::LedgerError),
    #[error("invalid bot configuration: {0}")]
    InvalidConfig(String),
}

/// When an inbox item is marked processed relative to handling it.
///
/// `Before` (the default) accepts a bounded lost-command window on crash;
/// `After` accepts redelivery instead, which the ledger's per-context
/// deduplication absorbs without double-applying.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkProcessed {
    #[default]
    Before,
    After,
}

impl std::str::FromStr for MarkProcessed {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(MarkProcessed::Before),
            "after" => Ok(MarkProcessed::After),
            other => Err(BotError::InvalidConfig(format!(
                "mark_processed must be \"before\" or \"after\", got \"{other}\""
            ))),
        }
    }
}

pub struct Bot {
    ledger: Ledger,
    client: api::RedditClient,
    bot_username: String,
    dev_user: Option<String>,
    mark_processed: MarkProcessed,
    footer: String,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// One polling cycle: fetch the unread inbox and process every item.
    ///
    /// A failure on one item is logged and alerted, then the cycle moves
    /// on; only a failure to fetch the inbox itself aborts the cycle.
    pub async fn check_inbox(&mut self) -> Result<(), BotError> {
        let messages = self.client.unread_messages().await?;
        tracing::info!(count = messages.len(), "processing unread inbox");

        for message in messages {
            if let Err(err) = self.process_message(&message).await {
                tracing::error!(id = %message.name, "failed to process message: {err}");
                self.alert_dev(
                    "Unknown Exception in Main Loop",
                    &format!("Error: {err}"),
                )
                .await;
            }
        }
        Ok(())
    }

    async fn process_message(&mut self, message: &InboxMessage) -> Result<(), BotError> {
        // Deleted accounts have no author to credit or reply to.
        let Some(author) = message.author.clone() else {
            self.client.mark_read(&message.name).await?;
            return Ok(());
        };

        if self.mark_processed == MarkProcessed::Before {
            self.client.mark_read(&message.name).await?;
        }
        let result = self.dispatch(message, &author).await;
        if result.is_ok() && self.mark_processed == MarkProcessed::After {
            self.client.mark_read(&message.name).await?;
        }
        result
    }

    async fn dispatch(&mut self, message: &InboxMessage, author: &str) -> Result<(), BotError> {
        self.ledger.ensure_account(author).await?;

        let reply = if message.was_comment {
            let Some(parent_id) = message.parent_id.as_deref() else {
                return Ok(());
            };
            let Some(recipient) = self.client.author_of(parent_id).await? else {
                return Ok(());
            };
            self.ledger.ensure_account(&recipient).await?;

            handlers::handle_mention(
                &self.ledger,
                &self.bot_username,
                author,
                &recipient,
                &message.body,
                &message.name,
                recipient == self.bot_username,
            )
            .await?
        } else {
            handlers::handle_private_message(
                &self.ledger,
                &self.bot_username,
                author,
                &message.body,
            )
            .await?
        };

        if let Some(body) = reply {
            let text = format!("{body}{footer}", footer = self.footer);
            self.client.reply(&message.name, &text).await?;
        }
        Ok(())
    }

    /// Best-effort operational alert to the dev account; never fails the
    /// caller.
    pub async fn alert_dev(&mut self, subject: &str, body: &str) {
        let Some(dev_user) = self.dev_user.clone() else {
            return;
        };
        if let Err(err) = self.client.compose(&dev_user, subject, body).await {
            tracing::error!("failed to deliver dev alert: {err}");
        }
    }

    /// Weekly administrative grant, alerting instead of crashing on failure.
    pub async fn top_off_accounts(&mut self) {
        match self.ledger.top_off().await {
            Ok(count) => tracing::info!(count, "topped off accounts"),
            Err(err) => {
                tracing::error!("failed to top off accounts: {err}");
                self.alert_dev(
                    "Unknown Exception topping off accounts",
                    &format!("Error: {err}"),
                )
                .await;
            }
        }
    }
}

#[derive(Default)]
pub struct BotBuilder {
    reddit: Option<RedditConfig>,
    ledger: Option<Ledger>,
    dev_user: Option<String>,
    mark_processed: MarkProcessed,
}

impl BotBuilder {
    /// Pass the required Reddit credentials.
    pub fn reddit(mut self, config: RedditConfig) -> BotBuilder {
        self.reddit = Some(config);
        self
    }

    /// Pass the required ledger.
    pub fn ledger(mut self, ledger: Ledger) -> BotBuilder {
        self.ledger = Some(ledger);
        self
    }

    /// Account that receives operational alerts.
    pub fn dev_user(mut self, dev_user: impl Into<String>) -> BotBuilder {
        self.dev_user = Some(dev_user.into());
        self
    }

    pub fn mark_processed(mut self, mark_processed: MarkProcessed) -> BotBuilder {
        self.mark_processed = mark_processed;
        self
    }

    pub fn build(self) -> Result<Bot, BotError> {
        tracing::info!("Initializing reddit bot...");
        let reddit = self
            .reddit
            .ok_or_else(|| BotError::InvalidConfig("missing reddit credentials".to_string()))?;
        let ledger = self
            .ledger
            .ok_or_else(|| BotError::InvalidConfig("missing ledger".to_string()))?;

        let bot_username = reddit.username.clone();
        let footer = ui::footer(
            &bot_username,
            self.dev_user.as_deref().unwrap_or(&bot_username),
        );
        let client = api::RedditClient::new(reddit)?;

        Ok(Bot {
            ledger,
            client,
            bot_username,
            dev_user: self.dev_user,
            mark_processed: self.mark_processed,
            footer,
        })
    }
}
