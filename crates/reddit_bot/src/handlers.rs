//! Message handling: typed command -> ledger call -> reply text.
//!
//! These functions are network-free; the dispatcher in `lib.rs` resolves
//! authors and delivers the rendered replies. Business rejections become
//! `Ok(Some(reply))`; only system faults propagate as errors.

use ledger::{Ledger, LedgerError, SendTipCmd};

use crate::{
    commands::{Command, parse_command},
    ui,
};

/// Handles a comment that mentions the bot. `recipient` is the author of
/// the parent comment.
///
/// Returns the reply body, or `None` when the bot should stay silent (an
/// unrecognized command under the bot's own comment).
pub(crate) async fn handle_mention(
    ledger: &Ledger,
    bot_username: &str,
    sender: &str,
    recipient: &str,
    body: &str,
    context: &str,
    parent_is_bot: bool,
) -> Result<Option<String>, LedgerError> {
    match parse_command(body, bot_username) {
        Command::SendTip { amount } => {
            let cmd = SendTipCmd::new(sender, recipient, amount, context);
            let reply = match ledger.send_tip(cmd).await {
                Ok(receipt) => ui::render_tip_success(sender, recipient, amount, &receipt),
                Err(LedgerError::SelfTransfer) => ui::render_self_tip(),
                Err(LedgerError::BelowMinimum(min_tip)) => ui::render_below_minimum(min_tip),
                Err(LedgerError::AboveMaximum(max_tip)) => ui::render_above_maximum(max_tip),
                Err(LedgerError::InsufficientFunds(_)) => ui::render_insufficient_funds(),
                Err(err) => return Err(err),
            };
            Ok(Some(reply))
        }
        // Tips are the only command a comment can carry; anything else
        // earns the syntax reminder, except under the bot's own comments.
        _ if parent_is_bot => Ok(None),
        _ => Ok(Some(ui::render_syntax_help(bot_username))),
    }
}

/// Handles a private message. Only `!account` produces a reply.
pub(crate) async fn handle_private_message(
    ledger: &Ledger,
    bot_username: &str,
    author: &str,
    body: &str,
) -> Result<Option<String>, LedgerError> {
    match parse_command(body, bot_username) {
        Command::AccountInfo => {
            let balance = ledger.balance(author).await?;
            let total_sent = ledger.total_sent(author).await?;
            let total_received = ledger.total_received(author).await?;
            Ok(Some(ui::render_account_info(
                balance,
                total_sent,
                total_received,
            )))
        }
        _ => Ok(None),
    }
}
