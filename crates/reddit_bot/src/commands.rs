//! Command interpretation for inbound message text.
//!
//! Pure text -> [`Command`] classification: no state, no I/O, no panics on
//! malformed input. A tip command is a mention of the bot followed by a
//! `+`-prefixed decimal amount; `!account` asks for account info.

use ledger::Money;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SendTip { amount: Money },
    AccountInfo,
    Unrecognized,
}

/// Classifies free-form message text.
///
/// Matching is case-insensitive. A mention that is not followed by a
/// parseable positive amount never matches; the text then falls through to
/// the other rules, so malformed amounts end up `Unrecognized` instead of
/// crashing the dispatcher.
pub fn parse_command(text: &str, bot_username: &str) -> Command {
    if let Some(amount) = parse_tip_amount(text, bot_username) {
        return Command::SendTip { amount };
    }
    if text.to_ascii_lowercase().contains("!account") {
        return Command::AccountInfo;
    }
    Command::Unrecognized
}

/// Scans for `[/]u/<bot> +<amount>` and extracts the amount.
fn parse_tip_amount(text: &str, bot_username: &str) -> Option<Money> {
    let mention = format!("u/{}", bot_username.to_ascii_lowercase());
    let mut tokens = text.split_whitespace().peekable();

    while let Some(token) = tokens.next() {
        let candidate = token.trim_start_matches('/').to_ascii_lowercase();
        if candidate != mention {
            continue;
        }
        // A mention followed by anything else keeps scanning: the command
        // may still appear later in the text.
        if let Some(next) = tokens.peek()
            && let Some(raw) = next.strip_prefix('+')
            && let Ok(amount) = raw.parse::<Money>()
            && amount.is_positive()
        {
            return Some(amount);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn mention_with_amount_is_a_tip() {
        assert_eq!(
            parse_command("/u/bot +2.5", "bot"),
            Command::SendTip { amount: money("2.5") }
        );
        assert_eq!(
            parse_command("u/bot +2", "bot"),
            Command::SendTip { amount: money("2") }
        );
        assert_eq!(
            parse_command("thanks for the help! /u/bot +0.5", "bot"),
            Command::SendTip { amount: money("0.5") }
        );
    }

    #[test]
    fn mention_match_is_case_insensitive() {
        assert_eq!(
            parse_command("/U/Bot +1", "bot"),
            Command::SendTip { amount: money("1") }
        );
    }

    #[test]
    fn account_keyword_is_account_info() {
        assert_eq!(parse_command("!account", "bot"), Command::AccountInfo);
        assert_eq!(parse_command("!ACCOUNT", "bot"), Command::AccountInfo);
        assert_eq!(
            parse_command("please show me !account info", "bot"),
            Command::AccountInfo
        );
    }

    #[test]
    fn anything_else_is_unrecognized() {
        assert_eq!(parse_command("hello", "bot"), Command::Unrecognized);
        assert_eq!(parse_command("", "bot"), Command::Unrecognized);
        assert_eq!(parse_command("/u/someoneelse +2", "bot"), Command::Unrecognized);
    }

    #[test]
    fn malformed_amounts_are_unrecognized() {
        assert_eq!(parse_command("/u/bot +", "bot"), Command::Unrecognized);
        assert_eq!(parse_command("/u/bot +abc", "bot"), Command::Unrecognized);
        assert_eq!(parse_command("/u/bot 2", "bot"), Command::Unrecognized);
        assert_eq!(parse_command("/u/bot +1.234", "bot"), Command::Unrecognized);
        assert_eq!(parse_command("/u/bot +-3", "bot"), Command::Unrecognized);
    }

    #[test]
    fn later_mention_can_still_match() {
        assert_eq!(
            parse_command("/u/bot is great, /u/bot +1", "bot"),
            Command::SendTip { amount: money("1") }
        );
    }

    #[test]
    fn tip_takes_precedence_over_account_info() {
        assert_eq!(
            parse_command("!account /u/bot +2", "bot"),
            Command::SendTip { amount: money("2") }
        );
    }
}
