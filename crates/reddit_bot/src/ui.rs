//! Reply text rendering.
//!
//! Pure formatting helpers; the dispatcher appends the shared footer.

use ledger::{Money, TipReceipt};

const DOCS_URL: &str = "https://github.com/tipjar-bot/tipjar";

/// Footer appended to every reply: account-info shortcut, feedback link,
/// bot info.
pub(crate) fn footer(bot_username: &str, dev_username: &str) -> String {
    format!(
        "\n\n---\n\n[^(Account Info)](https://www.reddit.com/message/compose/?to={bot_username}&subject=Account%20Info&message=!ACCOUNT) \
         ^| [^(Give Feedback)](https://www.reddit.com/message/compose/?to={dev_username}&subject=Feedback) \
         ^| [^(Bot Info)]({DOCS_URL})\n\n\
         ^(This bot is maintained and hosted by {dev_username}.)"
    )
}

pub(crate) fn render_tip_success(from_user: &str, to_user: &str, amount: Money, receipt: &TipReceipt) -> String {
    format!(
        "Thanks {from_user}, you have sent **{amount}** TIPs to **{to_user}**.\n\n\
         You have sent a total of {total_sent} TIPs.\n\n\
         {to_user} has received a total of {total_received} TIPs.",
        total_sent = receipt.total_sent,
        total_received = receipt.total_received,
    )
}

pub(crate) fn render_self_tip() -> String {
    "You can tip yourself all you want in the comfort of your own home but I won't allow it \
     here. **Request DENIED!**"
        .to_string()
}

pub(crate) fn render_below_minimum(min_tip: Money) -> String {
    format!(
        "Way to dig deep there big spender! All tips must be >= {min_tip} TIPs. \
         **Request DENIED!**"
    )
}

pub(crate) fn render_above_maximum(max_tip: Money) -> String {
    format!(
        "Easy there big fella! All tips must be {max_tip} TIPs or less. We don't want to \
         dilute the market and make these TIPs even more worthless. **Request DENIED!**"
    )
}

pub(crate) fn render_insufficient_funds() -> String {
    "You do not have sufficient funds to send that tip. How embarrassing for you.".to_string()
}

pub(crate) fn render_syntax_help(bot_username: &str) -> String {
    format!(
        "I could not find a valid command in your comment. Please try again with the correct \
         syntax.\n\nExample:\n\n    /u/{bot_username} +2"
    )
}

pub(crate) fn render_account_info(balance: Money, total_sent: Money, total_received: Money) -> String {
    format!(
        "Account Balance: {balance}\n\nTotal Sent: {total_sent}\n\nTotal Received: {total_received}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(total_sent: Money, total_received: Money) -> TipReceipt {
        TipReceipt {
            transaction_id: uuid::Uuid::nil(),
            total_sent,
            total_received,
        }
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn success_reply_formats_two_decimals() {
        let text = render_tip_success(
            "alice",
            "bob",
            money("2"),
            &receipt(money("2"), money("3.5")),
        );
        assert!(text.contains("sent **2.00** TIPs to **bob**"));
        assert!(text.contains("a total of 2.00 TIPs"));
        assert!(text.contains("bob has received a total of 3.50 TIPs"));
    }

    #[test]
    fn account_info_formats_two_decimals() {
        let text = render_account_info(money("20"), Money::ZERO, money("0.1"));
        assert_eq!(
            text,
            "Account Balance: 20.00\n\nTotal Sent: 0.00\n\nTotal Received: 0.10"
        );
    }

    #[test]
    fn footer_links_back_to_the_bot_and_dev() {
        let text = footer("tipjar_bot", "dev_user");
        assert!(text.contains("to=tipjar_bot"));
        assert!(text.contains("to=dev_user"));
        assert!(text.contains(DOCS_URL));
    }
}
