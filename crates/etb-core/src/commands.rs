//! Command processor: one line of chat text in, one reply string out.
//!
//! Dispatch is a single ordered match on the leading token. Everything
//! user-facing (including validation failures) comes back as the reply;
//! nothing here returns an `Error`.

use std::sync::Arc;

use crate::{
    config::Config,
    domain::ChatId,
    formatting::{balance_message, budget_alert, format_currency},
    ledger::LedgerStore,
};

/// Stateless-per-command processor over the shared [`LedgerStore`].
///
/// The invite link is resolved once by the transport at startup (`getMe` is a
/// boundary call); the processor itself never talks to Telegram.
pub struct CommandProcessor {
    cfg: Arc<Config>,
    store: Arc<LedgerStore>,
    invite_link: Option<String>,
}

impl CommandProcessor {
    pub fn new(cfg: Arc<Config>, store: Arc<LedgerStore>, invite_link: Option<String>) -> Self {
        Self {
            cfg,
            store,
            invite_link,
        }
    }

    /// Maps one inbound message to exactly one reply.
    pub fn handle(&self, chat: ChatId, text: &str) -> String {
        let trimmed = text.trim();
        if !trimmed.starts_with('/') {
            // Free text: show the command list.
            return self.help_text();
        }

        let (cmd, args) = parse_command(trimmed);
        match cmd.as_str() {
            "/start" => self.welcome_text(),
            "/help" => self.help_text(),
            "/add" => self.add(chat, &args),
            "/list" => self.list(chat),
            "/total" => self.total(chat),
            "/delete" => self.delete(chat, &args),
            "/money" if self.cfg.budget_tracking => self.money(chat, &args),
            "/balance" if self.cfg.budget_tracking => self.balance(chat),
            "/invite" => self.invite(),
            _ => self.unknown(&cmd),
        }
    }

    fn add(&self, chat: ChatId, args: &str) -> String {
        let tokens: Vec<&str> = args.split_whitespace().collect();
        if tokens.len() < 2 {
            return "Please use format: /add <amount> <description>".to_string();
        }

        let Some(amount) = parse_amount(tokens[0]) else {
            return "Please enter a valid amount".to_string();
        };
        let description = tokens[1..].join(" ");

        self.store.add_expense(chat, amount, description.clone());

        let mut message = format!(
            "✅ Added expense:\nAmount: {}\nDescription: {}",
            self.currency(amount),
            description
        );
        if self.cfg.budget_tracking {
            message.push_str("\n\n");
            message.push_str(&self.remaining_line(chat));
        }
        message
    }

    fn list(&self, chat: ChatId) -> String {
        let expenses = self.store.expenses(chat);
        if expenses.is_empty() {
            return "No expenses recorded yet.".to_string();
        }

        let lines = expenses
            .iter()
            .enumerate()
            .map(|(index, exp)| {
                format!(
                    "{}. {} - {}\n   {}",
                    index + 1,
                    self.currency(exp.amount),
                    exp.description,
                    exp.created_at.format("%Y-%m-%d")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("📋 Your expenses:\n\n{lines}")
    }

    fn total(&self, chat: ChatId) -> String {
        let expenses = self.store.expenses(chat);
        if expenses.is_empty() {
            return "No expenses recorded yet.".to_string();
        }

        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        if !self.cfg.budget_tracking {
            return format!("💰 Total expenses: {}", self.currency(total));
        }

        // Note: unlike /balance, /total never asks for the money to be set
        // first; an absent budget reads as zero here.
        let available = self.store.money(chat).unwrap_or(0.0);
        balance_message(&self.cfg.currency_symbol, available, total, available - total)
    }

    fn delete(&self, chat: ChatId, args: &str) -> String {
        let Ok(number) = args.trim().parse::<i64>() else {
            return "Please provide a valid expense number".to_string();
        };

        let Ok(deleted) = self.store.delete_expense(chat, number) else {
            return "Invalid expense number. Use /list to see your expenses.".to_string();
        };

        let mut message = format!(
            "🗑️ Deleted expense:\nAmount: {}\nDescription: {}",
            self.currency(deleted.amount),
            deleted.description
        );
        if self.cfg.budget_tracking {
            message.push_str("\n\n");
            message.push_str(&self.remaining_line(chat));
        }
        message
    }

    fn money(&self, chat: ChatId, args: &str) -> String {
        let Some(amount) = parse_amount(args.trim()) else {
            return "Please enter a valid amount".to_string();
        };

        self.store.set_money(chat, amount);
        let total = self.store.total_expenses(chat);
        balance_message(&self.cfg.currency_symbol, amount, total, amount - total)
    }

    fn balance(&self, chat: ChatId) -> String {
        // Deliberate asymmetry with /total and /money: only /balance guards
        // on a never-set budget.
        let Some(available) = self.store.money(chat) else {
            return "Please set your available money first using /money <amount>".to_string();
        };

        let total = self.store.total_expenses(chat);
        balance_message(
            &self.cfg.currency_symbol,
            available,
            total,
            available - total,
        )
    }

    fn invite(&self) -> String {
        match &self.invite_link {
            Some(link) => format!("🤖 Invite others to use this bot!\n\nShare this link:\n{link}"),
            None => "🤖 Invite link unavailable right now. Try again later.".to_string(),
        }
    }

    fn unknown(&self, cmd: &str) -> String {
        if self.cfg.budget_tracking {
            format!("Unknown command: {cmd}\nUse /help to see available commands.")
        } else {
            // The plain build answers everything unrecognized with the help text.
            self.help_text()
        }
    }

    fn welcome_text(&self) -> String {
        format!(
            "Welcome to Expense Tracker Bot! 💰\n\nHere are the available commands:\n{}",
            self.command_list()
        )
    }

    fn help_text(&self) -> String {
        format!("Available commands:\n\n{}", self.command_list())
    }

    fn command_list(&self) -> String {
        let mut lines = vec![
            "/add <amount> <description> - Add an expense",
            "/list - View all your expenses",
            "/total - Get total expenses",
            "/delete <expense_number> - Delete an expense",
        ];
        if self.cfg.budget_tracking {
            lines.push("/money <amount> - Set your available money");
            lines.push("/balance - Check your remaining balance");
        }
        lines.push("/invite - Get bot invite link");
        lines.push("/help - Show this help message");

        format!(
            "{}\n\nExample: /add 500 Lunch at restaurant",
            lines.join("\n")
        )
    }

    /// Alert prefix (if any) plus the single remaining-balance line used by
    /// the /add and /delete confirmations.
    fn remaining_line(&self, chat: ChatId) -> String {
        let total = self.store.total_expenses(chat);
        let available = self.store.money(chat).unwrap_or(0.0);
        let remaining = available - total;

        format!(
            "{}Remaining Balance: {}",
            budget_alert(&self.cfg.currency_symbol, available, remaining),
            self.currency(remaining)
        )
    }

    fn currency(&self, amount: f64) -> String {
        format_currency(&self.cfg.currency_symbol, amount)
    }
}

/// Splits the leading token from the rest and strips a `@botname` suffix
/// (Telegram sends `/cmd@botname` in groups). The keyword itself is matched
/// case-sensitively.
fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first.split('@').next().unwrap_or(first).to_string();
    (cmd, rest)
}

/// "Parses as a number" is the only amount validation; NaN and infinities are
/// rejected, signs and decimals are fine.
fn parse_amount(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: ChatId = ChatId(1001);

    fn processor(budget_tracking: bool) -> CommandProcessor {
        let cfg = Arc::new(Config {
            telegram_bot_token: "test-token".to_string(),
            budget_tracking,
            currency_symbol: "₹".to_string(),
        });
        CommandProcessor::new(
            cfg,
            Arc::new(LedgerStore::new()),
            Some("https://t.me/expense_test_bot".to_string()),
        )
    }

    #[test]
    fn start_lists_every_command() {
        let p = processor(true);
        let reply = p.handle(CHAT, "/start");
        assert!(reply.starts_with("Welcome to Expense Tracker Bot!"));
        for cmd in [
            "/add", "/list", "/total", "/delete", "/money", "/balance", "/invite", "/help",
        ] {
            assert!(reply.contains(cmd), "missing {cmd} in welcome");
        }
        assert!(reply.contains("Example: /add 500 Lunch at restaurant"));
    }

    #[test]
    fn help_and_start_share_the_command_list() {
        let p = processor(true);
        let start = p.handle(CHAT, "/start");
        let help = p.handle(CHAT, "/help");
        assert!(help.starts_with("Available commands:"));
        // Same list content, different preamble.
        let list = help.split_once("\n\n").unwrap().1;
        assert!(start.ends_with(list));
    }

    #[test]
    fn plain_variant_hides_budget_commands_from_help() {
        let p = processor(false);
        let help = p.handle(CHAT, "/help");
        assert!(!help.contains("/money"));
        assert!(!help.contains("/balance"));
        assert!(help.contains("/add"));
    }

    #[test]
    fn add_records_and_confirms() {
        let p = processor(true);
        let reply = p.handle(CHAT, "/add 500 Lunch at restaurant");
        assert!(reply.contains("✅ Added expense:"));
        assert!(reply.contains("Amount: ₹500.00"));
        assert!(reply.contains("Description: Lunch at restaurant"));
        assert!(reply.contains("Remaining Balance: ₹-500.00"));

        let list = p.store.expenses(CHAT);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].amount, 500.0);
        assert_eq!(list[0].description, "Lunch at restaurant");
    }

    #[test]
    fn add_collapses_whitespace_in_description() {
        let p = processor(true);
        p.handle(CHAT, "/add 10   Lunch   at    home");
        assert_eq!(p.store.expenses(CHAT)[0].description, "Lunch at home");
    }

    #[test]
    fn add_with_too_few_tokens_never_mutates() {
        let p = processor(true);
        for input in ["/add", "/add 500", "/add  "] {
            let reply = p.handle(CHAT, input);
            assert_eq!(reply, "Please use format: /add <amount> <description>");
        }
        assert!(p.store.expenses(CHAT).is_empty());
    }

    #[test]
    fn add_with_bad_amount_never_mutates() {
        let p = processor(true);
        for input in ["/add abc Lunch", "/add NaN Lunch", "/add inf Lunch"] {
            let reply = p.handle(CHAT, input);
            assert_eq!(reply, "Please enter a valid amount", "input: {input}");
        }
        assert!(p.store.expenses(CHAT).is_empty());
    }

    #[test]
    fn plain_variant_add_has_no_balance_line() {
        let p = processor(false);
        let reply = p.handle(CHAT, "/add 500 Lunch");
        assert!(reply.contains("✅ Added expense:"));
        assert!(!reply.contains("Remaining Balance"));
    }

    #[test]
    fn list_numbers_from_one() {
        let p = processor(true);
        p.handle(CHAT, "/add 500 Lunch");
        p.handle(CHAT, "/add 120 Coffee");

        let reply = p.handle(CHAT, "/list");
        assert!(reply.starts_with("📋 Your expenses:"));
        assert!(reply.contains("1. ₹500.00 - Lunch"));
        assert!(reply.contains("2. ₹120.00 - Coffee"));
    }

    #[test]
    fn list_empty_state() {
        let p = processor(true);
        assert_eq!(p.handle(CHAT, "/list"), "No expenses recorded yet.");
        assert_eq!(p.handle(CHAT, "/total"), "No expenses recorded yet.");
    }

    #[test]
    fn total_follows_adds_and_deletes() {
        let p = processor(true);
        p.handle(CHAT, "/add 100 a");
        p.handle(CHAT, "/add 200 b");
        p.handle(CHAT, "/add 50 c");
        p.handle(CHAT, "/delete 2");

        let reply = p.handle(CHAT, "/total");
        assert!(reply.contains("Total Expenses: ₹150.00"));
    }

    #[test]
    fn total_never_guards_on_unset_money() {
        let p = processor(true);
        p.handle(CHAT, "/add 100 Food");
        let reply = p.handle(CHAT, "/total");
        // Absent budget reads as zero, no "set your money first" here.
        assert!(reply.contains("Available Money: ₹0.00"));
        assert!(reply.contains("Remaining Balance: ₹-100.00"));
    }

    #[test]
    fn plain_variant_total_is_a_single_line() {
        let p = processor(false);
        p.handle(CHAT, "/add 100 Food");
        assert_eq!(p.handle(CHAT, "/total"), "💰 Total expenses: ₹100.00");
    }

    #[test]
    fn delete_confirms_and_shifts_numbering() {
        let p = processor(true);
        p.handle(CHAT, "/add 1 first");
        p.handle(CHAT, "/add 2 second");
        p.handle(CHAT, "/add 3 third");

        let reply = p.handle(CHAT, "/delete 2");
        assert!(reply.contains("🗑️ Deleted expense:"));
        assert!(reply.contains("Description: second"));

        let list = p.handle(CHAT, "/list");
        assert!(list.contains("1. ₹1.00 - first"));
        assert!(list.contains("2. ₹3.00 - third"));
    }

    #[test]
    fn delete_rejects_non_integers() {
        let p = processor(true);
        p.handle(CHAT, "/add 10 x");
        for input in ["/delete", "/delete one", "/delete 1.5"] {
            let reply = p.handle(CHAT, input);
            assert_eq!(reply, "Please provide a valid expense number");
        }
        assert_eq!(p.store.expenses(CHAT).len(), 1);
    }

    #[test]
    fn delete_rejects_out_of_range() {
        let p = processor(true);
        p.handle(CHAT, "/add 10 x");
        for input in ["/delete 0", "/delete -1", "/delete 2"] {
            let reply = p.handle(CHAT, input);
            assert_eq!(reply, "Invalid expense number. Use /list to see your expenses.");
        }
        assert_eq!(p.store.expenses(CHAT).len(), 1);
    }

    #[test]
    fn money_replies_with_the_balance_block() {
        let p = processor(true);
        let reply = p.handle(CHAT, "/money 1000");
        assert!(reply.contains("💰 Balance Summary:"));
        assert!(reply.contains("Available Money: ₹1000.00"));
        assert!(reply.contains("Remaining Balance: ₹1000.00"));
    }

    #[test]
    fn money_rejects_bad_amounts() {
        let p = processor(true);
        assert_eq!(p.handle(CHAT, "/money"), "Please enter a valid amount");
        assert_eq!(p.handle(CHAT, "/money lots"), "Please enter a valid amount");
        assert_eq!(p.store.money(CHAT), None);
    }

    #[test]
    fn low_balance_alert_fires_under_twenty_percent() {
        let p = processor(true);
        p.handle(CHAT, "/money 1000");
        p.handle(CHAT, "/add 850 Rent");

        let reply = p.handle(CHAT, "/balance");
        assert!(reply.contains("⚠️ ALERT: You're close to your budget limit!"));
        assert!(reply.contains("Only ₹150.00 remaining"));
        assert!(!reply.contains("overspending"));
        assert!(reply.contains("Remaining Balance: ₹150.00"));
    }

    #[test]
    fn overspend_warning_shows_the_overrun() {
        let p = processor(true);
        p.handle(CHAT, "/money 100");
        p.handle(CHAT, "/add 150 Food");

        let reply = p.handle(CHAT, "/balance");
        assert!(reply.contains("⚠️ WARNING: You're overspending!"));
        assert!(reply.contains("exceeded your budget by ₹50.00"));
        assert!(reply.contains("Remaining Balance: ₹-50.00"));
    }

    #[test]
    fn balance_guards_only_when_money_never_set() {
        let p = processor(true);
        assert_eq!(
            p.handle(CHAT, "/balance"),
            "Please set your available money first using /money <amount>"
        );

        // Explicitly set to zero counts as set.
        p.handle(CHAT, "/money 0");
        let reply = p.handle(CHAT, "/balance");
        assert!(reply.contains("Available Money: ₹0.00"));
    }

    #[test]
    fn invite_shares_the_bot_link() {
        let p = processor(true);
        let reply = p.handle(CHAT, "/invite");
        assert!(reply.contains("https://t.me/expense_test_bot"));
    }

    #[test]
    fn free_text_gets_the_help_text() {
        let p = processor(true);
        let reply = p.handle(CHAT, "what did I spend?");
        assert!(reply.starts_with("Available commands:"));
    }

    #[test]
    fn unknown_slash_command_per_variant() {
        let rich = processor(true);
        let reply = rich.handle(CHAT, "/export csv");
        assert!(reply.starts_with("Unknown command: /export"));

        let plain = processor(false);
        let reply = plain.handle(CHAT, "/export csv");
        assert!(reply.starts_with("Available commands:"));
    }

    #[test]
    fn budget_commands_are_unknown_in_the_plain_variant() {
        let p = processor(false);
        let reply = p.handle(CHAT, "/money 1000");
        assert!(reply.starts_with("Available commands:"));
        assert_eq!(p.store.money(CHAT), None);

        let reply = p.handle(CHAT, "/balance");
        assert!(reply.starts_with("Available commands:"));
    }

    #[test]
    fn command_keywords_are_case_sensitive() {
        let p = processor(true);
        let reply = p.handle(CHAT, "/ADD 10 Lunch");
        assert!(reply.starts_with("Unknown command: /ADD"));
        assert!(p.store.expenses(CHAT).is_empty());
    }

    #[test]
    fn group_style_command_suffix_is_stripped() {
        let p = processor(true);
        let reply = p.handle(CHAT, "/add@expense_test_bot 25 Tea");
        assert!(reply.contains("Amount: ₹25.00"));
    }
}
