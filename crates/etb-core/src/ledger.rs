//! In-memory per-chat expense ledgers.
//!
//! All state is volatile by design: one process, one store, nothing persisted.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Local};

use crate::domain::ChatId;

/// One logged spend event. Never mutated after creation.
#[derive(Clone, Debug)]
pub struct Expense {
    pub amount: f64,
    pub description: String,
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Default)]
struct UserLedger {
    expenses: Vec<Expense>,
    available_money: Option<f64>,
}

/// Delete failure: the 1-based index is outside `[1, len]`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("expense index out of range")]
pub struct OutOfRange;

/// Keyed store of user ledgers.
///
/// Constructed once at startup and shared via `Arc`; the mutex serializes
/// every read/mutate step, which is the whole concurrency story for this bot.
/// Ledgers are created lazily and live for the process lifetime.
#[derive(Debug, Default)]
pub struct LedgerStore {
    inner: Mutex<HashMap<i64, UserLedger>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an expense with the current timestamp, creating the ledger if
    /// absent. Validation happens before this is called; there is no failure.
    pub fn add_expense(&self, chat: ChatId, amount: f64, description: String) -> Expense {
        let expense = Expense {
            amount,
            description,
            created_at: Local::now(),
        };

        let mut map = self.lock();
        map.entry(chat.0)
            .or_default()
            .expenses
            .push(expense.clone());
        expense
    }

    /// Snapshot of the chat's expenses in insertion order.
    pub fn expenses(&self, chat: ChatId) -> Vec<Expense> {
        self.lock()
            .get(&chat.0)
            .map(|l| l.expenses.clone())
            .unwrap_or_default()
    }

    /// Removes and returns the expense at a 1-based position. Later records
    /// shift down, so the numbers shown by the next `/list` stay contiguous.
    pub fn delete_expense(&self, chat: ChatId, one_based: i64) -> Result<Expense, OutOfRange> {
        let mut map = self.lock();
        let ledger = map.get_mut(&chat.0).ok_or(OutOfRange)?;

        if one_based < 1 || one_based as usize > ledger.expenses.len() {
            return Err(OutOfRange);
        }
        Ok(ledger.expenses.remove(one_based as usize - 1))
    }

    pub fn total_expenses(&self, chat: ChatId) -> f64 {
        self.lock()
            .get(&chat.0)
            .map(|l| l.expenses.iter().map(|e| e.amount).sum())
            .unwrap_or(0.0)
    }

    /// Unconditional overwrite; `/money` never accumulates.
    pub fn set_money(&self, chat: ChatId, amount: f64) {
        self.lock().entry(chat.0).or_default().available_money = Some(amount);
    }

    /// `None` means "never set", which `/balance` distinguishes from zero.
    pub fn money(&self, chat: ChatId) -> Option<f64> {
        self.lock().get(&chat.0).and_then(|l| l.available_money)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, UserLedger>> {
        // A panic while holding the lock cannot leave a ledger half-mutated
        // (every operation is a single Vec/Option step), so recover the guard.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
