//! Rolling log of the most recent conversions

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::fmt;

/// Maximum number of conversions kept in the history.
pub const HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub converted: Decimal,
    pub date: DateTime<Local>,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} → {:.2} {}",
            self.amount, self.from, self.converted, self.to
        )
    }
}

/// Newest-first list of at most [`HISTORY_LIMIT`] transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionHistory {
    entries: VecDeque<Transaction>,
}

impl TransactionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.entries.push_front(transaction);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn latest(&self) -> Option<&Transaction> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
