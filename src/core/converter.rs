//! Conversion state: loaded rates, the selected pair and the recent history

use anyhow::Result;
use chrono::Local;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::convert::{self, ConversionError, normalize_code};
use super::history::{Transaction, TransactionHistory};
use super::rates::{RateProvider, RateTable};

/// The currency pair and amount currently picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub from: String,
    pub to: String,
    /// Amount as typed, validated only when converting.
    pub amount: String,
}

impl Default for Selection {
    fn default() -> Self {
        Selection {
            from: "USD".to_string(),
            to: "EUR".to_string(),
            amount: String::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Converter {
    rates: RateTable,
    selection: Selection,
    converted_amount: Option<Decimal>,
    history: TransactionHistory,
}

impl Converter {
    pub fn new(from: &str, to: &str) -> Self {
        Converter {
            selection: Selection {
                from: normalize_code(from),
                to: normalize_code(to),
                amount: String::new(),
            },
            ..Default::default()
        }
    }

    /// Fetches a fresh rate table. On failure the current table is kept.
    pub async fn load_rates(&mut self, provider: &dyn RateProvider, base: &str) -> Result<usize> {
        let rates = provider.fetch_rates(base).await?;
        info!(
            base = rates.base(),
            count = rates.len(),
            "Loaded exchange rates"
        );
        self.rates = rates;
        Ok(self.rates.len())
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Available currency codes in sorted order.
    pub fn currencies(&self) -> Vec<String> {
        self.rates.codes().map(str::to_string).collect()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_from(&mut self, code: &str) {
        self.selection.from = normalize_code(code);
    }

    pub fn set_to(&mut self, code: &str) {
        self.selection.to = normalize_code(code);
    }

    /// Replaces the whole selection, e.g. to undo edits of a failed conversion.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn set_amount(&mut self, amount: &str) {
        self.selection.amount = amount.trim().to_string();
    }

    pub fn swap(&mut self) {
        let selection = &mut self.selection;
        std::mem::swap(&mut selection.from, &mut selection.to);
    }

    pub fn converted_amount(&self) -> Option<Decimal> {
        self.converted_amount
    }

    pub fn history(&self) -> &TransactionHistory {
        &self.history
    }

    /// Converts the current selection and records it in the history.
    ///
    /// Nothing is modified when validation fails.
    pub fn convert(&mut self) -> Result<Transaction, ConversionError> {
        let Selection { from, to, amount } = &self.selection;
        let value = convert::parse_amount(amount)?;
        let converted = convert::convert(value, from, to, &self.rates)?;

        let transaction = Transaction {
            from: from.clone(),
            to: to.clone(),
            amount: value,
            converted,
            date: Local::now(),
        };
        debug!(%transaction, "Converted amount");

        self.converted_amount = Some(converted);
        self.history.push(transaction.clone());
        Ok(transaction)
    }
}
