//! Exchange rate tables and the provider abstraction that fills them

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::warn;

/// Rates of every known currency against a single base currency.
///
/// Every stored rate is strictly positive, so a cross rate between two
/// entries is always defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    base: String,
    rates: BTreeMap<String, Decimal>,
}

impl RateTable {
    pub fn new(base: &str) -> Self {
        RateTable {
            base: base.to_string(),
            rates: BTreeMap::new(),
        }
    }

    /// Builds a table from provider values, dropping non-positive rates.
    pub fn from_rates<I>(base: &str, rates: I) -> Self
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let mut table = RateTable::new(base);
        for (code, rate) in rates {
            if !table.insert(&code, rate) {
                warn!(currency = %code, %rate, "Dropping invalid exchange rate");
            }
        }
        table
    }

    /// Inserts a rate, returning `false` if it was rejected as non-positive.
    pub fn insert(&mut self, code: &str, rate: Decimal) -> bool {
        if rate <= Decimal::ZERO {
            return false;
        }
        self.rates.insert(code.to_string(), rate);
        true
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn get(&self, code: &str) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Currency codes in sorted order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Units of `to` per one unit of `from`.
    pub fn cross_rate(&self, from: &str, to: &str) -> Option<Decimal> {
        let from_rate = self.get(from)?;
        let to_rate = self.get(to)?;
        to_rate.checked_div(from_rate)
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rates of all supported currencies against `base`.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_rates_drops_invalid_entries() {
        let table = RateTable::from_rates(
            "USD",
            vec![
                ("USD".to_string(), dec!(1)),
                ("EUR".to_string(), dec!(0.92)),
                ("BAD".to_string(), dec!(0)),
                ("NEG".to_string(), dec!(-3.5)),
            ],
        );

        assert_eq!(table.base(), "USD");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("EUR"), Some(dec!(0.92)));
        assert!(!table.contains("BAD"));
        assert!(!table.contains("NEG"));
    }

    #[test]
    fn test_codes_are_sorted() {
        let mut table = RateTable::new("USD");
        table.insert("JPY", dec!(150));
        table.insert("EUR", dec!(0.9));
        table.insert("USD", dec!(1));

        let codes: Vec<&str> = table.codes().collect();
        assert_eq!(codes, vec!["EUR", "JPY", "USD"]);
    }

    #[test]
    fn test_cross_rate() {
        let mut table = RateTable::new("USD");
        table.insert("USD", dec!(1));
        table.insert("EUR", dec!(0.5));
        table.insert("GBP", dec!(0.25));

        assert_eq!(table.cross_rate("EUR", "GBP"), Some(dec!(0.5)));
        assert_eq!(table.cross_rate("GBP", "USD"), Some(dec!(4)));
        assert_eq!(table.cross_rate("EUR", "EUR"), Some(dec!(1)));
        assert_eq!(table.cross_rate("EUR", "XXX"), None);
    }
}
