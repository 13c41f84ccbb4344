//! Amount conversion between two currencies of a rate table

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

use super::rates::RateTable;

/// Number of decimal places a converted amount is rounded to.
pub const RESULT_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Enter a valid amount")]
    EmptyAmount,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

/// Normalizes user supplied currency codes, e.g. ` eur` becomes `EUR`.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Parses the amount text as entered by the user.
pub fn parse_amount(text: &str) -> Result<Decimal, ConversionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::EmptyAmount);
    }

    let amount = Decimal::from_str(trimmed)
        .map_err(|_| ConversionError::InvalidAmount(trimmed.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ConversionError::InvalidAmount(trimmed.to_string()));
    }
    Ok(amount)
}

/// Converts `amount` of `from` into `to` using the cross rate of `rates`,
/// rounded half away from zero to [`RESULT_SCALE`] places.
pub fn convert(
    amount: Decimal,
    from: &str,
    to: &str,
    rates: &RateTable,
) -> Result<Decimal, ConversionError> {
    let from_rate = rates
        .get(from)
        .ok_or_else(|| ConversionError::UnknownCurrency(from.to_string()))?;
    let to_rate = rates
        .get(to)
        .ok_or_else(|| ConversionError::UnknownCurrency(to.to_string()))?;

    // Multiply first so that converting a currency into itself is exact.
    let converted = amount
        .checked_mul(to_rate)
        .and_then(|v| v.checked_div(from_rate))
        .ok_or_else(|| ConversionError::OutOfRange(amount.to_string()))?;

    Ok(converted.round_dp_with_strategy(RESULT_SCALE, RoundingStrategy::MidpointAwayFromZero))
}
