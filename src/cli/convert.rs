use super::ui;
use crate::core::config::AppConfig;
use crate::core::convert::parse_amount;
use crate::core::rates::RateProvider;
use crate::core::{Converter, Transaction};
use anyhow::Result;
use std::io::Write;
use tracing::debug;

/// Converts a single amount with freshly fetched rates.
pub async fn run<W: Write>(
    provider: &dyn RateProvider,
    config: &AppConfig,
    amount: &str,
    from: Option<&str>,
    to: Option<&str>,
    out: &mut W,
) -> Result<()> {
    // Reject bad input before hitting the network
    parse_amount(amount)?;

    let mut converter = Converter::new(
        from.unwrap_or(&config.default_from),
        to.unwrap_or(&config.default_to),
    );
    converter.set_amount(amount);
    debug!(selection = ?converter.selection(), "Converting");

    let base = &config.base_currency;
    super::with_spinner(
        &format!("Fetching exchange rates for {base}"),
        converter.load_rates(provider, base),
    )
    .await?;

    let transaction = converter.convert()?;
    print_result(&transaction, out)?;
    Ok(())
}

pub fn print_result<W: Write>(transaction: &Transaction, out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "{} {}",
        ui::style_text("Converted Amount:", ui::StyleType::Label),
        ui::style_text(
            &format!("{:.2}", transaction.converted),
            ui::StyleType::Value
        )
    )?;
    writeln!(
        out,
        "{}",
        ui::style_text(&transaction.to_string(), ui::StyleType::Subtle)
    )
}
