use super::ui;
use crate::core::RateTable;
use crate::core::convert::normalize_code;
use crate::core::rates::RateProvider;
use anyhow::Result;
use comfy_table::Table;
use std::io::Write;

/// Fetches the rate table for `base` and prints it, optionally limited to `filter`.
pub async fn run<W: Write>(
    provider: &dyn RateProvider,
    base: &str,
    filter: &[String],
    out: &mut W,
) -> Result<()> {
    let rates = super::with_spinner(
        &format!("Fetching exchange rates for {base}"),
        provider.fetch_rates(base),
    )
    .await?;

    writeln!(
        out,
        "\n{}",
        ui::style_text(
            &format!("Exchange rates (base {})", rates.base()),
            ui::StyleType::Title
        )
    )?;
    writeln!(out, "{}", build_rates_table(&rates, filter))?;
    Ok(())
}

/// One row per currency with its rate against the base and the inverse.
/// Requested codes missing from the table are shown as N/A.
pub fn build_rates_table(rates: &RateTable, filter: &[String]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {}", rates.base())),
        ui::header_cell(&format!("In {}", rates.base())),
    ]);

    let codes: Vec<String> = if filter.is_empty() {
        rates.codes().map(str::to_string).collect()
    } else {
        filter.iter().map(|code| normalize_code(code)).collect()
    };

    for code in codes {
        match rates.get(&code) {
            Some(rate) => {
                let inverse = rates
                    .cross_rate(&code, rates.base())
                    .map_or_else(ui::na_cell, |r| ui::amount_cell(r.round_dp(6)));
                table.add_row(vec![code.into(), ui::amount_cell(rate), inverse]);
            }
            None => {
                table.add_row(vec![code.into(), ui::na_cell(), ui::na_cell()]);
            }
        }
    }
    table
}
