//! Interactive conversion screen.
//!
//! Rates are fetched once when the session starts. The user then edits the
//! selected pair and amount, converts, and browses the most recent
//! conversions. Failures are reported inline and the session carries on.

use super::ui;
use crate::core::config::AppConfig;
use crate::core::rates::RateProvider;
use crate::core::{Converter, HISTORY_LIMIT, TransactionHistory};
use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

const CURRENCIES_PER_LINE: usize = 12;

const HELP: &str = "\
Commands:
  from <CODE>              select the source currency
  to <CODE>                select the target currency
  amount <N>               set the amount to convert
  convert, c               convert the current selection
  <N> [<FROM> [to] <TO>]   set the amount (and pair) and convert
  swap                     swap source and target currencies
  currencies, list         list available currencies
  history, h               show the last conversions
  refresh                  fetch exchange rates again
  help, ?                  show this help
  quit, exit, q            leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    From(String),
    To(String),
    Amount(String),
    Convert,
    QuickConvert {
        amount: String,
        pair: Option<(String, String)>,
    },
    Swap,
    Currencies,
    History,
    Refresh,
    Help,
    Quit,
}

fn is_connector(token: &str) -> bool {
    matches!(token, "to" | "in" | "->")
}

fn looks_like_amount(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let lowered: Vec<String> = tokens.iter().map(|t| t.to_ascii_lowercase()).collect();
    let keywords: Vec<&str> = lowered.iter().map(String::as_str).collect();

    let command = match keywords.as_slice() {
        [] => return Ok(None),
        ["from", _] => SessionCommand::From(tokens[1].to_string()),
        ["to", _] => SessionCommand::To(tokens[1].to_string()),
        ["amount"] => SessionCommand::Amount(String::new()),
        ["amount", _] => SessionCommand::Amount(tokens[1].to_string()),
        ["convert" | "c"] => SessionCommand::Convert,
        ["swap"] => SessionCommand::Swap,
        ["currencies" | "list"] => SessionCommand::Currencies,
        ["history" | "h"] => SessionCommand::History,
        ["refresh"] => SessionCommand::Refresh,
        ["help" | "?"] => SessionCommand::Help,
        ["quit" | "exit" | "q"] => SessionCommand::Quit,
        [amount] if looks_like_amount(amount) => SessionCommand::QuickConvert {
            amount: tokens[0].to_string(),
            pair: None,
        },
        [amount, from, to] | [amount, from, "to" | "in" | "->", to]
            if looks_like_amount(amount) && !is_connector(from) && !is_connector(to) =>
        {
            SessionCommand::QuickConvert {
                amount: tokens[0].to_string(),
                pair: Some((tokens[1].to_string(), tokens[tokens.len() - 1].to_string())),
            }
        }
        _ => {
            return Err(format!(
                "Unknown command: {}. Type 'help' for the list of commands",
                line.trim()
            ));
        }
    };
    Ok(Some(command))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<'a, W: Write> {
    converter: Converter,
    provider: &'a dyn RateProvider,
    base_currency: String,
    out: W,
}

impl<'a, W: Write> Session<'a, W> {
    pub fn new(provider: &'a dyn RateProvider, config: &AppConfig, out: W) -> Self {
        Session {
            converter: Converter::new(&config.default_from, &config.default_to),
            provider,
            base_currency: config.base_currency.clone(),
            out,
        }
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs the session until `quit` or end of input.
    pub async fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        writeln!(
            self.out,
            "{}",
            ui::style_text("Currency Converter", ui::StyleType::Title)
        )?;
        self.refresh().await?;
        self.print_selection()?;
        writeln!(
            self.out,
            "{}",
            ui::style_text("Type 'help' for the list of commands", ui::StyleType::Subtle)
        )?;

        self.prompt()?;
        for line in input.lines() {
            let line = line.context("Failed to read input")?;
            if self.handle_line(&line).await? == Flow::Quit {
                return Ok(());
            }
            self.prompt()?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match parse_command(line) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Ok(Flow::Continue),
            Err(message) => {
                self.notice(&message)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub async fn execute(&mut self, command: SessionCommand) -> Result<Flow> {
        debug!(?command, "Executing session command");
        match command {
            SessionCommand::From(code) => {
                if self.check_currency(&code)? {
                    self.converter.set_from(&code);
                    self.print_selection()?;
                }
            }
            SessionCommand::To(code) => {
                if self.check_currency(&code)? {
                    self.converter.set_to(&code);
                    self.print_selection()?;
                }
            }
            SessionCommand::Amount(amount) => {
                self.converter.set_amount(&amount);
                self.print_selection()?;
            }
            SessionCommand::Convert => {
                self.convert()?;
            }
            SessionCommand::QuickConvert { amount, pair } => {
                let known = match &pair {
                    Some((from, to)) => self.check_currency(from)? && self.check_currency(to)?,
                    None => true,
                };
                if !known {
                    return Ok(Flow::Continue);
                }
                let previous = self.converter.selection().clone();
                self.converter.set_amount(&amount);
                if let Some((from, to)) = pair {
                    self.converter.set_from(&from);
                    self.converter.set_to(&to);
                }
                if !self.convert()? {
                    self.converter.set_selection(previous);
                }
            }
            SessionCommand::Swap => {
                self.converter.swap();
                self.print_selection()?;
            }
            SessionCommand::Currencies => self.print_currencies()?,
            SessionCommand::History => self.print_history()?,
            SessionCommand::Refresh => self.refresh().await?,
            SessionCommand::Help => writeln!(self.out, "{HELP}")?,
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Fetches the rate table; a failure is reported and leaves the session usable.
    async fn refresh(&mut self) -> Result<()> {
        let base = self.base_currency.clone();
        let result = super::with_spinner(
            &format!("Fetching exchange rates for {base}"),
            self.converter.load_rates(self.provider, &base),
        )
        .await;

        match result {
            Ok(count) => writeln!(
                self.out,
                "{}",
                ui::style_text(
                    &format!("Loaded {count} currencies (base {base})"),
                    ui::StyleType::Subtle
                )
            )?,
            Err(e) => {
                warn!(error = %e, "Failed to fetch exchange rates");
                self.notice(&format!(
                    "Could not fetch exchange rates, try again with 'refresh'. {e}"
                ))?;
            }
        }
        Ok(())
    }

    /// Returns whether the conversion succeeded.
    fn convert(&mut self) -> Result<bool> {
        match self.converter.convert() {
            Ok(transaction) => {
                super::convert::print_result(&transaction, &mut self.out)?;
                Ok(true)
            }
            Err(e) => {
                self.notice(&e.to_string())?;
                Ok(false)
            }
        }
    }

    /// Unknown codes are only rejected once rates are available.
    fn check_currency(&mut self, code: &str) -> Result<bool> {
        let rates = self.converter.rates();
        let normalized = crate::core::convert::normalize_code(code);
        if rates.is_empty() || rates.contains(&normalized) {
            return Ok(true);
        }
        self.notice(&format!("Unknown currency: {normalized}"))?;
        Ok(false)
    }

    fn print_selection(&mut self) -> Result<()> {
        let selection = self.converter.selection();
        let amount = if selection.amount.is_empty() {
            "--".to_string()
        } else {
            selection.amount.clone()
        };
        let converted = self
            .converter
            .converted_amount()
            .map_or("--".to_string(), |v| format!("{v:.2}"));
        let line = format!(
            "{} → {} | Amount: {} | Converted Amount: {}",
            selection.from, selection.to, amount, converted
        );
        writeln!(self.out, "{}", ui::style_text(&line, ui::StyleType::Label))?;
        Ok(())
    }

    fn print_currencies(&mut self) -> Result<()> {
        let currencies = self.converter.currencies();
        if currencies.is_empty() {
            return self.notice("No currencies loaded, type 'refresh' to fetch rates");
        }
        for chunk in currencies.chunks(CURRENCIES_PER_LINE) {
            writeln!(self.out, "{}", chunk.join(" "))?;
        }
        Ok(())
    }

    fn print_history(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "\n{}",
            ui::style_text(
                &format!("Last {HISTORY_LIMIT} Transactions"),
                ui::StyleType::Title
            )
        )?;
        let history = self.converter.history();
        if history.is_empty() {
            writeln!(
                self.out,
                "{}",
                ui::style_text("No transactions yet", ui::StyleType::Subtle)
            )?;
            return Ok(());
        }
        let table = build_history_table(history);
        writeln!(self.out, "{table}")?;
        Ok(())
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        writeln!(
            self.out,
            "{} {}",
            ui::style_text("Error:", ui::StyleType::Error),
            message
        )?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }
}

pub fn build_history_table(history: &TransactionHistory) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("From"),
        ui::header_cell("Amount"),
        ui::header_cell("To"),
        ui::header_cell("Converted"),
    ]);
    for transaction in history.iter() {
        table.add_row(vec![
            Cell::new(transaction.date.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&transaction.from),
            ui::amount_cell(transaction.amount),
            Cell::new(&transaction.to),
            ui::converted_cell(transaction.converted),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateTable;
    use crate::core::config::{ExchangeRateApiConfig, ProvidersConfig};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockRateProvider {
        failures_left: AtomicUsize,
    }

    impl MockRateProvider {
        fn failing(times: usize) -> Self {
            Self {
                failures_left: AtomicUsize::new(times),
            }
        }
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(anyhow!("Request error: connection refused"));
            }
            let mut rates = RateTable::new(base);
            rates.insert("USD", dec!(1));
            rates.insert("EUR", dec!(0.5));
            rates.insert("GBP", dec!(0.25));
            Ok(rates)
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            providers: ProvidersConfig {
                exchangerate_api: ExchangeRateApiConfig {
                    base_url: "http://localhost".to_string(),
                    api_key: "key".to_string(),
                },
            },
            base_currency: "USD".to_string(),
            default_from: "USD".to_string(),
            default_to: "EUR".to_string(),
        }
    }

    async fn run_session(provider: &MockRateProvider, input: &str) -> (String, Converter) {
        console::set_colors_enabled(false);
        let config = config();
        let mut session = Session::new(provider, &config, Vec::new());
        session.run(input.as_bytes()).await.unwrap();
        let Session { converter, out, .. } = session;
        (String::from_utf8(out).unwrap(), converter)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("from eur"),
            Ok(Some(SessionCommand::From("eur".to_string())))
        );
        assert_eq!(
            parse_command("TO gbp"),
            Ok(Some(SessionCommand::To("gbp".to_string())))
        );
        assert_eq!(
            parse_command("amount 12.5"),
            Ok(Some(SessionCommand::Amount("12.5".to_string())))
        );
        assert_eq!(
            parse_command("amount"),
            Ok(Some(SessionCommand::Amount(String::new())))
        );
        assert_eq!(parse_command("c"), Ok(Some(SessionCommand::Convert)));
        assert_eq!(parse_command("Exit"), Ok(Some(SessionCommand::Quit)));
        assert_eq!(parse_command("list"), Ok(Some(SessionCommand::Currencies)));
    }

    #[test]
    fn test_parse_quick_convert() {
        assert_eq!(
            parse_command("42"),
            Ok(Some(SessionCommand::QuickConvert {
                amount: "42".to_string(),
                pair: None
            }))
        );
        let expected = Ok(Some(SessionCommand::QuickConvert {
            amount: "100".to_string(),
            pair: Some(("usd".to_string(), "EUR".to_string())),
        }));
        assert_eq!(parse_command("100 usd EUR"), expected);
        assert_eq!(parse_command("100 usd to EUR"), expected);
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = parse_command("histroy").unwrap_err();
        assert!(err.starts_with("Unknown command: histroy"));
        assert!(parse_command("100 usd").is_err());

        let err = parse_command("100 usd to").unwrap_err();
        assert!(err.starts_with("Unknown command: 100 usd to"));
        assert!(parse_command("100 to eur").is_err());
        assert!(parse_command("100 usd in ->").is_err());
    }

    #[tokio::test]
    async fn test_session_converts_and_shows_history() {
        let provider = MockRateProvider::failing(0);
        let input = "amount 10\nconvert\n4 GBP USD\nhistory\nquit\n";
        let (output, converter) = run_session(&provider, input).await;

        assert!(output.contains("Currency Converter"));
        assert!(output.contains("Loaded 3 currencies (base USD)"));
        assert!(output.contains("USD → EUR | Amount: -- | Converted Amount: --"));
        assert!(output.contains("USD → EUR | Amount: 10 | Converted Amount: --"));
        assert!(output.contains("10 USD → 5.00 EUR"));
        assert!(output.contains("4 GBP → 16.00 USD"));
        assert!(output.contains("Last 5 Transactions"));

        let pairs: Vec<(&str, &str)> = converter
            .history()
            .iter()
            .map(|t| (t.from.as_str(), t.to.as_str()))
            .collect();
        assert_eq!(pairs, vec![("GBP", "USD"), ("USD", "EUR")]);
    }

    #[tokio::test]
    async fn test_session_empty_amount_is_reported() {
        let provider = MockRateProvider::failing(0);
        let (output, converter) = run_session(&provider, "convert\n").await;

        assert!(output.contains("Error: Enter a valid amount"));
        assert!(converter.history().is_empty());
        assert!(converter.converted_amount().is_none());
    }

    #[tokio::test]
    async fn test_session_keeps_last_five() {
        let provider = MockRateProvider::failing(0);
        let input: String = (1..=7).map(|n| format!("{n}\n")).collect();
        let (_, converter) = run_session(&provider, &input).await;

        let amounts: Vec<String> = converter
            .history()
            .iter()
            .map(|t| t.amount.to_string())
            .collect();
        assert_eq!(amounts, vec!["7", "6", "5", "4", "3"]);
    }

    #[tokio::test]
    async fn test_session_recovers_after_failed_fetch() {
        let provider = MockRateProvider::failing(1);
        let input = "5\nrefresh\n5\n";
        let (output, converter) = run_session(&provider, input).await;

        assert!(output.contains("Error: Could not fetch exchange rates"));
        assert!(output.contains("Error: Unknown currency: USD"));
        assert!(output.contains("Loaded 3 currencies (base USD)"));
        assert!(output.contains("5 USD → 2.50 EUR"));
        assert_eq!(converter.history().len(), 1);
    }

    #[tokio::test]
    async fn test_session_rejects_unknown_selection() {
        let provider = MockRateProvider::failing(0);
        let (output, converter) = run_session(&provider, "to xyz\nswap\n").await;

        assert!(output.contains("Error: Unknown currency: XYZ"));
        assert_eq!(converter.selection().from, "EUR");
        assert_eq!(converter.selection().to, "USD");
    }

    #[tokio::test]
    async fn test_failed_quick_convert_keeps_selection() {
        let provider = MockRateProvider::failing(0);
        let input = "to xyz\n5 usd xyz\n100 usd to\n-5 gbp usd\n5\n";
        let (output, converter) = run_session(&provider, input).await;

        assert!(output.contains("Error: Unknown currency: XYZ"));
        assert!(output.contains("Error: Unknown command: 100 usd to"));
        assert!(output.contains("Error: Invalid amount: -5"));
        assert!(output.contains("5 USD → 2.50 EUR"));

        assert_eq!(converter.selection().from, "USD");
        assert_eq!(converter.selection().to, "EUR");
        assert_eq!(converter.selection().amount, "5");
        assert_eq!(converter.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_quick_convert_without_rates_keeps_selection() {
        let provider = MockRateProvider::failing(1);
        let (output, converter) = run_session(&provider, "5 gbp usd\n").await;

        assert!(output.contains("Error: Unknown currency: GBP"));
        assert_eq!(converter.selection().from, "USD");
        assert_eq!(converter.selection().to, "EUR");
        assert!(converter.selection().amount.is_empty());
    }

    #[tokio::test]
    async fn test_session_lists_currencies_and_help() {
        let provider = MockRateProvider::failing(0);
        let (output, _) = run_session(&provider, "currencies\nhelp\nbogus\n").await;

        assert!(output.contains("EUR GBP USD"));
        assert!(output.contains("Commands:"));
        assert!(output.contains("Error: Unknown command: bogus"));
    }
}
