use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Number;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

use crate::core::config::ExchangeRateApiConfig;
use crate::core::rates::{RateProvider, RateTable};

/// Rate provider backed by the exchangerate-api.com v6 `latest` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: String,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &ExchangeRateApiConfig) -> Self {
        Self::new(&config.base_url, &config.api_key)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    base_code: Option<String>,
    #[serde(default)]
    conversion_rates: HashMap<String, Number>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

/// Reads a JSON number as a decimal from its shortest textual form, so
/// `0.9215` stays `0.9215` instead of the nearest binary fraction.
fn parse_rate(value: &Number) -> Option<Decimal> {
    let text = value.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        // The key is part of the path, keep it out of the logs
        debug!("Requesting latest rates from {}", self.base_url);
        let url = format!("{}/v6/{}/latest/{}", self.base_url, self.api_key, base);

        let client = reqwest::Client::builder()
            .user_agent(concat!("fxconv/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base currency: {}", e.without_url(), base))?;

        let status = response.status();
        debug!(%status, "Received exchange rate response");
        let text = response.text().await?;
        let parsed = serde_json::from_str::<LatestRatesResponse>(&text);

        if !status.is_success() {
            return Err(match parsed.ok().and_then(|data| data.error_type) {
                Some(error_type) => anyhow!(
                    "Provider error: {} for base currency: {}",
                    error_type,
                    base
                ),
                None => anyhow!("HTTP error: {} for base currency: {}", status, base),
            });
        }

        let data = parsed
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", base, e))?;

        if data.result != "success" {
            return Err(anyhow!(
                "Provider error: {} for base currency: {}",
                data.error_type.as_deref().unwrap_or("unknown"),
                base
            ));
        }

        let rates = data
            .conversion_rates
            .into_iter()
            .filter_map(|(code, value)| match parse_rate(&value) {
                Some(rate) => Some((code, rate)),
                None => {
                    warn!(currency = %code, %value, "Skipping unreadable exchange rate");
                    None
                }
            });
        let table = RateTable::from_rates(data.base_code.as_deref().unwrap_or(base), rates);
        if table.is_empty() {
            return Err(anyhow!("No rate data found for base currency: {}", base));
        }

        Ok(table)
    }
}
