pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::providers::ExchangeRateApiProvider;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Rates {
        filter: Vec<String>,
    },
    Convert {
        amount: String,
        from: Option<String>,
        to: Option<String>,
    },
    Session,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.providers.exchangerate_api.base_url,
        base_currency = %config.base_currency,
        "Loaded config"
    );

    let provider = ExchangeRateApiProvider::from_config(&config.providers.exchangerate_api);
    let mut stdout = std::io::stdout();

    match command {
        AppCommand::Rates { filter } => {
            cli::rates::run(&provider, &config.base_currency, &filter, &mut stdout).await
        }
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(
                &provider,
                &config,
                &amount,
                from.as_deref(),
                to.as_deref(),
                &mut stdout,
            )
            .await
        }
        AppCommand::Session => {
            let stdin = std::io::stdin();
            let mut session = cli::session::Session::new(&provider, &config, stdout);
            session.run(stdin.lock()).await
        }
    }
}
