pub mod app;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::app::{Controller, Settings};
use crate::core::config::AppConfig;
use crate::core::currency::CurrencyCode;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Interactive,
    Convert {
        amount: String,
        from: CurrencyCode,
        to: CurrencyCode,
    },
    Rates {
        base: CurrencyCode,
    },
    History {
        query: String,
    },
    Trend {
        from: Option<CurrencyCode>,
        to: Option<CurrencyCode>,
    },
}

/// Builds a controller wired to the configured provider and history file.
pub fn build_controller(config: &AppConfig) -> Result<Controller> {
    let provider = providers::from_config(&config.provider)?;
    let history_path = config.history_file_path()?;
    debug!("Using history file {}", history_path.display());
    let history = store::JsonFileHistory::new(history_path);

    let settings = Settings {
        currencies: config.currencies.clone(),
        precision: config.precision,
    };
    Ok(Controller::new(settings, provider, Box::new(history)))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let mut controller = build_controller(&config)?;
    match command {
        AppCommand::Interactive => cli::interactive::run(&mut controller).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&mut controller, &amount, from, to).await
        }
        AppCommand::Rates { base } => cli::rates::run(&mut controller, base).await,
        AppCommand::History { query } => {
            cli::history::run(&controller, &query);
            Ok(())
        }
        AppCommand::Trend { from, to } => {
            cli::trend::run(&controller, from.as_ref(), to.as_ref());
            Ok(())
        }
    }
}
