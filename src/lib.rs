pub mod cli;
pub mod core;
pub mod providers;

use crate::core::RatesView;
use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{debug, info};

pub enum AppCommand {
    /// Print one page of rates, or all of them.
    Show { date: Option<String>, all: bool },
    /// Browse rates interactively.
    Browse { date: Option<String> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("yafx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = Arc::new(providers::HttpRatesProvider::new(
        &config.providers.rates.base_url,
    )?);

    match command {
        AppCommand::Show { date, all } => {
            let date = date.as_deref().map(cli::parse_date).transpose()?;
            let mut view = RatesView::with_settings(
                provider,
                Arc::new(cli::ui::ConsoleNotifier),
                config.page_size,
                config.scroll_threshold,
            );
            cli::show::run(
                &mut view,
                date.as_deref(),
                all,
                config.columns,
                &mut std::io::stdout(),
            )
            .await
        }
        AppCommand::Browse { date } => {
            let date = date.as_deref().map(cli::parse_date).transpose()?;
            let options = cli::browse::SessionOptions::from_config(&config);
            cli::browse::run_session(
                provider,
                &options,
                date,
                BufReader::new(tokio::io::stdin()),
                std::io::stdout(),
            )
            .await
            .map(|_| ())
        }
    }
}
