use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use yafx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Print rates for a date, or the latest available
    Show {
        /// Date to show rates for (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// Print every rate instead of the first page
        #[arg(short, long)]
        all: bool,
    },
    /// Browse rates interactively
    Browse {
        /// Date to open at (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => yafx::cli::setup::setup(),
        Some(Commands::Show { date, all }) => {
            yafx::run_command(
                yafx::AppCommand::Show { date, all },
                cli.config_path.as_deref(),
            )
            .await
        }
        Some(Commands::Browse { date }) => {
            yafx::run_command(
                yafx::AppCommand::Browse { date },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
