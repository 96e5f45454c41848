use anyhow::Result;
use clap::{Parser, Subcommand};
use fxconv::core::currency::CurrencyCode;
use fxconv::core::log::init_logging;

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

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Interactive => fxconv::AppCommand::Interactive,
            Commands::Convert { amount, from, to } => {
                fxconv::AppCommand::Convert { amount, from, to }
            }
            Commands::Rates { base } => fxconv::AppCommand::Rates { base },
            Commands::History { query } => fxconv::AppCommand::History {
                query: query.join(" "),
            },
            Commands::Trend { from, to } => fxconv::AppCommand::Trend { from, to },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Start the interactive converter (default)
    Interactive,
    /// Convert an amount and log it to history
    Convert {
        /// Amount to convert, e.g. 100 or 12,5
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Source currency code
        from: CurrencyCode,
        /// Target currency code
        to: CurrencyCode,
    },
    /// Show exchange rates for a base currency
    Rates {
        /// Base currency code
        base: CurrencyCode,
    },
    /// Show logged conversions, newest first
    History {
        /// Case-insensitive filter on date, amount, currencies or result
        query: Vec<String>,
    },
    /// Show the daily mean of conversion results
    Trend {
        /// Only include conversions from this currency
        #[arg(long)]
        from: Option<CurrencyCode>,
        /// Only include conversions to this currency
        #[arg(long)]
        to: Option<CurrencyCode>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Interactive);
    let result = match command {
        Commands::Setup => fxconv::cli::setup::setup(),
        cmd => fxconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
