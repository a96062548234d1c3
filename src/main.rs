use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tickcorr::core::log::init_logging;

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

impl From<Commands> for tickcorr::AppCommand {
    fn from(cmd: Commands) -> tickcorr::AppCommand {
        match cmd {
            Commands::Symbols => tickcorr::AppCommand::Symbols,
            Commands::Stats { symbol, minutes } => tickcorr::AppCommand::Stats { symbol, minutes },
            Commands::Correlate { symbols, minutes } => {
                tickcorr::AppCommand::Correlate { symbols, minutes }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List available symbols
    Symbols,
    /// Display price statistics for one symbol
    Stats {
        symbol: String,
        /// Window size in minutes
        #[arg(short, long)]
        minutes: Option<u32>,
    },
    /// Display the pairwise correlation matrix
    Correlate {
        /// Symbols to compare; defaults to the configured or full list
        symbols: Vec<String>,
        /// Window size in minutes
        #[arg(short, long)]
        minutes: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => tickcorr::cli::setup::setup(),
        Some(cmd) => tickcorr::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
