use clap::{Parser, Subcommand};

mod cli;

use lyricsget::config::Config;
use lyricsget::core::ProviderRegistry;
use lyricsget::error::{LyricsGetError, Result};
use lyricsget::utils;

#[derive(Parser)]
#[command(name = "lyricsget")]
#[command(about = "Command-line utility for fetching song lyrics from web sources")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch lyrics for one song
    Fetch(cli::fetch::FetchArgs),

    /// List configured lyrics sources
    Sources(cli::sources::SourcesArgs),

    /// Show configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::init_logging(cli.verbose).map_err(LyricsGetError::Internal)?;

    let config = Config::load(cli.config.as_deref())?;
    let registry = ProviderRegistry::builtin();

    match cli.command {
        Commands::Fetch(args) => {
            config.validate(&registry)?;
            cli::fetch::execute(args, &config, &registry).await
        }
        Commands::Sources(args) => {
            config.validate(&registry)?;
            cli::sources::execute(args, &config, &registry).await
        }
        Commands::Config(args) => cli::config::execute(args, &config).await,
    }
}
