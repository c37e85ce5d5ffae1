use clap::{Args, Subcommand};

use lyricsget::config::Config as AppConfig;
use lyricsget::error::Result;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the current configuration (without credentials) to the config file
    Save,
}

pub async fn execute(args: ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            println!("Current configuration:");
            println!("  genius_api_url: {}", config.genius_api_url);
            println!("  amalgama_url: {}", config.amalgama_url);
            println!("  http_timeout_seconds: {}", config.http_timeout_seconds);
            println!("  user_agent: {}", config.user_agent.as_deref().unwrap_or("(default)"));
            println!("  genius.client_id: {}", mask(&config.genius.client_id));
            println!("  genius.client_secret: {}", mask(&config.genius.client_secret));
            println!("  genius.access_token: {}", mask(&config.genius.access_token));
            println!("  sources:");
            for (name, id) in &config.sources {
                println!("    {} = {}", name, id);
            }
        },

        ConfigCommands::Path => {
            let config_path = AppConfig::config_path()?;
            println!("{}", config_path.display());
        },

        ConfigCommands::Save => {
            let config_path = AppConfig::config_path()?;
            let mut config = config.clone();
            config.genius = Default::default();
            config.save(&config_path)?;
            println!("✅ Configuration saved");
            println!("📁 Config file: {}", config_path.display());
        },
    }

    Ok(())
}

fn mask(value: &Option<String>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "(set)",
        _ => "(not set)",
    }
}
