use clap::Args;

use lyricsget::config::Config;
use lyricsget::core::{ProviderKind, ProviderRegistry};
use lyricsget::error::Result;

#[derive(Args)]
pub struct SourcesArgs {
    /// Also list registered providers no source name points to
    #[arg(long)]
    all: bool,
}

pub async fn execute(args: SourcesArgs, config: &Config, registry: &ProviderRegistry) -> Result<()> {
    println!("Available sources:");
    for (name, id) in &config.sources {
        let descriptor = registry.resolve_source(&config.sources, name)?;
        println!("  {:<16} -> {:<10} ({})", name, id, describe(descriptor.kind));
    }

    if args.all {
        let unmapped: Vec<&str> = registry
            .ids()
            .filter(|id| !config.sources.values().any(|mapped| mapped.as_str() == *id))
            .collect();
        if !unmapped.is_empty() {
            println!("\nRegistered but not configured: {}", unmapped.join(", "));
        }
    }

    Ok(())
}

fn describe(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Direct => "direct page, translated",
        ProviderKind::SearchThenSelect => "search, then pick a result",
    }
}
