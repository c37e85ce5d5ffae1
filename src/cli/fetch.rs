use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use lyricsget::config::Config;
use lyricsget::core::http::HttpFetcher;
use lyricsget::core::{
    DisambiguationContext, FetchOutcome, FetchRequest, LyricsProvider, LyricsRecord,
    ProviderRegistry,
};
use lyricsget::error::{LyricsGetError, Result};

#[derive(Args)]
pub struct FetchArgs {
    /// "Artist - Song"
    #[arg(value_name = "QUERY", required_unless_present_all = ["artist", "song"])]
    query: Option<String>,

    /// Artist name
    #[arg(short, long)]
    artist: Option<String>,

    /// Song title
    #[arg(short = 't', long)]
    song: Option<String>,

    /// Source name from the [sources] table
    #[arg(short, long, default_value = "amalgama")]
    source: String,

    /// Candidate number to take when the source offers several matches
    #[arg(short, long)]
    pick: Option<String>,

    /// Write lyrics to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn execute(args: FetchArgs, config: &Config, registry: &ProviderRegistry) -> Result<()> {
    let (artist, song) = resolve_query(&args)?;

    let descriptor = registry.resolve_source(&config.sources, &args.source)?;
    let settings = config.http_settings();
    let fetcher = Arc::new(HttpFetcher::new(&settings)?);
    let legacy_fetcher = Arc::new(HttpFetcher::legacy_tls(&settings)?);
    let mut provider = descriptor.create(&config.provider_context(fetcher, legacy_fetcher))?;

    info!("🔍 Searching {} for {} - {}", args.source, artist, song);
    let outcome = match provider.request_lyrics(FetchRequest::search(&artist, &song)).await {
        Err(e) if e.is_upstream_protocol() => {
            report_unavailable(&args.source, &e);
            return Ok(());
        }
        other => other?,
    };

    let record = match outcome {
        FetchOutcome::Lyrics(record) => record,
        FetchOutcome::NotFound => {
            println!("Sorry, nothing was found. Check that the song title and artist name are spelled correctly");
            return Ok(());
        }
        FetchOutcome::Disambiguation(ctx) => {
            match continue_with_choice(provider.as_mut(), ctx, args.pick.as_deref(), &args.source).await? {
                Some(record) => record,
                None => return Ok(()),
            }
        }
    };

    emit(&record, args.output.as_deref())
}

async fn continue_with_choice(
    provider: &mut dyn LyricsProvider,
    mut ctx: DisambiguationContext,
    pick: Option<&str>,
    source: &str,
) -> Result<Option<LyricsRecord>> {
    if ctx.is_empty() {
        println!("Sorry, nothing was found. Check that the song title and artist name are spelled correctly");
        return Ok(None);
    }

    println!("Top results:\n\n{}", ctx.format_choices());
    let reply = match pick {
        Some(pick) => pick.to_string(),
        None => prompt_choice(ctx.len()).await?,
    };
    ctx.select_choice(&reply)?;

    match provider.request_lyrics(FetchRequest::Continue(&ctx)).await {
        Ok(FetchOutcome::Lyrics(record)) => Ok(Some(record)),
        Ok(FetchOutcome::NotFound) => {
            println!("Sorry, but something went wrong loading that page. Please try again");
            Ok(None)
        }
        Ok(FetchOutcome::Disambiguation(_)) => Err(LyricsGetError::Internal(anyhow::anyhow!(
            "Provider {} asked for a second disambiguation round",
            provider.id()
        ))),
        Err(e) if e.is_upstream_protocol() => {
            report_unavailable(source, &e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn prompt_choice(count: usize) -> Result<String> {
    println!("Pick a result [1-{}]:", count);
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line)
}

fn report_unavailable(source: &str, err: &LyricsGetError) {
    warn!("{}", err);
    println!(
        "Sorry, {} is not accepting connections right now. Try again later or choose another source",
        source
    );
}

fn emit(record: &LyricsRecord, output: Option<&std::path::Path>) -> Result<()> {
    match output {
        Some(path) => {
            record.export_to_file(path)?;
            println!("✅ Saved {} - {} to {}", record.artist(), record.song(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            record.export_to_writer(&mut stdout.lock())?;
            println!();
        }
    }
    Ok(())
}

fn resolve_query(args: &FetchArgs) -> Result<(String, String)> {
    if let (Some(artist), Some(song)) = (&args.artist, &args.song) {
        return Ok((artist.trim().to_string(), song.trim().to_string()));
    }

    let query = args.query.as_deref().unwrap_or_default();
    parse_query(query)
}

/// Split `"Artist - Song"` at the first hyphen.
fn parse_query(query: &str) -> Result<(String, String)> {
    let (artist, song) = query.split_once('-').ok_or_else(|| {
        LyricsGetError::Validation(format!(
            "Expected \"Artist - Song\", got \"{}\"",
            query
        ))
    })?;
    Ok((artist.trim().to_string(), song.trim().to_string()))
}
