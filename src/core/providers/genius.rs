//! Genius: search through the public API, then scrape the chosen song page.

use std::sync::{Arc, OnceLock};

use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::http::PageFetcher;
use crate::core::lyrics::LyricsRecord;
use crate::core::provider::{
    ensure_state, load_page, validate_input, FetchOutcome, FetchRequest, FetchState,
    LyricsProvider, PageRules, ProviderContext, ProviderKind,
};
use crate::core::registry::ProviderDescriptor;
use crate::core::selection::{DisambiguationContext, SearchCandidate};
use crate::error::{ConfigError, LyricsError, Result};

pub const ID: &str = "genius";

const TITLE_SEPARATOR: &str = "===============";

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ID,
        kind: ProviderKind::SearchThenSelect,
        factory: GeniusProvider::from_context,
    }
}

#[derive(Deserialize, Debug)]
struct SearchEnvelope {
    meta: SearchMeta,
    #[serde(default)]
    response: Option<SearchResponse>,
}

#[derive(Deserialize, Debug)]
struct SearchMeta {
    status: u16,
}

#[derive(Deserialize, Debug, Default)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize, Debug)]
struct SearchHit {
    result: HitResult,
}

#[derive(Deserialize, Debug)]
struct HitResult {
    title: String,
    primary_artist: PrimaryArtist,
    url: String,
    full_title: String,
}

#[derive(Deserialize, Debug)]
struct PrimaryArtist {
    name: String,
}

impl From<HitResult> for SearchCandidate {
    fn from(hit: HitResult) -> Self {
        SearchCandidate {
            artist: hit.primary_artist.name,
            song: hit.title,
            page_locator: hit.url,
            display_title: hit.full_title,
        }
    }
}

pub struct GeniusProvider {
    fetcher: Arc<dyn PageFetcher>,
    api_url: String,
    access_token: String,
    state: FetchState,
    page_content: Option<String>,
    lyrics: Option<LyricsRecord>,
}

impl GeniusProvider {
    pub fn new(fetcher: Arc<dyn PageFetcher>, api_url: &str, access_token: &str) -> Self {
        let api_url = if api_url.ends_with('/') {
            api_url.to_string()
        } else {
            format!("{}/", api_url)
        };

        Self {
            fetcher,
            api_url,
            access_token: access_token.to_string(),
            state: FetchState::Idle,
            page_content: None,
            lyrics: None,
        }
    }

    pub fn from_context(ctx: &ProviderContext) -> Result<Box<dyn LyricsProvider>> {
        let token = ctx
            .genius_access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingField {
                field: "genius.access_token".to_string(),
            })?;

        Ok(Box::new(Self::new(ctx.fetcher.clone(), &ctx.genius_api_url, token)))
    }

    /// Query the search API and keep the first half of the ranked hits.
    ///
    /// `None` means the API reported failure or found nothing.
    async fn search(&self, query: &str) -> Result<Option<Vec<SearchCandidate>>> {
        let url = format!("{}search", self.api_url);
        let page = self
            .fetcher
            .get(&url, &[("q", query), ("access_token", self.access_token.as_str())])
            .await?;

        let envelope: SearchEnvelope = match serde_json::from_str(&page.body) {
            Ok(envelope) => envelope,
            Err(e) if !page.is_ok() => {
                debug!("Search returned status {} with unreadable body: {}", page.status, e);
                return Ok(None);
            }
            Err(e) => {
                return Err(LyricsError::ParseFailed {
                    reason: format!("search response is not valid JSON: {}", e),
                }
                .into())
            }
        };

        if envelope.meta.status != 200 {
            debug!("Search API reported status {}", envelope.meta.status);
            return Ok(None);
        }

        let hits = envelope.response.unwrap_or_default().hits;
        if hits.is_empty() {
            return Ok(None);
        }

        let keep = valuable_count(hits.len());
        debug!("Search returned {} hits, keeping {}", hits.len(), keep);
        Ok(Some(
            hits.into_iter()
                .take(keep)
                .map(|hit| SearchCandidate::from(hit.result))
                .collect(),
        ))
    }

    async fn fetch_candidate(&mut self, candidate: &SearchCandidate) -> Result<FetchOutcome> {
        let rules = PageRules {
            not_found_sentinel: None,
            breaks_to_newlines: true,
        };
        let Some(content) = load_page(self.fetcher.as_ref(), &candidate.page_locator, rules).await?
        else {
            self.state = FetchState::Failed;
            return Ok(FetchOutcome::NotFound);
        };

        let lines = extract_lines(&content, &candidate.display_title);
        self.page_content = Some(content);

        let record = LyricsRecord::new(
            candidate.artist.clone(),
            candidate.song.clone(),
            lines.into_iter().map(|line| (line, String::new())),
            false,
            Some(candidate.page_locator.clone()),
        );
        info!("Fetched {} lines from {}", record.lines().len(), candidate.page_locator);

        self.lyrics = Some(record.clone());
        self.state = FetchState::Done;
        Ok(FetchOutcome::Lyrics(record))
    }
}

#[async_trait::async_trait]
impl LyricsProvider for GeniusProvider {
    fn id(&self) -> &'static str {
        ID
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::SearchThenSelect
    }

    fn source_url(&self) -> &str {
        &self.api_url
    }

    fn state(&self) -> FetchState {
        self.state
    }

    fn page_content(&self) -> Option<&str> {
        self.page_content.as_deref()
    }

    fn lyrics(&self) -> Option<&LyricsRecord> {
        self.lyrics.as_ref()
    }

    async fn request_lyrics(&mut self, request: FetchRequest<'_>) -> Result<FetchOutcome> {
        ensure_state(ID, self.state, &request)?;

        match request {
            FetchRequest::Search { artist, song } => {
                validate_input(artist, song)?;
                info!("Searching Genius for {} - {}", artist, song);

                match self.search(&format!("{} {}", artist, song)).await? {
                    Some(candidates) => {
                        self.state = FetchState::AwaitingSelection;
                        Ok(FetchOutcome::Disambiguation(DisambiguationContext::new(candidates)))
                    }
                    None => {
                        self.state = FetchState::Failed;
                        Ok(FetchOutcome::NotFound)
                    }
                }
            }
            FetchRequest::Continue(ctx) => {
                let candidate = ctx.selection()?.clone();
                self.fetch_candidate(&candidate).await
            }
        }
    }
}

/// Hits are ranked by relevance; only the upper half is worth offering.
/// A single hit is still offered.
fn valuable_count(hits: usize) -> usize {
    (hits / 2).max(1).min(hits)
}

fn lyrics_container_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| {
        Selector::parse(r#"div[data-lyrics-container="true"]"#).expect("valid lyrics container selector")
    })
}

/// Title header followed by the text of every lyrics container, one entry per line.
fn extract_lines(content: &str, display_title: &str) -> Vec<String> {
    let document = Html::parse_document(content);

    let mut text = format!("{}\n{}\n", display_title, TITLE_SEPARATOR);
    for container in document.select(lyrics_container_selector()) {
        text.extend(container.text());
    }

    text.split('\n').map(str::to_string).collect()
}
