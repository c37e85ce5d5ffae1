//! The lyrics provider abstraction and its two-phase fetch protocol.
//!
//! Phase 1 (`FetchRequest::Search`) either finishes the fetch or hands back a
//! [`DisambiguationContext`]. Phase 2 (`FetchRequest::Continue`) fetches the
//! page of the candidate the caller selected.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;

use crate::core::http::PageFetcher;
use crate::core::lyrics::LyricsRecord;
use crate::core::selection::DisambiguationContext;
use crate::error::{LyricsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest<'a> {
    Search { artist: &'a str, song: &'a str },
    Continue(&'a DisambiguationContext),
}

impl<'a> FetchRequest<'a> {
    pub fn search(artist: &'a str, song: &'a str) -> Self {
        FetchRequest::Search { artist, song }
    }
}

/// Result of one protocol step. "Nothing found" is a normal outcome, not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Lyrics(LyricsRecord),
    Disambiguation(DisambiguationContext),
    NotFound,
}

impl FetchOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchOutcome::NotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    AwaitingSelection,
    Done,
    Failed,
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchState::Idle => "idle",
            FetchState::AwaitingSelection => "awaiting selection",
            FetchState::Done => "done",
            FetchState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Whether a provider goes straight to a page or searches first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Direct,
    SearchThenSelect,
}

#[async_trait::async_trait]
pub trait LyricsProvider: Send {
    fn id(&self) -> &'static str;

    fn kind(&self) -> ProviderKind;

    /// Base endpoint the provider talks to.
    fn source_url(&self) -> &str;

    fn state(&self) -> FetchState;

    /// Last page loaded, after provider-specific normalization.
    fn page_content(&self) -> Option<&str>;

    /// Record produced by the last successful fetch.
    fn lyrics(&self) -> Option<&LyricsRecord>;

    /// Run one step of the fetch protocol.
    ///
    /// Taking `&mut self` keeps one instance to a single in-flight request.
    async fn request_lyrics(&mut self, request: FetchRequest<'_>) -> Result<FetchOutcome>;
}

/// Shared dependencies handed to provider factories.
#[derive(Clone)]
pub struct ProviderContext {
    pub fetcher: Arc<dyn PageFetcher>,
    /// Transport for scraped sites that still need legacy TLS.
    pub legacy_fetcher: Arc<dyn PageFetcher>,
    pub genius_api_url: String,
    pub genius_access_token: Option<String>,
    pub amalgama_url: String,
}

pub fn validate_input(artist: &str, song: &str) -> Result<()> {
    if artist.is_empty() || song.is_empty() {
        return Err(LyricsError::BadArgument.into());
    }
    Ok(())
}

/// Reject a request that does not fit the provider's current state.
pub fn ensure_state(
    provider: &'static str,
    state: FetchState,
    request: &FetchRequest<'_>,
) -> Result<()> {
    let (allowed, action) = match request {
        FetchRequest::Search { .. } => (state == FetchState::Idle, "search"),
        FetchRequest::Continue(_) => (state == FetchState::AwaitingSelection, "continue"),
    };
    if allowed {
        Ok(())
    } else {
        Err(LyricsError::InvalidState {
            provider,
            action,
            state: state.to_string(),
        }
        .into())
    }
}

/// How [`load_page`] treats a response body.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRules<'a> {
    /// Text that marks a "document not found" page served with status 200.
    pub not_found_sentinel: Option<&'a str>,
    /// Turn `<br>` tags into newlines before parsing.
    pub breaks_to_newlines: bool,
}

/// GET `url` and return its normalized body, or `None` when the page is
/// missing (non-200 status or sentinel text in the body).
pub async fn load_page(
    fetcher: &dyn PageFetcher,
    url: &str,
    rules: PageRules<'_>,
) -> Result<Option<String>> {
    let page = fetcher.get(url, &[]).await?;
    if !page.is_ok() {
        debug!("Page {} returned status {}", url, page.status);
        return Ok(None);
    }

    if let Some(sentinel) = rules.not_found_sentinel {
        if page.body.contains(sentinel) {
            debug!("Page {} is a not-found placeholder", url);
            return Ok(None);
        }
    }

    let body = if rules.breaks_to_newlines {
        breaks_to_newlines(&page.body)
    } else {
        page.body
    };
    Ok(Some(body))
}

fn breaks_to_newlines(html: &str) -> String {
    static BR: OnceLock<Regex> = OnceLock::new();
    let br = BR.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid <br> pattern"));
    br.replace_all(html, "\n").into_owned()
}
