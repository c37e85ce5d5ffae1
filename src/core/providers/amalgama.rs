//! Amalgama: dual-language lyrics pages at a URL derived from artist and song.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::core::http::PageFetcher;
use crate::core::lyrics::LyricsRecord;
use crate::core::provider::{
    ensure_state, load_page, validate_input, FetchOutcome, FetchRequest, FetchState,
    LyricsProvider, PageRules, ProviderContext, ProviderKind,
};
use crate::core::registry::ProviderDescriptor;
use crate::error::{LyricsError, Result};

pub const ID: &str = "amalgama";

/// The site answers unknown songs with a regular 200 page carrying this text.
pub const NOT_FOUND_SENTINEL: &str = "Извините, запрашиваемый документ не найден или не существует. Попробуйте воспользоваться нашим поиском!";

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ID,
        kind: ProviderKind::Direct,
        factory: AmalgamaProvider::from_context,
    }
}

pub struct AmalgamaProvider {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    state: FetchState,
    page_content: Option<String>,
    lyrics: Option<LyricsRecord>,
}

impl AmalgamaProvider {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: &str) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Self {
            fetcher,
            base_url,
            state: FetchState::Idle,
            page_content: None,
            lyrics: None,
        }
    }

    pub fn from_context(ctx: &ProviderContext) -> Result<Box<dyn LyricsProvider>> {
        Ok(Box::new(Self::new(ctx.legacy_fetcher.clone(), &ctx.amalgama_url)))
    }

    async fn fetch(&mut self, artist: &str, song: &str) -> Result<FetchOutcome> {
        let url = song_url(&self.base_url, artist, song)?;
        info!("Fetching Amalgama page {}", url);

        let rules = PageRules {
            not_found_sentinel: Some(NOT_FOUND_SENTINEL),
            breaks_to_newlines: false,
        };
        let Some(content) = load_page(self.fetcher.as_ref(), &url, rules).await? else {
            self.state = FetchState::Failed;
            return Ok(FetchOutcome::NotFound);
        };

        let pairs = extract_pairs(&content);
        self.page_content = Some(content);

        if pairs.is_empty() {
            debug!("No translation blocks on {}", url);
            self.state = FetchState::Failed;
            return Ok(FetchOutcome::NotFound);
        }

        let record = LyricsRecord::new(artist, song, pairs, true, Some(url));
        self.lyrics = Some(record.clone());
        self.state = FetchState::Done;
        Ok(FetchOutcome::Lyrics(record))
    }
}

#[async_trait::async_trait]
impl LyricsProvider for AmalgamaProvider {
    fn id(&self) -> &'static str {
        ID
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Direct
    }

    fn source_url(&self) -> &str {
        &self.base_url
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
            FetchRequest::Search { artist, song } => self.fetch(artist, song).await,
            // Never awaits a selection, so ensure_state has already refused this.
            FetchRequest::Continue(_) => Err(LyricsError::InvalidState {
                provider: ID,
                action: "continue",
                state: self.state.to_string(),
            }
            .into()),
        }
    }
}

/// Path segment rule: every run of ASCII punctuation, typographic apostrophes
/// or whitespace becomes one `_`, then the whole string is lower-cased.
pub fn normalize_segment(value: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let separators =
        SEPARATORS.get_or_init(|| Regex::new(r"[[:punct:]\s‘’]+").expect("valid separator pattern"));
    separators.replace_all(value, "_").to_lowercase()
}

/// `{base}{first letter of artist}/{artist}/{song}.html`, segments normalized
/// with [`normalize_segment`].
pub fn song_url(base_url: &str, artist: &str, song: &str) -> Result<String> {
    validate_input(artist, song)?;
    let artist = normalize_segment(artist);
    let song = normalize_segment(song);

    let bucket = artist.chars().next().ok_or(LyricsError::BadArgument)?;
    Ok(format!("{}{}/{}/{}.html", base_url, bucket, artist, song))
}

struct PageSelectors {
    block: Selector,
    original: Selector,
    translate: Selector,
    heading: Selector,
}

fn selectors() -> &'static PageSelectors {
    static SELECTORS: OnceLock<PageSelectors> = OnceLock::new();
    SELECTORS.get_or_init(|| PageSelectors {
        block: Selector::parse("div.string_container").expect("valid block selector"),
        original: Selector::parse("div.original").expect("valid original selector"),
        translate: Selector::parse("div.translate").expect("valid translate selector"),
        heading: Selector::parse("strong").expect("valid heading selector"),
    })
}

/// Original/translation pairs in page order, up to the first block carrying a
/// `<strong>` heading. Pages with several translations start each extra one
/// with such a block.
fn extract_pairs(content: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(content);
    let selectors = selectors();

    let mut pairs = Vec::new();
    for block in document.select(&selectors.block) {
        let original = block.select(&selectors.original).next();
        let translate = block.select(&selectors.translate).next();

        let is_heading = [original, translate]
            .iter()
            .flatten()
            .any(|segment| segment.select(&selectors.heading).next().is_some());
        if is_heading {
            break;
        }

        pairs.push((segment_text(original), segment_text(translate)));
    }
    pairs
}

fn segment_text(segment: Option<ElementRef<'_>>) -> String {
    segment
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::mock::{ScriptedFetcher, TlsFailingFetcher};
    use crate::error::LyricsGetError;

    const BASE: &str = "https://www.amalgama-lab.com/songs/";

    fn block(original: &str, translate: &str) -> String {
        format!(
            r#"<div class="string_container"><div class="original">{}</div><div class="translate">{}</div></div>"#,
            original, translate
        )
    }

    fn page(blocks: &[String]) -> String {
        format!("<html><body><div id=\"click_area\">{}</div></body></html>", blocks.concat())
    }

    #[test]
    fn test_song_url_normalization() {
        assert_eq!(
            song_url(BASE, "Guns N' Roses", "November Rain").unwrap(),
            "https://www.amalgama-lab.com/songs/g/guns_n_roses/november_rain.html"
        );
        assert_eq!(
            song_url(BASE, "AC/DC", "Highway to Hell").unwrap(),
            "https://www.amalgama-lab.com/songs/a/ac_dc/highway_to_hell.html"
        );
    }

    #[test]
    fn test_typographic_apostrophe() {
        assert_eq!(normalize_segment("Guns N’ Roses"), "guns_n_roses");
        assert_eq!(
            song_url(BASE, "Guns N’ Roses", "Don‘t Cry").unwrap(),
            "https://www.amalgama-lab.com/songs/g/guns_n_roses/don_t_cry.html"
        );
    }

    #[test]
    fn test_song_url_rejects_empty_input() {
        assert!(matches!(
            song_url(BASE, "", "November Rain"),
            Err(LyricsGetError::Lyrics(LyricsError::BadArgument))
        ));
    }

    #[test]
    fn test_extract_pairs_stops_at_heading() {
        let content = page(&[
            block("Take me down", "Отвези меня"),
            block("To the paradise city", "В райский город"),
            block("<strong>Перевод 2</strong>", ""),
            block("Take me down", "Унеси меня"),
        ]);

        let pairs = extract_pairs(&content);
        assert_eq!(
            pairs,
            vec![
                ("Take me down".to_string(), "Отвези меня".to_string()),
                ("To the paradise city".to_string(), "В райский город".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_pairs_heading_in_translation() {
        let content = page(&[block("one", "один"), block("two", "<strong>два</strong>")]);
        assert_eq!(extract_pairs(&content).len(), 1);
    }

    #[tokio::test]
    async fn test_direct_fetch() {
        let url = "https://www.amalgama-lab.com/songs/s/scorpions/wind_of_change.html";
        let fetcher = ScriptedFetcher::new().with_page(
            url,
            200,
            &page(&[block("I follow the Moskva", "Я иду вдоль Москвы"), block("Down to Gorky Park", "К парку Горького")]),
        );
        let mut provider = AmalgamaProvider::new(Arc::new(fetcher), BASE);

        let outcome = provider
            .request_lyrics(FetchRequest::search("Scorpions", "Wind of Change"))
            .await
            .unwrap();
        let FetchOutcome::Lyrics(record) = outcome else {
            panic!("expected lyrics");
        };

        assert!(record.is_translated());
        assert_eq!(record.artist(), "Scorpions");
        assert_eq!(record.source_url(), Some(url));
        assert_eq!(record.lines().len(), 2);
        assert_eq!(record.lines()[0].0, "I follow the Moskva");

        let text = record.export_as_text();
        let (body, attribution) = text.split_once("\n\n\n=================").unwrap();
        assert_eq!(body.matches("[orig] ").count(), record.lines().len());
        assert!(attribution.ends_with(url));
        assert_eq!(provider.state(), FetchState::Done);
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let mut provider = AmalgamaProvider::new(Arc::new(ScriptedFetcher::new()), BASE);

        let outcome = provider
            .request_lyrics(FetchRequest::search("Nobody", "Nothing"))
            .await
            .unwrap();
        assert!(outcome.is_not_found());
        assert_eq!(provider.state(), FetchState::Failed);
    }

    #[tokio::test]
    async fn test_page_without_translation_blocks_is_not_found() {
        let url = "https://www.amalgama-lab.com/songs/s/scorpions/wind_of_change.html";
        let fetcher = ScriptedFetcher::new().with_page(url, 200, "<html><body><p>Скоро</p></body></html>");
        let mut provider = AmalgamaProvider::new(Arc::new(fetcher), BASE);

        let outcome = provider
            .request_lyrics(FetchRequest::search("Scorpions", "Wind of Change"))
            .await
            .unwrap();
        assert!(outcome.is_not_found());
        assert_eq!(provider.state(), FetchState::Failed);
        assert!(provider.page_content().is_some());
        assert!(provider.lyrics().is_none());
    }

    #[tokio::test]
    async fn test_sentinel_page_is_not_found() {
        let url = "https://www.amalgama-lab.com/songs/n/nobody/nothing.html";
        let body = format!("<html><body><p>{}</p></body></html>", NOT_FOUND_SENTINEL);
        let fetcher = ScriptedFetcher::new().with_page(url, 200, &body);
        let mut provider = AmalgamaProvider::new(Arc::new(fetcher), BASE);

        let outcome = provider
            .request_lyrics(FetchRequest::search("Nobody", "Nothing"))
            .await
            .unwrap();
        assert!(outcome.is_not_found());
    }

    #[tokio::test]
    async fn test_tls_failure_surfaces_as_error() {
        let mut provider = AmalgamaProvider::new(Arc::new(TlsFailingFetcher), BASE);

        let err = provider
            .request_lyrics(FetchRequest::search("Scorpions", "Wind of Change"))
            .await
            .unwrap_err();
        assert!(err.is_upstream_protocol());
    }

    #[tokio::test]
    async fn test_no_continuation_phase() {
        let mut provider = AmalgamaProvider::new(Arc::new(ScriptedFetcher::new()), BASE);
        let ctx = crate::core::selection::DisambiguationContext::new(Vec::new());

        let err = provider.request_lyrics(FetchRequest::Continue(&ctx)).await.unwrap_err();
        assert!(matches!(err, LyricsGetError::Lyrics(LyricsError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_instance_is_single_use() {
        let url = "https://www.amalgama-lab.com/songs/s/scorpions/wind_of_change.html";
        let fetcher = ScriptedFetcher::new().with_page(url, 200, &page(&[block("a", "б")]));
        let mut provider = AmalgamaProvider::new(Arc::new(fetcher), BASE);

        provider
            .request_lyrics(FetchRequest::search("Scorpions", "Wind of Change"))
            .await
            .unwrap();
        let err = provider
            .request_lyrics(FetchRequest::search("Scorpions", "Wind of Change"))
            .await
            .unwrap_err();
        assert!(matches!(err, LyricsGetError::Lyrics(LyricsError::InvalidState { .. })));
    }
}
