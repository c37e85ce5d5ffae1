//! Page transport used by every provider.
//!
//! Providers never talk to reqwest directly; they go through [`PageFetcher`]
//! so the fetch protocol can be exercised without a network.

use std::error::Error as StdError;
use std::time::Duration;

use tracing::debug;

use crate::error::NetworkError;

/// Raw HTTP response: status plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issue a GET against `url` with the given query parameters.
    ///
    /// Non-200 statuses are returned as a page, not as an error; only
    /// transport failures end up in `Err`.
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<FetchedPage, NetworkError>;
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!(
                "lyricsget v{} (https://github.com/lyricsget/lyricsget)",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

/// reqwest-backed fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// rustls client with the bundled webpki roots, TLS 1.2 and up.
    pub fn new(settings: &HttpSettings) -> Result<Self, NetworkError> {
        let client = Self::builder(settings)
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self { client })
    }

    /// Client for scraped sites whose servers only offer old protocol
    /// versions or CBC/RSA cipher suites, which rustls does not implement.
    ///
    /// Uses the platform TLS stack (OpenSSL on Linux) with TLS 1.0 as the
    /// floor. Certificate and hostname verification are left on.
    pub fn legacy_tls(settings: &HttpSettings) -> Result<Self, NetworkError> {
        let client = Self::builder(settings)
            .use_native_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_0)
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self { client })
    }

    fn builder(settings: &HttpSettings) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<FetchedPage, NetworkError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify_error(url, e))?;
        debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchedPage { status, body })
    }
}

/// Split reqwest failures into timeouts, TLS negotiation problems and
/// everything else.
fn classify_error(url: &str, err: reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        return NetworkError::Timeout { url: url.to_string() };
    }

    if err.is_connect() {
        if let Some(reason) = tls_failure_reason(&err) {
            let host = reqwest::Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| url.to_string());
            return NetworkError::Tls { host, reason };
        }
    }

    NetworkError::Http(err)
}

fn tls_failure_reason(err: &(dyn StdError + 'static)) -> Option<String> {
    let mut source = err.source();
    while let Some(inner) = source {
        let message = inner.to_string();
        if is_tls_message(&message) {
            return Some(message);
        }
        source = inner.source();
    }
    None
}

fn is_tls_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["tls", "handshake", "certificate", "cipher", "alert"]
        .iter()
        .any(|marker| lower.contains(marker))
}
