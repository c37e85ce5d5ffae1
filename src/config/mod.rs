use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use directories::ProjectDirs;
use tracing::debug;

pub mod env;
pub mod validation;

use crate::core::http::{HttpSettings, PageFetcher};
use crate::core::provider::ProviderContext;
use crate::core::providers::genius;
use crate::core::registry::ProviderRegistry;
use crate::error::{ConfigError, LyricsGetError, Result};
use env::{EnvParser, EnvVars};
use validation::ConfigValidator;

fn default_sources() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("amalgama".to_string(), "amalgama".to_string()),
        ("genius".to_string(), "genius".to_string()),
    ])
}

fn default_http_timeout_seconds() -> u64 {
    10
}

/// Genius API application credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeniusCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Genius API base URL
    pub genius_api_url: String,

    /// Amalgama songs base URL
    pub amalgama_url: String,

    /// Timeout for every HTTP request (seconds)
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,

    /// Custom User-Agent header (optional)
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Source name shown to users -> provider id
    #[serde(default = "default_sources")]
    pub sources: BTreeMap<String, String>,

    #[serde(default)]
    pub genius: GeniusCredentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            genius_api_url: "https://api.genius.com/".to_string(),
            amalgama_url: "https://www.amalgama-lab.com/songs/".to_string(),
            http_timeout_seconds: default_http_timeout_seconds(),
            user_agent: None,
            sources: default_sources(),
            genius: GeniusCredentials::default(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Pick up a .env file during development
        dotenvy::dotenv().ok();

        let mut config = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return Err(ConfigError::FileNotFound { path }.into());
                }
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        // Environment variables have the highest priority
        config.load_from_env()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from environment variables
    fn load_from_env(&mut self) -> Result<()> {
        if let Some(value) = EnvParser::parse_string(EnvVars::GENIUS_CLIENT_ID, None)? {
            self.genius.client_id = Some(value);
        }

        if let Some(value) = EnvParser::parse_string(EnvVars::GENIUS_CLIENT_SECRET, None)? {
            self.genius.client_secret = Some(value);
        }

        if let Some(value) = EnvParser::parse_string(EnvVars::GENIUS_ACCESS_TOKEN, None)? {
            self.genius.access_token = Some(value);
        }

        if let Some(url) = EnvParser::parse_string(EnvVars::GENIUS_API_URL, Some(validate_genius_url))? {
            self.genius_api_url = url;
        }

        if let Some(url) = EnvParser::parse_string(EnvVars::AMALGAMA_URL, Some(validate_amalgama_url))? {
            self.amalgama_url = url;
        }

        if let Some(timeout) = EnvParser::parse_u64(EnvVars::HTTP_TIMEOUT_SECONDS, 1, 300)? {
            self.http_timeout_seconds = timeout;
        }

        if let Some(agent) = EnvParser::parse_string(EnvVars::USER_AGENT, None)? {
            self.user_agent = Some(agent);
        }

        Ok(())
    }

    /// Fail-fast check run once at startup: URLs, ranges, every source name
    /// resolvable, and credentials present for the sources that need them.
    pub fn validate(&self, registry: &ProviderRegistry) -> Result<()> {
        validate_genius_url(&self.genius_api_url)?;
        validate_amalgama_url(&self.amalgama_url)?;
        ConfigValidator::validate_range(self.http_timeout_seconds, 1, 300, "http_timeout_seconds")?;
        ConfigValidator::validate_sources(&self.sources)?;

        for name in self.sources.keys() {
            registry.resolve_source(&self.sources, name)?;
        }

        if self.sources.values().any(|id| id == genius::ID) {
            self.require_genius_credentials()?;
        }
        Ok(())
    }

    pub fn require_genius_credentials(&self) -> Result<()> {
        let fields = [
            (EnvVars::GENIUS_CLIENT_ID, &self.genius.client_id),
            (EnvVars::GENIUS_CLIENT_SECRET, &self.genius.client_secret),
            (EnvVars::GENIUS_ACCESS_TOKEN, &self.genius.access_token),
        ];

        for (name, value) in fields {
            if value.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::MissingField {
                    field: name.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn http_settings(&self) -> HttpSettings {
        let mut settings = HttpSettings {
            timeout: Duration::from_secs(self.http_timeout_seconds),
            ..HttpSettings::default()
        };
        if let Some(agent) = &self.user_agent {
            settings.user_agent = agent.clone();
        }
        settings
    }

    pub fn provider_context(
        &self,
        fetcher: Arc<dyn PageFetcher>,
        legacy_fetcher: Arc<dyn PageFetcher>,
    ) -> ProviderContext {
        ProviderContext {
            fetcher,
            legacy_fetcher,
            genius_api_url: self.genius_api_url.clone(),
            genius_access_token: self.genius.access_token.clone(),
            amalgama_url: self.amalgama_url.clone(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn default_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("net", "lyricsget", "lyricsget").ok_or_else(|| {
            LyricsGetError::Validation("Failed to determine project directories".to_string())
        })?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Self::default_config_path()
    }
}

fn validate_genius_url(url: &str) -> Result<()> {
    ConfigValidator::validate_url(url, "Genius API")
}

fn validate_amalgama_url(url: &str) -> Result<()> {
    ConfigValidator::validate_url(url, "Amalgama")
}
