use std::collections::BTreeMap;
use url::Url;
use crate::error::{ConfigError, LyricsGetError, Result};

/// Centralized configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a URL string
    pub fn validate_url(url: &str, field_name: &str) -> Result<()> {
        let parsed = Url::parse(url).map_err(|e| {
            LyricsGetError::Validation(format!("Invalid {} URL '{}': {}", field_name, url, e))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(LyricsGetError::Validation(format!(
                "{} URL must use http or https, got: {}",
                field_name, url
            )));
        }
        Ok(())
    }

    /// Validate numeric range
    pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(LyricsGetError::Validation(format!(
                "{} must be between {} and {}, got {}",
                field_name, min, max, value
            )));
        }
        Ok(())
    }

    /// Validate the source name -> provider id table
    pub fn validate_sources(sources: &BTreeMap<String, String>) -> Result<()> {
        if sources.is_empty() {
            return Err(LyricsGetError::Validation(
                "At least one lyrics source must be configured".to_string(),
            ));
        }

        for (name, id) in sources {
            if name.trim().is_empty() || id.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "sources".to_string(),
                    value: format!("'{}' = '{}'", name, id),
                }
                .into());
            }
        }
        Ok(())
    }
}
