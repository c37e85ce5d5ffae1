use std::env;
use crate::error::{Result, LyricsGetError};

/// Environment variable configuration constants
pub struct EnvVars;

impl EnvVars {
    pub const GENIUS_CLIENT_ID: &'static str = "GENIUS_CLIENT_ID";
    pub const GENIUS_CLIENT_SECRET: &'static str = "GENIUS_CLIENT_SECRET";
    pub const GENIUS_ACCESS_TOKEN: &'static str = "GENIUS_ACCESS_TOKEN";

    pub const GENIUS_API_URL: &'static str = "LYRICSGET_GENIUS_API_URL";
    pub const AMALGAMA_URL: &'static str = "LYRICSGET_AMALGAMA_URL";
    pub const HTTP_TIMEOUT_SECONDS: &'static str = "LYRICSGET_HTTP_TIMEOUT_SECONDS";
    pub const USER_AGENT: &'static str = "LYRICSGET_USER_AGENT";
}

/// Environment variable parsing utilities with validation
pub struct EnvParser;

impl EnvParser {
    /// Parse environment variable as string with validation
    pub fn parse_string(var_name: &str, validator: Option<fn(&str) -> Result<()>>) -> Result<Option<String>> {
        match env::var(var_name) {
            Ok(value) => {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() {
                    return Ok(None);
                }

                if let Some(validate_fn) = validator {
                    validate_fn(&trimmed)?;
                }

                Ok(Some(trimmed))
            }
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(LyricsGetError::Validation(format!(
                    "Environment variable {} contains invalid UTF-8",
                    var_name
                )))
            }
        }
    }

    /// Parse environment variable as u64 with range validation
    pub fn parse_u64(var_name: &str, min: u64, max: u64) -> Result<Option<u64>> {
        if let Some(value_str) = Self::parse_string(var_name, None)? {
            let value = value_str.parse::<u64>().map_err(|_| {
                LyricsGetError::Validation(format!(
                    "Invalid number in {}: '{}'. Must be a positive integer",
                    var_name, value_str
                ))
            })?;

            if value < min || value > max {
                return Err(LyricsGetError::Validation(format!(
                    "Value in {} must be between {} and {}, got {}",
                    var_name, min, max, value
                )));
            }

            Ok(Some(value))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_parse_string() {
        env::set_var("TEST_LYRICSGET_STRING", "  https://api.genius.com/  ");
        env::set_var("TEST_LYRICSGET_BLANK", "   ");

        assert_eq!(
            EnvParser::parse_string("TEST_LYRICSGET_STRING", None).unwrap(),
            Some("https://api.genius.com/".to_string())
        );
        assert_eq!(EnvParser::parse_string("TEST_LYRICSGET_BLANK", None).unwrap(), None);
        assert_eq!(EnvParser::parse_string("TEST_LYRICSGET_NOT_SET", None).unwrap(), None);

        let reject: fn(&str) -> Result<()> = |_| Err(LyricsGetError::Validation("rejected".to_string()));
        assert!(EnvParser::parse_string("TEST_LYRICSGET_STRING", Some(reject)).is_err());

        env::remove_var("TEST_LYRICSGET_STRING");
        env::remove_var("TEST_LYRICSGET_BLANK");
    }

    #[test]
    fn test_parse_u64() {
        env::set_var("TEST_U64_VALID", "42");
        env::set_var("TEST_U64_OUT_OF_RANGE", "150");
        env::set_var("TEST_U64_INVALID", "not_a_number");

        assert_eq!(EnvParser::parse_u64("TEST_U64_VALID", 1, 100).unwrap(), Some(42));
        assert!(EnvParser::parse_u64("TEST_U64_OUT_OF_RANGE", 1, 100).is_err());
        assert!(EnvParser::parse_u64("TEST_U64_INVALID", 1, 100).is_err());
        assert_eq!(EnvParser::parse_u64("TEST_U64_NOT_SET", 1, 100).unwrap(), None);

        env::remove_var("TEST_U64_VALID");
        env::remove_var("TEST_U64_OUT_OF_RANGE");
        env::remove_var("TEST_U64_INVALID");
    }
}
