//! Environment configuration, read once at startup.

use std::env;

use crate::{gemini, perplexity, wikipedia};

pub const DEFAULT_PHOTO_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/9/9d/Morgan_Hall_of_Williams_College_in_the_fall_%2827_October_2010%29.jpg/330px-Morgan_Hall_of_Williams_College_in_the_fall_%2827_October_2010%29.jpg";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} must use http or https, got '{value}'")]
    InvalidScheme { var: &'static str, value: String },

    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Runtime settings.
///
/// - `GEMINI_API_KEY` / `GEMINI_MODEL`: extraction, and research when Perplexity is not configured
/// - `GEMINI_MAX_ATTEMPTS`: attempts per Gemini call, 1 (no retry) unless set
/// - `PERPLEXITY_API_KEY` / `PERPLEXITY_MODEL`: optional research backend
/// - `UNIRANK_DEFAULT_PHOTO`: photo used when no thumbnail is found
/// - `UNIRANK_SUMMARY_BASE`: page summary endpoint
#[derive(Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_max_attempts: u32,
    pub perplexity_api_key: Option<String>,
    pub perplexity_model: String,
    pub default_photo_url: String,
    pub summary_base_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_max_attempts", &self.gemini_max_attempts)
            .field(
                "perplexity_api_key",
                &self.perplexity_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("perplexity_model", &self.perplexity_model)
            .field("default_photo_url", &self.default_photo_url)
            .field("summary_base_url", &self.summary_base_url)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |var: &str| {
            get(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let default_photo_url =
            read("UNIRANK_DEFAULT_PHOTO").unwrap_or_else(|| DEFAULT_PHOTO_URL.to_string());
        validate_http_url("UNIRANK_DEFAULT_PHOTO", &default_photo_url)?;

        let summary_base_url = read("UNIRANK_SUMMARY_BASE")
            .unwrap_or_else(|| wikipedia::SUMMARY_API_BASE.to_string());
        validate_http_url("UNIRANK_SUMMARY_BASE", &summary_base_url)?;

        let gemini_max_attempts = match read("GEMINI_MAX_ATTEMPTS") {
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    var: "GEMINI_MAX_ATTEMPTS",
                    value,
                })?,
            None => gemini::client::DEFAULT_MAX_ATTEMPTS,
        };

        Ok(Self {
            gemini_api_key: read("GEMINI_API_KEY"),
            gemini_model: read("GEMINI_MODEL")
                .unwrap_or_else(|| gemini::client::DEFAULT_MODEL.to_string()),
            gemini_max_attempts,
            perplexity_api_key: read("PERPLEXITY_API_KEY"),
            perplexity_model: read("PERPLEXITY_MODEL")
                .unwrap_or_else(|| perplexity::DEFAULT_MODEL.to_string()),
            default_photo_url,
            summary_base_url,
        })
    }
}

fn validate_http_url(var: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|source| ConfigError::InvalidUrl { var, source })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::InvalidScheme {
            var,
            value: value.to_string(),
        }),
    }
}
