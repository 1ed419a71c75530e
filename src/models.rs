//! Data models and structures
//!
//! Defines what goes into an analysis, what comes out of it, and how the
//! provider connection is configured.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// One conversation submitted for analysis, either pasted text or a screenshot.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Text { content: String },
    Image { bytes: Vec<u8>, mime_type: String },
}

impl AnalysisRequest {
    /// Text input. Empty or whitespace-only text is rejected.
    pub fn text(content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::Input(
                "Please paste or type the conversation text".to_string(),
            ));
        }
        Ok(Self::Text { content })
    }

    /// Screenshot input. Without an explicit MIME type it is sniffed from the bytes.
    pub fn image(bytes: Vec<u8>, mime_type: Option<&str>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Input(
                "Either text content or image must be provided".to_string(),
            ));
        }

        let mime_type = match mime_type.map(str::trim).filter(|m| !m.is_empty()) {
            Some(mime) if mime.starts_with("image/") => mime.to_string(),
            Some(mime) => {
                return Err(Error::Input(format!(
                    "Unsupported file type '{}': please upload an image",
                    mime
                )))
            }
            None => crate::ai::mime::sniff_image_mime(&bytes)
                .ok_or_else(|| {
                    Error::Input("Unsupported file type: please upload an image".to_string())
                })?
                .to_string(),
        };

        Ok(Self::Image { bytes, mime_type })
    }
}

/// Verdict returned by the model. All four fields are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub wrong: Vec<String>,
    pub unsolicited_advice: Vec<String>,
    pub rude: Vec<String>,
    pub summary: String,
}

impl AnalysisResult {
    /// True when nobody landed in any category.
    pub fn is_clean(&self) -> bool {
        self.wrong.is_empty() && self.unsolicited_advice.is_empty() && self.rude.is_empty()
    }
}

/// Backoff schedule for rate-limited requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `n` is `base_delay * 2^n`, no jitter.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let base = self.base_delay;
        (0..self.max_retries).map(move |n| base * 2u32.pow(n))
    }
}

/// Connection settings for an OpenAI-compatible chat completion endpoint.
#[derive(Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub use_json_schema: bool,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("use_json_schema", &self.use_json_schema)
            .finish()
    }
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Values are trimmed and empty ones
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get("API_KEY").or_else(|| get("OPENAI_API_KEY")).ok_or_else(|| {
            Error::Config("API_KEY or OPENAI_API_KEY is not set".to_string())
        })?;

        let base_url = get("API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_base_url(&base_url)?;

        let model = get("API_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let use_json_schema = match get("USE_JSON_SCHEMA") {
            None => true,
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                Error::Config(format!(
                    "USE_JSON_SCHEMA must be true or false, got '{}'",
                    raw
                ))
            })?,
        };

        Ok(Self {
            base_url,
            api_key,
            model,
            use_json_schema,
        })
    }
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let url = reqwest::Url::parse(base_url).map_err(|e| {
        Error::Config(format!("API_BASE_URL '{}' is not a valid URL: {}", base_url, e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "API_BASE_URL must use http or https, got '{}'",
            other
        ))),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
