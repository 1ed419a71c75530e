//! Conversation referee backed by an OpenAI-compatible chat completion API
//!
//! Submit a conversation as pasted text or as a screenshot and get back who
//! was wrong, who gave unsolicited advice, who was rude, and a short summary.
//! The reasoning is delegated to the configured model; this crate builds the
//! request, retries rate limits with exponential backoff, and validates the
//! reply.

pub mod ai;
pub mod analyzer;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod prompts;

pub use analyzer::Analyzer;
pub use error::{Error, Result};
pub use models::{AnalysisRequest, AnalysisResult, ProviderConfig, RetryPolicy};

/// Analyze pasted conversation text using configuration from the environment.
///
/// Blank text is rejected before configuration is read or any request is made.
pub async fn analyze_text(text: &str) -> Result<AnalysisResult> {
    let request = AnalysisRequest::text(text)?;
    Analyzer::from_env()?.analyze(request).await
}

/// Analyze a conversation screenshot using configuration from the environment.
///
/// The MIME type is sniffed from the image bytes when not given.
pub async fn analyze_screenshot(image: Vec<u8>, mime_type: Option<&str>) -> Result<AnalysisResult> {
    let request = AnalysisRequest::image(image, mime_type)?;
    Analyzer::from_env()?.analyze(request).await
}
