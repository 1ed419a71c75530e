//! Chat completion integration
//!
//! Builds the payload sent to an OpenAI-compatible chat endpoint and reads
//! the verdict back out of the reply.

pub mod format;
pub mod mime;
pub mod mock;
pub mod openai;
pub mod parser;

pub use format::{FreeformJson, ResponseFormatStrategy, StrictSchema};
pub use mock::{MockChatTransport, MockReply};
pub use openai::OpenAiHttpClient;

use crate::Result;
use async_trait::async_trait;
use openai::types::ChatCompletionRequest;

/// Sends one chat completion request and returns the decoded body.
///
/// Implementations make exactly one attempt; non-success statuses come back
/// as their classified [`crate::Error`].
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatCompletionRequest) -> Result<serde_json::Value>;
}
