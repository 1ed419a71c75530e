use super::types::{ChatCompletionRequest, ChatMessage, ImageUrl, MessagePart};
use crate::ai::format::ResponseFormatStrategy;
use crate::models::AnalysisRequest;
use crate::{prompts, Error, Result};
use base64::Engine as _;

pub const TEMPERATURE: f64 = 0.3;

/// Build the chat completion payload for one conversation.
///
/// Fails with [`Error::Input`] before anything is sent when the request has
/// no usable content.
pub fn build_chat_request(
    request: &AnalysisRequest,
    model: &str,
    format: &dyn ResponseFormatStrategy,
) -> Result<ChatCompletionRequest> {
    let instructions = format.instructions();

    let parts = match request {
        AnalysisRequest::Text { content } => {
            if content.trim().is_empty() {
                return Err(Error::Input(
                    "Please paste or type the conversation text".to_string(),
                ));
            }
            vec![MessagePart::Text {
                text: prompts::render(
                    prompts::TEXT_INPUT,
                    &[("instructions", instructions), ("conversation", content.as_str())],
                ),
            }]
        }
        AnalysisRequest::Image { bytes, mime_type } => {
            if bytes.is_empty() || mime_type.trim().is_empty() {
                return Err(Error::Input(
                    "Either text content or image must be provided".to_string(),
                ));
            }
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            vec![
                MessagePart::Text {
                    text: prompts::render(prompts::IMAGE_INPUT, &[("instructions", instructions)]),
                },
                MessagePart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{}", mime_type, encoded),
                    },
                },
            ]
        }
    };

    Ok(ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::system(prompts::SYSTEM), ChatMessage::user(parts)],
        temperature: TEMPERATURE,
        response_format: format.response_format(),
    })
}
