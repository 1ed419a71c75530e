//! Maps provider failures onto [`Error`] and renders the multi-line
//! diagnostics shown to whoever submitted the conversation.

use crate::Error;
use reqwest::StatusCode;
use serde_json::Value;

/// Pick the most specific message out of an error body.
///
/// Preference order is `error.message`, `message`, then `error` when it is a
/// plain string. Falls back to the status reason phrase and finally
/// `HTTP <status>`.
pub fn error_message(body: Option<&Value>, status: StatusCode) -> String {
    let from_body = body.and_then(|body| {
        let text_at = |pointer: &str| {
            body.pointer(pointer)
                .and_then(Value::as_str)
                .filter(|message| !message.trim().is_empty())
        };
        text_at("/error/message")
            .or_else(|| text_at("/message"))
            .or_else(|| text_at("/error"))
            .map(str::to_string)
    });

    from_body
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Turn a non-success status into its taxonomy entry.
pub fn classify_status(status: StatusCode, message: String, details: Option<Value>) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Auth { message },
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimit { message },
        StatusCode::BAD_REQUEST => Error::BadRequest { message },
        StatusCode::NOT_FOUND => Error::NotFound { message },
        _ => Error::Unknown {
            status: status.as_u16(),
            message,
            details,
        },
    }
}

impl Error {
    /// Human-readable explanation with likely causes and next steps.
    pub fn diagnostic(&self) -> String {
        match self {
            Error::Config(message) => format!(
                "{}\n\nSet API_KEY (or OPENAI_API_KEY), and optionally API_BASE_URL, \
                 API_MODEL and USE_JSON_SCHEMA, in the environment or a .env file, then try again.",
                message
            ),
            Error::Input(message) => message.clone(),
            Error::Auth { .. } => [
                "Invalid API key (401 Unauthorized). This means:",
                "• The API key is invalid or expired",
                "• The API key was revoked",
                "• The API key doesn't have the right permissions",
                "",
                "Please:",
                "1. Verify API_KEY (or OPENAI_API_KEY) holds the correct key",
                "2. Make sure the key is complete (not truncated)",
                "3. Check that your API provider account is active",
                "4. Remove any quotes or spaces around the key",
                "5. Restart the process so the new value is picked up",
            ]
            .join("\n"),
            Error::RateLimit { .. } => [
                "Rate limit exceeded. This usually means:",
                "• You've made too many requests in a short time (wait a few minutes)",
                "• Your API account has hit its usage limit",
                "• You're on a free tier with limited requests",
                "",
                "Please check your API provider account usage or add billing information.",
            ]
            .join("\n"),
            Error::BadRequest { message } => format!(
                "Invalid request (400 Bad Request): {}\n\n\
                 This could mean:\n\
                 • The image format is not supported by your API provider\n\
                 • The request format is incompatible with your API provider\n\
                 • The model doesn't support vision/image inputs\n\
                 • The response_format (JSON schema) is not supported; try USE_JSON_SCHEMA=false\n\n\
                 Check the logs for more details.",
                message
            ),
            Error::NotFound { .. } => {
                "API endpoint not found. Please check API_BASE_URL.".to_string()
            }
            Error::Unknown {
                status,
                message,
                details,
            } => {
                let details = details
                    .as_ref()
                    .and_then(|details| serde_json::to_string_pretty(details).ok())
                    .map(|pretty| format!("\n\nDetails: {}", pretty))
                    .unwrap_or_default();
                format!("API error ({}): {}{}", status, message, details)
            }
            Error::Http(err) => format!(
                "Analysis failed: could not reach the API ({}). Check your network connection and API_BASE_URL.",
                err
            ),
            Error::Transport(message) => format!("Analysis failed: {}", message),
            Error::Validation(message) => format!("Invalid response format: {}", message),
        }
    }
}
