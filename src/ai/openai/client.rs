use super::types::ChatCompletionRequest;
use crate::ai::ChatTransport;
use crate::{diagnostics, Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Join the base URL and `/chat/completions` without doubling the slash.
pub fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

pub struct OpenAiHttpClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiHttpClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::new_with_client(api_key, base_url, client))
    }

    /// Use a preconfigured `reqwest::Client`, for example one with a proxy or
    /// extra default headers.
    pub fn new_with_client(api_key: String, base_url: &str, client: Client) -> Self {
        Self {
            client,
            api_key,
            endpoint: chat_completions_url(base_url),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for OpenAiHttpClient {
    async fn send(&self, request: &ChatCompletionRequest) -> Result<Value> {
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to {}: {}", self.endpoint, e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<Value>(&body).ok();
            let message = diagnostics::error_message(details.as_ref(), status);

            tracing::error!(
                status = status.as_u16(),
                endpoint = %self.endpoint,
                body = %body,
                "API error response"
            );

            return Err(diagnostics::classify_status(status, message, details));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse API response: {}\nBody: {}", e, body);
            Error::Transport(format!("Failed to parse API response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::openai::types::ChatMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage::system("hello")],
            temperature: 0.3,
            response_format: None,
        }
    }

    async fn respond_with(template: ResponseTemplate) -> (MockServer, OpenAiHttpClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(template)
            .mount(&server)
            .await;

        let client = OpenAiHttpClient::new("test-key".to_string(), &format!("{}/v1", server.uri()))
            .unwrap();
        (server, client)
    }

    #[test]
    fn test_chat_completions_url_normalizes_trailing_slash() {
        assert_eq!(
            chat_completions_url("https://api.openai.com/v1"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_send_posts_json_with_bearer_auth() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("Content-Type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "temperature": 0.3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "{}" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenAiHttpClient::new("test-key".to_string(), &format!("{}/v1/", server.uri())).unwrap();

        let body = client.send(&request()).await.unwrap();
        assert_eq!(body["choices"][0]["message"]["content"], "{}");
    }

    #[tokio::test]
    async fn test_send_uses_injected_client() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("X-Org", "snitch-team"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "{}" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("X-Org", reqwest::header::HeaderValue::from_static("snitch-team"));
        let http = Client::builder().default_headers(headers).build().unwrap();

        let client = OpenAiHttpClient::new_with_client(
            "test-key".to_string(),
            &format!("{}/v1//", server.uri()),
            http,
        );
        assert_eq!(
            client.endpoint(),
            format!("{}/v1/chat/completions", server.uri())
        );

        let body = client.send(&request()).await.unwrap();
        assert_eq!(body["choices"][0]["message"]["content"], "{}");
    }

    #[tokio::test]
    async fn test_send_classifies_unauthorized() {
        let (_server, client) = respond_with(ResponseTemplate::new(401).set_body_json(
            serde_json::json!({ "error": { "message": "Incorrect API key provided" } }),
        ))
        .await;

        let err = client.send(&request()).await.unwrap_err();
        assert!(
            matches!(err, Error::Auth { ref message } if message == "Incorrect API key provided")
        );
    }

    #[tokio::test]
    async fn test_send_classifies_rate_limit_with_plain_body() {
        let (_server, client) =
            respond_with(ResponseTemplate::new(429).set_body_string("slow down")).await;

        let err = client.send(&request()).await.unwrap_err();
        assert!(matches!(err, Error::RateLimit { ref message } if message == "Too Many Requests"));
    }

    #[tokio::test]
    async fn test_send_classifies_bad_request_and_not_found() {
        let (_server, client) = respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "message": "json_schema unsupported" })),
        )
        .await;
        let err = client.send(&request()).await.unwrap_err();
        assert!(
            matches!(err, Error::BadRequest { ref message } if message == "json_schema unsupported")
        );

        let (_server, client) = respond_with(ResponseTemplate::new(404)).await;
        let err = client.send(&request()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_send_keeps_details_for_other_statuses() {
        let (_server, client) = respond_with(
            ResponseTemplate::new(503).set_body_json(serde_json::json!({ "error": "overloaded" })),
        )
        .await;

        let err = client.send(&request()).await.unwrap_err();
        match err {
            Error::Unknown {
                status,
                message,
                details,
            } => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
                assert_eq!(details, Some(serde_json::json!({ "error": "overloaded" })));
            }
            other => panic!("expected unknown error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_rejects_malformed_success_body() {
        let (_server, client) =
            respond_with(ResponseTemplate::new(200).set_body_string("{\"choices\": [")).await;

        let err = client.send(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
