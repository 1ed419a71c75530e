use super::openai::types::ChatCompletionRequest;
use super::ChatTransport;
use crate::{diagnostics, Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One scripted reply from [`MockChatTransport`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 2xx with this decoded body.
    Ok(Value),
    /// Non-success status with an optional JSON error body.
    Status(u16, Option<Value>),
}

impl MockReply {
    /// A well-formed completion whose message content is `content`.
    pub fn content(content: Value) -> Self {
        MockReply::Ok(serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        }))
    }
}

/// Transport that plays back scripted replies in order, repeating the last
/// one once the script runs out.
pub struct MockChatTransport {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockChatTransport {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Serialized bodies of every request sent so far.
    pub fn sent_requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Shares the recorded state, so a test can keep a handle after boxing.
    pub fn handle(&self) -> Self {
        Self {
            replies: Arc::clone(&self.replies),
            requests: Arc::clone(&self.requests),
        }
    }
}

impl Default for MockChatTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for MockChatTransport {
    async fn send(&self, request: &ChatCompletionRequest) -> Result<Value> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(
                serde_json::to_value(request).map_err(|e| Error::Transport(e.to_string()))?,
            );
            requests.len()
        };

        let reply = {
            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                MockReply::content(serde_json::json!({
                    "wrong": [],
                    "unsolicitedAdvice": [],
                    "rude": [],
                    "summary": "Nobody misbehaved."
                }))
            } else {
                replies[(call - 1).min(replies.len() - 1)].clone()
            }
        };

        match reply {
            MockReply::Ok(body) => Ok(body),
            MockReply::Status(code, body) => {
                let status =
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = diagnostics::error_message(body.as_ref(), status);
                Err(diagnostics::classify_status(status, message, body))
            }
        }
    }
}
