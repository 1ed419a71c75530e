//! Response formatting strategies.
//!
//! Some providers enforce a JSON schema on the reply, others only return
//! text. Each strategy owns both the prompt it sends and how it reads the
//! answer back.

use super::openai::types::{JsonSchema, ResponseFormat};
use super::parser;
use crate::models::AnalysisResult;
use crate::{prompts, Result};
use serde_json::Value;

pub const SCHEMA_NAME: &str = "conversation_analysis";

pub trait ResponseFormatStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Task instructions placed in the user message.
    fn instructions(&self) -> &'static str;

    /// Optional `response_format` directive for the request body.
    fn response_format(&self) -> Option<ResponseFormat>;

    /// Read `choices[0].message.content` back into a result.
    fn parse_content(&self, content: &Value) -> Result<AnalysisResult> {
        parser::parse_content(content)
    }
}

/// Provider-enforced JSON schema (`response_format.type = "json_schema"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictSchema;

impl ResponseFormatStrategy for StrictSchema {
    fn name(&self) -> &'static str {
        "json_schema"
    }

    fn instructions(&self) -> &'static str {
        prompts::USER_STRUCTURED
    }

    fn response_format(&self) -> Option<ResponseFormat> {
        Some(ResponseFormat {
            format_type: "json_schema".to_string(),
            json_schema: JsonSchema {
                name: SCHEMA_NAME.to_string(),
                strict: true,
                schema: analysis_schema(),
            },
        })
    }
}

/// JSON object embedded in the reply text, for providers without schema support.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeformJson;

impl ResponseFormatStrategy for FreeformJson {
    fn name(&self) -> &'static str {
        "freeform_json"
    }

    fn instructions(&self) -> &'static str {
        prompts::USER_FREEFORM
    }

    fn response_format(&self) -> Option<ResponseFormat> {
        None
    }
}

pub fn strategy_for(use_json_schema: bool) -> Box<dyn ResponseFormatStrategy> {
    if use_json_schema {
        Box::new(StrictSchema)
    } else {
        Box::new(FreeformJson)
    }
}

fn analysis_schema() -> Value {
    let names = |description: &str| {
        serde_json::json!({
            "type": "array",
            "items": { "type": "string" },
            "description": description
        })
    };

    serde_json::json!({
        "type": "object",
        "properties": {
            "wrong": names("List of people who were wrong in the conversation"),
            "unsolicitedAdvice": names("List of people who gave unsolicited advice"),
            "rude": names("List of people who were being rude"),
            "summary": {
                "type": "string",
                "description": "A brief summary of the conversation analysis"
            }
        },
        "required": ["wrong", "unsolicitedAdvice", "rude", "summary"],
        "additionalProperties": false
    })
}
