//! Turns a chat completion body into an [`AnalysisResult`].
//!
//! The content can arrive as an already-decoded object, as a JSON string, or
//! as prose with a JSON object somewhere inside it.

use crate::models::AnalysisResult;
use crate::{Error, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static EMBEDDED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("embedded object pattern is valid"));

/// Pull `choices[0].message.content` out of a decoded response body.
pub fn extract_content(body: &Value) -> Result<&Value> {
    body.pointer("/choices/0/message/content")
        .filter(|content| match content {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        })
        .ok_or_else(|| Error::Validation("No response content from API".to_string()))
}

/// Decode message content and validate it against the result shape.
pub fn parse_content(content: &Value) -> Result<AnalysisResult> {
    match content {
        Value::String(text) => validate_result(&parse_json_text(text)?),
        other => validate_result(other),
    }
}

fn parse_json_text(text: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    let candidate = EMBEDDED_OBJECT.find(text).ok_or_else(|| {
        Error::Validation("Could not parse JSON from API response".to_string())
    })?;

    serde_json::from_str(candidate.as_str()).map_err(|e| {
        tracing::debug!("Embedded JSON candidate failed to parse: {}", e);
        Error::Validation(format!("Could not parse JSON from API response: {}", e))
    })
}

/// Check a candidate against the result shape without coercing anything.
///
/// Extra keys are ignored. The error names the first violated field.
pub fn validate_result(candidate: &Value) -> Result<AnalysisResult> {
    let object = candidate.as_object().ok_or_else(|| {
        Error::Validation(format!(
            "expected a JSON object, got {}",
            type_name(candidate)
        ))
    })?;

    Ok(AnalysisResult {
        wrong: string_list(object, "wrong")?,
        unsolicited_advice: string_list(object, "unsolicitedAdvice")?,
        rude: string_list(object, "rude")?,
        summary: string_field(object, "summary")?,
    })
}

fn required<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a Value> {
    object
        .get(field)
        .ok_or_else(|| Error::Validation(format!("missing required field `{}`", field)))
}

fn string_list(object: &Map<String, Value>, field: &str) -> Result<Vec<String>> {
    let value = required(object, field)?;
    let items = value.as_array().ok_or_else(|| {
        Error::Validation(format!(
            "field `{}` must be an array of strings, got {}",
            field,
            type_name(value)
        ))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                Error::Validation(format!(
                    "field `{}[{}]` must be a string, got {}",
                    field,
                    index,
                    type_name(item)
                ))
            })
        })
        .collect()
}

fn string_field(object: &Map<String, Value>, field: &str) -> Result<String> {
    let value = required(object, field)?;
    value.as_str().map(str::to_string).ok_or_else(|| {
        Error::Validation(format!(
            "field `{}` must be a string, got {}",
            field,
            type_name(value)
        ))
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
