//! Response normalizer: raw model text to [`JudgementResponse`].
//!
//! Models are asked for a JSON object but routinely wrap it in prose,
//! return numbers as strings, or nest list items in objects. Everything
//! here is total: any input produces a judgement, and a reply that cannot
//! be decoded at all becomes a low-information fallback instead of an
//! error.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde_json::{Map, Value};

use crate::agent_profile::AgentRole;

use super::state::JudgementResponse;

/// Confidence used when the reply carries no usable number.
pub const DEFAULT_CONFIDENCE: f64 = 5.0;
/// Confidence assigned to replies that could not be decoded.
pub const FALLBACK_CONFIDENCE: f64 = 7.0;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("FIRST_NUMBER regex should compile"));

/// Every field a reviewer is asked to return, after coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawJudgement {
    /// Role the model claims to speak for, if stated.
    pub role: Option<String>,
    pub confidence: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub criticisms: Vec<String>,
    pub improvements: Vec<String>,
    pub enhanced_content: Option<String>,
    pub code_examples: Vec<String>,
    pub technical_details: Vec<String>,
    pub security_considerations: Vec<String>,
    pub rationale: String,
    /// True when this record was synthesized from an undecodable reply.
    pub fallback: bool,
}

impl RawJudgement {
    /// Stand-in for a reply with no decodable JSON object.
    pub fn fallback(raw_text: &str) -> Self {
        Self {
            role: None,
            confidence: FALLBACK_CONFIDENCE,
            strengths: vec!["Content reviewed".to_string()],
            weaknesses: vec!["Response parsing failed".to_string()],
            suggestions: vec!["Review response format".to_string()],
            criticisms: Vec::new(),
            improvements: Vec::new(),
            enhanced_content: Some(raw_text.to_string()),
            code_examples: Vec::new(),
            technical_details: Vec::new(),
            security_considerations: Vec::new(),
            rationale: "Response parsing failed, using raw content".to_string(),
            fallback: true,
        }
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        let list = |key: &str| obj.get(key).map(coerce_string_list).unwrap_or_default();
        let text = |key: &str| match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(coerce_item(other)),
        };

        Self {
            role: text("agent_role").or_else(|| text("role")),
            confidence: obj
                .get("confidence")
                .map(coerce_confidence)
                .unwrap_or(DEFAULT_CONFIDENCE),
            strengths: list("strengths"),
            weaknesses: list("weaknesses"),
            suggestions: list("suggestions"),
            criticisms: list("criticisms"),
            improvements: list("improvements"),
            enhanced_content: text("enhanced_content"),
            code_examples: list("code_examples"),
            technical_details: list("technical_details"),
            security_considerations: list("security_considerations"),
            rationale: text("rationale").unwrap_or_default(),
            fallback: false,
        }
    }
}

/// Decode the outermost `{ ... }` span of a reply.
///
/// Returns `None` when there is no brace pair or the span is not a JSON
/// object.
pub fn extract_object(raw_text: &str) -> Option<Map<String, Value>> {
    let start = raw_text.find('{')?;
    let end = raw_text.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&raw_text[start..=end]) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

/// Parse a reply into coerced fields, falling back when it cannot be decoded.
pub fn parse_reply(raw_text: &str) -> RawJudgement {
    match extract_object(raw_text) {
        Some(obj) => RawJudgement::from_object(&obj),
        None => RawJudgement::fallback(raw_text),
    }
}

/// Normalize one reviewer reply.
///
/// `reviewed_content` is the content the reviewer was shown; it stands in
/// for `enhanced_content` when the reply omits it.
pub fn normalize(raw_text: &str, role: AgentRole, reviewed_content: &str) -> JudgementResponse {
    let raw = parse_reply(raw_text);
    JudgementResponse {
        role,
        content: raw
            .enhanced_content
            .unwrap_or_else(|| reviewed_content.to_string()),
        confidence: raw.confidence,
        suggestions: raw.suggestions,
        criticisms: raw.criticisms,
        improvements: raw.improvements,
        strengths: raw.strengths,
        weaknesses: raw.weaknesses,
        rationale: raw.rationale,
        parse_fallback: raw.fallback,
        created_at: Utc::now(),
    }
}

/// Coerce a confidence value into `[0, 10]`.
///
/// Numbers pass through, strings yield their first decimal number, a list
/// yields its first element's confidence; anything else is 5.0.
pub fn coerce_confidence(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => FIRST_NUMBER
            .find(s)
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        Value::Array(items) => items.first().map(coerce_confidence),
        _ => None,
    };
    match parsed {
        Some(c) if c.is_finite() => c.clamp(0.0, 10.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Coerce a list-ish value into a list of strings.
///
/// Lists are kept, `null` and empty strings become an empty list, any
/// other scalar is wrapped.
pub fn coerce_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(coerce_item).collect(),
        Value::Null => Vec::new(),
        Value::String(s) if s.is_empty() => Vec::new(),
        other => vec![coerce_item(other)],
    }
}

/// Reduce a single list element to a string.
///
/// Objects prefer their `text` key, then `content`, then their JSON form.
pub fn coerce_item(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => match obj.get("text").or_else(|| obj.get("content")) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}
