//! LLM-backed skill extraction with a defensive two-stage response parser.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::extract::prompts::{SKILL_EXTRACTION_PROMPT_TEMPLATE, SKILL_EXTRACTION_SYSTEM};
use crate::llm_client::{strip_json_fences, LlmClient};

/// Only the head of the resume goes to the model; skills cluster early and
/// the tail is mostly noise for this prompt.
const PROMPT_TEXT_LIMIT: usize = 3500;

/// Widest `[...]` span in the reply, tolerating commentary on either side.
static ARRAY_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("invalid array span regex"));

/// Extracts a skill list from resume text via the LLM.
///
/// Never fails past this boundary: any transport, API, or parse problem
/// degrades to an empty list so resume analysis can continue without skills.
pub async fn extract_skills_from_text(llm: &LlmClient, text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let snippet: String = text.chars().take(PROMPT_TEXT_LIMIT).collect();
    let prompt = SKILL_EXTRACTION_PROMPT_TEMPLATE.replace("{resume_text}", &snippet);

    let response = match llm.call(&prompt, SKILL_EXTRACTION_SYSTEM).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Skill extraction call failed: {e}");
            return Vec::new();
        }
    };

    match response.text() {
        Some(raw) => parse_skill_array(raw),
        None => {
            warn!("Skill extraction returned no text content");
            Vec::new()
        }
    }
}

/// Parses a model reply into a skill list: strip code fences, isolate the
/// first JSON array span, try strict JSON, then lenient JSON5, then give up.
pub fn parse_skill_array(raw: &str) -> Vec<String> {
    let stripped = strip_json_fences(raw);

    let span = match ARRAY_SPAN_RE.find(stripped) {
        Some(m) => m.as_str(),
        None => {
            warn!("Skill extraction response missing a JSON array");
            return Vec::new();
        }
    };

    let parsed: Value = match serde_json::from_str(span) {
        Ok(value) => value,
        Err(strict_err) => match json5::from_str(span) {
            Ok(value) => value,
            Err(lenient_err) => {
                warn!(
                    "Skill array unparseable (strict: {strict_err}; lenient: {lenient_err})"
                );
                return Vec::new();
            }
        },
    };

    match parsed {
        Value::Array(items) => normalize_skills(items),
        _ => Vec::new(),
    }
}

/// Keeps string entries longer than one character, trimmed, deduplicated
/// while preserving first-seen order and casing.
fn normalize_skills(items: Vec<Value>) -> Vec<String> {
    let mut skills = Vec::new();
    for item in items {
        if let Value::String(s) = item {
            let trimmed = s.trim();
            if trimmed.len() > 1 && !skills.iter().any(|existing| existing == trimmed) {
                skills.push(trimmed.to_string());
            }
        }
    }
    skills
}
