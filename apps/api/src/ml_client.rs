//! Client for the external ML resume-parsing microservice.
//!
//! Best-effort by contract: callers must treat any failure here as a signal
//! to run the local fallback analyzer, never as a request-fatal error.

use std::path::Path;

use anyhow::{bail, Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const PARSE_TIMEOUT_SECS: u64 = 60;

/// Parsed-resume payload returned by the ML service. Unknown fields are
/// preserved in `extra` so the full payload can be persisted verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedResumeData {
    pub extracted_skills: Vec<String>,
    pub final_ats_score: Option<f64>,
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Clone)]
pub struct MlClient {
    client: Client,
    base_url: String,
}

impl MlClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(PARSE_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }

    /// Uploads a resume file for parsing. The service answers either with a
    /// `{success, data}` envelope or the data object directly; both are
    /// accepted.
    pub async fn parse_resume(&self, path: &Path, original_name: &str) -> Result<ParsedResumeData> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {} for ML upload", path.display()))?;

        let part = Part::bytes(bytes)
            .file_name(original_name.to_string())
            .mime_str(mime_for(original_name))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/parse-resume", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            bail!("ML service returned {status}");
        }

        let body: Value = response.json().await?;
        let parsed = unwrap_envelope(body)?;
        debug!(
            "ML service parsed resume: {} skills, score {:?}",
            parsed.extracted_skills.len(),
            parsed.final_ats_score
        );
        Ok(parsed)
    }
}

fn unwrap_envelope(body: Value) -> Result<ParsedResumeData> {
    let data = match (body.get("success"), body.get("data")) {
        (Some(Value::Bool(true)), Some(data)) => data.clone(),
        (Some(Value::Bool(false)), _) => bail!("ML service reported failure"),
        _ => body,
    };
    serde_json::from_value(data).context("ML service returned an unexpected payload shape")
}

fn mime_for(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else {
        "application/octet-stream"
    }
}
