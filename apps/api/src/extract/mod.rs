//! Resume text and skill extraction.
//!
//! `text` pulls raw text out of uploaded PDF/DOCX files; `skills` asks the
//! LLM for a skill list and parses its answer defensively.

pub mod prompts;
pub mod skills;
pub mod text;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported resume format '{0}' (only PDF and DOCX are supported)")]
    UnsupportedFormat(String),

    #[error("Unable to extract sufficient text from resume")]
    InsufficientText,

    #[error("Failed to read resume file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse document: {0}")]
    Parse(String),
}
