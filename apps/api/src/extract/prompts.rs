//! Prompt templates for skill extraction.

pub const SKILL_EXTRACTION_SYSTEM: &str = "You are a resume parsing assistant. \
You respond with a single JSON array of strings and nothing else: no prose, \
no markdown fences, no trailing commentary.";

pub const SKILL_EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract every technical skill, tool, framework, cloud/platform, programming language, database, methodology, and relevant soft skill mentioned in the following resume text.
Return ONLY a JSON array of unique skill names (strings). Do not include explanations or duplicates.

Resume Text:
{resume_text}

Return format: ["skill1", "skill2", ...]"#;
