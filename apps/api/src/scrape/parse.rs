//! Normalization of scraped HTML into a canonical `JobPosting`, regardless
//! of which job board or fetch strategy produced the page.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use super::boards::{selectors_for, JobBoard, GENERIC_SELECTORS};
use super::ScrapeMethod;

/// A posting with a shorter description is treated as incomplete and the
/// next strategy is tried.
pub const MIN_DESCRIPTION_LENGTH: usize = 250;
pub const MAX_DESCRIPTION_LENGTH: usize = 6000;
const MAX_FIELD_LENGTH: usize = 500;
const MIN_TITLE_LENGTH: usize = 3;

static EXPERIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\s*\+?\s*(?:(?:-|to)\s*\d+\s*)?(?:years?|yrs?)(?:\s+of)?(?:\s+experience)?")
        .expect("invalid experience regex")
});

static SALARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:₹|Rs\.?|INR|USD|\$)\s*[\d,]+(?:\s*-\s*[\d,]+)?(?:\s*(?:LPA|per\s*annum|annually|/year|/yr))?",
    )
    .expect("invalid salary regex")
});

/// Canonical job-posting record. Created per request, immutable once the
/// orchestrator persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_title: String,
    pub company_name: Option<String>,
    pub job_description: String,
    pub location: Option<String>,
    /// Raw matched substring, e.g. "5 years of experience".
    pub experience: Option<String>,
    /// Raw matched substring, e.g. "$120,000 - 150,000 /year".
    pub salary: Option<String>,
    pub job_board: Option<JobBoard>,
    pub scrape_strategy: ScrapeMethod,
}

impl JobPosting {
    /// A posting is usable only with a real title and a substantive
    /// description; anything less sends the scraper to the next strategy.
    pub fn is_complete(&self) -> bool {
        self.job_title.chars().count() >= MIN_TITLE_LENGTH
            && self.job_description.chars().count() >= MIN_DESCRIPTION_LENGTH
    }
}

/// Parses fetched HTML into a `JobPosting`, using board-specific selectors
/// where the resolved URL identifies a known board and falling back to
/// generic selectors, the page `<title>`, and finally whole-body text.
pub fn parse_job_html(html: &str, final_url: &str, method: ScrapeMethod) -> JobPosting {
    let document = Html::parse_document(html);
    let board = JobBoard::detect(final_url);
    let table = selectors_for(board);
    // Generic selectors double as the fallback pass for dedicated tables.
    let fallback = (!std::ptr::eq(table, &GENERIC_SELECTORS)).then_some(&GENERIC_SELECTORS);

    let body_text = clean_text(&element_text(&document, "body"), MAX_DESCRIPTION_LENGTH);

    let job_title = pick_field(&document, table.title, fallback.map(|g| g.title), MAX_FIELD_LENGTH)
        .or_else(|| clean_text(&element_text(&document, "title"), MAX_FIELD_LENGTH))
        .unwrap_or_else(|| "Position".to_string());

    let company_name = pick_field(
        &document,
        table.company,
        fallback.map(|g| g.company),
        MAX_FIELD_LENGTH,
    );
    let location = pick_field(
        &document,
        table.location,
        fallback.map(|g| g.location),
        MAX_FIELD_LENGTH,
    );

    let job_description = pick_field(
        &document,
        table.description,
        fallback.map(|g| g.description),
        MAX_DESCRIPTION_LENGTH,
    )
    .or_else(|| body_text.clone())
    .unwrap_or_default();

    let salary = pick_field(
        &document,
        table.salary,
        fallback.map(|g| g.salary),
        MAX_FIELD_LENGTH,
    )
    .or_else(|| extract_salary(body_text.as_deref().unwrap_or_default()));

    let experience = extract_experience(body_text.as_deref().unwrap_or_default());

    JobPosting {
        job_title,
        company_name,
        job_description,
        location,
        experience,
        salary,
        job_board: board,
        scrape_strategy: method,
    }
}

/// Tries the board table first, then the generic fallback when present.
fn pick_field(
    document: &Html,
    selectors: &[&str],
    fallback: Option<&[&str]>,
    max_length: usize,
) -> Option<String> {
    pick_first(document, selectors, max_length)
        .or_else(|| fallback.and_then(|generic| pick_first(document, generic, max_length)))
}

/// First selector whose first match yields non-empty cleaned text.
fn pick_first(document: &Html, selectors: &[&str], max_length: usize) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<Vec<_>>().join(" ");
            if let Some(cleaned) = clean_text(&text, max_length) {
                return Some(cleaned);
            }
        }
    }
    None
}

fn element_text(document: &Html, selector: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&selector)
        .flat_map(|e| e.text())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses whitespace (including NBSP) and truncates with a trailing
/// ellipsis marker beyond `max_length` characters.
pub fn clean_text(value: &str, max_length: usize) -> Option<String> {
    let text = value
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return None;
    }

    if text.chars().count() > max_length {
        let truncated: String = text.chars().take(max_length).collect();
        Some(format!("{truncated}..."))
    } else {
        Some(text)
    }
}

/// Matches "5 years", "3+ yrs", "2 - 4 years of experience", etc.
pub fn extract_experience(text: &str) -> Option<String> {
    EXPERIENCE_RE.find(text).map(|m| m.as_str().to_string())
}

/// Matches currency-prefixed amounts with optional range and period unit.
pub fn extract_salary(text: &str) -> Option<String> {
    SALARY_RE.find(text).map(|m| m.as_str().to_string())
}
