//! Job-board detection and per-board selector tables.
//!
//! Selector lookup is a typed mapping from a closed enum, not a stringly
//! keyed table: an unknown board cannot silently miss the lookup.

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobBoard {
    LinkedIn,
    Indeed,
    Naukri,
    Glassdoor,
    Monster,
}

impl JobBoard {
    /// Detects the board from the final resolved URL's hostname.
    /// Returns `None` for unrecognized hosts (generic parsing applies).
    pub fn detect(url: &str) -> Option<Self> {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_else(|| url.to_lowercase());

        if host.contains("linkedin.com") {
            Some(JobBoard::LinkedIn)
        } else if host.contains("indeed.") {
            Some(JobBoard::Indeed)
        } else if host.contains("naukri.com") {
            Some(JobBoard::Naukri)
        } else if host.contains("glassdoor.com") {
            Some(JobBoard::Glassdoor)
        } else if host.contains("monster.") {
            Some(JobBoard::Monster)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobBoard::LinkedIn => "LinkedIn",
            JobBoard::Indeed => "Indeed",
            JobBoard::Naukri => "Naukri",
            JobBoard::Glassdoor => "Glassdoor",
            JobBoard::Monster => "Monster",
        }
    }
}

/// Ordered CSS selector candidates for each extracted field.
/// First selector yielding non-empty cleaned text wins.
pub struct FieldSelectors {
    pub title: &'static [&'static str],
    pub company: &'static [&'static str],
    pub location: &'static [&'static str],
    pub description: &'static [&'static str],
    pub salary: &'static [&'static str],
}

pub static LINKEDIN_SELECTORS: FieldSelectors = FieldSelectors {
    title: &[
        "h1.top-card-layout__title",
        ".job-details-jobs-unified-top-card__job-title",
        "h1",
    ],
    company: &[
        "a.topcard__org-name-link",
        ".topcard__flavor",
        "a.jobs-unified-top-card__company-name",
        "a.top-card-layout__company-url",
    ],
    location: &[
        ".topcard__flavor--bullet",
        ".jobs-unified-top-card__bullet",
        "span.jobs-unified-top-card__subtitle-primaries",
    ],
    description: &[
        ".jobs-description__container",
        "section.show-more-less-html__markup",
        ".description__text",
        "article",
    ],
    salary: &[".salary-compensation__text", ".compensation__amount"],
};

pub static INDEED_SELECTORS: FieldSelectors = FieldSelectors {
    title: &[
        "h1.jobsearch-JobInfoHeader-title",
        ".jobsearch-JobInfoHeader-title-container h1",
        "h1",
    ],
    company: &[
        ".jobsearch-CompanyInfoContainer a",
        ".jobsearch-InlineCompanyRating div:nth-child(1)",
        ".jobsearch-CompanyInfoWithReview",
    ],
    location: &[
        ".jobsearch-InlineCompanyRating div:nth-child(3)",
        ".jobsearch-JobInfoHeader-subtitle div",
        ".jobsearch-CompanyInfoWithoutHeaderImage",
    ],
    description: &[
        "#jobDescriptionText",
        ".jobsearch-jobDescriptionText",
        "article",
    ],
    salary: &[
        ".jobsearch-JobMetadataHeader-itemWithIcon",
        ".jobsearch-JobMetadataHeader-item",
    ],
};

pub static NAUKRI_SELECTORS: FieldSelectors = FieldSelectors {
    title: &[
        "h1.styles_JobsPremiumHeader__title__380zN",
        ".styles_JD-header-title__AhzMP",
        "h1",
    ],
    company: &[
        ".styles_JD-header-company__vizZo",
        ".styles_JD-company-info__OU0T_ a",
        ".styles_company-name__9k5Ir",
    ],
    location: &[
        ".styles_JD-header-info__kDPCX a",
        ".styles_JD-header-info__kDPCX span",
        ".styles_JD-header-info__kDPCX",
    ],
    description: &[
        ".styles_description__bJxRs",
        ".styles_JD-section__aJ4OD",
        "#jobDescriptionTxt",
        "article",
    ],
    salary: &[
        ".styles_JD-header-compensation__ZQAe7",
        ".styles_JD-header-info__kDPCX span",
    ],
};

pub static GENERIC_SELECTORS: FieldSelectors = FieldSelectors {
    title: &["h1", "[class*=\"job-title\"]", "[class*=\"title\"]"],
    company: &[
        "[class*=\"company\"]",
        "[class*=\"employer\"]",
        "[itemprop=\"hiringOrganization\"]",
    ],
    location: &[
        "[class*=\"location\"]",
        "[itemprop=\"jobLocation\"]",
        "[data-test=\"location\"]",
    ],
    description: &[
        "article",
        "[class*=\"description\"]",
        "main",
        "[itemprop=\"description\"]",
    ],
    salary: &["[class*=\"salary\"]", "[itemprop=\"baseSalary\"]"],
};

/// Board-specific table where one exists; Glassdoor and Monster are
/// detected as boards but share the generic selectors.
pub fn selectors_for(board: Option<JobBoard>) -> &'static FieldSelectors {
    match board {
        Some(JobBoard::LinkedIn) => &LINKEDIN_SELECTORS,
        Some(JobBoard::Indeed) => &INDEED_SELECTORS,
        Some(JobBoard::Naukri) => &NAUKRI_SELECTORS,
        Some(JobBoard::Glassdoor) | Some(JobBoard::Monster) | None => &GENERIC_SELECTORS,
    }
}
