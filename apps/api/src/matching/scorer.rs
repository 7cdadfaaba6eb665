//! Deterministic weighted match scoring between a candidate profile and a
//! job posting.
//!
//! Scoring is non-linear on required skills: covering most of them is worth
//! far more than covering some, which is how recruiters actually read a
//! profile. Pure function — no I/O, no hidden state.

use serde::{Deserialize, Serialize};

/// Substring indicators used to judge whether a bonus skill is technical.
const TECHNICAL_INDICATORS: [&str; 11] = [
    "js", "py", "java", "sql", "api", "cloud", "dev", "data", "test", "framework", "database",
];

/// Foundational skills that earn a depth bonus when broadly covered.
const CORE_SKILLS: [&str; 7] = ["JavaScript", "Python", "Java", "SQL", "Git", "API", "Agile"];

/// Industry keyword sets scanned over the job description.
const INDUSTRIES: [(&str, &[&str]); 5] = [
    ("fintech", &["banking", "finance", "payment", "trading", "blockchain"]),
    ("healthcare", &["medical", "health", "patient", "clinical", "pharma"]),
    ("ecommerce", &["ecommerce", "retail", "shopping", "marketplace", "store"]),
    ("saas", &["saas", "b2b", "enterprise", "cloud platform"]),
    ("ai/ml", &["machine learning", "ai", "nlp", "computer vision", "ml model"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchGrade {
    Excellent,
    Good,
    Fair,
    Weak,
    Poor,
    NoData,
}

impl MatchGrade {
    pub fn from_score(score: i32) -> Self {
        if score >= 80 {
            MatchGrade::Excellent
        } else if score >= 65 {
            MatchGrade::Good
        } else if score >= 50 {
            MatchGrade::Fair
        } else if score >= 30 {
            MatchGrade::Weak
        } else {
            MatchGrade::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchGrade::Excellent => "Excellent Match",
            MatchGrade::Good => "Good Match",
            MatchGrade::Fair => "Fair Match",
            MatchGrade::Weak => "Weak Match",
            MatchGrade::Poor => "Poor Match",
            MatchGrade::NoData => "No Data",
        }
    }
}

/// Per-factor point breakdown. Components always sum to the total score and
/// never exceed their stated maxima (40/20/20/10/10).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub required_skills: i32,
    pub preferred_skills: i32,
    pub experience: i32,
    pub skill_depth: i32,
    pub industry_relevance: i32,
}

impl MatchBreakdown {
    pub fn total(&self) -> i32 {
        self.required_skills
            + self.preferred_skills
            + self.experience
            + self.skill_depth
            + self.industry_relevance
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: i32,
    pub breakdown: MatchBreakdown,
    pub grade: MatchGrade,
    pub insights: Vec<String>,
}

/// Job-side inputs to scoring. Skill lists come from the AI analysis;
/// experience and description come from the scraped posting.
#[derive(Debug, Clone, Default)]
pub struct JobRequirements {
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub experience: Option<String>,
    pub job_description: String,
}

/// Computes the 0-100 match score, grade, and ordered insight list.
pub fn calculate_match_score(
    candidate_skills: &[String],
    matching_skills: &[String],
    missing_skills: &[String],
    job: &JobRequirements,
    candidate_years: Option<i64>,
    ats_score: Option<i32>,
) -> MatchResult {
    if candidate_skills.is_empty() {
        return MatchResult {
            score: 0,
            breakdown: MatchBreakdown::default(),
            grade: MatchGrade::NoData,
            insights: vec!["Upload a resume with skills to see match score".to_string()],
        };
    }

    let candidate_lower: Vec<String> = candidate_skills.iter().map(|s| s.to_lowercase()).collect();
    let matching_lower: Vec<String> = matching_skills.iter().map(|s| s.to_lowercase()).collect();

    let breakdown = MatchBreakdown {
        required_skills: required_skills_points(&candidate_lower, &matching_lower, job),
        preferred_skills: preferred_skills_points(&candidate_lower, &matching_lower, job),
        experience: experience_points(job.experience.as_deref(), candidate_years),
        skill_depth: skill_depth_points(candidate_skills.len(), &candidate_lower),
        industry_relevance: industry_relevance_points(&job.job_description, &candidate_lower),
    };

    let score = breakdown.total();
    let grade = MatchGrade::from_score(score);
    let insights = build_insights(&breakdown, score, missing_skills, ats_score);

    MatchResult {
        score,
        breakdown,
        grade,
        insights,
    }
}

/// Case-insensitive substring containment in either direction, so "React"
/// matches "ReactJS" and vice versa. Inputs must already be lowercased.
fn skills_match(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Max 40, banded on the fraction of required skills covered. Without a
/// required list (the AI analysis degraded), a flat 25 when anything
/// matches at all, else 0.
fn required_skills_points(
    candidate_lower: &[String],
    matching_lower: &[String],
    job: &JobRequirements,
) -> i32 {
    if job.required_skills.is_empty() {
        return if matching_lower.is_empty() { 0 } else { 25 };
    }
    let required_lower: Vec<String> = job
        .required_skills
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    let matched = required_lower
        .iter()
        .filter(|req| candidate_lower.iter().any(|c| skills_match(c, req)))
        .count();
    let match_rate = matched as f64 / required_lower.len() as f64;

    if match_rate >= 0.9 {
        40
    } else if match_rate >= 0.75 {
        35
    } else if match_rate >= 0.6 {
        28
    } else if match_rate >= 0.4 {
        18
    } else if match_rate >= 0.2 {
        10
    } else {
        4
    }
}

/// Max 20: linear on the preferred list when one exists, otherwise a small
/// bonus for technical skills beyond the matching set.
fn preferred_skills_points(
    candidate_lower: &[String],
    matching_lower: &[String],
    job: &JobRequirements,
) -> i32 {
    if !job.preferred_skills.is_empty() {
        let preferred_lower: Vec<String> = job
            .preferred_skills
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        let matched = preferred_lower
            .iter()
            .filter(|pref| candidate_lower.iter().any(|c| skills_match(c, pref)))
            .count();
        let match_rate = matched as f64 / preferred_lower.len() as f64;
        return (match_rate * 20.0).round() as i32;
    }

    let bonus = candidate_lower
        .iter()
        .filter(|skill| !matching_lower.contains(skill) && is_technical_skill(skill))
        .count() as i32;
    (bonus * 3).min(15)
}

fn is_technical_skill(skill_lower: &str) -> bool {
    TECHNICAL_INDICATORS
        .iter()
        .any(|indicator| skill_lower.contains(indicator))
}

/// Max 20, scored on the absolute gap between required and candidate years.
/// Defaults to 12 when either side is unknown.
fn experience_points(job_experience: Option<&str>, candidate_years: Option<i64>) -> i32 {
    let required_years = job_experience.and_then(parse_experience_years);

    match (required_years, candidate_years) {
        (Some(required), Some(actual)) => match (actual - required).abs() {
            0 => 20,
            1 => 18,
            2 => 15,
            3 => 10,
            _ => 5,
        },
        _ => 12,
    }
}

/// First integer preceding a years/yrs token, e.g. "5+ years" -> 5.
pub fn parse_experience_years(text: &str) -> Option<i64> {
    static YEARS_RE: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
        regex::Regex::new(r"(?i)(\d+)[\+\-\s]*(?:years?|yrs?)").expect("invalid years regex")
    });
    YEARS_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Max 10: banded on raw count, +2 when core skills are broadly covered.
fn skill_depth_points(skill_count: usize, candidate_lower: &[String]) -> i32 {
    let mut points = if skill_count >= 15 {
        10
    } else if skill_count >= 10 {
        8
    } else if skill_count >= 6 {
        5
    } else {
        2
    };

    let core_matches = CORE_SKILLS
        .iter()
        .filter(|core| {
            let core_lower = core.to_lowercase();
            candidate_lower.iter().any(|s| s.contains(&core_lower))
        })
        .count();
    if core_matches >= 4 {
        points = (points + 2).min(10);
    }
    points
}

/// Max 10: +2 per detected industry the candidate has a skill for; an
/// unknown industry earns the neutral default of 5, never a penalty.
fn industry_relevance_points(job_description: &str, candidate_lower: &[String]) -> i32 {
    let description_lower = job_description.to_lowercase();

    let matched = INDUSTRIES
        .iter()
        .filter(|(industry, terms)| {
            terms.iter().any(|term| description_lower.contains(term))
                && candidate_lower.iter().any(|s| s.contains(industry))
        })
        .count() as i32;

    let points = (matched * 2).min(10);
    if points == 0 {
        5
    } else {
        points
    }
}

/// Rule-ordered insight generation. The order is part of the contract:
/// ATS commentary, required skills, preferred bonus, experience, depth,
/// missing-skill call-to-action, closing recommendation.
fn build_insights(
    breakdown: &MatchBreakdown,
    total_score: i32,
    missing_skills: &[String],
    ats_score: Option<i32>,
) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(ats) = ats_score {
        if ats >= 80 {
            insights.push(format!(
                "Your resume's ATS score of {ats} is strong - it should parse cleanly in most tracking systems"
            ));
        } else if ats >= 65 {
            insights.push(format!(
                "Your resume's ATS score of {ats} is solid - tightening formatting could help it rank higher"
            ));
        } else {
            insights.push(format!(
                "Your resume's ATS score of {ats} is low - improve structure and keywords before applying"
            ));
        }
    }

    if breakdown.required_skills >= 35 {
        insights.push("Strong match on required skills - you meet most job requirements".to_string());
    } else if breakdown.required_skills >= 25 {
        insights.push(
            "Moderate match on required skills - consider highlighting related experience"
                .to_string(),
        );
    } else {
        insights
            .push("Weak match on required skills - significant skill gaps detected".to_string());
    }

    if breakdown.preferred_skills >= 15 {
        insights.push("Excellent bonus skills - you exceed expectations".to_string());
    }

    if breakdown.experience >= 15 {
        insights.push("Your experience level aligns well with this role".to_string());
    } else if breakdown.experience < 10 {
        insights.push(
            "Experience mismatch - this role may require a different seniority level".to_string(),
        );
    }

    if breakdown.skill_depth >= 8 {
        insights.push("Strong technical breadth across multiple domains".to_string());
    }

    if !missing_skills.is_empty() && missing_skills.len() <= 3 {
        insights.push(format!("Focus on learning: {}", missing_skills.join(", ")));
    } else if missing_skills.len() > 3 {
        insights.push(format!(
            "Major skill gaps: {} skills to develop",
            missing_skills.len()
        ));
    }

    if total_score >= 80 {
        insights.push("You are a top candidate for this role - apply with confidence".to_string());
    } else if total_score >= 65 {
        insights.push(
            "You have a solid chance - tailor your application to highlight matches".to_string(),
        );
    } else if total_score >= 50 {
        insights.push("This role is a stretch - consider upskilling before applying".to_string());
    } else {
        insights
            .push("Not recommended yet - focus on building relevant skills first".to_string());
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn job_with_required(required: &[&str]) -> JobRequirements {
        JobRequirements {
            required_skills: skills(required),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_candidate_skills_short_circuits_to_no_data() {
        let result = calculate_match_score(
            &[],
            &skills(&["Rust"]),
            &skills(&["Go"]),
            &job_with_required(&["Rust"]),
            Some(5),
            Some(90),
        );
        assert_eq!(result.score, 0);
        assert_eq!(result.grade, MatchGrade::NoData);
        assert_eq!(result.breakdown, MatchBreakdown::default());
        assert_eq!(
            result.insights,
            vec!["Upload a resume with skills to see match score".to_string()]
        );
    }

    #[test]
    fn test_required_component_takes_only_band_values() {
        let bands = [4, 10, 18, 28, 35, 40];
        let required: Vec<String> = (0..10).map(|i| format!("skill-{i}")).collect();
        for covered in 0..=10usize {
            let candidate: Vec<String> = required.iter().take(covered.max(1)).cloned().collect();
            let candidate = if covered == 0 {
                skills(&["unrelated-xyz"])
            } else {
                candidate
            };
            let job = JobRequirements {
                required_skills: required.clone(),
                ..Default::default()
            };
            let result = calculate_match_score(&candidate, &[], &[], &job, None, None);
            assert!(
                bands.contains(&result.breakdown.required_skills),
                "covered={covered} gave {}",
                result.breakdown.required_skills
            );
        }
    }

    #[test]
    fn test_required_component_monotonic_in_match_rate() {
        let required: Vec<String> = (0..10).map(|i| format!("skill-{i}")).collect();
        let mut last = 0;
        for covered in 1..=10usize {
            let candidate: Vec<String> = required.iter().take(covered).cloned().collect();
            let job = JobRequirements {
                required_skills: required.clone(),
                ..Default::default()
            };
            let result = calculate_match_score(&candidate, &[], &[], &job, None, None);
            assert!(
                result.breakdown.required_skills >= last,
                "non-monotonic at covered={covered}"
            );
            last = result.breakdown.required_skills;
        }
        assert_eq!(last, 40);
    }

    #[test]
    fn test_required_band_thresholds() {
        // Two-digit names so no generated skill is a substring of another.
        let required: Vec<String> = (0..20).map(|i| format!("skill-{i:02}")).collect();
        let cases = [(18, 40), (15, 35), (12, 28), (8, 18), (4, 10), (1, 4)];
        for (covered, expected) in cases {
            let candidate: Vec<String> = required.iter().take(covered).cloned().collect();
            let job = JobRequirements {
                required_skills: required.clone(),
                ..Default::default()
            };
            let result = calculate_match_score(&candidate, &[], &[], &job, None, None);
            assert_eq!(
                result.breakdown.required_skills, expected,
                "covered={covered}"
            );
        }
    }

    #[test]
    fn test_substring_matching_both_directions() {
        let job = job_with_required(&["React"]);
        let result =
            calculate_match_score(&skills(&["ReactJS"]), &[], &[], &job, None, None);
        assert_eq!(result.breakdown.required_skills, 40);

        let job = job_with_required(&["ReactJS"]);
        let result = calculate_match_score(&skills(&["React"]), &[], &[], &job, None, None);
        assert_eq!(result.breakdown.required_skills, 40);
    }

    #[test]
    fn test_no_required_list_takes_flat_band() {
        // No required list and no matching skills: flat 0.
        let result = calculate_match_score(
            &skills(&["Knitting"]),
            &[],
            &[],
            &JobRequirements::default(),
            None,
            None,
        );
        assert_eq!(result.breakdown.required_skills, 0);

        // No required list but something matched: flat 25. This is the
        // path the degraded AI analysis lands on.
        let result = calculate_match_score(
            &skills(&["Rust", "SQL"]),
            &skills(&["Rust", "SQL"]),
            &[],
            &JobRequirements::default(),
            None,
            None,
        );
        assert_eq!(result.breakdown.required_skills, 25);
    }

    #[test]
    fn test_preferred_linear_scoring() {
        let job = JobRequirements {
            required_skills: skills(&["Rust"]),
            preferred_skills: skills(&["Docker", "Kubernetes", "Terraform", "Helm"]),
            ..Default::default()
        };
        // 2 of 4 preferred covered -> round(0.5 * 20) = 10
        let result = calculate_match_score(
            &skills(&["Rust", "Docker", "Kubernetes"]),
            &[],
            &[],
            &job,
            None,
            None,
        );
        assert_eq!(result.breakdown.preferred_skills, 10);
    }

    #[test]
    fn test_preferred_bonus_capped_at_15() {
        // No preferred list: technical extras earn 3 each, capped at 15.
        let candidate = skills(&[
            "NodeJS",
            "GraphQL API",
            "PostgreSQL database",
            "Cloud architecture",
            "Data pipelines",
            "Test automation",
            "Web framework design",
        ]);
        let result = calculate_match_score(
            &candidate,
            &[],
            &[],
            &job_with_required(&["NodeJS"]),
            None,
            None,
        );
        assert_eq!(result.breakdown.preferred_skills, 15);
    }

    #[test]
    fn test_experience_difference_bands() {
        let job = JobRequirements {
            required_skills: skills(&["Rust"]),
            experience: Some("5 years of experience".to_string()),
            ..Default::default()
        };
        let cases = [(5, 20), (6, 18), (3, 15), (8, 10), (2, 10), (12, 5)];
        for (years, expected) in cases {
            let result =
                calculate_match_score(&skills(&["Rust"]), &[], &[], &job, Some(years), None);
            assert_eq!(result.breakdown.experience, expected, "years={years}");
        }
    }

    #[test]
    fn test_experience_defaults_to_12_when_unknown() {
        let job = job_with_required(&["Rust"]);
        let result = calculate_match_score(&skills(&["Rust"]), &[], &[], &job, Some(4), None);
        assert_eq!(result.breakdown.experience, 12);

        let job = JobRequirements {
            required_skills: skills(&["Rust"]),
            experience: Some("senior level".to_string()),
            ..Default::default()
        };
        let result = calculate_match_score(&skills(&["Rust"]), &[], &[], &job, Some(4), None);
        assert_eq!(result.breakdown.experience, 12);
    }

    #[test]
    fn test_parse_experience_years() {
        assert_eq!(parse_experience_years("5+ years"), Some(5));
        // For a range the match lands on the number adjacent to the unit.
        assert_eq!(parse_experience_years("3-5 yrs"), Some(5));
        assert_eq!(parse_experience_years("at least 10 years of work"), Some(10));
        assert_eq!(parse_experience_years("entry level"), None);
    }

    #[test]
    fn test_skill_depth_bands_and_core_bonus() {
        let job = job_with_required(&["Rust"]);

        let five = skills(&["Rust", "A", "B", "C", "D"]);
        let result = calculate_match_score(&five, &[], &[], &job, None, None);
        assert_eq!(result.breakdown.skill_depth, 2);

        // 6 skills covering 4 core areas: band 5 + bonus 2.
        let with_core = skills(&["JavaScript", "Python", "SQL", "Git", "Rust", "Go"]);
        let result = calculate_match_score(&with_core, &[], &[], &job, None, None);
        assert_eq!(result.breakdown.skill_depth, 7);

        let fifteen: Vec<String> = (0..15).map(|i| format!("skill-{i}")).collect();
        let result = calculate_match_score(&fifteen, &[], &[], &job, None, None);
        assert_eq!(result.breakdown.skill_depth, 10);
    }

    #[test]
    fn test_industry_relevance_defaults_to_5() {
        let job = JobRequirements {
            required_skills: skills(&["Rust"]),
            job_description: "A role doing interesting systems work".to_string(),
            ..Default::default()
        };
        let result = calculate_match_score(&skills(&["Rust"]), &[], &[], &job, None, None);
        assert_eq!(result.breakdown.industry_relevance, 5);
    }

    #[test]
    fn test_industry_relevance_matches_candidate_domain() {
        let job = JobRequirements {
            required_skills: skills(&["Rust"]),
            job_description: "We build payment infrastructure for banking clients".to_string(),
            ..Default::default()
        };
        let result = calculate_match_score(
            &skills(&["Rust", "Fintech platforms"]),
            &[],
            &[],
            &job,
            None,
            None,
        );
        assert_eq!(result.breakdown.industry_relevance, 2);
    }

    #[test]
    fn test_breakdown_sums_to_score_and_is_bounded() {
        let job = JobRequirements {
            required_skills: skills(&["Rust", "SQL"]),
            preferred_skills: skills(&["Docker"]),
            experience: Some("4 years".to_string()),
            job_description: "fintech banking payments".to_string(),
        };
        let candidate = skills(&["Rust", "SQL", "Docker", "Fintech", "Python", "Git"]);
        let result =
            calculate_match_score(&candidate, &skills(&["Rust", "SQL"]), &[], &job, Some(4), None);
        assert_eq!(result.score, result.breakdown.total());
        assert!((0..=100).contains(&result.score));
    }

    #[test]
    fn test_idempotent_for_identical_inputs() {
        let job = JobRequirements {
            required_skills: skills(&["Rust", "Tokio"]),
            preferred_skills: skills(&["Kafka"]),
            experience: Some("3 years".to_string()),
            job_description: "streaming data platform".to_string(),
        };
        let candidate = skills(&["Rust", "Tokio", "Kafka", "SQL"]);
        let a = calculate_match_score(&candidate, &[], &skills(&["Go"]), &job, Some(3), Some(70));
        let b = calculate_match_score(&candidate, &[], &skills(&["Go"]), &job, Some(3), Some(70));
        assert_eq!(a.score, b.score);
        assert_eq!(a.breakdown, b.breakdown);
        assert_eq!(a.insights, b.insights);
    }

    #[test]
    fn test_insight_ordering_full_pipeline() {
        // Crafted for a high score in every dimension, with an ATS score
        // and one missing skill, so every insight rule fires in order.
        let required: Vec<String> =
            skills(&["Rust", "SQL", "Docker", "Kubernetes", "Python", "Git", "API design"]);
        let job = JobRequirements {
            required_skills: required.clone(),
            preferred_skills: skills(&["Kafka"]),
            experience: Some("5 years".to_string()),
            job_description: "payments and banking systems".to_string(),
        };
        let mut candidate = required.clone();
        candidate.extend(skills(&[
            "Kafka",
            "JavaScript",
            "Terraform",
            "Helm",
            "Redis",
            "Linux",
            "CI/CD",
            "Fintech",
        ]));

        let result =
            calculate_match_score(&candidate, &[], &skills(&["GraphQL"]), &job, Some(5), Some(85));

        assert_eq!(result.breakdown.required_skills, 40);
        assert_eq!(result.breakdown.preferred_skills, 20);
        assert_eq!(result.breakdown.experience, 20);
        assert_eq!(result.breakdown.skill_depth, 10);
        assert_eq!(result.breakdown.industry_relevance, 2);
        assert_eq!(result.score, 92);
        assert_eq!(result.grade, MatchGrade::Excellent);

        assert_eq!(
            result.insights,
            vec![
                "Your resume's ATS score of 85 is strong - it should parse cleanly in most tracking systems".to_string(),
                "Strong match on required skills - you meet most job requirements".to_string(),
                "Excellent bonus skills - you exceed expectations".to_string(),
                "Your experience level aligns well with this role".to_string(),
                "Strong technical breadth across multiple domains".to_string(),
                "Focus on learning: GraphQL".to_string(),
                "You are a top candidate for this role - apply with confidence".to_string(),
            ]
        );
    }

    #[test]
    fn test_insight_many_missing_skills_uses_count_phrasing() {
        let job = job_with_required(&["Rust"]);
        let missing = skills(&["A1", "B2", "C3", "D4", "E5"]);
        let result =
            calculate_match_score(&skills(&["Rust"]), &[], &missing, &job, None, None);
        assert!(result
            .insights
            .contains(&"Major skill gaps: 5 skills to develop".to_string()));
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(MatchGrade::from_score(80), MatchGrade::Excellent);
        assert_eq!(MatchGrade::from_score(79), MatchGrade::Good);
        assert_eq!(MatchGrade::from_score(65), MatchGrade::Good);
        assert_eq!(MatchGrade::from_score(64), MatchGrade::Fair);
        assert_eq!(MatchGrade::from_score(50), MatchGrade::Fair);
        assert_eq!(MatchGrade::from_score(49), MatchGrade::Weak);
        assert_eq!(MatchGrade::from_score(30), MatchGrade::Weak);
        assert_eq!(MatchGrade::from_score(29), MatchGrade::Poor);
    }
}
