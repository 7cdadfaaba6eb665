//! Prompt templates for the AI job-fit analysis.

pub const JOB_FIT_SYSTEM: &str = "You are an expert career counselor and recruiter. \
You respond with a single JSON object and nothing else: no prose before or \
after it, no markdown fences.";

pub const JOB_FIT_PROMPT_TEMPLATE: &str = r#"Analyze the following job posting and the candidate's resume to provide detailed insights.

JOB POSTING:
Title: {job_title}
Company: {company_name}
Location: {location}
Experience: {experience}
Description: {job_description}

CANDIDATE'S SKILLS:
{candidate_skills}

CANDIDATE'S EXPERIENCE:
{candidate_summary}

Provide a comprehensive analysis in exactly this JSON format:
{
  "requiredSkills": ["skill1", "skill2"],
  "preferredSkills": ["skill1", "skill2"],
  "matchingSkills": ["skills that the candidate has and the job requires"],
  "missingSkills": ["skills that the job requires but the candidate lacks"],
  "strengths": ["candidate's strengths relevant to this role"],
  "areasToImprove": ["areas where the candidate should improve"],
  "recommendations": ["specific actionable recommendations"],
  "summary": "A 2-3 paragraph analysis of the candidate's fit for this role"
}

{no_skills_note}"#;

pub const NO_SKILLS_NOTE: &str = "NOTE: Since candidate skills are not available, focus on \
extracting job requirements and providing general recommendations.";
