// All LLM prompt constants for the job ad assistant.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::job_ad::models::{
    CURRENCIES, EDUCATION_LEVELS, EMPLOYMENT_TYPES, SALARY_PERIODS, WORKPLACE_TYPES,
};
use crate::llm_client::prompts::{GUESS_DISCLOSURE_INSTRUCTION, JSON_ONLY_SYSTEM};

/// System prompt for the primary generation call.
pub const JOB_AD_SYSTEM: &str = "You are an experienced recruiter who writes clear, \
    friendly job ads. Turn a recruiter's free-text description of an open position \
    into a structured job ad draft.";

/// Generation prompt template.
/// Replace: {employment_types}, {workplace_types}, {currencies}, {salary_periods},
///          {education_levels}, {guess_instruction}, {description}
pub const JOB_AD_PROMPT_TEMPLATE: &str = r#"Write a job ad draft for the position described below.

Return a JSON object with this EXACT schema:
{
  "job_title": "Office Assistant",
  "job_title_variants": {"friendly": "Office Assistant for a Friendly Team"},
  "employment_type": ["part-time"],
  "place_of_work": {"type": "Work is regularly performed in one workplace", "location": "Bratislava"},
  "salary": {"amount": 600, "currency": "EUR", "time_period": "per month"},
  "education_attained": "secondary school with a GCSE equivalent",
  "job_description_html": "<ul><li>...</li></ul>",
  "employee_benefits_html": "<ul><li>...</li></ul>",
  "personality_prerequisites_and_skills_html": "<ul><li>...</li></ul>",
  "missing_info": [],
  "follow_up_questions": ""
}

ALLOWED VALUES (use these strings exactly):
- employment_type (one or more): {employment_types}
- place_of_work.type: {workplace_types}
- salary.currency: {currencies}
- salary.time_period: {salary_periods}
- education_attained: {education_levels}

RULES:
1. `job_title` is at most 60 characters.
2. `place_of_work.location` may be omitted for remote work.
3. `salary.amount` is a plain non-negative number, no currency sign.
4. Each *_html field is one <ul> with 5-6 <li> items written in the second person ("You will...", "You receive...").
5. {guess_instruction}
6. If you guessed anything, put one or two short questions for the recruiter in `follow_up_questions`; otherwise leave it empty.

POSITION DESCRIPTION:
{description}"#;

/// System prompt for the supplementary gap-fill call.
pub const GAP_FILL_SYSTEM: &str = "You complete partially written job ad drafts. \
    Fill in only the fields you are asked for, consistent with the fields already known.";

/// Gap-fill prompt template. Replace: {known_fields_json}, {missing_fields}
pub const GAP_FILL_PROMPT_TEMPLATE: &str = r#"A job ad draft is missing some fields.

KNOWN FIELDS:
{known_fields_json}

MISSING FIELDS (dotted names are nested keys):
{missing_fields}

Return a JSON object containing ONLY the missing fields, using the same nested shape as the known fields
(for example "salary.currency" becomes {"salary": {"currency": "EUR"}}).
HTML list fields are one <ul> with 5-6 <li> items written in the second person."#;

fn quoted(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full system prompt for the primary call.
pub fn job_ad_system() -> String {
    format!("{JOB_AD_SYSTEM} {JSON_ONLY_SYSTEM}")
}

/// Fills the generation template for a recruiter's description.
pub fn build_job_ad_prompt(description: &str) -> String {
    JOB_AD_PROMPT_TEMPLATE
        .replace("{employment_types}", &quoted(EMPLOYMENT_TYPES))
        .replace("{workplace_types}", &quoted(WORKPLACE_TYPES))
        .replace("{currencies}", &quoted(CURRENCIES))
        .replace("{salary_periods}", &quoted(SALARY_PERIODS))
        .replace("{education_levels}", &quoted(EDUCATION_LEVELS))
        .replace("{guess_instruction}", GUESS_DISCLOSURE_INSTRUCTION)
        // Last, so braces inside the description are never treated as placeholders.
        .replace("{description}", description.trim())
}

/// Full system prompt for the gap-fill call.
pub fn gap_fill_system() -> String {
    format!("{GAP_FILL_SYSTEM} {JSON_ONLY_SYSTEM}")
}

pub fn build_gap_fill_prompt(known_fields_json: &str, missing_fields: &[&str]) -> String {
    GAP_FILL_PROMPT_TEMPLATE
        .replace("{missing_fields}", &missing_fields.join("\n"))
        .replace("{known_fields_json}", known_fields_json)
}
