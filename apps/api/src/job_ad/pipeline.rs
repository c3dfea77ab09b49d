//! Job ad generation: orchestrates one "generate" action for a session.
//!
//! Flow: validate input → primary completion → extract draft →
//!       gap fill (at most one extra call) → map into the form.
//!
//! The form is only written after every fallible step has succeeded, so a
//! failed action leaves the previous form state untouched.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::job_ad::extractor::{extract, ParseError};
use crate::job_ad::field_mapper::{apply_draft, MapOptions};
use crate::job_ad::form::{FormModel, ProvenanceSet};
use crate::job_ad::gap_filler::fill_gaps;
use crate::job_ad::models::{FormField, JobAdDraft, REQUIRED_FIELDS};
use crate::job_ad::prompts::{build_job_ad_prompt, job_ad_system};
use crate::llm_client::{CompletionBackend, CompletionRequest, LlmError};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Please describe the position before using the AI assistant")]
    EmptyInput,

    #[error("The AI assistant is unavailable: {0}")]
    Completion(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub map: MapOptions,
}

/// What one successful generation did to the form.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Fields written by the assistant in this generation.
    pub provenance: ProvenanceSet,
    /// Required fields the primary reply left empty.
    pub requested_gaps: Vec<FormField>,
    /// Required fields still empty after the gap fill.
    pub unfilled_gaps: Vec<FormField>,
    pub follow_up_questions: Option<String>,
    pub summary: String,
}

/// Runs the full pipeline for `description` and writes the result into `form`.
pub async fn generate_into_form(
    backend: &dyn CompletionBackend,
    form: &mut FormModel,
    description: &str,
    options: &GenerationOptions,
) -> Result<GenerationReport, GenerationError> {
    if description.trim().is_empty() {
        return Err(GenerationError::EmptyInput);
    }

    // Step 1: Primary completion
    let request = CompletionRequest::new(job_ad_system(), build_job_ad_prompt(description))
        .with_temperature(options.temperature);
    let raw = backend.complete(&request).await?;

    // Step 2: Extract draft
    let draft = extract(&raw)?;
    info!(
        "Draft extracted: title={:?}, guessed={:?}",
        draft.job_title, draft.missing_info
    );

    // Step 3: Gap fill. A failed supplementary call degrades to a partial result.
    let gap_fill = fill_gaps(backend, &draft, REQUIRED_FIELDS, options.temperature).await;
    let (draft, requested_gaps, unfilled_gaps) = match gap_fill {
        Ok(gap_fill) => {
            let unfilled: Vec<FormField> = gap_fill
                .requested
                .iter()
                .copied()
                .filter(|field| !gap_fill.filled.contains(field))
                .collect();
            (gap_fill.draft, gap_fill.requested, unfilled)
        }
        Err(e) => {
            warn!("Gap fill failed, keeping partial draft: {e}");
            let requested = draft.missing(REQUIRED_FIELDS);
            (draft, requested.clone(), requested)
        }
    };
    if !unfilled_gaps.is_empty() {
        warn!(
            "Generation finished with {} required field(s) empty: {:?}",
            unfilled_gaps.len(),
            unfilled_gaps
        );
    }

    // Step 4: Map into the form
    let follow_up_questions = follow_up_text(&draft);
    let provenance = apply_draft(form, &draft, &options.map);
    form.show_summary = true;
    form.follow_up_questions = follow_up_questions.clone();
    form.missing_fields = draft.missing_info.clone();

    let summary = build_summary(&provenance, &unfilled_gaps);
    info!("{summary}");

    Ok(GenerationReport {
        provenance,
        requested_gaps,
        unfilled_gaps,
        follow_up_questions,
        summary,
    })
}

/// The backend's own follow-up text, or a prompt listing the guessed fields.
fn follow_up_text(draft: &JobAdDraft) -> Option<String> {
    if let Some(text) = draft
        .follow_up_questions
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(text.to_string());
    }

    let guessed: Vec<&str> = draft
        .missing_info
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if guessed.is_empty() {
        return None;
    }
    Some(format!(
        "The assistant guessed these details, please check them: {}",
        guessed.join(", ")
    ))
}

fn build_summary(provenance: &ProvenanceSet, unfilled: &[FormField]) -> String {
    let mut summary = format!(
        "AI prefilled {} of {} fields",
        provenance.len(),
        FormField::ALL.len()
    );
    if !unfilled.is_empty() {
        let names: Vec<&str> = unfilled.iter().map(|f| f.as_str()).collect();
        summary.push_str(&format!(
            "; still empty, please fill in: {}",
            names.join(", ")
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_ad::form::Provenance;
    use crate::job_ad::models::FieldValue;
    use crate::llm_client::testing::{Scripted, ScriptedBackend};

    const DESCRIPTION: &str = "We need a part-time office assistant in Bratislava, \
        600 EUR/month, high-school diploma required";

    const FULL_REPLY: &str = r#"{
        "job_title": "Office Assistant",
        "job_title_variants": {"friendly": "Office Assistant in a Friendly Team"},
        "employment_type": ["part-time"],
        "place_of_work": {"type": "Work is regularly performed in one workplace", "location": "Bratislava"},
        "salary": {"amount": 600, "currency": "EUR", "time_period": "per month"},
        "education_attained": "secondary school with a GCSE equivalent",
        "job_description_html": "<ul><li>Provide administrative support to the team</li></ul>",
        "employee_benefits_html": "<ul><li>You receive meal vouchers for each workday</li></ul>",
        "personality_prerequisites_and_skills_html": "<ul><li>You are organized and detail-oriented</li></ul>",
        "missing_info": []
    }"#;

    const NO_BENEFITS_REPLY: &str = r#"{
        "job_title": "Office Assistant",
        "employment_type": ["part-time"],
        "place_of_work": {"type": "Work is regularly performed in one workplace", "location": "Bratislava"},
        "salary": {"amount": 600, "currency": "EUR", "time_period": "per month"},
        "education_attained": "secondary school with a GCSE equivalent",
        "job_description_html": "<ul><li>Provide administrative support to the team</li></ul>",
        "personality_prerequisites_and_skills_html": "<ul><li>You are organized</li></ul>",
        "missing_info": []
    }"#;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn assert_scenario_a_fields(form: &FormModel, report: &GenerationReport) {
        assert!(!form.values().get(&FormField::JobTitle).unwrap().is_empty());
        assert_eq!(
            form.values().get(&FormField::EmploymentType),
            Some(&FieldValue::List(vec!["part-time".to_string()]))
        );
        assert_eq!(form.values().get(&FormField::WorkplaceLocation), Some(&text("Bratislava")));
        assert_eq!(
            form.values().get(&FormField::SalaryAmount),
            Some(&FieldValue::Number(600.0))
        );
        assert_eq!(form.values().get(&FormField::SalaryCurrency), Some(&text("EUR")));
        assert_eq!(form.values().get(&FormField::SalaryPeriod), Some(&text("per month")));
        assert_eq!(
            form.values().get(&FormField::Education),
            Some(&text("secondary school with a GCSE equivalent"))
        );
        for field in [
            FormField::JobTitle,
            FormField::EmploymentType,
            FormField::WorkplaceLocation,
            FormField::SalaryAmount,
            FormField::SalaryCurrency,
            FormField::SalaryPeriod,
            FormField::Education,
        ] {
            assert!(report.provenance.contains(&field), "{field} not in provenance");
        }
        assert!(form.follow_up_questions.is_none());
        assert!(report.follow_up_questions.is_none());
    }

    #[tokio::test]
    async fn test_scenario_a_well_formed_reply_fills_form() {
        let backend = ScriptedBackend::replying(&[FULL_REPLY]);
        let mut form = FormModel::new();

        let report = generate_into_form(&backend, &mut form, DESCRIPTION, &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(backend.calls(), 1);
        assert_scenario_a_fields(&form, &report);
        assert!(form.show_summary);
        assert!(report.requested_gaps.is_empty());
        assert!(report.unfilled_gaps.is_empty());
        assert_eq!(form.provenance(FormField::JobTitle), Provenance::AiFilled);
        assert!(backend.requests()[0].prompt.contains("office assistant in Bratislava"));
    }

    #[tokio::test]
    async fn test_scenario_b_reply_wrapped_in_prose() {
        let reply = format!(
            "Of course! Based on your description, here is the draft:\n{FULL_REPLY}\nI hope this helps."
        );
        let backend = ScriptedBackend::replying(&[reply.as_str()]);
        let mut form = FormModel::new();

        let report = generate_into_form(&backend, &mut form, DESCRIPTION, &GenerationOptions::default())
            .await
            .unwrap();

        assert_scenario_a_fields(&form, &report);
    }

    #[tokio::test]
    async fn test_scenario_c_plain_prose_leaves_form_unchanged() {
        let backend =
            ScriptedBackend::replying(&["I'm sorry, I need more details about the position."]);
        let mut form = FormModel::new();
        form.edit(FormField::JobTitle, FieldValue::Text("Draft title".to_string()));
        let before = form.clone();

        let err = generate_into_form(&backend, &mut form, DESCRIPTION, &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Parse(_)));
        assert!(!err.to_string().is_empty());
        assert_eq!(form, before);
    }

    #[tokio::test]
    async fn test_scenario_d_gap_is_filled_by_supplementary_call() {
        let backend = ScriptedBackend::replying(&[
            NO_BENEFITS_REPLY,
            r#"{"employee_benefits_html": "<ul><li>Flexible working hours</li></ul>"}"#,
        ]);
        let mut form = FormModel::new();

        let report = generate_into_form(&backend, &mut form, DESCRIPTION, &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(backend.calls(), 2);
        assert_eq!(report.requested_gaps, vec![FormField::EmployeeBenefitsHtml]);
        assert!(report.unfilled_gaps.is_empty());
        assert!(report.provenance.contains(&FormField::EmployeeBenefitsHtml));
        assert_eq!(
            form.values().get(&FormField::EmployeeBenefitsHtml),
            Some(&text("<ul><li>Flexible working hours</li></ul>"))
        );

        let gap_prompt = &backend.requests()[1].prompt;
        assert!(gap_prompt.contains("employee_benefits_html"));
        assert!(!gap_prompt.contains("MISSING FIELDS (dotted names are nested keys):\njob_title"));
    }

    #[tokio::test]
    async fn test_scenario_d_failed_supplementary_call_is_partial_success() {
        let backend = ScriptedBackend::new(vec![
            Scripted::Reply(NO_BENEFITS_REPLY.to_string()),
            Scripted::Fail {
                status: 500,
                message: "internal error".to_string(),
            },
        ]);
        let mut form = FormModel::new();

        let report = generate_into_form(&backend, &mut form, DESCRIPTION, &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(backend.calls(), 2);
        assert_eq!(report.unfilled_gaps, vec![FormField::EmployeeBenefitsHtml]);
        assert!(!report.provenance.contains(&FormField::EmployeeBenefitsHtml));
        assert_eq!(form.values().get(&FormField::EmployeeBenefitsHtml), Some(&text("")));
        assert!(report.summary.contains("employee_benefits_html"));
        assert_eq!(form.values().get(&FormField::JobTitle), Some(&text("Office Assistant")));
    }

    #[tokio::test]
    async fn test_unreadable_salary_amount_is_requested_as_gap() {
        let reply = FULL_REPLY.replace(r#""amount": 600"#, r#""amount": "to be agreed""#);
        let backend = ScriptedBackend::replying(&[
            reply.as_str(),
            r#"{"salary": {"amount": "650"}}"#,
        ]);
        let mut form = FormModel::new();

        let report = generate_into_form(&backend, &mut form, DESCRIPTION, &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(backend.calls(), 2);
        assert_eq!(report.requested_gaps, vec![FormField::SalaryAmount]);
        assert!(report.unfilled_gaps.is_empty());
        assert_eq!(
            form.values().get(&FormField::SalaryAmount),
            Some(&FieldValue::Number(650.0))
        );
        assert_eq!(form.values().get(&FormField::JobTitle), Some(&text("Office Assistant")));
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_backend() {
        let backend = ScriptedBackend::replying(&[FULL_REPLY]);
        let mut form = FormModel::new();

        let err = generate_into_form(&backend, &mut form, "  \n\t ", &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::EmptyInput));
        assert_eq!(backend.calls(), 0);
        assert_eq!(form, FormModel::new());
    }

    #[tokio::test]
    async fn test_completion_failure_leaves_form_unchanged() {
        let backend = ScriptedBackend::new(vec![Scripted::Fail {
            status: 401,
            message: "invalid x-api-key".to_string(),
        }]);
        let mut form = FormModel::new();

        let err = generate_into_form(&backend, &mut form, DESCRIPTION, &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Completion(_)));
        assert!(err.to_string().contains("invalid x-api-key"));
        assert_eq!(form, FormModel::new());
    }

    #[tokio::test]
    async fn test_guessed_fields_produce_follow_up_questions() {
        let reply = FULL_REPLY.replace(
            r#""missing_info": []"#,
            r#""missing_info": ["salary.amount", "education_attained"]"#,
        );
        let backend = ScriptedBackend::replying(&[reply.as_str()]);
        let mut form = FormModel::new();

        let report = generate_into_form(&backend, &mut form, DESCRIPTION, &GenerationOptions::default())
            .await
            .unwrap();

        let questions = report.follow_up_questions.unwrap();
        assert!(questions.contains("salary.amount"));
        assert!(questions.contains("education_attained"));
        assert_eq!(form.missing_fields, vec!["salary.amount", "education_attained"]);
    }

    #[tokio::test]
    async fn test_backend_follow_up_text_wins() {
        let reply = FULL_REPLY.replace(
            r#""missing_info": []"#,
            r#""missing_info": ["salary.amount"], "follow_up_questions": "Is the salary gross or net?""#,
        );
        let backend = ScriptedBackend::replying(&[reply.as_str()]);
        let mut form = FormModel::new();

        generate_into_form(&backend, &mut form, DESCRIPTION, &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(
            form.follow_up_questions.as_deref(),
            Some("Is the salary gross or net?")
        );
    }

    #[tokio::test]
    async fn test_regeneration_overwrites_user_edit_only_where_draft_has_values() {
        let backend = ScriptedBackend::replying(&[
            r#"{"job_title": "Cook", "employment_type": ["full-time"], "place_of_work": {"type": "Remote work"},
                "salary": {"amount": 1000, "currency": "EUR", "time_period": "per month"},
                "education_attained": "elementary education", "job_description_html": "<ul><li>Cook</li></ul>",
                "employee_benefits_html": "<ul><li>Meals</li></ul>",
                "personality_prerequisites_and_skills_html": "<ul><li>Calm</li></ul>"}"#,
        ]);
        let mut form = FormModel::new();
        form.edit(FormField::WorkplaceLocation, FieldValue::Text("Žilina".to_string()));

        let report = generate_into_form(&backend, &mut form, "A cook", &GenerationOptions::default())
            .await
            .unwrap();

        assert!(!report.provenance.contains(&FormField::WorkplaceLocation));
        assert_eq!(form.values().get(&FormField::WorkplaceLocation), Some(&text("Žilina")));
        assert_eq!(
            form.provenance(FormField::WorkplaceLocation),
            Provenance::UserEdited
        );
    }

    #[tokio::test]
    async fn test_options_reach_backend_and_mapper() {
        let backend = ScriptedBackend::replying(&[FULL_REPLY]);
        let mut form = FormModel::new();
        let options = GenerationOptions {
            temperature: Some(0.2),
            map: MapOptions {
                normalize_html_lists: true,
                bullet_marker: "- ".to_string(),
            },
        };

        generate_into_form(&backend, &mut form, DESCRIPTION, &options)
            .await
            .unwrap();

        assert_eq!(backend.requests()[0].temperature, Some(0.2));
        assert_eq!(
            form.values().get(&FormField::EmployeeBenefitsHtml),
            Some(&text("- You receive meal vouchers for each workday"))
        );
    }

    #[test]
    fn test_summary_mentions_unfilled_fields() {
        let provenance = ProvenanceSet::from([FormField::JobTitle]);
        assert_eq!(build_summary(&provenance, &[]), "AI prefilled 1 of 12 fields");
        let with_gap = build_summary(&provenance, &[FormField::Education]);
        assert!(with_gap.ends_with("still empty, please fill in: education"));
    }
}
