//! Gap Filler: one bounded supplementary call for required fields the
//! primary reply left empty.
//!
//! At most one extra backend call per generation. Fields still missing after
//! that call are accepted as-is; there is no second round.

use tracing::info;

use crate::job_ad::extractor::extract;
use crate::job_ad::models::{FormField, JobAdDraft};
use crate::job_ad::pipeline::GenerationError;
use crate::job_ad::prompts::{build_gap_fill_prompt, gap_fill_system};
use crate::llm_client::{CompletionBackend, CompletionRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct GapFill {
    pub draft: JobAdDraft,
    /// Fields asked for in the supplementary call (empty when no call was made).
    pub requested: Vec<FormField>,
    /// Requested fields the supplementary reply actually supplied.
    pub filled: Vec<FormField>,
}

/// Fills required-but-empty fields of `draft` with a single supplementary call.
///
/// Only fields in the gap set are merged from the supplementary reply; any
/// other keys it returns are ignored.
pub async fn fill_gaps(
    backend: &dyn CompletionBackend,
    draft: &JobAdDraft,
    required: &[FormField],
    temperature: Option<f32>,
) -> Result<GapFill, GenerationError> {
    let missing = draft.missing(required);
    if missing.is_empty() {
        return Ok(GapFill {
            draft: draft.clone(),
            requested: Vec::new(),
            filled: Vec::new(),
        });
    }

    let missing_keys: Vec<&str> = missing.iter().map(|f| f.payload_key()).collect();
    info!("Requesting {} missing field(s): {}", missing.len(), missing_keys.join(", "));

    let known = format!("{:#}", draft.known_fields_json());

    let request = CompletionRequest::new(
        gap_fill_system(),
        build_gap_fill_prompt(&known, &missing_keys),
    )
    .with_temperature(temperature);

    let raw = backend.complete(&request).await?;
    let supplement = extract(&raw)?;

    let mut merged = draft.clone();
    let filled: Vec<FormField> = missing
        .iter()
        .copied()
        .filter(|field| merged.merge_field(*field, &supplement))
        .collect();

    info!("Gap fill supplied {}/{} field(s)", filled.len(), missing.len());

    Ok(GapFill {
        draft: merged,
        requested: missing,
        filled,
    })
}
