//! Response Extractor: recovers the structured draft from a raw backend reply.

use thiserror::Error;
use tracing::warn;

use crate::job_ad::models::JobAdDraft;

/// The reply held no recoverable payload, or the payload was not valid JSON
/// of the expected shape.
#[derive(Debug, Error)]
#[error("could not read a job ad from the AI reply: {source}")]
pub struct ParseError {
    /// The text that was handed to the JSON parser.
    pub text: String,
    #[source]
    pub source: serde_json::Error,
}

/// Parses the payload between the first `{` and the last `}` of `raw`.
///
/// Prose or code fences around the object are ignored. Without a brace pair
/// the whole text is parsed, which fails for plain prose. Only one object per
/// reply is supported: braces in surrounding prose widen the slice.
pub fn extract(raw: &str) -> Result<JobAdDraft, ParseError> {
    let candidate = payload_slice(raw);

    let draft: JobAdDraft = serde_json::from_str(candidate).map_err(|source| ParseError {
        text: candidate.to_string(),
        source,
    })?;

    if !draft.unrecognized.is_empty() {
        warn!(
            "Ignoring unrecognized keys in AI reply: {:?}",
            draft.unrecognized.keys().collect::<Vec<_>>()
        );
    }
    for (field, value) in draft.out_of_vocabulary() {
        warn!("AI reply has out-of-vocabulary value for {field}: {value:?}");
    }

    Ok(draft)
}

fn payload_slice(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    }
}
