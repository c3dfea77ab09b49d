// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps the model from presenting guesses as facts.
pub const GUESS_DISCLOSURE_INSTRUCTION: &str = "\
    If the description does not state a value, make a sensible guess from the context \
    and list the field name in `missing_info`. Never leave a required field out.";
