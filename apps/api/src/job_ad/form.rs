//! Form Model: the per-session store of current field values plus the
//! bookkeeping the presentation surface needs (provenance, summary flag,
//! follow-up questions).
//!
//! This is a passive store: it never validates values, so out-of-vocabulary
//! strings are kept exactly as the caller supplied them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::job_ad::models::{FieldValue, FormField};

/// Fields written by the assistant during one generation.
pub type ProvenanceSet = BTreeSet<FormField>;

/// Who last wrote a field.
///
/// `Unset → AiFilled` on a generation write, `AiFilled → UserEdited` on a
/// direct edit. A direct edit always lands in `UserEdited`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Unset,
    AiFilled,
    UserEdited,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormModel {
    values: BTreeMap<FormField, FieldValue>,
    provenance: BTreeMap<FormField, Provenance>,
    /// Whether the "prefilled by AI" summary should be shown.
    pub show_summary: bool,
    pub follow_up_questions: Option<String>,
    /// The backend's `missing_info` from the last generation.
    pub missing_fields: Vec<String>,
    /// ProvenanceSet of the most recent successful generation.
    pub last_generation: ProvenanceSet,
}

impl Default for FormModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FormModel {
    pub fn new() -> Self {
        Self {
            values: FormField::ALL
                .into_iter()
                .map(|f| (f, f.default_value()))
                .collect(),
            provenance: BTreeMap::new(),
            show_summary: false,
            follow_up_questions: None,
            missing_fields: Vec::new(),
            last_generation: ProvenanceSet::new(),
        }
    }

    /// Raw write. Provenance is left alone; use `edit` for user changes.
    pub fn set(&mut self, field: FormField, value: FieldValue) {
        self.values.insert(field, value);
    }

    /// A direct user edit: stores the value and clears any ai-filled marker.
    pub fn edit(&mut self, field: FormField, value: FieldValue) {
        self.set(field, value);
        self.provenance.insert(field, Provenance::UserEdited);
    }

    pub fn mark_ai_filled(&mut self, field: FormField) {
        self.provenance.insert(field, Provenance::AiFilled);
    }

    pub fn provenance(&self, field: FormField) -> Provenance {
        self.provenance.get(&field).copied().unwrap_or_default()
    }

    /// Fields whose current value still comes from the assistant.
    pub fn ai_filled(&self) -> ProvenanceSet {
        FormField::ALL
            .into_iter()
            .filter(|f| self.provenance(*f) == Provenance::AiFilled)
            .collect()
    }

    pub fn values(&self) -> &BTreeMap<FormField, FieldValue> {
        &self.values
    }

    /// Restores every field and all bookkeeping to the session-start defaults.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
