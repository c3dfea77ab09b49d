//! Job ad data model: the backend's structured draft, the flat form field set,
//! and the fixed vocabularies the presentation surface offers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

// ────────────────────────────────────────────────────────────────────────────
// Vocabularies
// ────────────────────────────────────────────────────────────────────────────

pub const EMPLOYMENT_TYPES: &[&str] = &[
    "full-time",
    "part-time",
    "internship",
    "trade licence",
    "agreement-based",
];

pub const WORKPLACE_TYPES: &[&str] = &[
    "Work is regularly performed in one workplace",
    "Work at a workplace with optional work from home",
    "Remote work",
    "The job requires travel",
];

pub const CURRENCIES: &[&str] = &["EUR", "CZK", "HUF"];

pub const SALARY_PERIODS: &[&str] = &["per month", "per hour"];

/// Ordered from lowest to highest.
pub const EDUCATION_LEVELS: &[&str] = &[
    "elementary education",
    "secondary school with a GCSE equivalent",
    "secondary school with an A-Levels equivalent",
    "post-secondary technical follow-up / tertiary professional",
    "I. level university degree",
    "II. level university degree",
    "III. level university degree",
];

pub const DEFAULT_CURRENCY: &str = "EUR";
pub const DEFAULT_SALARY_PERIOD: &str = "per month";

/// The vocabularies served to the presentation surface.
#[derive(Debug, Clone, Serialize)]
pub struct Vocabulary {
    pub employment_types: &'static [&'static str],
    pub workplace_types: &'static [&'static str],
    pub currencies: &'static [&'static str],
    pub salary_periods: &'static [&'static str],
    pub education_levels: &'static [&'static str],
}

pub const VOCABULARY: Vocabulary = Vocabulary {
    employment_types: EMPLOYMENT_TYPES,
    workplace_types: WORKPLACE_TYPES,
    currencies: CURRENCIES,
    salary_periods: SALARY_PERIODS,
    education_levels: EDUCATION_LEVELS,
};

// ────────────────────────────────────────────────────────────────────────────
// Form fields
// ────────────────────────────────────────────────────────────────────────────

/// A field of the flat form model. Nested payload keys are flattened here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    JobTitle,
    JobTitleFriendly,
    EmploymentType,
    WorkplaceType,
    WorkplaceLocation,
    SalaryAmount,
    SalaryCurrency,
    SalaryPeriod,
    Education,
    JobDescriptionHtml,
    EmployeeBenefitsHtml,
    #[serde(rename = "personality_prerequisites_and_skills_html")]
    SkillsHtml,
}

/// Fields a generation must produce; anything still missing triggers one gap-fill call.
pub const REQUIRED_FIELDS: &[FormField] = &[
    FormField::JobTitle,
    FormField::EmploymentType,
    FormField::WorkplaceType,
    FormField::SalaryAmount,
    FormField::SalaryCurrency,
    FormField::SalaryPeriod,
    FormField::Education,
    FormField::JobDescriptionHtml,
    FormField::EmployeeBenefitsHtml,
    FormField::SkillsHtml,
];

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::JobTitle,
        FormField::JobTitleFriendly,
        FormField::EmploymentType,
        FormField::WorkplaceType,
        FormField::WorkplaceLocation,
        FormField::SalaryAmount,
        FormField::SalaryCurrency,
        FormField::SalaryPeriod,
        FormField::Education,
        FormField::JobDescriptionHtml,
        FormField::EmployeeBenefitsHtml,
        FormField::SkillsHtml,
    ];

    /// Flat form key.
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::JobTitle => "job_title",
            FormField::JobTitleFriendly => "job_title_friendly",
            FormField::EmploymentType => "employment_type",
            FormField::WorkplaceType => "workplace_type",
            FormField::WorkplaceLocation => "workplace_location",
            FormField::SalaryAmount => "salary_amount",
            FormField::SalaryCurrency => "salary_currency",
            FormField::SalaryPeriod => "salary_period",
            FormField::Education => "education",
            FormField::JobDescriptionHtml => "job_description_html",
            FormField::EmployeeBenefitsHtml => "employee_benefits_html",
            FormField::SkillsHtml => "personality_prerequisites_and_skills_html",
        }
    }

    /// Dotted key of the field in the backend payload.
    pub fn payload_key(self) -> &'static str {
        match self {
            FormField::JobTitle => "job_title",
            FormField::JobTitleFriendly => "job_title_variants.friendly",
            FormField::EmploymentType => "employment_type",
            FormField::WorkplaceType => "place_of_work.type",
            FormField::WorkplaceLocation => "place_of_work.location",
            FormField::SalaryAmount => "salary.amount",
            FormField::SalaryCurrency => "salary.currency",
            FormField::SalaryPeriod => "salary.time_period",
            FormField::Education => "education_attained",
            FormField::JobDescriptionHtml => "job_description_html",
            FormField::EmployeeBenefitsHtml => "employee_benefits_html",
            FormField::SkillsHtml => "personality_prerequisites_and_skills_html",
        }
    }

    pub fn is_html_list(self) -> bool {
        matches!(
            self,
            FormField::JobDescriptionHtml | FormField::EmployeeBenefitsHtml | FormField::SkillsHtml
        )
    }

    /// The fixed vocabulary for enum-typed fields.
    pub fn vocabulary(self) -> Option<&'static [&'static str]> {
        match self {
            FormField::EmploymentType => Some(EMPLOYMENT_TYPES),
            FormField::WorkplaceType => Some(WORKPLACE_TYPES),
            FormField::SalaryCurrency => Some(CURRENCIES),
            FormField::SalaryPeriod => Some(SALARY_PERIODS),
            FormField::Education => Some(EDUCATION_LEVELS),
            _ => None,
        }
    }

    pub fn default_value(self) -> FieldValue {
        match self {
            FormField::EmploymentType => FieldValue::List(Vec::new()),
            FormField::SalaryAmount => FieldValue::Number(0.0),
            FormField::SalaryCurrency => FieldValue::Text(DEFAULT_CURRENCY.to_string()),
            FormField::SalaryPeriod => FieldValue::Text(DEFAULT_SALARY_PERIOD.to_string()),
            _ => FieldValue::Text(String::new()),
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown form field '{}'", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for FormField {
    type Err = UnknownField;

    /// Accepts both flat form keys and dotted payload keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|f| f.as_str() == s || f.payload_key() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// A form value as the presentation surface sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Number(n) => !n.is_finite(),
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|i| i.trim().is_empty()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Number(n) => Value::from(*n),
            FieldValue::Text(s) => Value::from(s.as_str()),
            FieldValue::List(items) => Value::from(items.clone()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend draft
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JobTitleVariants {
    pub friendly: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaceOfWork {
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Salary {
    #[serde(deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub time_period: Option<String>,
}

/// The structured record the backend returns. Every field is optional so a
/// partial reply still parses; enum-typed values are kept verbatim, even when
/// they fall outside their vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobAdDraft {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_title_variants: Option<JobTitleVariants>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub employment_type: Option<Vec<String>>,
    #[serde(default)]
    pub place_of_work: Option<PlaceOfWork>,
    #[serde(default)]
    pub salary: Option<Salary>,
    #[serde(default)]
    pub education_attained: Option<String>,
    #[serde(default)]
    pub job_description_html: Option<String>,
    #[serde(default)]
    pub employee_benefits_html: Option<String>,
    #[serde(default)]
    pub personality_prerequisites_and_skills_html: Option<String>,
    /// Field names the backend guessed rather than read from the description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub missing_info: Vec<String>,
    #[serde(default)]
    pub follow_up_questions: Option<String>,
    /// Top-level keys outside the known payload shape.
    #[serde(flatten)]
    pub unrecognized: BTreeMap<String, Value>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(s)) => Some(vec![s]),
        Some(OneOrMany::Many(v)) => Some(v),
        None => None,
    })
}

/// Accepts a number or a numeric string ("600", " 1 200 ", "7,50"). Anything
/// else is logged and dropped so the field counts as a gap.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_amount(&s).or_else(|| {
            warn!("Dropping unreadable salary amount: {s:?}");
            None
        }),
        Some(other) => {
            warn!("Dropping salary amount of unexpected type: {other}");
            None
        }
    };
    Ok(amount.filter(|n| n.is_finite()))
}

fn parse_amount(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty_text(value: &Option<String>) -> Option<FieldValue> {
    value
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| FieldValue::Text(s.clone()))
}

impl JobAdDraft {
    /// The draft's value for `field`, or `None` when absent or empty.
    pub fn value_of(&self, field: FormField) -> Option<FieldValue> {
        let place = self.place_of_work.as_ref();
        let salary = self.salary.as_ref();
        let value = match field {
            FormField::JobTitle => non_empty_text(&self.job_title),
            FormField::JobTitleFriendly => self
                .job_title_variants
                .as_ref()
                .and_then(|v| non_empty_text(&v.friendly)),
            FormField::EmploymentType => self.employment_type.as_ref().map(|types| {
                FieldValue::List(
                    types
                        .iter()
                        .filter(|t| !t.trim().is_empty())
                        .cloned()
                        .collect(),
                )
            }),
            FormField::WorkplaceType => place.and_then(|p| non_empty_text(&p.work_type)),
            FormField::WorkplaceLocation => place.and_then(|p| non_empty_text(&p.location)),
            FormField::SalaryAmount => salary.and_then(|s| s.amount).map(FieldValue::Number),
            FormField::SalaryCurrency => salary.and_then(|s| non_empty_text(&s.currency)),
            FormField::SalaryPeriod => salary.and_then(|s| non_empty_text(&s.time_period)),
            FormField::Education => non_empty_text(&self.education_attained),
            FormField::JobDescriptionHtml => non_empty_text(&self.job_description_html),
            FormField::EmployeeBenefitsHtml => non_empty_text(&self.employee_benefits_html),
            FormField::SkillsHtml => non_empty_text(&self.personality_prerequisites_and_skills_html),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Required fields that are absent or empty, in `required` order.
    pub fn missing(&self, required: &[FormField]) -> Vec<FormField> {
        required
            .iter()
            .copied()
            .filter(|f| self.value_of(*f).is_none())
            .collect()
    }

    /// Copies `field` from `source` when the source has a non-empty value.
    /// Returns whether anything was copied.
    pub fn merge_field(&mut self, field: FormField, source: &JobAdDraft) -> bool {
        if source.value_of(field).is_none() {
            return false;
        }
        let src_place = source.place_of_work.clone().unwrap_or_default();
        let src_salary = source.salary.clone().unwrap_or_default();
        match field {
            FormField::JobTitle => self.job_title = source.job_title.clone(),
            FormField::JobTitleFriendly => {
                self.job_title_variants = source.job_title_variants.clone()
            }
            FormField::EmploymentType => self.employment_type = source.employment_type.clone(),
            FormField::WorkplaceType => {
                self.place_of_work.get_or_insert_with(Default::default).work_type =
                    src_place.work_type
            }
            FormField::WorkplaceLocation => {
                self.place_of_work.get_or_insert_with(Default::default).location =
                    src_place.location
            }
            FormField::SalaryAmount => {
                self.salary.get_or_insert_with(Default::default).amount = src_salary.amount
            }
            FormField::SalaryCurrency => {
                self.salary.get_or_insert_with(Default::default).currency = src_salary.currency
            }
            FormField::SalaryPeriod => {
                self.salary.get_or_insert_with(Default::default).time_period =
                    src_salary.time_period
            }
            FormField::Education => self.education_attained = source.education_attained.clone(),
            FormField::JobDescriptionHtml => {
                self.job_description_html = source.job_description_html.clone()
            }
            FormField::EmployeeBenefitsHtml => {
                self.employee_benefits_html = source.employee_benefits_html.clone()
            }
            FormField::SkillsHtml => {
                self.personality_prerequisites_and_skills_html =
                    source.personality_prerequisites_and_skills_html.clone()
            }
        }
        true
    }

    /// The known (non-empty) fields, nested back into the payload shape.
    pub fn known_fields_json(&self) -> Value {
        let mut root = Map::new();
        for field in FormField::ALL {
            if let Some(value) = self.value_of(field) {
                insert_path(&mut root, field.payload_key(), value.to_json());
            }
        }
        Value::Object(root)
    }

    /// Enum-typed values outside their vocabulary. Reported, never corrected.
    pub fn out_of_vocabulary(&self) -> Vec<(FormField, String)> {
        let mut found = Vec::new();
        for field in FormField::ALL {
            let Some(vocabulary) = field.vocabulary() else {
                continue;
            };
            let values = match self.value_of(field) {
                Some(FieldValue::Text(s)) => vec![s],
                Some(FieldValue::List(items)) => items,
                _ => continue,
            };
            for value in values {
                if !vocabulary.contains(&value.as_str()) {
                    found.push((field, value));
                }
            }
        }
        found
    }
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        Some((head, rest)) => {
            let child = root
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
        None => {
            root.insert(path.to_string(), value);
        }
    }
}
