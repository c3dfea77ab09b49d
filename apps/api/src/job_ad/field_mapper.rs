//! Field Mapper: flattens a draft into the form model and records provenance.

use crate::job_ad::form::{FormModel, ProvenanceSet};
use crate::job_ad::models::{FieldValue, FormField, JobAdDraft};

pub const DEFAULT_BULLET_MARKER: &str = "• ";

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// Store the three HTML list fields as marker-prefixed plain-text lines.
    pub normalize_html_lists: bool,
    pub bullet_marker: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            normalize_html_lists: false,
            bullet_marker: DEFAULT_BULLET_MARKER.to_string(),
        }
    }
}

/// Writes every non-empty draft field into `form` and returns the set of
/// fields written. Absent or empty draft fields leave the form untouched.
pub fn apply_draft(form: &mut FormModel, draft: &JobAdDraft, options: &MapOptions) -> ProvenanceSet {
    let mut written = ProvenanceSet::new();

    for field in FormField::ALL {
        let Some(value) = draft.value_of(field) else {
            continue;
        };
        let value = match value {
            FieldValue::Text(html) if options.normalize_html_lists && field.is_html_list() => {
                FieldValue::Text(html_list_to_text(&html, &options.bullet_marker))
            }
            other => other,
        };
        form.set(field, value);
        form.mark_ai_filled(field);
        written.insert(field);
    }

    form.last_generation = written.clone();
    written
}

/// Converts an HTML list fragment into one `marker`-prefixed line per item.
///
/// One-way and lossy: markup is stripped, nested structure is flattened, and
/// the result is never turned back into HTML. Input without `<li>` items is
/// treated as one item per non-blank line.
pub fn html_list_to_text(html: &str, marker: &str) -> String {
    let items = list_items(html);
    let items: Vec<&str> = if items.is_empty() {
        html.lines().collect()
    } else {
        items
    };

    items
        .into_iter()
        .map(clean_item)
        .filter(|item| !item.is_empty())
        .map(|item| format!("{marker}{item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Raw inner text of each `<li>` element, in document order.
fn list_items(html: &str) -> Vec<&str> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let mut items = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = lower[cursor..].find("<li") {
        let tag_start = cursor + rel;
        let after_name = tag_start + 3;
        let is_li_tag = lower[after_name..]
            .chars()
            .next()
            .map(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
            .unwrap_or(false);
        if !is_li_tag {
            cursor = after_name;
            continue;
        }
        let Some(close) = lower[tag_start..].find('>') else {
            break;
        };
        let content_start = tag_start + close + 1;
        let content_end = ["</li", "<li"]
            .iter()
            .filter_map(|m| lower[content_start..].find(m))
            .min()
            .map(|i| content_start + i)
            .unwrap_or(html.len());
        items.push(&html[content_start..content_end]);
        cursor = content_end;
    }

    items
}

fn clean_item(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
