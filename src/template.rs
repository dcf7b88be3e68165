//! Portable form templates.
//!
//! A template is a JSON document that may have been hand-edited or exported
//! from another installation. [`normalize`] accepts any JSON value and always
//! produces a well-formed [`Form`], falling back to defaults field by field.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::model::{Choice, Form, Question, QuestionType, Section};

const UNTITLED_FORM: &str = "Untitled Form";
const TEMPLATE_EXTENSION: &str = "template.json";
const FALLBACK_SLUG: &str = "form";

static SLUG_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_-]+").expect("slug pattern is a valid regex"));

type Fields = Map<String, Value>;

/// The single-section, single-question form used whenever nothing usable is
/// supplied.
pub fn default_form() -> Form {
    Form {
        id: None,
        title: UNTITLED_FORM.to_string(),
        description: String::new(),
        sections: vec![default_section()],
    }
}

fn default_section() -> Section {
    Section {
        id: None,
        title: "Section 1".to_string(),
        description: String::new(),
        order: 0,
        questions: vec![Question {
            text: "Question 1".to_string(),
            ..Default::default()
        }],
    }
}

/// Interprets an arbitrary JSON value as a form. Never fails.
pub fn normalize(raw: &Value) -> Form {
    let Some(fields) = raw.as_object() else {
        debug!("template is not an object; using the default form");
        return default_form();
    };

    let title = fields
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(UNTITLED_FORM)
        .to_string();

    let sections = match fields.get("sections").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries
            .iter()
            .enumerate()
            .map(|(position, entry)| normalize_section(entry.as_object(), position))
            .collect(),
        _ => vec![default_section()],
    };

    Form {
        id: id_of(Some(fields)),
        title,
        description: string_of(Some(fields), "description"),
        sections,
    }
}

fn normalize_section(fields: Option<&Fields>, position: usize) -> Section {
    let questions = array_of(fields, "questions")
        .iter()
        .enumerate()
        .map(|(position, entry)| normalize_question(entry.as_object(), position))
        .collect();

    Section {
        id: id_of(fields),
        title: non_blank(fields, "title").unwrap_or_else(|| format!("Section {}", position + 1)),
        description: string_of(fields, "description"),
        order: position,
        questions,
    }
}

fn normalize_question(fields: Option<&Fields>, position: usize) -> Question {
    let question_type = non_blank(fields, "question_type")
        .map_or_else(QuestionType::default, |name| {
            QuestionType::from(name.trim())
        });

    let choices = if question_type.is_choice() {
        array_of(fields, "choices")
            .iter()
            .enumerate()
            .map(|(position, entry)| normalize_choice(entry.as_object(), position))
            .collect()
    } else {
        Vec::new()
    };

    Question {
        id: id_of(fields),
        text: non_blank(fields, "text").unwrap_or_else(|| format!("Question {}", position + 1)),
        question_type,
        required: fields
            .and_then(|f| f.get("required"))
            .is_some_and(truthy),
        order: position,
        choices,
    }
}

fn normalize_choice(fields: Option<&Fields>, position: usize) -> Choice {
    Choice {
        id: id_of(fields),
        text: non_blank(fields, "text").unwrap_or_else(|| format!("Choice {}", position + 1)),
        order: position,
    }
}

fn id_of(fields: Option<&Fields>) -> Option<i64> {
    fields?.get("id")?.as_i64()
}

fn string_of(fields: Option<&Fields>, key: &str) -> String {
    fields
        .and_then(|f| f.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn non_blank(fields: Option<&Fields>, key: &str) -> Option<String> {
    fields?
        .get(key)?
        .as_str()
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

fn array_of<'a>(fields: Option<&'a Fields>, key: &str) -> &'a [Value] {
    fields
        .and_then(|f| f.get(key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && !["false", "0", "no"].contains(&s.to_ascii_lowercase().as_str())
        }
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Exports `form` as a template document. The output is already normalized,
/// so feeding it back to [`normalize`] reproduces the same form.
pub fn to_template(form: &Form) -> Value {
    document(&normalize(&document(form)))
}

fn document(form: &Form) -> Value {
    let mut doc = json!({
        "title": form.title,
        "description": form.description,
        "sections": form.sections.iter().map(section_document).collect::<Vec<_>>(),
    });
    if let Some(id) = form.id {
        doc["id"] = json!(id);
    }
    doc
}

fn section_document(section: &Section) -> Value {
    let mut doc = json!({
        "title": section.title,
        "description": section.description,
        "order": section.order,
        "questions": section.questions.iter().map(question_document).collect::<Vec<_>>(),
    });
    if let Some(id) = section.id {
        doc["id"] = json!(id);
    }
    doc
}

fn question_document(question: &Question) -> Value {
    let mut doc = json!({
        "text": question.text,
        "question_type": question.question_type.as_str(),
        "required": question.required,
        "order": question.order,
        "choices": question.choices.iter().map(choice_document).collect::<Vec<_>>(),
    });
    if let Some(id) = question.id {
        doc["id"] = json!(id);
    }
    doc
}

fn choice_document(choice: &Choice) -> Value {
    let mut doc = json!({
        "text": choice.text,
        "order": choice.order,
    });
    if let Some(id) = choice.id {
        doc["id"] = json!(id);
    }
    doc
}

/// `<slug>.template.json`, where the slug is the lower-cased title with every
/// run of characters other than `[a-z0-9_-]` collapsed to `_`.
pub fn template_file_name(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = SLUG_SEPARATOR.replace_all(&lowered, "_");
    let slug: &str = if slug.trim_matches('_').is_empty() {
        FALLBACK_SLUG
    } else {
        &slug
    };
    format!("{slug}.{TEMPLATE_EXTENSION}")
}

/// Parses template text. Malformed JSON is an "invalid template file" error;
/// anything that parses is normalized.
pub fn parse_template(text: &str) -> Result<Form> {
    let raw: Value = serde_json::from_str(text).context("invalid template file")?;
    Ok(normalize(&raw))
}

pub fn read_template_file(path: &Path) -> Result<Form> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read template {}", path.display()))?;
    parse_template(&text).with_context(|| format!("{}", path.display()))
}

/// Writes `form` into `dir` under its template file name and returns the path.
pub fn write_template_file(dir: &Path, form: &Form) -> Result<PathBuf> {
    let path = dir.join(template_file_name(&form.title));
    let text = serde_json::to_string_pretty(&to_template(form))?;
    fs::write(&path, text)
        .with_context(|| format!("failed to write template {}", path.display()))?;
    Ok(path)
}
