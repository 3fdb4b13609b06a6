//! Loading and validating knowledge sources.
//!
//! Knowledge files are hand-authored, so the loader is lenient about shape and
//! strict about content. A document is first parsed into a loosely-typed
//! [`serde_json::Value`] (TOML is converted on the way in), then validated into
//! a [`KnowledgeBase`]. Accepted shapes:
//!
//! ```text
//! { "categories": [ {name, keywords, subcategories: [...]}, ... ] }
//! { "items": [ {question, answer, tags?}, ... ] }        (or "entries")
//! [ {name, keywords, subcategories}, ... ]                bare category list
//! [ {question, answer, tags?}, ... ]                      bare flat list
//! ```
//!
//! Entries without a non-empty string `question` and `answer` are dropped and
//! logged. Unknown fields are ignored.

use crate::error::{KnowledgeError, Result};
use crate::model::{Category, KnowledgeBase, KnowledgeEntry, Subcategory};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

const NONE: &[Value] = &[];

/// On-disk format of a knowledge source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeFormat {
    Json,
    Toml,
}

impl KnowledgeFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(KnowledgeError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// What validation kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub categories: usize,
    pub subcategories: usize,
    pub entries: usize,
    pub dropped_entries: usize,
    /// Keywords that were not strings
    pub dropped_keywords: usize,
}

/// Parse and validate a knowledge document.
pub fn parse_str(content: &str, format: KnowledgeFormat) -> Result<(KnowledgeBase, LoadReport)> {
    let value = match format {
        KnowledgeFormat::Json => serde_json::from_str::<Value>(content)
            .map_err(|e| KnowledgeError::malformed(format!("invalid JSON: {e}")))?,
        KnowledgeFormat::Toml => {
            let table: toml::Value = toml::from_str(content)
                .map_err(|e| KnowledgeError::malformed(format!("invalid TOML: {e}")))?;
            serde_json::to_value(table)
                .map_err(|e| KnowledgeError::malformed(format!("unconvertible TOML: {e}")))?
        }
    };

    validate(&value)
}

/// Read, parse and validate a knowledge file.
pub fn load(path: &Path) -> Result<(KnowledgeBase, LoadReport)> {
    let format = KnowledgeFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (kb, report) = parse_str(&content, format)?;
    info!(
        "Loaded knowledge base from {}: {} categories, {} entries ({} dropped)",
        path.display(),
        report.categories,
        report.entries,
        report.dropped_entries
    );
    Ok((kb, report))
}

/// Like [`load`], but any failure degrades to an empty knowledge base.
pub fn load_or_empty(path: &Path) -> KnowledgeBase {
    match load(path) {
        Ok((kb, _)) => kb,
        Err(e) => {
            warn!("Falling back to an empty knowledge base: {}", e);
            KnowledgeBase::empty()
        }
    }
}

/// Validate a loosely-typed document into a [`KnowledgeBase`].
pub fn validate(value: &Value) -> Result<(KnowledgeBase, LoadReport)> {
    let mut report = LoadReport::default();

    let (raw_categories, raw_entries): (&[Value], &[Value]) = match value {
        Value::Object(map) => (
            array_field(map, "categories")?,
            match array_field(map, "items")? {
                [] => array_field(map, "entries")?,
                items => items,
            },
        ),
        Value::Array(items) if items.iter().any(is_category_like) => (items.as_slice(), NONE),
        Value::Array(items) => (NONE, items.as_slice()),
        other => {
            return Err(KnowledgeError::malformed(format!(
                "expected an object or array at the top level, found {}",
                type_name(other)
            )));
        }
    };

    let categories: Vec<Category> = raw_categories
        .iter()
        .filter_map(|raw| parse_category(raw, &mut report))
        .collect();
    let flat_entries: Vec<KnowledgeEntry> = raw_entries
        .iter()
        .filter_map(|raw| parse_entry(raw, &mut report))
        .collect();

    report.categories = categories.len();
    Ok((KnowledgeBase::new(categories, flat_entries), report))
}

fn parse_category(raw: &Value, report: &mut LoadReport) -> Option<Category> {
    let Some(map) = raw.as_object() else {
        warn!("Skipping category that is not an object");
        return None;
    };

    let name = string_field(map, "name").unwrap_or_default();
    let keywords = keywords_field(map, report);
    let subcategories: Vec<Subcategory> = list_field(map, "subcategories")
        .iter()
        .filter_map(|raw| parse_subcategory(raw, report))
        .collect();

    report.subcategories += subcategories.len();
    Some(Category::new(name, keywords, subcategories))
}

fn parse_subcategory(raw: &Value, report: &mut LoadReport) -> Option<Subcategory> {
    let Some(map) = raw.as_object() else {
        warn!("Skipping subcategory that is not an object");
        return None;
    };

    let name = string_field(map, "name").unwrap_or_default();
    let keywords = keywords_field(map, report);
    let items = list_field(map, "items")
        .iter()
        .filter_map(|raw| parse_entry(raw, report))
        .collect();

    Some(Subcategory::new(name, keywords, items))
}

fn parse_entry(raw: &Value, report: &mut LoadReport) -> Option<KnowledgeEntry> {
    let entry = raw.as_object().and_then(|map| {
        let question = non_blank(string_field(map, "question"))?;
        let answer = non_blank(string_field(map, "answer"))?;
        let tags = list_field(map, "tags")
            .iter()
            .filter_map(Value::as_str)
            .filter(|tag| !tag.trim().is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        Some(KnowledgeEntry::new(question, answer).with_tags(tags))
    });

    match entry {
        Some(entry) => {
            report.entries += 1;
            Some(entry)
        }
        None => {
            warn!("Dropping knowledge entry without question or answer: {}", raw);
            report.dropped_entries += 1;
            None
        }
    }
}

fn keywords_field(map: &Map<String, Value>, report: &mut LoadReport) -> Vec<String> {
    let raw = list_field(map, "keywords");
    // Blank keywords are kept: they still count toward the keyword score's denominator.
    let keywords: Vec<String> = raw
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    report.dropped_keywords += raw.len() - keywords.len();
    keywords
}

fn array_field<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a [Value]> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(NONE),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(KnowledgeError::malformed(format!(
            "`{key}` must be an array, found {}",
            type_name(other)
        ))),
    }
}

/// Nested lists are tolerated when missing or mistyped; the parent survives.
fn list_field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(NONE)
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn is_category_like(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key("subcategories"))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
