//! Hard pre-publish validation of the notes directory.
//!
//! Unlike the index build, which skips bad files, validation reports every
//! problem so a publish step can refuse to continue.

use crate::note_index::fences::FenceTracker;
use crate::note_index::{
    NoteError, ParseError, is_canonical_slug, is_valid_ymd, list_note_files, parse_kind_alias,
    slugify, split_frontmatter,
};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// File name inside the notes directory.
    pub file: String,
    /// Human readable message.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Result of [`validate_notes_dir`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Number of note files inspected.
    pub files_checked: usize,
    /// Failures in file order.
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Whether no failure was found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, file: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            file: file.to_string(),
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "Validated {} note(s): OK", self.files_checked);
        }
        writeln!(f, "Note validation failed:")?;
        for error in &self.errors {
            writeln!(f, "- {error}")?;
        }
        Ok(())
    }
}

fn scalar_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn check_metadata(
    file: &str,
    mapping: &Mapping,
    slugs: &mut HashMap<String, String>,
    report: &mut ValidationReport,
) -> bool {
    let title = mapping
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if title.is_empty() {
        report.push(file, "required frontmatter field 'title' is missing or empty");
        return false;
    }

    let explicit_slug = mapping
        .get("slug")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|slug| !slug.is_empty());
    let slug = explicit_slug.map_or_else(|| slugify(title), str::to_string);
    if slug.is_empty() {
        report.push(file, "slug cannot be derived from title");
        return false;
    }
    if !is_canonical_slug(&slug) {
        report.push(file, format!("slug '{slug}' must be lowercase kebab-case"));
    }
    match slugs.get(&slug) {
        Some(first) => {
            let message = format!("duplicate slug '{slug}' (already used in {first})");
            report.push(file, message);
        }
        None => {
            slugs.insert(slug, file.to_string());
        }
    }

    if let Some(date) = mapping.get("date") {
        let date = scalar_display(date);
        if !is_valid_ymd(&date) {
            report.push(file, format!("date '{date}' must be valid YYYY-MM-DD"));
        }
    }

    if let Some(tags) = mapping.get("tags") {
        let valid = matches!(tags, Value::Sequence(items) if items.iter().all(Value::is_string));
        if !valid {
            report.push(file, "tags must be an array of strings");
        }
    }

    if let Some(kind) = mapping.get("type") {
        let kind = scalar_display(kind).to_lowercase();
        if parse_kind_alias(&kind).is_none() {
            report.push(file, format!("type '{kind}' is invalid"));
        }
    }
    true
}

fn check_fences(file: &str, body: &str, report: &mut ValidationReport) {
    let mut fences = FenceTracker::new();
    for (idx, line) in body.lines().enumerate() {
        fences.observe(idx + 1, line);
    }
    if let Some(line) = fences.unclosed_line() {
        report.push(
            file,
            format!("unclosed code fence starting at content line {line}"),
        );
    }
}

/// Validate every note in `dir`, collecting all failures.
///
/// A missing directory is itself reported as a failure.
///
/// # Errors
///
/// Returns [`NoteError::Io`] only when the directory exists but cannot be listed.
pub fn validate_notes_dir(dir: &Path) -> Result<ValidationReport, NoteError> {
    let mut report = ValidationReport::default();
    if !dir.is_dir() {
        report.push(&dir.display().to_string(), "missing notes directory");
        return Ok(report);
    }
    let entries = list_note_files(dir)?;
    report.files_checked = entries.len();
    let mut slugs: HashMap<String, String> = HashMap::new();

    for entry in &entries {
        let file = entry.file_name.as_str();
        let raw = match std::fs::read_to_string(&entry.path) {
            Ok(raw) => raw,
            Err(err) => {
                report.push(file, format!("failed to read file ({err})"));
                continue;
            }
        };
        let (mapping, body) = match split_frontmatter(&raw) {
            Ok(parts) => parts,
            Err(ParseError::MissingOpeningDelimiter) => {
                report.push(file, "missing frontmatter start delimiter (---)");
                continue;
            }
            Err(ParseError::InvalidYaml(message)) => {
                report.push(file, format!("frontmatter parse error ({message})"));
                continue;
            }
            Err(other) => {
                report.push(file, format!("frontmatter parse error ({other})"));
                continue;
            }
        };
        if check_metadata(file, &mapping, &mut slugs, &mut report) {
            check_fences(file, body, &mut report);
        }
    }
    log::debug!(
        "validated {} note file(s), {} error(s)",
        report.files_checked,
        report.errors.len()
    );
    Ok(report)
}
