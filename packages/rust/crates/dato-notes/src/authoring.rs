//! Normalize and write new note files.

use crate::note_index::{is_valid_ymd, slugify};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Authoring failures.
#[derive(Debug, Error)]
pub enum AuthoringError {
    /// Title is missing or blank.
    #[error("title is required")]
    MissingTitle,
    /// Neither the slug nor the title yields a slug.
    #[error("slug could not be derived from title/slug")]
    EmptySlug,
    /// Date is neither `YYYY-MM-DD` nor RFC 3339.
    #[error("date '{0}' is invalid (expected YYYY-MM-DD)")]
    InvalidDate(String),
    /// Front matter could not be serialized.
    #[error("failed to render front matter: {0}")]
    FrontMatter(String),
    /// A note file with that slug already exists.
    #[error("a note with that slug already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    /// Filesystem failure.
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Unvalidated note creation input (CLI flags or HTTP payload).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewNoteRequest {
    /// Required title.
    pub title: String,
    /// Optional explicit slug.
    pub slug: Option<String>,
    /// Markdown body.
    pub body: String,
    /// Raw tag values; each may hold comma separated tags.
    pub tags: Vec<String>,
    /// `YYYY-MM-DD` or RFC 3339; defaults to today.
    pub date: Option<String>,
    /// Optional `type` value.
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    /// Optional `status` value (`seed`, `draft`, `published`).
    pub status: Option<String>,
    /// Emit an empty `excerpt` key for the author to fill in.
    #[serde(skip)]
    pub excerpt_placeholder: bool,
}

/// Validated note ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedNote {
    /// Trimmed title.
    pub title: String,
    /// Canonical slug, also the file stem.
    pub slug: String,
    /// Publication date.
    pub date: NaiveDate,
    /// Split, trimmed, non-empty tags.
    pub tags: Vec<String>,
    /// `type` value, if any.
    pub note_type: Option<String>,
    /// `status` value, if any.
    pub status: Option<String>,
    /// Trimmed body.
    pub body: String,
    /// Whether to emit `excerpt: ""`.
    pub excerpt_placeholder: bool,
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn split_tags(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_authored_date(raw: &str) -> Option<NaiveDate> {
    if is_valid_ymd(raw) {
        return NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

impl NewNoteRequest {
    /// Validate and normalize against `today`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthoringError::MissingTitle`], [`AuthoringError::EmptySlug`] or
    /// [`AuthoringError::InvalidDate`].
    pub fn normalize(&self, today: NaiveDate) -> Result<NormalizedNote, AuthoringError> {
        let title = trimmed(Some(&self.title)).ok_or(AuthoringError::MissingTitle)?;
        let slug_source = trimmed(self.slug.as_deref()).unwrap_or_else(|| title.clone());
        let slug = slugify(&slug_source);
        if slug.is_empty() {
            return Err(AuthoringError::EmptySlug);
        }
        let date = match trimmed(self.date.as_deref()) {
            None => today,
            Some(raw) => parse_authored_date(&raw).ok_or(AuthoringError::InvalidDate(raw))?,
        };
        Ok(NormalizedNote {
            title,
            slug,
            date,
            tags: split_tags(&self.tags),
            note_type: trimmed(self.note_type.as_deref()),
            status: trimmed(self.status.as_deref()),
            body: self.body.trim().to_string(),
            excerpt_placeholder: self.excerpt_placeholder,
        })
    }
}

/// Front matter keys in written order.
#[derive(Serialize)]
struct FrontMatterOut<'a> {
    title: &'a str,
    slug: &'a str,
    date: String,
    tags: &'a [String],
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    note_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    excerpt: Option<&'a str>,
}

impl NormalizedNote {
    /// File name `<slug>.md`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.md", self.slug)
    }

    /// Front matter block followed by the body.
    ///
    /// # Errors
    ///
    /// Returns [`AuthoringError::FrontMatter`] when YAML serialization fails.
    pub fn to_markdown(&self) -> Result<String, AuthoringError> {
        let front_matter = FrontMatterOut {
            title: &self.title,
            slug: &self.slug,
            date: self.date.format("%Y-%m-%d").to_string(),
            tags: &self.tags,
            note_type: self.note_type.as_deref(),
            status: self.status.as_deref(),
            excerpt: self.excerpt_placeholder.then_some(""),
        };
        let yaml = serde_yaml::to_string(&front_matter)
            .map_err(|err| AuthoringError::FrontMatter(err.to_string()))?;
        let mut out = format!("---\n{yaml}---\n\n");
        if !self.body.is_empty() {
            out.push_str(&self.body);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Write `contents` into a freshly created `path`; the file is removed again on failure.
fn fill_new_file(path: &Path, mut file: impl Write, contents: &str) -> Result<(), AuthoringError> {
    let written = file.write_all(contents.as_bytes()).and_then(|()| file.flush());
    if let Err(source) = written {
        if let Err(err) = std::fs::remove_file(path) {
            log::warn!("failed to remove partial note '{}': {err}", path.display());
        }
        return Err(AuthoringError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Create `dir` if needed and write `<slug>.md`, refusing to overwrite.
///
/// # Errors
///
/// Returns [`AuthoringError::AlreadyExists`] when the file exists,
/// [`AuthoringError::FrontMatter`] when rendering fails and
/// [`AuthoringError::Io`] for other filesystem failures.
pub fn write_note(dir: &Path, note: &NormalizedNote) -> Result<PathBuf, AuthoringError> {
    let contents = note.to_markdown()?;
    std::fs::create_dir_all(dir).map_err(|source| AuthoringError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(note.file_name());
    let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(AuthoringError::AlreadyExists(path));
        }
        Err(source) => return Err(AuthoringError::Io { path, source }),
    };
    fill_new_file(&path, file, &contents)?;
    log::info!("created note '{}'", path.display());
    Ok(path)
}
