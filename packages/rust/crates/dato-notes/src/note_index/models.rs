//! Shared models for note indexing and querying.

use super::classify::{DEFAULT_LONG_FORM_MIN_WORDS, NoteKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default number of content characters folded into a summary search blob.
pub const DEFAULT_SEARCH_CONTENT_PREFIX_CHARS: usize = 2000;

/// Tunables for parsing and summary projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Word count at which an untyped note becomes long-form.
    pub long_form_min_words: usize,
    /// Content prefix length (characters) included in `searchText`.
    pub search_content_prefix_chars: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            long_form_min_words: DEFAULT_LONG_FORM_MIN_WORDS,
            search_content_prefix_chars: DEFAULT_SEARCH_CONTENT_PREFIX_CHARS,
        }
    }
}

/// Inverse reference to a note that links to the current one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Backlink {
    /// Slug of the linking note.
    pub slug: String,
    /// Title of the linking note.
    pub title: String,
}

/// Fully cross-referenced note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Canonical identifier, unique across the index.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Publication date (`YYYY-MM-DD` on the wire).
    pub date: Option<NaiveDate>,
    /// Tags in authored order.
    pub tags: Vec<String>,
    /// Form factor.
    #[serde(rename = "type")]
    pub kind: NoteKind,
    /// Whether the note has a dedicated page.
    pub has_page: bool,
    /// Markdown body without front matter.
    pub content: String,
    /// Short display summary.
    pub excerpt: String,
    /// Human readable reading time, e.g. `3 min read`.
    pub reading_time: String,
    /// Resolved outgoing slugs.
    pub links: Vec<String>,
    /// Notes linking here.
    pub backlinks: Vec<Backlink>,
}

impl Note {
    /// Tags de-duplicated case-insensitively (first spelling wins).
    #[must_use]
    pub fn display_tags(&self) -> Vec<String> {
        dedup_tags_case_insensitive(&self.tags)
    }
}

/// Lightweight projection used by listings, feeds and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    /// Canonical identifier.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Publication date.
    pub date: Option<NaiveDate>,
    /// Tags in authored order.
    pub tags: Vec<String>,
    /// Form factor.
    #[serde(rename = "type")]
    pub kind: NoteKind,
    /// Whether the note has a dedicated page.
    pub has_page: bool,
    /// Short display summary.
    pub excerpt: String,
    /// Human readable reading time.
    pub reading_time: String,
    /// Lowercase blob of title, excerpt, tags and a bounded content prefix.
    pub search_text: String,
}

impl NoteSummary {
    /// Project a full note, bounding the content prefix to `prefix_chars`.
    #[must_use]
    pub fn from_note(note: &Note, prefix_chars: usize) -> Self {
        let content_prefix: String = note.content.chars().take(prefix_chars).collect();
        let search_text = [
            note.title.as_str(),
            note.excerpt.as_str(),
            note.tags.join(" ").as_str(),
            content_prefix.as_str(),
        ]
        .join(" ")
        .to_lowercase();
        Self {
            slug: note.slug.clone(),
            title: note.title.clone(),
            date: note.date,
            tags: note.tags.clone(),
            kind: note.kind,
            has_page: note.has_page,
            excerpt: note.excerpt.clone(),
            reading_time: note.reading_time.clone(),
            search_text,
        }
    }

    /// Tags de-duplicated case-insensitively (first spelling wins).
    #[must_use]
    pub fn display_tags(&self) -> Vec<String> {
        dedup_tags_case_insensitive(&self.tags)
    }
}

fn dedup_tags_case_insensitive(tags: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(tags.len());
    tags.iter()
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .cloned()
        .collect()
}

/// Per-file problem recorded while building the index.
///
/// The offending file is left out of the index; every other note still builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexIssue {
    /// The file could not be read.
    Unreadable {
        /// File name inside the notes directory.
        file: String,
        /// I/O error text.
        reason: String,
    },
    /// Front matter is missing or malformed.
    Malformed {
        /// File name inside the notes directory.
        file: String,
        /// Parser error text.
        reason: String,
    },
    /// No title could be derived.
    MissingTitle {
        /// File name inside the notes directory.
        file: String,
    },
    /// No slug could be derived.
    EmptySlug {
        /// File name inside the notes directory.
        file: String,
    },
    /// Two files resolved to the same slug; the later file was skipped.
    SlugCollision {
        /// Contested slug.
        slug: String,
        /// File that keeps the slug.
        kept: String,
        /// File left out of the index.
        skipped: String,
    },
}

impl IndexIssue {
    /// File the issue was raised for (the skipped file on collisions).
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::Unreadable { file, .. }
            | Self::Malformed { file, .. }
            | Self::MissingTitle { file }
            | Self::EmptySlug { file } => file,
            Self::SlugCollision { skipped, .. } => skipped,
        }
    }
}

/// Aggregate counters for one index build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Notes in the index.
    pub total_notes: usize,
    /// Notes with a dedicated page.
    pub long_form_notes: usize,
    /// Resolved outgoing links across all notes.
    pub links: usize,
    /// Links whose target slug has no note.
    pub dangling_links: usize,
    /// Notes with neither outgoing links nor backlinks.
    pub orphans: usize,
    /// Files skipped during the build.
    pub issues: usize,
}
