//! Per-file note parsing: front matter, wiki links, derived fields.

mod content;
mod frontmatter;
mod links;
mod time;

use super::classify::{NoteKind, classify_note};
use super::error::NoteError;
use super::models::IndexOptions;
use super::slug::slugify;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::Path;

use self::content::derive_excerpt;

pub use self::content::{count_words, reading_time};
pub use self::frontmatter::{FieldKind, FieldValue, Frontmatter, ParseError, split_frontmatter};
pub use self::links::{WikiLink, extract_link_targets, extract_wiki_links};
pub use self::time::{is_valid_ymd, parse_note_date};

/// One parsed file before link resolution and backlink inversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNote {
    /// File name inside the notes directory.
    pub file_name: String,
    /// Derived title.
    pub title: String,
    /// Derived canonical slug.
    pub slug: String,
    /// Publication date.
    pub date: Option<NaiveDate>,
    /// Tags in authored order.
    pub tags: Vec<String>,
    /// Resolved kind.
    pub kind: NoteKind,
    /// Whether the note gets a page.
    pub has_page: bool,
    /// Body without front matter.
    pub content: String,
    /// Explicit or derived excerpt.
    pub excerpt: String,
    /// Reading time label.
    pub reading_time: String,
    /// Front matter `links` then body targets, exact duplicates removed.
    pub raw_links: Vec<String>,
}

/// Title fallback chain: front matter `title`, then the file stem.
#[must_use]
pub fn title_tier(frontmatter_title: Option<&str>, stem: &str) -> Option<String> {
    [frontmatter_title, Some(stem)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
}

/// Slug fallback chain: explicit slug, then title, then stem, each normalized.
///
/// A tier that normalizes to nothing falls through to the next one.
#[must_use]
pub fn slug_tier(explicit: Option<&str>, title: &str, stem: &str) -> Option<String> {
    [explicit, Some(title), Some(stem)]
        .into_iter()
        .flatten()
        .map(slugify)
        .find(|slug| !slug.is_empty())
}

fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}

fn merge_raw_links(frontmatter_links: Vec<String>, body: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    frontmatter_links
        .into_iter()
        .chain(extract_link_targets(body))
        .filter(|target| seen.insert(target.clone()))
        .collect()
}

/// Parse one note file.
///
/// # Errors
///
/// Returns [`NoteError::Parse`] for missing or malformed front matter and
/// [`NoteError::MissingTitle`] / [`NoteError::EmptySlug`] when no tier yields a value.
pub fn parse_note(
    file_name: &str,
    raw: &str,
    options: &IndexOptions,
) -> Result<ParsedNote, NoteError> {
    let (mapping, body) = split_frontmatter(raw).map_err(|source| NoteError::Parse {
        file: file_name.to_string(),
        source,
    })?;
    let fm = Frontmatter::from_mapping(&mapping);
    let stem = file_stem(file_name);

    let title = title_tier(fm.title.as_deref(), stem).ok_or_else(|| NoteError::MissingTitle {
        file: file_name.to_string(),
    })?;
    let slug = slug_tier(fm.slug.as_deref(), &title, stem).ok_or_else(|| NoteError::EmptySlug {
        file: file_name.to_string(),
    })?;

    let words = count_words(body);
    let class = classify_note(fm.note_type.as_deref(), words, options.long_form_min_words);
    let excerpt = fm.excerpt.unwrap_or_else(|| derive_excerpt(body));
    let raw_links = merge_raw_links(fm.links, body);

    Ok(ParsedNote {
        file_name: file_name.to_string(),
        title,
        slug,
        date: fm.date,
        tags: fm.tags,
        kind: class.kind,
        has_page: class.has_page,
        content: body.to_string(),
        excerpt,
        reading_time: reading_time(words),
        raw_links,
    })
}
