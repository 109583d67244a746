//! Built, immutable note index.

mod build;
mod order;

use super::models::{IndexIssue, IndexStats, Note, NoteSummary};
use std::collections::{BTreeMap, HashMap};

pub use self::build::NoteSource;

/// Fully resolved notes plus summaries, lookup tables and build issues.
///
/// An index is never mutated after construction; the cache swaps whole
/// instances.
#[derive(Debug, Clone, Default)]
pub struct NoteIndex {
    notes: Vec<Note>,
    summaries: Vec<NoteSummary>,
    by_slug: HashMap<String, usize>,
    slug_map: BTreeMap<String, String>,
    issues: Vec<IndexIssue>,
}

impl NoteIndex {
    /// All notes in display order.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// All summaries, same order as [`Self::notes`].
    #[must_use]
    pub fn summaries(&self) -> &[NoteSummary] {
        &self.summaries
    }

    /// Summaries of long-form notes only.
    pub fn long_form_summaries(&self) -> impl Iterator<Item = &NoteSummary> {
        self.summaries.iter().filter(|summary| summary.has_page)
    }

    /// Exact slug lookup.
    #[must_use]
    pub fn note(&self, slug: &str) -> Option<&Note> {
        self.by_slug.get(slug).and_then(|idx| self.notes.get(*idx))
    }

    /// Exact slug lookup on summaries.
    #[must_use]
    pub fn summary(&self, slug: &str) -> Option<&NoteSummary> {
        self.by_slug.get(slug).and_then(|idx| self.summaries.get(*idx))
    }

    /// Lowercase title / slug → canonical slug.
    #[must_use]
    pub fn slug_map(&self) -> &BTreeMap<String, String> {
        &self.slug_map
    }

    /// Files skipped during the build.
    #[must_use]
    pub fn issues(&self) -> &[IndexIssue] {
        &self.issues
    }

    /// Number of indexed notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether no note was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Aggregate graph counters.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        let links = self.notes.iter().map(|note| note.links.len()).sum();
        let dangling_links = self
            .notes
            .iter()
            .flat_map(|note| note.links.iter())
            .filter(|target| !self.by_slug.contains_key(target.as_str()))
            .count();
        let orphans = self
            .notes
            .iter()
            .filter(|note| note.links.is_empty() && note.backlinks.is_empty())
            .count();
        IndexStats {
            total_notes: self.notes.len(),
            long_form_notes: self.notes.iter().filter(|note| note.has_page).count(),
            links,
            dangling_links,
            orphans,
            issues: self.issues.len(),
        }
    }
}
