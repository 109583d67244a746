//! Read-only query API over the cached index.

use super::cache::NoteIndexCache;
use super::error::NoteError;
use super::index::NoteIndex;
use super::models::{IndexIssue, IndexOptions, Note, NoteSummary};
use crate::runtime_config::SiteConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Optional listing filters; both apply when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFilter {
    /// Case-insensitive substring matched against `searchText`.
    #[serde(default, alias = "q")]
    pub query: Option<String>,
    /// Exact case-insensitive tag match.
    #[serde(default)]
    pub tag: Option<String>,
    /// Restrict to long-form notes.
    #[serde(default)]
    pub long_form_only: bool,
}

impl NoteFilter {
    fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    fn normalized_tag(&self) -> Option<String> {
        self.tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether `summary` passes every configured filter.
    #[must_use]
    pub fn matches(&self, summary: &NoteSummary) -> bool {
        if self.long_form_only && !summary.has_page {
            return false;
        }
        if let Some(query) = self.normalized_query() {
            if !summary.search_text.contains(&query) {
                return false;
            }
        }
        match self.normalized_tag() {
            Some(tag) => summary.tags.iter().any(|t| t.to_lowercase() == tag),
            None => true,
        }
    }
}

/// Tag with the number of notes carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    /// First spelling seen in display order.
    pub tag: String,
    /// Number of notes carrying the tag (case-insensitive, once per note).
    pub count: usize,
}

/// Query facade owning the notes directory, options and index cache.
///
/// Every call checks the directory fingerprint and rebuilds when it changed.
/// Returned values are owned copies.
#[derive(Debug)]
pub struct NoteStore {
    dir: PathBuf,
    options: IndexOptions,
    cache: NoteIndexCache,
}

impl NoteStore {
    /// Store over `dir` with its own empty cache.
    pub fn new(dir: impl Into<PathBuf>, options: IndexOptions) -> Self {
        Self {
            dir: dir.into(),
            options,
            cache: NoteIndexCache::new(),
        }
    }

    /// Store over the configured notes directory and tunables.
    #[must_use]
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.notes_dir.clone(), config.index_options())
    }

    /// Notes directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Index options.
    #[must_use]
    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Underlying cache (for build counters and invalidation).
    #[must_use]
    pub fn cache(&self) -> &NoteIndexCache {
        &self.cache
    }

    /// Current index, rebuilt first if the directory changed.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Io`] when the directory cannot be listed.
    pub fn snapshot(&self) -> Result<Arc<NoteIndex>, NoteError> {
        self.cache
            .get_or_build(&self.dir, &self.options)
            .map(|(index, _)| index)
    }

    /// All notes in display order.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn all_notes(&self) -> Result<Vec<Note>, NoteError> {
        Ok(self.snapshot()?.notes().to_vec())
    }

    /// All summaries in display order.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn all_note_summaries(&self) -> Result<Vec<NoteSummary>, NoteError> {
        Ok(self.snapshot()?.summaries().to_vec())
    }

    /// Summaries of long-form notes.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn long_form_note_summaries(&self) -> Result<Vec<NoteSummary>, NoteError> {
        Ok(self.snapshot()?.long_form_summaries().cloned().collect())
    }

    /// Exact slug lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn note_by_slug(&self, slug: &str) -> Result<Option<Note>, NoteError> {
        Ok(self.snapshot()?.note(slug).cloned())
    }

    /// Exact slug lookup on summaries.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn note_summary_by_slug(&self, slug: &str) -> Result<Option<NoteSummary>, NoteError> {
        Ok(self.snapshot()?.summary(slug).cloned())
    }

    /// Lowercase title / slug → canonical slug.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn slug_map(&self) -> Result<BTreeMap<String, String>, NoteError> {
        Ok(self.snapshot()?.slug_map().clone())
    }

    /// Summaries passing `filter`, display order kept.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn search_summaries(&self, filter: &NoteFilter) -> Result<Vec<NoteSummary>, NoteError> {
        Ok(self
            .snapshot()?
            .summaries()
            .iter()
            .filter(|summary| filter.matches(summary))
            .cloned()
            .collect())
    }

    /// Summaries carrying `tag` (case-insensitive).
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn notes_with_tag(&self, tag: &str) -> Result<Vec<NoteSummary>, NoteError> {
        self.search_summaries(&NoteFilter {
            tag: Some(tag.to_string()),
            ..NoteFilter::default()
        })
    }

    /// Tag frequencies, count descending then tag ascending.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn tag_counts(&self) -> Result<Vec<TagCount>, NoteError> {
        let index = self.snapshot()?;
        Ok(count_tags(index.summaries()))
    }

    /// Files skipped by the latest build.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn issues(&self) -> Result<Vec<IndexIssue>, NoteError> {
        Ok(self.snapshot()?.issues().to_vec())
    }
}

fn count_tags(summaries: &[NoteSummary]) -> Vec<TagCount> {
    let mut counts: HashMap<String, TagCount> = HashMap::new();
    for summary in summaries {
        let mut seen: HashSet<String> = HashSet::new();
        for tag in &summary.tags {
            let key = tag.to_lowercase();
            if !seen.insert(key.clone()) {
                continue;
            }
            counts
                .entry(key)
                .or_insert_with(|| TagCount {
                    tag: tag.clone(),
                    count: 0,
                })
                .count += 1;
        }
    }
    let mut out: Vec<TagCount> = counts.into_values().collect();
    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.tag.to_lowercase().cmp(&b.tag.to_lowercase()))
    });
    out
}
