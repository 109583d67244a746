use super::NoteIndex;
use super::order::sort_notes;
use crate::note_index::error::NoteError;
use crate::note_index::models::{Backlink, IndexIssue, IndexOptions, Note, NoteSummary};
use crate::note_index::parser::{ParsedNote, parse_note};
use crate::note_index::scan::{NoteFileEntry, list_note_files};
use crate::note_index::slug::slugify;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// In-memory note file, for building an index without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSource {
    /// File name, used for stem fallbacks and issue reports.
    pub file_name: String,
    /// Raw file text.
    pub raw: String,
}

impl NoteSource {
    /// Create a source from a file name and its text.
    pub fn new(file_name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            raw: raw.into(),
        }
    }
}

fn read_and_parse(entry: &NoteFileEntry, options: &IndexOptions) -> Result<ParsedNote, NoteError> {
    let raw = std::fs::read_to_string(&entry.path).map_err(|source| NoteError::Io {
        path: entry.path.clone(),
        source,
    })?;
    parse_note(&entry.file_name, &raw, options)
}

/// Keep the first file per slug; later files are reported as collisions.
fn admit_unique(
    parsed: Vec<Result<ParsedNote, NoteError>>,
    issues: &mut Vec<IndexIssue>,
) -> Vec<ParsedNote> {
    let mut owners: HashMap<String, String> = HashMap::new();
    let mut admitted = Vec::with_capacity(parsed.len());
    for result in parsed {
        let note = match result {
            Ok(note) => note,
            Err(err) => {
                log::warn!("skipping note: {err}");
                issues.push(err.to_issue());
                continue;
            }
        };
        if let Some(first) = owners.get(&note.slug) {
            let err = NoteError::SlugCollision {
                slug: note.slug.clone(),
                first: first.clone(),
                second: note.file_name.clone(),
            };
            log::warn!("skipping note: {err}");
            issues.push(err.to_issue());
            continue;
        }
        owners.insert(note.slug.clone(), note.file_name.clone());
        admitted.push(note);
    }
    admitted
}

fn title_lookup(notes: &[ParsedNote]) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(notes.len());
    for note in notes {
        map.entry(note.title.to_lowercase())
            .or_insert_with(|| note.slug.clone());
    }
    map
}

fn resolve_links(raw_links: &[String], titles: &HashMap<String, String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw_links.len());
    let mut out = Vec::with_capacity(raw_links.len());
    for raw in raw_links {
        let resolved = titles
            .get(&raw.to_lowercase())
            .cloned()
            .unwrap_or_else(|| slugify(raw));
        if resolved.is_empty() {
            log::debug!("dropping link '{raw}' with no resolvable slug");
            continue;
        }
        if seen.insert(resolved.clone()) {
            out.push(resolved);
        }
    }
    out
}

fn build_slug_map(notes: &[ParsedNote]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for note in notes {
        map.entry(note.title.to_lowercase())
            .or_insert_with(|| note.slug.clone());
    }
    for note in notes {
        map.entry(note.slug.to_lowercase())
            .or_insert_with(|| note.slug.clone());
    }
    map
}

impl NoteIndex {
    /// Scan `dir` and build a fresh index.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Io`] only when the directory listing fails; per-file
    /// failures are recorded in [`NoteIndex::issues`].
    pub fn build(dir: &Path, options: &IndexOptions) -> Result<Self, NoteError> {
        let entries = list_note_files(dir)?;
        Ok(Self::build_from_entries(&entries, options))
    }

    /// Build from an already enumerated file list (file-name order).
    #[must_use]
    pub fn build_from_entries(entries: &[NoteFileEntry], options: &IndexOptions) -> Self {
        let parsed: Vec<Result<ParsedNote, NoteError>> = entries
            .par_iter()
            .map(|entry| read_and_parse(entry, options))
            .collect();
        Self::assemble(parsed, options)
    }

    /// Build from in-memory sources, sorted by file name first.
    #[must_use]
    pub fn from_sources(mut sources: Vec<NoteSource>, options: &IndexOptions) -> Self {
        sources.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        let parsed: Vec<Result<ParsedNote, NoteError>> = sources
            .par_iter()
            .map(|source| parse_note(&source.file_name, &source.raw, options))
            .collect();
        Self::assemble(parsed, options)
    }

    fn assemble(parsed: Vec<Result<ParsedNote, NoteError>>, options: &IndexOptions) -> Self {
        let mut issues = Vec::new();
        let parsed = admit_unique(parsed, &mut issues);
        let titles = title_lookup(&parsed);
        let slug_map = build_slug_map(&parsed);

        let resolved: Vec<Vec<String>> = parsed
            .iter()
            .map(|note| resolve_links(&note.raw_links, &titles))
            .collect();

        let mut backlinks: HashMap<&str, Vec<Backlink>> = HashMap::new();
        for (note, links) in parsed.iter().zip(&resolved) {
            for target in links {
                backlinks.entry(target.as_str()).or_default().push(Backlink {
                    slug: note.slug.clone(),
                    title: note.title.clone(),
                });
            }
        }

        let mut notes: Vec<Note> = parsed
            .iter()
            .zip(resolved.iter())
            .map(|(note, links)| Note {
                slug: note.slug.clone(),
                title: note.title.clone(),
                date: note.date,
                tags: note.tags.clone(),
                kind: note.kind,
                has_page: note.has_page,
                content: note.content.clone(),
                excerpt: note.excerpt.clone(),
                reading_time: note.reading_time.clone(),
                links: links.clone(),
                backlinks: backlinks.remove(note.slug.as_str()).unwrap_or_default(),
            })
            .collect();
        sort_notes(&mut notes);

        let summaries = notes
            .iter()
            .map(|note| NoteSummary::from_note(note, options.search_content_prefix_chars))
            .collect();
        let by_slug = notes
            .iter()
            .enumerate()
            .map(|(idx, note)| (note.slug.clone(), idx))
            .collect();

        log::debug!(
            "built note index: {} notes, {} issues",
            notes.len(),
            issues.len()
        );
        Self {
            notes,
            summaries,
            by_slug,
            slug_map,
            issues,
        }
    }
}
