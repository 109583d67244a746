//! Single-slot index memo keyed by a directory fingerprint.

use super::error::NoteError;
use super::index::NoteIndex;
use super::models::IndexOptions;
use super::scan::{NoteFileEntry, list_note_files};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// `name:mtime_nanos:size` for every note file, joined with `|`.
///
/// Edits that preserve both modification time and size go unnoticed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DirectoryFingerprint(String);

impl DirectoryFingerprint {
    /// Fingerprint an enumerated file list.
    #[must_use]
    pub fn from_entries(entries: &[NoteFileEntry]) -> Self {
        let joined = entries
            .iter()
            .map(|entry| {
                let mtime = entry
                    .modified_nanos
                    .map_or_else(String::new, |nanos| nanos.to_string());
                format!("{}:{mtime}:{}", entry.file_name, entry.size)
            })
            .collect::<Vec<_>>()
            .join("|");
        Self(joined)
    }

    /// Enumerate `dir` and fingerprint it. A missing directory gives an empty fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Io`] when the directory cannot be listed.
    pub fn scan(dir: &Path) -> Result<Self, NoteError> {
        Ok(Self::from_entries(&list_note_files(dir)?))
    }

    /// Raw fingerprint text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no note file contributed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DirectoryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a lookup reused the stored index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Stored index returned unchanged.
    Hit,
    /// Index rebuilt and stored.
    Miss,
}

#[derive(Debug, Clone)]
struct CacheSlot {
    dir: PathBuf,
    options: IndexOptions,
    fingerprint: DirectoryFingerprint,
    index: Arc<NoteIndex>,
}

/// Owned cache around one [`NoteIndex`].
///
/// The lock guards only the slot; builds run outside it, so concurrent
/// rebuilds may race and the last one stored wins.
#[derive(Debug, Default)]
pub struct NoteIndexCache {
    slot: Mutex<Option<CacheSlot>>,
    builds: AtomicUsize,
}

impl NoteIndexCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored index when `dir` is unchanged, else rebuild it.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Io`] when the directory cannot be listed.
    pub fn get_or_build(
        &self,
        dir: &Path,
        options: &IndexOptions,
    ) -> Result<(Arc<NoteIndex>, CacheStatus), NoteError> {
        let entries = list_note_files(dir)?;
        let fingerprint = DirectoryFingerprint::from_entries(&entries);

        if let Some(index) = self.lookup(dir, options, &fingerprint) {
            log::debug!("note index cache hit for '{}'", dir.display());
            return Ok((index, CacheStatus::Hit));
        }

        log::debug!(
            "note index cache miss for '{}' ({} files)",
            dir.display(),
            entries.len()
        );
        let index = Arc::new(NoteIndex::build_from_entries(&entries, options));
        self.builds.fetch_add(1, Ordering::Relaxed);
        let slot = CacheSlot {
            dir: dir.to_path_buf(),
            options: *options,
            fingerprint,
            index: Arc::clone(&index),
        };
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(slot);
        Ok((index, CacheStatus::Miss))
    }

    fn lookup(
        &self,
        dir: &Path,
        options: &IndexOptions,
        fingerprint: &DirectoryFingerprint,
    ) -> Option<Arc<NoteIndex>> {
        let guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|slot| {
                slot.dir == dir && slot.options == *options && slot.fingerprint == *fingerprint
            })
            .map(|slot| Arc::clone(&slot.index))
    }

    /// Number of rebuilds performed so far.
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Fingerprint of the stored index, if any.
    #[must_use]
    pub fn fingerprint(&self) -> Option<DirectoryFingerprint> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|slot| slot.fingerprint.clone())
    }

    /// Drop the stored index so the next lookup rebuilds.
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, mtime: Option<u128>, size: u64) -> NoteFileEntry {
        NoteFileEntry {
            file_name: name.to_string(),
            path: PathBuf::from(name),
            modified_nanos: mtime,
            size,
        }
    }

    #[test]
    fn test_fingerprint_format() {
        let fp = DirectoryFingerprint::from_entries(&[
            entry("a.md", Some(10), 3),
            entry("b.md", None, 0),
        ]);
        assert_eq!(fp.as_str(), "a.md:10:3|b.md::0");
        assert!(DirectoryFingerprint::from_entries(&[]).is_empty());
    }

    #[test]
    fn test_missing_directory_builds_empty_index() -> Result<(), NoteError> {
        let cache = NoteIndexCache::new();
        let dir = Path::new("/definitely/not/a/notes/dir");
        let (index, status) = cache.get_or_build(dir, &IndexOptions::default())?;
        assert!(index.is_empty());
        assert_eq!(status, CacheStatus::Miss);
        let (_, status) = cache.get_or_build(dir, &IndexOptions::default())?;
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(cache.build_count(), 1);
        cache.invalidate();
        assert_eq!(cache.fingerprint(), None);
        Ok(())
    }
}
