//! Notes directory enumeration.

use super::error::NoteError;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

const NOTE_EXTENSION: &str = "md";

/// One candidate note file with the metadata the cache fingerprint uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFileEntry {
    /// File name inside the notes directory.
    pub file_name: String,
    /// Full path.
    pub path: PathBuf,
    /// Modification time in nanoseconds since the Unix epoch, when available.
    pub modified_nanos: Option<u128>,
    /// File size in bytes.
    pub size: u64,
}

fn is_note_file_name(name: &str) -> bool {
    !name.starts_with('.')
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == NOTE_EXTENSION)
}

fn walk_error_to_io(err: walkdir::Error) -> io::Error {
    let message = err.to_string();
    err.into_io_error()
        .unwrap_or_else(|| io::Error::other(message))
}

/// List `.md` files directly inside `dir`, sorted by file name.
///
/// Hidden files, sub-directories and symlinks are skipped. A missing directory
/// yields an empty list.
///
/// # Errors
///
/// Returns [`NoteError::Io`] when the directory exists but cannot be listed.
pub fn list_note_files(dir: &Path) -> Result<Vec<NoteFileEntry>, NoteError> {
    if !dir.exists() {
        log::debug!("notes directory '{}' does not exist", dir.display());
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(NoteError::Io {
                    path: dir.to_path_buf(),
                    source: walk_error_to_io(err),
                });
            }
            Err(err) => {
                log::warn!("skipping unreadable entry in '{}': {err}", dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            log::debug!("skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if !is_note_file_name(file_name) {
            continue;
        }
        let (modified_nanos, size) = match entry.metadata() {
            Ok(meta) => (
                meta.modified()
                    .ok()
                    .and_then(|ts| ts.duration_since(UNIX_EPOCH).ok())
                    .map(|elapsed| elapsed.as_nanos()),
                meta.len(),
            ),
            Err(_) => (None, 0),
        };
        out.push(NoteFileEntry {
            file_name: file_name.to_string(),
            path: entry.path().to_path_buf(),
            modified_nanos,
            size,
        });
    }
    Ok(out)
}
