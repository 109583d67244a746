use super::models::IndexIssue;
use super::parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Note indexing errors.
#[derive(Debug, Error)]
pub enum NoteError {
    /// Filesystem access failed.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        /// Path being read or listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The front matter block is missing or malformed.
    #[error("{file}: {source}")]
    Parse {
        /// File name inside the notes directory.
        file: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },
    /// Neither front matter nor file name yield a title.
    #[error("{file}: no title could be derived")]
    MissingTitle {
        /// File name inside the notes directory.
        file: String,
    },
    /// Slug normalization produced an empty identifier.
    #[error("{file}: slug cannot be derived")]
    EmptySlug {
        /// File name inside the notes directory.
        file: String,
    },
    /// Two files resolved to the same slug.
    #[error("duplicate slug '{slug}' in {second} (already used in {first})")]
    SlugCollision {
        /// Contested slug.
        slug: String,
        /// File that owns the slug.
        first: String,
        /// File that collided.
        second: String,
    },
}

impl NoteError {
    /// Convert a per-file error into the issue recorded by the index build.
    #[must_use]
    pub fn to_issue(&self) -> IndexIssue {
        match self {
            Self::Io { path, source } => IndexIssue::Unreadable {
                file: path
                    .file_name()
                    .map_or_else(|| path.display().to_string(), |name| {
                        name.to_string_lossy().into_owned()
                    }),
                reason: source.to_string(),
            },
            Self::Parse { file, source } => IndexIssue::Malformed {
                file: file.clone(),
                reason: source.to_string(),
            },
            Self::MissingTitle { file } => IndexIssue::MissingTitle { file: file.clone() },
            Self::EmptySlug { file } => IndexIssue::EmptySlug { file: file.clone() },
            Self::SlugCollision {
                slug,
                first,
                second,
            } => IndexIssue::SlugCollision {
                slug: slug.clone(),
                kept: first.clone(),
                skipped: second.clone(),
            },
        }
    }
}
