//! Markdown note index: parsing, link resolution, backlinks, cache and queries.

mod cache;
mod classify;
mod error;
pub(crate) mod fences;
mod index;
mod models;
mod parser;
mod query;
mod scan;
mod slug;

pub use cache::{CacheStatus, DirectoryFingerprint, NoteIndexCache};
pub use classify::{
    Classification, DEFAULT_LONG_FORM_MIN_WORDS, NoteKind, classify_note, parse_kind_alias,
};
pub use error::NoteError;
pub use index::{NoteIndex, NoteSource};
pub use models::{
    Backlink, IndexIssue, IndexOptions, IndexStats, Note, NoteSummary,
    DEFAULT_SEARCH_CONTENT_PREFIX_CHARS,
};
pub use parser::{
    FieldKind, FieldValue, Frontmatter, ParseError, ParsedNote, WikiLink, count_words,
    extract_link_targets, extract_wiki_links, is_valid_ymd, parse_note, parse_note_date,
    reading_time, slug_tier, split_frontmatter, title_tier,
};
pub use query::{NoteFilter, NoteStore, TagCount};
pub use scan::{NoteFileEntry, list_note_files};
pub use slug::{is_canonical_slug, slugify};
