//! dato-notes - Zettelkasten note index for the Dato site.
//!
//! Module layout (by domain):
//! - `note_index`: front matter, wiki links, slugs, classification, index build,
//!   fingerprint cache and the read-only query API (`NoteStore`)
//! - `render`: wiki-link aware Markdown to HTML
//! - `feeds`: RSS and sitemap documents
//! - `validate`: hard pre-publish validation of the notes directory
//! - `authoring`: normalize and write new note files
//! - `runtime_config`: `SiteConfig` resolution (defaults, YAML, environment)
//!
//! # Examples
//!
//! ```rust
//! use dato_notes::{IndexOptions, NoteIndex, NoteSource};
//!
//! let index = NoteIndex::from_sources(
//!     vec![
//!         NoteSource::new("a.md", "---\ntitle: Alpha\n---\nSee [[Beta]].\n"),
//!         NoteSource::new("b.md", "---\ntitle: Beta\n---\nLeaf.\n"),
//!     ],
//!     &IndexOptions::default(),
//! );
//!
//! let beta = index.note("beta").map(|note| note.backlinks.len());
//! assert_eq!(beta, Some(1));
//! ```

pub mod authoring;
pub mod feeds;
pub mod note_index;
pub mod render;
pub mod runtime_config;
pub mod validate;

pub use authoring::{AuthoringError, NewNoteRequest, NormalizedNote, write_note};
pub use feeds::{FeedOptions, escape_xml, normalize_site_url, rss_feed, sitemap};
pub use note_index::{
    Backlink, CacheStatus, Classification, DirectoryFingerprint, Frontmatter, IndexIssue,
    IndexOptions, IndexStats, Note, NoteError, NoteFilter, NoteIndex, NoteIndexCache, NoteKind,
    NoteSource, NoteStore, NoteSummary, ParseError, TagCount, WikiLink, classify_note,
    extract_link_targets, extract_wiki_links, is_canonical_slug, slugify, split_frontmatter,
};
pub use render::{RenderedMarkdown, RenderedWikiLink, render_markdown};
pub use runtime_config::{ConfigError, SiteConfig, load_site_config};
pub use validate::{ValidationError, ValidationReport, validate_notes_dir};
