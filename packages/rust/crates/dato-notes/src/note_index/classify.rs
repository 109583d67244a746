//! Short vs long-form classification.

use serde::{Deserialize, Serialize};

/// Word count at which an untyped note is treated as long-form.
///
/// Heuristic boundary; override per store through `IndexOptions`.
pub const DEFAULT_LONG_FORM_MIN_WORDS: usize = 280;

/// Note form factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Short atomic note, listed but without a page.
    Note,
    /// Long-form article.
    Article,
    /// Long-form essay.
    Essay,
}

impl NoteKind {
    /// Whether this kind gets a dedicated page.
    #[must_use]
    pub const fn is_long_form(self) -> bool {
        matches!(self, Self::Article | Self::Essay)
    }

    /// Wire name (`note`, `article`, `essay`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Article => "article",
            Self::Essay => "essay",
        }
    }
}

/// Map an explicit `type` value and its synonyms onto a kind.
#[must_use]
pub fn parse_kind_alias(raw: &str) -> Option<NoteKind> {
    match raw.trim().to_lowercase().as_str() {
        "note" | "idea" | "short" => Some(NoteKind::Note),
        "article" | "post" | "long" => Some(NoteKind::Article),
        "essay" => Some(NoteKind::Essay),
        _ => None,
    }
}

/// Classification outcome; `has_page` always mirrors `kind.is_long_form()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Resolved kind.
    pub kind: NoteKind,
    /// Whether a dedicated page exists.
    pub has_page: bool,
}

impl From<NoteKind> for Classification {
    fn from(kind: NoteKind) -> Self {
        Self {
            kind,
            has_page: kind.is_long_form(),
        }
    }
}

/// Classify from an explicit type (if recognized) or the body word count.
#[must_use]
pub fn classify_note(
    explicit_type: Option<&str>,
    word_count: usize,
    long_form_min_words: usize,
) -> Classification {
    if let Some(kind) = explicit_type.and_then(parse_kind_alias) {
        return kind.into();
    }
    if word_count >= long_form_min_words {
        NoteKind::Article.into()
    } else {
        NoteKind::Note.into()
    }
}
