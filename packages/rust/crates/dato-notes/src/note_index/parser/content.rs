const WORDS_PER_MINUTE: usize = 200;
const EXCERPT_LINES: usize = 3;

/// Whitespace separated word count.
#[must_use]
pub fn count_words(body: &str) -> usize {
    body.split_whitespace().count()
}

/// `"<n> min read"` at 200 words per minute, rounded up, at least one minute.
#[must_use]
pub fn reading_time(word_count: usize) -> String {
    let minutes = word_count.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

/// First non-empty lines of the body, trimmed and joined by single spaces.
pub(super) fn derive_excerpt(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(EXCERPT_LINES)
        .collect::<Vec<_>>()
        .join(" ")
}
