use regex::Regex;
use std::sync::LazyLock;

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(_compile_err) => match Regex::new(r"$^") {
            Ok(fallback) => fallback,
            Err(fallback_err) => panic!("hardcoded fallback regex must compile: {fallback_err}"),
        },
    }
}

static WIKILINK_REGEX: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"\[\[([^\[\]]+)\]\]"));

/// One `[[Target]]` / `[[Target|Label]]` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    /// Trimmed text before the first `|`.
    pub target: String,
    /// Trimmed text after the first `|`, when non-empty.
    pub label: Option<String>,
    /// Byte range of the whole `[[...]]` match in the scanned text.
    pub span: std::ops::Range<usize>,
}

impl WikiLink {
    /// Label if present, else the target.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.target)
    }
}

/// Extract wiki links in order of appearance, duplicates kept.
///
/// Occurrences whose target is empty after trimming are dropped.
#[must_use]
pub fn extract_wiki_links(text: &str) -> Vec<WikiLink> {
    WIKILINK_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?.as_str();
            let (target, label) = match inner.split_once('|') {
                Some((target, label)) => (target.trim(), Some(label.trim())),
                None => (inner.trim(), None),
            };
            if target.is_empty() {
                return None;
            }
            Some(WikiLink {
                target: target.to_string(),
                label: label.filter(|l| !l.is_empty()).map(str::to_string),
                span: whole.range(),
            })
        })
        .collect()
}

/// Raw link targets only.
#[must_use]
pub fn extract_link_targets(text: &str) -> Vec<String> {
    extract_wiki_links(text)
        .into_iter()
        .map(|link| link.target)
        .collect()
}
