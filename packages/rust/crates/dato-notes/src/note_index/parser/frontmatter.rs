use super::time::parse_note_date;
use chrono::NaiveDate;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

const OPENING_DELIMITER: &str = "---";
const CLOSING_DELIMITERS: [&str; 2] = ["---", "..."];

/// Front matter parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text does not start with a `---` line.
    #[error("missing frontmatter start delimiter (---)")]
    MissingOpeningDelimiter,
    /// No closing `---` / `...` line was found.
    #[error("frontmatter block is not terminated")]
    UnterminatedBlock,
    /// The block is not valid YAML.
    #[error("frontmatter parse error ({0})")]
    InvalidYaml(String),
    /// The block is valid YAML but not a key/value mapping.
    #[error("frontmatter must be a key/value mapping")]
    NotAMapping,
}

/// Returns `(line_without_newline, offset_after_newline)`.
fn line_at(text: &str, start: usize) -> (&str, usize) {
    match text[start..].find('\n') {
        Some(rel) => (&text[start..start + rel], start + rel + 1),
        None => (&text[start..], text.len()),
    }
}

fn is_delimiter(line: &str, candidates: &[&str]) -> bool {
    let trimmed = line.trim_end();
    candidates.contains(&trimmed)
}

/// Split raw note text into the front matter mapping and the untouched body.
///
/// # Errors
///
/// Returns [`ParseError`] when the opening or closing delimiter is missing or
/// the block is not a YAML mapping.
pub fn split_frontmatter(raw: &str) -> Result<(Mapping, &str), ParseError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if text.is_empty() {
        return Err(ParseError::MissingOpeningDelimiter);
    }
    let (first, block_start) = line_at(text, 0);
    if !is_delimiter(first, &[OPENING_DELIMITER]) {
        return Err(ParseError::MissingOpeningDelimiter);
    }

    let mut cursor = block_start;
    while cursor < text.len() {
        let (line, next) = line_at(text, cursor);
        if is_delimiter(line, &CLOSING_DELIMITERS) {
            let mapping = parse_block(&text[block_start..cursor])?;
            return Ok((mapping, &text[next..]));
        }
        cursor = next;
    }
    Err(ParseError::UnterminatedBlock)
}

fn parse_block(block: &str) -> Result<Mapping, ParseError> {
    if block.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Mapping(mapping)) => Ok(mapping),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(ParseError::NotAMapping),
        Err(err) => Err(ParseError::InvalidYaml(err.to_string())),
    }
}

/// Declared shape of a recognized front matter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Scalar text (`title`, `slug`, `type`, `excerpt`).
    Text,
    /// List of strings (`tags`, `links`).
    List,
    /// Calendar date (`date`).
    Date,
}

/// Typed value of one recognized front matter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Key missing, null, empty or not convertible to the declared shape.
    Absent,
    /// Trimmed, non-empty text.
    Text(String),
    /// Trimmed, non-empty strings in authored order.
    List(Vec<String>),
    /// Parsed calendar date.
    Date(NaiveDate),
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

impl FieldValue {
    /// Read `key` from `mapping` and convert it to `kind`.
    #[must_use]
    pub fn read(mapping: &Mapping, key: &str, kind: FieldKind) -> Self {
        let Some(value) = mapping.get(key) else {
            return Self::Absent;
        };
        match kind {
            FieldKind::Text => scalar_text(value).map_or(Self::Absent, Self::Text),
            FieldKind::List => {
                let items: Vec<String> = match value {
                    Value::Sequence(seq) => seq
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect(),
                    other => scalar_text(other).into_iter().collect(),
                };
                if items.is_empty() {
                    Self::Absent
                } else {
                    Self::List(items)
                }
            }
            FieldKind::Date => scalar_text(value)
                .as_deref()
                .and_then(parse_note_date)
                .map_or(Self::Absent, Self::Date),
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Text(text) => vec![text],
            _ => Vec::new(),
        }
    }

    fn into_date(self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }
}

/// Strongly typed view of the recognized front matter keys; other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// `title`
    pub title: Option<String>,
    /// `slug`
    pub slug: Option<String>,
    /// `date`
    pub date: Option<NaiveDate>,
    /// `tags`
    pub tags: Vec<String>,
    /// `type`
    pub note_type: Option<String>,
    /// `links`
    pub links: Vec<String>,
    /// `excerpt`
    pub excerpt: Option<String>,
}

impl Frontmatter {
    /// Convert a parsed mapping into typed fields.
    #[must_use]
    pub fn from_mapping(mapping: &Mapping) -> Self {
        Self {
            title: FieldValue::read(mapping, "title", FieldKind::Text).into_text(),
            slug: FieldValue::read(mapping, "slug", FieldKind::Text).into_text(),
            date: FieldValue::read(mapping, "date", FieldKind::Date).into_date(),
            tags: FieldValue::read(mapping, "tags", FieldKind::List).into_list(),
            note_type: FieldValue::read(mapping, "type", FieldKind::Text).into_text(),
            links: FieldValue::read(mapping, "links", FieldKind::List).into_list(),
            excerpt: FieldValue::read(mapping, "excerpt", FieldKind::Text).into_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_returns_body_verbatim() {
        let raw = "---\ntitle: Alpha\n---\n\nBody line\n  indented\n";
        let (mapping, body) = split_frontmatter(raw).unwrap();
        assert_eq!(body, "\nBody line\n  indented\n");
        assert_eq!(
            mapping.get("title").and_then(Value::as_str),
            Some("Alpha")
        );
    }

    #[test]
    fn test_split_accepts_crlf_and_dots_terminator() {
        let (mapping, body) = split_frontmatter("---\r\ntitle: A\r\n...\r\nrest").unwrap();
        assert!(mapping.contains_key("title"));
        assert_eq!(body, "rest");
    }

    #[test]
    fn test_split_empty_block_and_eof_body() {
        let (mapping, body) = split_frontmatter("---\n---").unwrap();
        assert!(mapping.is_empty());
        assert_eq!(body, "");
    }

    #[test]
    fn test_split_errors() {
        assert_eq!(
            split_frontmatter("# Title\n").unwrap_err(),
            ParseError::MissingOpeningDelimiter
        );
        assert_eq!(
            split_frontmatter("").unwrap_err(),
            ParseError::MissingOpeningDelimiter
        );
        assert_eq!(
            split_frontmatter("---\ntitle: A\nno end\n").unwrap_err(),
            ParseError::UnterminatedBlock
        );
        assert!(matches!(
            split_frontmatter("---\ntitle: [unclosed\n---\n").unwrap_err(),
            ParseError::InvalidYaml(_)
        ));
        assert_eq!(
            split_frontmatter("---\n- a\n- b\n---\n").unwrap_err(),
            ParseError::NotAMapping
        );
    }

    #[test]
    fn test_typed_fields() {
        let raw = "---\ntitle: '  Alpha  '\nslug: alpha-note\ndate: 2024-05-01\ntags: [rust, ' ', Rust]\ntype: essay\nlinks: Beta\nexcerpt: ''\nstatus: seed\n---\n";
        let (mapping, _) = split_frontmatter(raw).unwrap();
        let fm = Frontmatter::from_mapping(&mapping);
        assert_eq!(fm.title.as_deref(), Some("Alpha"));
        assert_eq!(fm.slug.as_deref(), Some("alpha-note"));
        assert_eq!(fm.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(fm.tags, vec!["rust".to_string(), "Rust".to_string()]);
        assert_eq!(fm.note_type.as_deref(), Some("essay"));
        assert_eq!(fm.links, vec!["Beta".to_string()]);
        assert_eq!(fm.excerpt, None);
    }

    #[test]
    fn test_unparseable_date_is_absent() {
        let (mapping, _) = split_frontmatter("---\ndate: someday\n---\n").unwrap();
        assert_eq!(
            FieldValue::read(&mapping, "date", FieldKind::Date),
            FieldValue::Absent
        );
    }
}
