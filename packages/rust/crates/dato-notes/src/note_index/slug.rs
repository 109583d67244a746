//! Canonical kebab-case identifiers for filenames, URLs and graph keys.

use unicode_normalization::UnicodeNormalization;

/// Symbols and letters that have no ASCII decomposition.
fn transliterate(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        '&' => "and",
        '|' => "or",
        '<' => "less",
        '>' => "greater",
        '$' => "dollar",
        '%' => "percent",
        '€' => "euro",
        '£' => "pound",
        '¢' => "cent",
        '¥' => "yen",
        '∞' => "infinity",
        '♥' => "love",
        '©' => "c",
        '®' => "r",
        '™' => "tm",
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'ø' | 'Ø' => "o",
        'ł' | 'Ł' => "l",
        'đ' | 'Đ' | 'ð' | 'Ð' => "d",
        'þ' | 'Þ' => "th",
        'ħ' | 'Ħ' => "h",
        'ı' => "i",
        _ => return None,
    };
    Some(mapped)
}

#[derive(Default)]
struct SlugBuilder {
    out: String,
    pending_hyphen: bool,
}

impl SlugBuilder {
    fn push(&mut self, ch: char) {
        if ch.is_ascii_alphanumeric() {
            if self.pending_hyphen && !self.out.is_empty() {
                self.out.push('-');
            }
            self.pending_hyphen = false;
            self.out.push(ch.to_ascii_lowercase());
        } else if ch == '-' || ch.is_whitespace() {
            self.pending_hyphen = true;
        }
    }
}

/// Normalize arbitrary text into a lowercase `[a-z0-9]` slug joined by single hyphens.
///
/// Only whitespace and `-` separate words. Symbols with a spelled-out form
/// are transliterated (`&` → `and`, `ß` → `ss`), accents fold to ASCII
/// (`é` → `e`) and every other character is deleted, so `Node.js` becomes
/// `nodejs`. Returns an empty string when nothing alphanumeric remains.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut builder = SlugBuilder::default();
    for ch in input.chars() {
        match transliterate(ch) {
            Some(mapped) => mapped.chars().for_each(|m| builder.push(m)),
            None => ch.nfkd().for_each(|part| builder.push(part)),
        }
    }
    builder.out
}

/// Whether `slug` already has the canonical `^[a-z0-9]+(-[a-z0-9]+)*$` shape.
#[must_use]
pub fn is_canonical_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}
