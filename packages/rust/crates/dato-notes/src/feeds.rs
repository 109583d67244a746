//! RSS 2.0 and sitemap documents.

use crate::note_index::NoteSummary;
use chrono::NaiveDate;
use std::fmt::Write as _;

/// Maximum number of RSS items.
pub const RSS_ITEM_LIMIT: usize = 50;

/// Channel metadata for [`rss_feed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    /// Absolute site origin without trailing slash.
    pub site_url: String,
    /// Channel title.
    pub title: String,
    /// Channel description.
    pub description: String,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:3000".to_string(),
            title: "Dato — Notes".to_string(),
            description: "Public library of thoughts".to_string(),
        }
    }
}

/// Trim whitespace and trailing slashes.
#[must_use]
pub fn normalize_site_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn rfc2822_gmt(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0).map_or_else(String::new, |naive| {
        naive
            .and_utc()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string()
    })
}

/// RSS 2.0 channel with the first [`RSS_ITEM_LIMIT`] long-form summaries.
#[must_use]
pub fn rss_feed(summaries: &[NoteSummary], options: &FeedOptions) -> String {
    let site = normalize_site_url(&options.site_url);
    let site_xml = escape_xml(&site);
    let mut items = String::new();
    for summary in summaries
        .iter()
        .filter(|summary| summary.has_page)
        .take(RSS_ITEM_LIMIT)
    {
        let url = escape_xml(&format!("{site}/notes/{}", summary.slug));
        let _ = write!(
            items,
            "\n    <item>\n      <title>{}</title>\n      <link>{url}</link>\n      <guid>{url}</guid>\n      <description>{}</description>",
            escape_xml(&summary.title),
            escape_xml(&summary.excerpt),
        );
        if let Some(date) = summary.date {
            let _ = write!(items, "\n      <pubDate>{}</pubDate>", rfc2822_gmt(date));
        }
        items.push_str("\n    </item>");
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n  <channel>\n    <title>{}</title>\n    <link>{site_xml}</link>\n    <description>{}</description>{items}\n  </channel>\n</rss>\n",
        escape_xml(&options.title),
        escape_xml(&options.description),
    )
}

fn push_url(out: &mut String, loc: &str, lastmod: Option<NaiveDate>, priority: &str) {
    let _ = write!(out, "\n  <url>\n    <loc>{}</loc>", escape_xml(loc));
    if let Some(date) = lastmod {
        let _ = write!(out, "\n    <lastmod>{}</lastmod>", date.format("%Y-%m-%d"));
    }
    let _ = write!(out, "\n    <priority>{priority}</priority>\n  </url>");
}

/// Sitemap with the static pages plus one entry per note.
#[must_use]
pub fn sitemap(notes: &[NoteSummary], site_url: &str) -> String {
    let site = normalize_site_url(site_url);
    let mut urls = String::new();
    push_url(&mut urls, &format!("{site}/"), None, "1.0");
    push_url(&mut urls, &format!("{site}/about"), None, "0.8");
    push_url(&mut urls, &format!("{site}/notes"), None, "0.9");
    for note in notes {
        push_url(
            &mut urls,
            &format!("{site}/notes/{}", note.slug),
            note.date,
            "0.9",
        );
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">{urls}\n</urlset>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note_index::{IndexOptions, NoteIndex, NoteSource};

    fn summaries() -> Vec<NoteSummary> {
        NoteIndex::from_sources(
            vec![
                NoteSource::new(
                    "a.md",
                    "---\ntitle: Tom & Jerry <3\ndate: 2024-06-01\ntype: essay\nexcerpt: \"Cats 'n' mice\"\n---\nBody",
                ),
                NoteSource::new("b.md", "---\ntitle: Short\n---\nTiny"),
                NoteSource::new("c.md", "---\ntitle: Undated Essay\ntype: article\n---\nText"),
            ],
            &IndexOptions::default(),
        )
        .summaries()
        .to_vec()
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;");
    }

    #[test]
    fn test_normalize_site_url() {
        assert_eq!(normalize_site_url(" https://dato.dev// "), "https://dato.dev");
    }

    #[test]
    fn test_rss_contains_only_long_form_items() {
        let options = FeedOptions {
            site_url: "https://dato.dev/".to_string(),
            ..FeedOptions::default()
        };
        let xml = rss_feed(&summaries(), &options);
        assert!(xml.contains("<title>Tom &amp; Jerry &lt;3</title>"));
        assert!(xml.contains("<description>Cats &apos;n&apos; mice</description>"));
        assert!(xml.contains("<link>https://dato.dev/notes/tom-and-jerry-less3</link>"));
        assert!(xml.contains("<pubDate>Sat, 01 Jun 2024 00:00:00 GMT</pubDate>"));
        assert!(xml.contains("undated-essay"));
        assert!(!xml.contains("/notes/short"));
        assert_eq!(xml.matches("<pubDate>").count(), 1);
    }

    #[test]
    fn test_rss_caps_items() {
        let many: Vec<NoteSummary> = (0..60)
            .map(|idx| {
                let mut summary = summaries()[0].clone();
                summary.slug = format!("n{idx}");
                summary
            })
            .collect();
        let xml = rss_feed(&many, &FeedOptions::default());
        assert_eq!(xml.matches("<item>").count(), RSS_ITEM_LIMIT);
    }

    #[test]
    fn test_sitemap_lists_pages_and_notes() {
        let xml = sitemap(&summaries(), "https://dato.dev/");
        assert!(xml.contains("<loc>https://dato.dev/</loc>"));
        assert!(xml.contains("<loc>https://dato.dev/about</loc>"));
        assert!(xml.contains("<loc>https://dato.dev/notes</loc>"));
        assert!(xml.contains("<loc>https://dato.dev/notes/short</loc>"));
        assert!(xml.contains("<lastmod>2024-06-01</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), 6);
    }
}
