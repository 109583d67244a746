//! Wiki-link aware Markdown to HTML.

use crate::note_index::fences::FenceTracker;
use crate::note_index::{extract_wiki_links, slugify};
use comrak::{Options, markdown_to_html};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// One wiki link seen while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWikiLink {
    /// Raw target text.
    pub target: String,
    /// Displayed text.
    pub text: String,
    /// Resolved slug; `None` renders plain text.
    pub slug: Option<String>,
}

/// HTML fragment plus the wiki links it contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    /// Rendered HTML.
    pub html: String,
    /// Wiki links outside code fences, in order.
    pub wiki_links: Vec<RenderedWikiLink>,
}

fn resolve_target(target: &str, slug_map: &BTreeMap<String, String>) -> Option<String> {
    slug_map
        .get(&target.to_lowercase())
        .or_else(|| slug_map.get(&slugify(target)))
        .cloned()
}

fn rewrite_line(
    line: &str,
    slug_map: &BTreeMap<String, String>,
    seen: &mut Vec<RenderedWikiLink>,
) -> String {
    let links = extract_wiki_links(line);
    if links.is_empty() {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;
    for link in links {
        out.push_str(&line[cursor..link.span.start]);
        let text = link.display_text().to_string();
        let slug = resolve_target(&link.target, slug_map);
        match &slug {
            Some(slug) => {
                let _ = write!(out, "[{text}](/notes/{slug})");
            }
            None => out.push_str(&text),
        }
        cursor = link.span.end;
        seen.push(RenderedWikiLink {
            target: link.target,
            text,
            slug,
        });
    }
    out.push_str(&line[cursor..]);
    out
}

fn rewrite_wiki_links(
    content: &str,
    slug_map: &BTreeMap<String, String>,
) -> (String, Vec<RenderedWikiLink>) {
    let mut fences = FenceTracker::new();
    let mut seen = Vec::new();
    let mut out = String::with_capacity(content.len());
    for (idx, line) in content.split_inclusive('\n').enumerate() {
        if fences.observe(idx + 1, line) {
            out.push_str(line);
        } else {
            out.push_str(&rewrite_line(line, slug_map, &mut seen));
        }
    }
    (out, seen)
}

fn comrak_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.alerts = true;
    options.extension.header_ids = Some(String::new());
    options.render.escape = true;
    options
}

/// Render a note body, turning resolvable `[[Target|Label]]` into `/notes/<slug>` links.
///
/// Unresolved links render as their label text. Fenced code is left untouched.
#[must_use]
pub fn render_markdown(content: &str, slug_map: &BTreeMap<String, String>) -> RenderedMarkdown {
    let (markdown, wiki_links) = rewrite_wiki_links(content, slug_map);
    RenderedMarkdown {
        html: markdown_to_html(&markdown, &comrak_options()),
        wiki_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug_map() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("project alpha".to_string(), "project-alpha".to_string()),
            ("project-alpha".to_string(), "project-alpha".to_string()),
            ("project beta".to_string(), "project-beta".to_string()),
            ("project-beta".to_string(), "project-beta".to_string()),
        ])
    }

    #[test]
    fn test_resolved_links_render_as_anchors() {
        let rendered = render_markdown(
            "See [[Project Alpha]] and [[project-beta|the other one]].\n",
            &slug_map(),
        );
        assert!(rendered.html.contains(r#"<a href="/notes/project-alpha">Project Alpha</a>"#));
        assert!(rendered.html.contains(r#"<a href="/notes/project-beta">the other one</a>"#));
        assert_eq!(rendered.wiki_links.len(), 2);
        assert_eq!(rendered.wiki_links[1].text, "the other one");
    }

    #[test]
    fn test_slugified_fallback_and_unresolved_text() {
        let rendered = render_markdown("[[PROJECT   alpha!]] then [[Nowhere|gone]]", &slug_map());
        assert!(rendered.html.contains(r#"href="/notes/project-alpha""#));
        assert!(rendered.html.contains("then gone"));
        assert_eq!(rendered.wiki_links[1].slug, None);
    }

    #[test]
    fn test_fenced_code_is_untouched() {
        let rendered = render_markdown("```\n[[Project Alpha]]\n```\n", &slug_map());
        assert!(rendered.html.contains("[[Project Alpha]]"));
        assert!(rendered.wiki_links.is_empty());
    }

    #[test]
    fn test_gfm_extensions_and_escaping() {
        let source = "# Hello World\n\n~~old~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n> [!NOTE]\n> careful\n\n<script>alert(1)</script>\n";
        let html = render_markdown(source, &BTreeMap::new()).html;
        assert!(html.contains(r#"id="hello-world""#));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("markdown-alert-note"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
