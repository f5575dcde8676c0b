//! HTML markup host.
//!
//! Reads and rewrites an HTML string with a streaming rewriter, so markup the
//! updater does not touch is emitted byte for byte.

use std::cell::{Cell, RefCell};

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, doctype, element, rewrite_str, text};

use super::{DocumentError, FaviconDocument, collapse_whitespace};

/// Temporary attribute used to find a freshly appended link.
const NEW_LINK_MARKER: &str = "data-favicon-tint-new";

/// Elements that only occur in a document, never in a bare fragment.
const IMPLIED_HEAD_MARKERS: &[&str] = &["title", "body", "base", "meta"];

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Position of a `<link>` among all link elements, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HtmlLink(usize);

#[derive(Debug, Clone)]
struct LinkAttrs {
    rel: String,
    href: Option<String>,
    marked: bool,
}

/// An HTML document held as markup.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    url: String,
    source: String,
    modified: bool,
}

impl HtmlDocument {
    pub fn new(source: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
            modified: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn into_string(self) -> String {
        self.source
    }

    /// Whether any rewrite changed the markup since construction.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    fn scan_links(&self) -> Result<Vec<LinkAttrs>, DocumentError> {
        let links = RefCell::new(Vec::new());

        rewrite_str(
            &self.source,
            RewriteStrSettings {
                element_content_handlers: vec![element!("link", |el| {
                    links.borrow_mut().push(LinkAttrs {
                        rel: el.get_attribute("rel").map(decode).unwrap_or_default(),
                        href: el.get_attribute("href").map(decode),
                        marked: el.has_attribute(NEW_LINK_MARKER),
                    });
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )
        .map_err(|e| DocumentError::Rewrite(e.to_string()))?;

        Ok(links.into_inner())
    }

    fn link_attrs(&self, link: HtmlLink) -> Result<LinkAttrs, DocumentError> {
        self.scan_links()?
            .into_iter()
            .nth(link.0)
            .ok_or(DocumentError::UnknownLink)
    }

    fn replace_source(&mut self, source: String) {
        if source != self.source {
            self.source = source;
            self.modified = true;
        }
    }
}

impl FaviconDocument for HtmlDocument {
    type Link = HtmlLink;

    fn url(&self) -> String {
        self.url.clone()
    }

    fn title(&self) -> Result<String, DocumentError> {
        // `<title>` inside inline SVG is not the document title
        let html_titles = Cell::new(0usize);
        let collecting = Cell::new(false);
        let title = RefCell::new(String::new());

        rewrite_str(
            &self.source,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!("title", |el| {
                        let is_html = el.namespace_uri() == HTML_NAMESPACE;
                        collecting.set(is_html && html_titles.get() == 0);
                        if is_html {
                            html_titles.set(html_titles.get() + 1);
                        }
                        Ok(())
                    }),
                    text!("title", |chunk| {
                        if collecting.get() {
                            title.borrow_mut().push_str(chunk.as_str());
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::new()
            },
        )
        .map_err(|e| DocumentError::Rewrite(e.to_string()))?;

        Ok(collapse_whitespace(&decode(title.into_inner())))
    }

    fn find_link(&self, rel_fragment: &str) -> Result<Option<HtmlLink>, DocumentError> {
        Ok(self
            .scan_links()?
            .iter()
            .position(|attrs| attrs.rel.contains(rel_fragment))
            .map(HtmlLink))
    }

    fn append_link(&mut self, rel: &str) -> Result<HtmlLink, DocumentError> {
        let doctype_seen = Cell::new(false);
        let html_seen = Cell::new(false);
        let decided = Cell::new(false);
        let inserted = Cell::new(false);
        let markup = format!(
            r#"<link rel="{}" {}>"#,
            rel.replace('"', "&quot;"),
            NEW_LINK_MARKER
        );

        let appended = rewrite_str(
            &self.source,
            RewriteStrSettings {
                element_content_handlers: vec![element!("*", |el| {
                    if decided.get() {
                        return Ok(());
                    }
                    let tag = el.tag_name().to_ascii_lowercase();
                    match tag.as_str() {
                        "html" => html_seen.set(true),
                        // Right after the start tag, so an omitted `</head>`
                        // cannot push the link into the body.
                        "head" => {
                            el.prepend(&markup, ContentType::Html);
                            inserted.set(true);
                            decided.set(true);
                        }
                        // No `<head>` tag: everything before the first other
                        // element belongs to the implied head.
                        _ => {
                            if doctype_seen.get()
                                || html_seen.get()
                                || IMPLIED_HEAD_MARKERS.contains(&tag.as_str())
                            {
                                el.before(&markup, ContentType::Html);
                                inserted.set(true);
                            }
                            decided.set(true);
                        }
                    }
                    Ok(())
                })],
                document_content_handlers: vec![doctype!(|_doctype| {
                    doctype_seen.set(true);
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )
        .map_err(|e| DocumentError::Rewrite(e.to_string()))?;

        if !inserted.get() {
            return Err(DocumentError::MissingHead);
        }

        let position = HtmlDocument::new(appended.as_str(), "")
            .scan_links()?
            .iter()
            .position(|attrs| attrs.marked)
            .ok_or(DocumentError::UnknownLink)?;

        let cleaned = rewrite_str(
            &appended,
            RewriteStrSettings {
                element_content_handlers: vec![element!("link", |el| {
                    el.remove_attribute(NEW_LINK_MARKER);
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )
        .map_err(|e| DocumentError::Rewrite(e.to_string()))?;

        self.replace_source(cleaned);
        Ok(HtmlLink(position))
    }

    fn rel(&self, link: HtmlLink) -> Result<String, DocumentError> {
        Ok(self.link_attrs(link)?.rel)
    }

    fn href(&self, link: HtmlLink) -> Result<Option<String>, DocumentError> {
        Ok(self.link_attrs(link)?.href)
    }

    fn set_href(&mut self, link: HtmlLink, href: &str) -> Result<(), DocumentError> {
        let position = Cell::new(0usize);
        let written = Cell::new(false);

        let output = rewrite_str(
            &self.source,
            RewriteStrSettings {
                element_content_handlers: vec![element!("link", |el| {
                    if position.get() == link.0 {
                        el.set_attribute("href", href)?;
                        written.set(true);
                    }
                    position.set(position.get() + 1);
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )
        .map_err(|e| DocumentError::Rewrite(e.to_string()))?;

        if !written.get() {
            return Err(DocumentError::UnknownLink);
        }

        self.replace_source(output);
        Ok(())
    }
}

fn decode(raw: String) -> String {
    htmlize::unescape(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>  Sprint
     board </title>
  <link rel="stylesheet" href="/app.css">
  <link rel="shortcut icon" href="/favicon.ico">
</head>
<body><p>hi</p></body>
</html>
"#;

    #[test]
    fn reads_title_with_collapsed_whitespace() {
        let doc = HtmlDocument::new(PAGE, "file:///page.html");
        assert_eq!(doc.title().unwrap(), "Sprint board");
    }

    #[test]
    fn decodes_title_entities() {
        let doc = HtmlDocument::new(
            "<html><head><title>Tom &amp; Jerry</title></head></html>",
            "",
        );
        assert_eq!(doc.title().unwrap(), "Tom & Jerry");
    }

    #[test]
    fn only_first_title_counts() {
        let doc = HtmlDocument::new(
            "<html><head><title>One</title></head><body><title>Two</title></body></html>",
            "",
        );
        assert_eq!(doc.title().unwrap(), "One");
    }

    #[test]
    fn svg_title_is_not_the_document_title() {
        let doc = HtmlDocument::new("<body><svg><title>Icon</title></svg></body>", "");
        assert_eq!(doc.title().unwrap(), "");

        let doc = HtmlDocument::new(
            "<html><head><title>Board</title></head><body><svg><title>Icon</title></svg></body></html>",
            "",
        );
        assert_eq!(doc.title().unwrap(), "Board");

        let doc = HtmlDocument::new(
            "<body><svg><title>Icon</title></svg><title>Late</title></body>",
            "",
        );
        assert_eq!(doc.title().unwrap(), "Late");
    }

    #[test]
    fn finds_first_icon_link() {
        let doc = HtmlDocument::new(PAGE, "");
        let link = doc.find_link("icon").unwrap().unwrap();
        assert_eq!(link, HtmlLink(1));
        assert_eq!(doc.rel(link).unwrap(), "shortcut icon");
        assert_eq!(doc.href(link).unwrap().as_deref(), Some("/favicon.ico"));
    }

    #[test]
    fn set_href_rewrites_only_that_link() {
        let mut doc = HtmlDocument::new(PAGE, "");
        let link = doc.find_link("icon").unwrap().unwrap();
        doc.set_href(link, "data:image/svg+xml;base64,AAAA").unwrap();

        assert!(doc.is_modified());
        assert!(doc.as_str().contains(r#"href="data:image/svg+xml;base64,AAAA""#));
        assert!(doc.as_str().contains(r#"href="/app.css""#));
        assert!(doc.as_str().contains("<body><p>hi</p></body>"));
    }

    #[test]
    fn append_link_lands_in_head() {
        let mut doc = HtmlDocument::new(
            "<html><head><link rel=\"stylesheet\" href=\"a.css\"></head><body><link rel=\"preload\" href=\"b\"></body></html>",
            "",
        );
        let link = doc.append_link("icon").unwrap();

        assert_eq!(link, HtmlLink(0));
        assert_eq!(doc.rel(link).unwrap(), "icon");
        assert!(!doc.as_str().contains(NEW_LINK_MARKER));
        let icon_at = doc.as_str().find(r#"<link rel="icon""#).unwrap();
        let head_end = doc.as_str().find("</head>").unwrap();
        assert!(icon_at < head_end);
    }

    #[test]
    fn append_link_stays_in_head_without_head_end_tag() {
        let mut doc =
            HtmlDocument::new("<html><head><title>T</title><body><p>x</p></body></html>", "");
        let link = doc.append_link("icon").unwrap();

        assert_eq!(doc.rel(link).unwrap(), "icon");
        let source = doc.as_str();
        let head_at = source.find("<head>").unwrap();
        let icon_at = source.find(r#"<link rel="icon""#).unwrap();
        let body_at = source.find("<body").unwrap();
        assert!(head_at < icon_at && icon_at < body_at);
        assert!(source.ends_with("</body></html>"));
    }

    #[test]
    fn append_link_uses_implied_head() {
        let mut doc = HtmlDocument::new("<!doctype html><title>T</title><p>x</p>", "");
        let link = doc.append_link("icon").unwrap();

        assert_eq!(link, HtmlLink(0));
        let source = doc.as_str();
        assert!(source.starts_with("<!doctype html><link rel=\"icon\""));
        assert!(source.ends_with("<title>T</title><p>x</p>"));
        assert!(!source.contains(NEW_LINK_MARKER));
        assert_eq!(doc.title().unwrap(), "T");
    }

    #[test]
    fn append_link_after_html_start_tag_without_head() {
        let mut doc = HtmlDocument::new("<html><body><p>x</p></body></html>", "");
        doc.append_link("icon").unwrap();

        let source = doc.as_str();
        let icon_at = source.find(r#"<link rel="icon""#).unwrap();
        assert!(source.find("<html>").unwrap() < icon_at);
        assert!(icon_at < source.find("<body>").unwrap());
    }

    #[test]
    fn append_to_fragment_fails() {
        let mut doc = HtmlDocument::new("<p>no head here</p>", "");
        assert_eq!(doc.append_link("icon"), Err(DocumentError::MissingHead));
        assert!(!doc.is_modified());
    }

    #[test]
    fn unknown_link_is_reported() {
        let mut doc = HtmlDocument::new(PAGE, "");
        assert_eq!(
            doc.set_href(HtmlLink(9), "x"),
            Err(DocumentError::UnknownLink)
        );
    }
}
