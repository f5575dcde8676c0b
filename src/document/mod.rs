//! Document hosts
//!
//! A [`FaviconDocument`] is the only view the updater has of a page: its URL,
//! its title and the `<link>` elements of its head. Hosts also report the
//! mutations they undergo so a [`ChangeWatcher`](crate::watch::ChangeWatcher)
//! can react to them.

pub mod html;
pub mod memory;

use std::fmt;

pub use html::HtmlDocument;
pub use memory::MemoryDocument;

/// Failure reported by a document host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The document has no `<head>` to attach a favicon link to.
    #[error("document has no <head> element")]
    MissingHead,
    /// The link handle does not refer to an element of this document.
    #[error("link element is not part of the document")]
    UnknownLink,
    /// The host could not process the document markup.
    #[error("failed to rewrite document: {0}")]
    Rewrite(String),
}

/// A DOM change observed on a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    TitleChanged,
    LinkAdded { rel: String },
    LinkRemoved { rel: String },
    LinkHrefChanged { rel: String },
}

/// How the favicon link is located and created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Case-sensitive substring searched for in `rel`
    pub rel_fragment: &'static str,
    /// `rel` given to a newly created link
    pub new_rel: &'static str,
}

impl ResolverConfig {
    pub const DEFAULT: ResolverConfig = ResolverConfig {
        rel_fragment: "icon",
        new_rel: "icon",
    };

    pub fn matches(&self, rel: &str) -> bool {
        rel.contains(self.rel_fragment)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Platform capability the favicon updater works against.
pub trait FaviconDocument {
    /// Handle to a `<link>` element.
    type Link: Copy + Eq + fmt::Debug;

    /// The document URL.
    fn url(&self) -> String;

    /// The document title, with whitespace collapsed.
    fn title(&self) -> Result<String, DocumentError>;

    /// First link (in document order) whose `rel` contains `rel_fragment`.
    fn find_link(&self, rel_fragment: &str) -> Result<Option<Self::Link>, DocumentError>;

    /// Append a new `<link rel=...>` to the head.
    fn append_link(&mut self, rel: &str) -> Result<Self::Link, DocumentError>;

    fn rel(&self, link: Self::Link) -> Result<String, DocumentError>;

    fn href(&self, link: Self::Link) -> Result<Option<String>, DocumentError>;

    fn set_href(&mut self, link: Self::Link, href: &str) -> Result<(), DocumentError>;
}

/// Find the favicon link, creating one in the head if there is none.
///
/// Calling this again without removing the link returns the same handle.
pub fn resolve_favicon_link<D>(doc: &mut D, config: &ResolverConfig) -> Result<D::Link, DocumentError>
where
    D: FaviconDocument + ?Sized,
{
    if let Some(link) = doc.find_link(config.rel_fragment)? {
        return Ok(link);
    }

    log::debug!("no favicon link found, appending rel=\"{}\"", config.new_rel);
    doc.append_link(config.new_rel)
}

/// Collapse runs of ASCII whitespace and trim, like `document.title`.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}
