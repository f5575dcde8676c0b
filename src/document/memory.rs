//! In-memory document model.

use super::{DocumentError, FaviconDocument, Mutation, collapse_whitespace};

/// Identity of a link element inside a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(u32);

#[derive(Debug, Clone)]
struct LinkElement {
    id: LinkId,
    rel: String,
    href: Option<String>,
}

/// A document whose head is held in memory.
///
/// Every change, made by the page or by the updater, is queued as a
/// [`Mutation`] until [`take_mutations`](Self::take_mutations) drains it.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    url: String,
    title: String,
    has_head: bool,
    links: Vec<LinkElement>,
    next_id: u32,
    href_writes: usize,
    mutations: Vec<Mutation>,
}

impl MemoryDocument {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            has_head: true,
            links: Vec::new(),
            next_id: 0,
            href_writes: 0,
            mutations: Vec::new(),
        }
    }

    /// A document without a `<head>` element.
    pub fn without_head(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            has_head: false,
            ..Self::new(url, title)
        }
    }

    /// Builder variant of [`insert_link`](Self::insert_link) that records no mutation.
    pub fn with_link(mut self, rel: &str, href: Option<&str>) -> Self {
        self.push_link(rel, href.map(str::to_string));
        self
    }

    /// Change the title, as the page would.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.mutations.push(Mutation::TitleChanged);
        }
    }

    /// Navigate within the page. Not a DOM mutation.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Insert a link at the start of the head, as a page replacing its icon would.
    pub fn insert_link(&mut self, rel: &str, href: Option<&str>) -> LinkId {
        let id = self.allocate_id();
        self.links.insert(
            0,
            LinkElement {
                id,
                rel: rel.to_string(),
                href: href.map(str::to_string),
            },
        );
        self.mutations.push(Mutation::LinkAdded {
            rel: rel.to_string(),
        });
        id
    }

    pub fn remove_link(&mut self, link: LinkId) -> Result<(), DocumentError> {
        let index = self.index_of(link)?;
        let removed = self.links.remove(index);
        self.mutations.push(Mutation::LinkRemoved { rel: removed.rel });
        Ok(())
    }

    /// Number of link elements in the head.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// How many times an href attribute was written.
    pub fn href_writes(&self) -> usize {
        self.href_writes
    }

    /// Drain the queued mutation records.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    fn allocate_id(&mut self) -> LinkId {
        let id = LinkId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_link(&mut self, rel: &str, href: Option<String>) -> LinkId {
        let id = self.allocate_id();
        self.links.push(LinkElement {
            id,
            rel: rel.to_string(),
            href,
        });
        id
    }

    fn index_of(&self, link: LinkId) -> Result<usize, DocumentError> {
        self.links
            .iter()
            .position(|el| el.id == link)
            .ok_or(DocumentError::UnknownLink)
    }
}

impl FaviconDocument for MemoryDocument {
    type Link = LinkId;

    fn url(&self) -> String {
        self.url.clone()
    }

    fn title(&self) -> Result<String, DocumentError> {
        Ok(collapse_whitespace(&self.title))
    }

    fn find_link(&self, rel_fragment: &str) -> Result<Option<LinkId>, DocumentError> {
        Ok(self
            .links
            .iter()
            .find(|el| el.rel.contains(rel_fragment))
            .map(|el| el.id))
    }

    fn append_link(&mut self, rel: &str) -> Result<LinkId, DocumentError> {
        if !self.has_head {
            return Err(DocumentError::MissingHead);
        }
        let id = self.push_link(rel, None);
        self.mutations.push(Mutation::LinkAdded {
            rel: rel.to_string(),
        });
        Ok(id)
    }

    fn rel(&self, link: LinkId) -> Result<String, DocumentError> {
        let index = self.index_of(link)?;
        Ok(self.links[index].rel.clone())
    }

    fn href(&self, link: LinkId) -> Result<Option<String>, DocumentError> {
        let index = self.index_of(link)?;
        Ok(self.links[index].href.clone())
    }

    fn set_href(&mut self, link: LinkId, href: &str) -> Result<(), DocumentError> {
        let index = self.index_of(link)?;
        let element = &mut self.links[index];
        element.href = Some(href.to_string());
        self.href_writes += 1;
        self.mutations.push(Mutation::LinkHrefChanged {
            rel: element.rel.clone(),
        });
        Ok(())
    }
}
