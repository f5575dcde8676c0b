//! Change watching
//!
//! A [`ChangeWatcher`] is a subscription: a callback plus the condition under
//! which a batch of [`Mutation`]s should invoke it. Hosts deliver batches;
//! the watcher decides whether they qualify.

pub mod file;

use crate::document::{
    DocumentError, FaviconDocument, MemoryDocument, Mutation, ResolverConfig,
};
use crate::favicon::{Encoder, FaviconUpdater, TextSource};

pub use file::{FileSession, shutdown_signal, watch_file};

/// Upper bound on back-to-back dispatch rounds in [`ChangeWatcher::run_until_idle`].
const MAX_IDLE_ROUNDS: usize = 16;

/// Which mutations re-trigger the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchScope {
    /// Title changes and changes to icon links anywhere in the head.
    Head,
    /// Changes to the title only.
    Title,
}

impl WatchScope {
    /// The scope matching the text the icon is derived from.
    pub fn for_source(source: TextSource) -> Self {
        match source {
            TextSource::Url => WatchScope::Head,
            TextSource::Title => WatchScope::Title,
        }
    }

    pub fn qualifies(&self, mutation: &Mutation, resolver: &ResolverConfig) -> bool {
        match (self, mutation) {
            (_, Mutation::TitleChanged) => true,
            (WatchScope::Title, _) => false,
            (
                WatchScope::Head,
                Mutation::LinkAdded { rel }
                | Mutation::LinkRemoved { rel }
                | Mutation::LinkHrefChanged { rel },
            ) => resolver.matches(rel),
        }
    }
}

/// A callback subscribed to a document's mutations.
pub struct ChangeWatcher<'a, D: ?Sized> {
    scope: WatchScope,
    resolver: ResolverConfig,
    callback: Box<dyn FnMut(&mut D, &[Mutation]) + 'a>,
}

impl<'a, D: ?Sized> ChangeWatcher<'a, D> {
    pub fn subscribe(
        scope: WatchScope,
        resolver: ResolverConfig,
        callback: impl FnMut(&mut D, &[Mutation]) + 'a,
    ) -> Self {
        Self {
            scope,
            resolver,
            callback: Box::new(callback),
        }
    }

    pub fn scope(&self) -> WatchScope {
        self.scope
    }

    /// Deliver a batch. Returns whether the callback ran.
    pub fn dispatch(&mut self, doc: &mut D, batch: &[Mutation]) -> bool {
        if !batch
            .iter()
            .any(|mutation| self.scope.qualifies(mutation, &self.resolver))
        {
            return false;
        }

        (self.callback)(doc, batch);
        true
    }
}

impl<'a, D> ChangeWatcher<'a, D>
where
    D: FaviconDocument + ?Sized,
{
    /// Subscribe `updater` with the scope its text source calls for.
    ///
    /// Update failures are logged and swallowed.
    pub fn for_updater<E: Encoder>(updater: &'a FaviconUpdater<E>) -> Self {
        let settings = updater.settings();
        Self::subscribe(
            WatchScope::for_source(settings.source),
            settings.resolver,
            move |doc: &mut D, _batch: &[Mutation]| {
                if let Err(e) = updater.update(doc) {
                    log::warn!("Favicon update failed: {:#}", e);
                }
            },
        )
    }
}

impl ChangeWatcher<'_, MemoryDocument> {
    /// Drain and dispatch queued mutations until the document is quiet.
    ///
    /// Returns how many times the callback ran.
    pub fn run_until_idle(&mut self, doc: &mut MemoryDocument) -> usize {
        let mut runs = 0;
        for _ in 0..MAX_IDLE_ROUNDS {
            let batch = doc.take_mutations();
            if batch.is_empty() {
                return runs;
            }
            if self.dispatch(doc, &batch) {
                runs += 1;
            }
        }

        log::warn!(
            "document still mutating after {} rounds, giving up",
            MAX_IDLE_ROUNDS
        );
        runs
    }
}

/// The favicon-relevant state of a document at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub title: String,
    /// `rel` and `href` of the current icon link
    pub icon: Option<(String, Option<String>)>,
}

impl DocumentSnapshot {
    pub fn capture<D>(doc: &D, resolver: &ResolverConfig) -> Result<Self, DocumentError>
    where
        D: FaviconDocument + ?Sized,
    {
        let icon = match doc.find_link(resolver.rel_fragment)? {
            Some(link) => Some((doc.rel(link)?, doc.href(link)?)),
            None => None,
        };

        Ok(Self {
            title: doc.title()?,
            icon,
        })
    }

    /// Mutation records that turn `self` into `next`.
    pub fn diff(&self, next: &DocumentSnapshot) -> Vec<Mutation> {
        let mut batch = Vec::new();

        if self.title != next.title {
            batch.push(Mutation::TitleChanged);
        }

        match (&self.icon, &next.icon) {
            (None, Some((rel, _))) => batch.push(Mutation::LinkAdded { rel: rel.clone() }),
            (Some((rel, _)), None) => batch.push(Mutation::LinkRemoved { rel: rel.clone() }),
            (Some((old_rel, old_href)), Some((rel, href))) => {
                if old_rel != rel {
                    batch.push(Mutation::LinkRemoved {
                        rel: old_rel.clone(),
                    });
                    batch.push(Mutation::LinkAdded { rel: rel.clone() });
                } else if old_href != href {
                    batch.push(Mutation::LinkHrefChanged { rel: rel.clone() });
                }
            }
            (None, None) => {}
        }

        batch
    }
}
