//! Keeping an HTML file's favicon tinted.
//!
//! The file system stands in for the DOM: every save is reloaded, diffed
//! against the previous [`DocumentSnapshot`] to produce a mutation batch, and
//! that batch goes through the same [`ChangeWatcher`] an in-memory document
//! would use.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::{ChangeWatcher, DocumentSnapshot};
use crate::document::{HtmlDocument, Mutation};
use crate::favicon::{FaviconUpdater, UpdateOutcome, UpdaterSettings};

/// Quiet period after an event before the file is reloaded.
const DEBOUNCE: Duration = Duration::from_millis(50);

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    FileChanged,
    WatcherError(notify::Error),
}

/// The `file://` URL of an existing file.
pub fn file_url(path: &Path) -> Result<String> {
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
    url::Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| anyhow!("Cannot express {} as a file URL", absolute.display()))
}

/// One HTML file whose favicon is managed.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    url: String,
    updater: FaviconUpdater,
    snapshot: Option<DocumentSnapshot>,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>, settings: UpdaterSettings) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            updater: FaviconUpdater::new(settings),
            snapshot: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn updater(&self) -> &FaviconUpdater {
        &self.updater
    }

    /// Read the file as it is on disk.
    pub async fn load(&self) -> Result<HtmlDocument> {
        let source = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read HTML file: {}", self.path.display()))?;
        Ok(HtmlDocument::new(source, self.url.as_str()))
    }

    /// Load and update the document without writing it back.
    pub async fn render(&self) -> Result<(HtmlDocument, UpdateOutcome)> {
        let mut doc = self.load().await?;
        let outcome = self.updater.update(&mut doc)?;
        Ok((doc, outcome))
    }

    /// Update the favicon unconditionally and save the file if it changed.
    pub async fn apply(&mut self) -> Result<UpdateOutcome> {
        let (doc, outcome) = self.render().await?;
        self.store(&doc).await?;
        Ok(outcome)
    }

    /// Reload the file and re-run the update if a qualifying change happened.
    ///
    /// Returns whether the file was rewritten.
    pub async fn refresh(&mut self) -> Result<bool> {
        let mut doc = self.load().await?;
        let resolver = self.updater.settings().resolver;
        let next = DocumentSnapshot::capture(&doc, &resolver)?;
        let batch = match &self.snapshot {
            Some(previous) => previous.diff(&next),
            None => vec![Mutation::TitleChanged],
        };
        self.snapshot = Some(next);

        if batch.is_empty() {
            return Ok(false);
        }
        log::debug!("{}: {:?}", self.path.display(), batch);

        {
            let mut watcher = ChangeWatcher::for_updater(&self.updater);
            watcher.dispatch(&mut doc, &batch);
        }

        self.store(&doc).await
    }

    async fn store(&mut self, doc: &HtmlDocument) -> Result<bool> {
        if doc.is_modified() {
            tokio::fs::write(&self.path, doc.as_str())
                .await
                .with_context(|| format!("Failed to write HTML file: {}", self.path.display()))?;
        }

        let resolver = self.updater.settings().resolver;
        self.snapshot = Some(DocumentSnapshot::capture(doc, &resolver)?);
        Ok(doc.is_modified())
    }
}

/// Resolves on Ctrl-C, or right away if the handler cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl-C: {}", e);
    }
}

/// Tint the session's file now and again after every qualifying change,
/// until `shutdown` resolves.
pub async fn watch_file<F>(mut session: FileSession, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let target = session
        .path()
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| anyhow!("{} does not name a file", session.path().display()))?;
    let dir = match session.path().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let EventKind::Create(_) | EventKind::Modify(_) = event.kind {
                    // editors often save by renaming a temp file over the target
                    if event
                        .paths
                        .iter()
                        .any(|path| path.file_name() == Some(target.as_os_str()))
                    {
                        let _ = tx.send(WatcherEvent::FileChanged);
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(WatcherEvent::WatcherError(e));
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch directory: {}", dir.display()))?;

    match session.apply().await {
        Ok(outcome) => log::info!("{}: {:?}", session.path().display(), outcome),
        Err(e) => log::warn!("Initial favicon update failed: {:#}", e),
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Stopping watch on {}", session.path().display());
                break;
            }
            event = rx.recv() => match event {
                None => break,
                Some(WatcherEvent::WatcherError(e)) => {
                    log::error!("File watcher error: {}", e);
                }
                Some(WatcherEvent::FileChanged) => {
                    tokio::time::sleep(DEBOUNCE).await;
                    while rx.try_recv().is_ok() {}

                    match session.refresh().await {
                        Ok(true) => log::info!("Favicon rewritten in {}", session.path().display()),
                        Ok(false) => {}
                        Err(e) => log::warn!("Favicon refresh failed: {:#}", e),
                    }
                }
            }
        }
    }

    drop(watcher);
    Ok(())
}
