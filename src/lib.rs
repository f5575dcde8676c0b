//! favicon-tint
//!
//! Recolors a page's favicon with a tint derived from a hash of the page URL
//! or title, and keeps it up to date as the page changes.
//!
//! This library provides:
//! - Deterministic text-to-color derivation
//! - The SVG favicon template and data URI encoding
//! - Document hosts (in-memory and HTML markup) behind one trait
//! - Change watching for in-memory documents and HTML files

pub mod color;
pub mod config;
pub mod document;
pub mod favicon;
pub mod svg;
pub mod watch;

pub use color::{ColorOptions, ColorResult, HashMode, HslMode, SvgColor, derive_color};
pub use config::Config;
pub use document::{FaviconDocument, HtmlDocument, MemoryDocument, resolve_favicon_link};
pub use favicon::{FaviconUpdater, TextSource, UpdateOutcome, update_favicon};
pub use svg::{SvgTemplate, render_favicon_svg};
pub use watch::{ChangeWatcher, WatchScope};
