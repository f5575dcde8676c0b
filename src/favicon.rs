//! Favicon update orchestration.
//!
//! Ties the pieces together: resolve the icon link, derive a color from the
//! observed text, render the SVG, encode it as a data URI and write it back
//! only when it differs from the current href.

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::color::{ColorOptions, derive_color_with};
use crate::document::{FaviconDocument, ResolverConfig, resolve_favicon_link};
use crate::svg::SvgTemplate;

pub const DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Which page text the color is derived from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    /// The full document URL
    #[default]
    Url,
    /// The document title
    Title,
}

/// Turns the rendered SVG into the payload of a data URI.
pub trait Encoder {
    fn encode(&self, data: &[u8]) -> String;
}

/// Standard base64 with padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Encoder;

impl Encoder for Base64Encoder {
    fn encode(&self, data: &[u8]) -> String {
        STANDARD.encode(data)
    }
}

/// Build a `data:image/svg+xml;base64,...` URI for `svg`.
pub fn svg_data_uri(svg: &str, encoder: &dyn Encoder) -> String {
    format!("{}{}", DATA_URI_PREFIX, encoder.encode(svg.as_bytes()))
}

/// Everything that shapes the generated icon.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdaterSettings {
    pub source: TextSource,
    pub color: ColorOptions,
    pub template: SvgTemplate,
    pub resolver: ResolverConfig,
}

/// What an update did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Written { href: String },
    Unchanged,
}

impl UpdateOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, UpdateOutcome::Written { .. })
    }
}

/// Recomputes a document's favicon.
#[derive(Debug, Clone)]
pub struct FaviconUpdater<E = Base64Encoder> {
    settings: UpdaterSettings,
    encoder: E,
}

impl FaviconUpdater {
    pub fn new(settings: UpdaterSettings) -> Self {
        Self {
            settings,
            encoder: Base64Encoder,
        }
    }
}

impl Default for FaviconUpdater {
    fn default() -> Self {
        Self::new(UpdaterSettings::default())
    }
}

impl<E: Encoder> FaviconUpdater<E> {
    pub fn with_encoder(settings: UpdaterSettings, encoder: E) -> Self {
        Self { settings, encoder }
    }

    pub fn settings(&self) -> &UpdaterSettings {
        &self.settings
    }

    /// The data URI the icon for `text` encodes to.
    pub fn icon_uri(&self, text: &str) -> String {
        let color = derive_color_with(text, self.settings.color);
        let svg = self.settings.template.render_color(&color);
        svg_data_uri(&svg, &self.encoder)
    }

    /// Read the text the color is derived from.
    pub fn observed_text<D>(&self, doc: &D) -> Result<String>
    where
        D: FaviconDocument + ?Sized,
    {
        match self.settings.source {
            TextSource::Url => Ok(doc.url()),
            TextSource::Title => doc.title().context("Failed to read document title"),
        }
    }

    /// Recompute the favicon and write it if it changed.
    pub fn update<D>(&self, doc: &mut D) -> Result<UpdateOutcome>
    where
        D: FaviconDocument + ?Sized,
    {
        let link = resolve_favicon_link(doc, &self.settings.resolver)
            .context("Failed to resolve favicon link")?;
        let text = self.observed_text(&*doc)?;
        let href = self.icon_uri(&text);

        let current = doc.href(link).context("Failed to read favicon href")?;
        if current.as_deref() == Some(href.as_str()) {
            log::debug!("favicon already up to date for {:?}", text);
            return Ok(UpdateOutcome::Unchanged);
        }

        doc.set_href(link, &href)
            .context("Failed to write favicon href")?;
        log::info!("favicon updated for {:?}", text);
        Ok(UpdateOutcome::Written { href })
    }
}

/// Update `doc` with the default settings.
pub fn update_favicon<D>(doc: &mut D) -> Result<UpdateOutcome>
where
    D: FaviconDocument + ?Sized,
{
    FaviconUpdater::default().update(doc)
}
