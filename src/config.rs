//! Configuration management for favicon-tint.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project / user configuration files (`.favicon-tint.toml`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::color::{ColorOptions, HashMode, HslMode};
use crate::favicon::{TextSource, UpdaterSettings};

/// Name of the project configuration file looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".favicon-tint.toml";

/// Command-line arguments for favicon-tint
#[derive(Debug, Parser)]
#[command(name = "favicon-tint")]
#[command(about = "Tint favicons with a color derived from page text")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Page text the color is derived from
    #[arg(long, global = true, value_enum)]
    pub source: Option<TextSource>,

    #[arg(long, global = true, value_enum, help = "Hash arithmetic (wrapping, browser)")]
    pub hash: Option<HashMode>,

    #[arg(long, global = true, value_enum, help = "HSL reduction (raw, normalized)")]
    pub hsl: Option<HslMode>,

    /// URL reported for HTML files instead of their file:// URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Configuration file to use instead of the discovered one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the color derived from TEXT
    Color {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the favicon SVG for TEXT
    Svg { text: String },
    /// Print the favicon data URI for TEXT
    Uri { text: String },
    /// Tint the favicon of an HTML file
    Apply {
        file: PathBuf,
        /// Print the rewritten HTML instead of saving it
        #[arg(long, conflicts_with = "watch")]
        stdout: bool,
        /// Keep the favicon up to date while the file changes
        #[arg(long)]
        watch: bool,
    },
}

/// Settings read from a TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<TextSource>,
    pub hash: Option<HashMode>,
    pub hsl: Option<HslMode>,
    pub url: Option<String>,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse favicon-tint configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Find a configuration file: the project file in `cwd` first, then the
    /// user-global one.
    pub fn discover(cwd: &Path) -> Option<PathBuf> {
        let project = cwd.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Some(project);
        }

        dirs::config_dir()
            .map(|dir| dir.join("favicon-tint").join("config.toml"))
            .filter(|path| path.is_file())
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,
    pub settings: UpdaterSettings,
    /// URL override for HTML files, normalized
    pub url: Option<String>,
    pub log_level: String,
    /// Configuration file that contributed to this config, if any
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments and discovered files
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments, discovering the config
    /// file relative to the working directory.
    pub fn from_args(args: Args) -> Result<Self> {
        let path = match &args.config {
            Some(path) => Some(path.clone()),
            None => FileConfig::discover(&std::env::current_dir()?),
        };

        let file = match &path {
            Some(path) => Some((path.clone(), FileConfig::load(path)?)),
            None => None,
        };

        Self::merge(args, file)
    }

    /// Merge arguments over an already loaded file configuration.
    ///
    /// Command-line values win over file values, which win over defaults.
    pub fn merge(args: Args, file: Option<(PathBuf, FileConfig)>) -> Result<Self> {
        let (config_path, file) = match file {
            Some((path, file)) => (Some(path), file),
            None => (None, FileConfig::default()),
        };

        let settings = UpdaterSettings {
            source: args.source.or(file.source).unwrap_or_default(),
            color: ColorOptions {
                hash: args.hash.or(file.hash).unwrap_or_default(),
                hsl: args.hsl.or(file.hsl).unwrap_or_default(),
            },
            ..UpdaterSettings::default()
        };

        let url = args
            .url
            .or(file.url)
            .map(|raw| normalize_url(&raw))
            .transpose()?;

        Ok(Config {
            command: args.command,
            settings,
            url,
            log_level: args.log_level,
            config_path,
        })
    }

    pub fn has_config_file(&self) -> bool {
        self.config_path.is_some()
    }
}

/// Serialize a URL the way a browser reports `document.URL`.
fn normalize_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw).with_context(|| format!("Invalid URL: {}", raw))?;
    Ok(parsed.into())
}
