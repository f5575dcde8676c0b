//! Tests for merging command-line and file configuration
use std::path::PathBuf;

use clap::Parser;
use favicon_tint::color::{HashMode, HslMode};
use favicon_tint::config::{Args, Command, Config, FileConfig};
use favicon_tint::favicon::TextSource;

fn args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).expect("parse args")
}

#[test]
fn defaults_match_the_browser_script() {
    let config = Config::merge(args(&["favicon-tint", "uri", "hello"]), None).unwrap();

    assert_eq!(config.settings.source, TextSource::Url);
    assert_eq!(config.settings.color.hash, HashMode::Wrapping);
    assert_eq!(config.settings.color.hsl, HslMode::Raw);
    assert_eq!(config.log_level, "info");
    assert!(!config.has_config_file());
    assert_eq!(
        config.command,
        Command::Uri {
            text: "hello".to_string()
        }
    );
}

#[test]
fn file_values_fill_in_missing_arguments() {
    let file = FileConfig::parse(
        r#"
source = "title"
hsl = "normalized"
url = "https://Acme.example"
"#,
    )
    .unwrap();

    let config = Config::merge(
        args(&["favicon-tint", "apply", "index.html"]),
        Some((PathBuf::from(".favicon-tint.toml"), file)),
    )
    .unwrap();

    assert!(config.has_config_file());
    assert_eq!(config.settings.source, TextSource::Title);
    assert_eq!(config.settings.color.hsl, HslMode::Normalized);
    assert_eq!(config.url.as_deref(), Some("https://acme.example/"));
}

#[test]
fn arguments_override_file_values() {
    let file = FileConfig::parse("source = \"title\"\nhash = \"wrapping\"\n").unwrap();
    let config = Config::merge(
        args(&[
            "favicon-tint",
            "color",
            "x",
            "--source",
            "url",
            "--hash",
            "browser",
        ]),
        Some((PathBuf::from("config.toml"), file)),
    )
    .unwrap();

    assert_eq!(config.settings.source, TextSource::Url);
    assert_eq!(config.settings.color.hash, HashMode::Browser);
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(FileConfig::parse("colour = \"red\"\n").is_err());
}

#[test]
fn invalid_url_is_rejected() {
    let result = Config::merge(
        args(&["favicon-tint", "apply", "index.html", "--url", "::nope"]),
        None,
    );
    assert!(result.is_err());
}

#[test]
fn stdout_and_watch_conflict() {
    assert!(
        Args::try_parse_from(["favicon-tint", "apply", "a.html", "--stdout", "--watch"]).is_err()
    );
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tint.toml");
    std::fs::write(&path, "source = \"title\"\n").unwrap();

    let config = Config::from_args(args(&[
        "favicon-tint",
        "svg",
        "x",
        "--config",
        path.to_str().unwrap(),
    ]))
    .unwrap();

    assert_eq!(config.config_path, Some(path));
    assert_eq!(config.settings.source, TextSource::Title);
}
