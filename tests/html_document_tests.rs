//! Updating favicons in HTML markup
use favicon_tint::document::{FaviconDocument, HtmlDocument, ResolverConfig};
use favicon_tint::favicon::{FaviconUpdater, TextSource, UpdateOutcome, UpdaterSettings};
use favicon_tint::update_favicon;

const BOARD: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Board &ndash; Jira</title>
    <link rel="stylesheet" href="/app.css">
  </head>
  <body>
    <main>board</main>
  </body>
</html>
"#;

fn title_updater() -> FaviconUpdater {
    FaviconUpdater::new(UpdaterSettings {
        source: TextSource::Title,
        ..UpdaterSettings::default()
    })
}

#[test]
fn creates_icon_link_in_head() {
    let mut doc = HtmlDocument::new(BOARD, "https://acme.example/board");
    let outcome = update_favicon(&mut doc).expect("update");

    let expected = FaviconUpdater::default().icon_uri("https://acme.example/board");
    assert_eq!(outcome, UpdateOutcome::Written { href: expected.clone() });

    let link = doc
        .find_link(ResolverConfig::DEFAULT.rel_fragment)
        .unwrap()
        .expect("icon link");
    assert_eq!(doc.rel(link).unwrap(), "icon");
    assert_eq!(doc.href(link).unwrap(), Some(expected));
    assert!(doc.as_str().contains("<main>board</main>"));
}

#[test]
fn second_update_leaves_markup_alone() {
    let mut doc = HtmlDocument::new(BOARD, "https://acme.example/board");
    update_favicon(&mut doc).unwrap();
    let first = doc.as_str().to_string();

    let mut again = HtmlDocument::new(first.as_str(), "https://acme.example/board");
    assert_eq!(update_favicon(&mut again).unwrap(), UpdateOutcome::Unchanged);
    assert!(!again.is_modified());
    assert_eq!(again.as_str(), first);
}

#[test]
fn title_source_uses_decoded_title() {
    let mut doc = HtmlDocument::new(BOARD, "");
    assert_eq!(doc.title().unwrap(), "Board \u{2013} Jira");

    let updater = title_updater();
    updater.update(&mut doc).unwrap();

    let link = doc.find_link("icon").unwrap().unwrap();
    assert_eq!(
        doc.href(link).unwrap(),
        Some(updater.icon_uri("Board \u{2013} Jira"))
    );
}

#[test]
fn existing_shortcut_icon_is_reused() {
    let page = BOARD.replace(
        r#"<link rel="stylesheet" href="/app.css">"#,
        r#"<link rel="shortcut icon" href="/favicon.ico"><link rel="icon" href="/other.png">"#,
    );
    let mut doc = HtmlDocument::new(page, "https://acme.example/");
    update_favicon(&mut doc).unwrap();

    assert!(!doc.as_str().contains("/favicon.ico"));
    assert!(doc.as_str().contains(r#"href="/other.png""#));
    assert_eq!(doc.as_str().matches("<link").count(), 2);
}

#[test]
fn markup_without_head_is_an_error() {
    let mut doc = HtmlDocument::new("<p>fragment</p>", "https://acme.example/");
    let err = update_favicon(&mut doc).unwrap_err();
    assert!(format!("{:#}", err).contains("no <head>"));
}

#[test]
fn document_without_head_tag_is_tinted() {
    let mut doc = HtmlDocument::new(
        "<!doctype html><title>Board</title><p>x</p>",
        "https://acme.example/",
    );
    let outcome = title_updater().update(&mut doc).expect("update");

    let href = title_updater().icon_uri("Board");
    assert_eq!(outcome, UpdateOutcome::Written { href: href.clone() });
    let link_at = doc.as_str().find(&href).unwrap();
    assert!(link_at < doc.as_str().find("<title>").unwrap());
    assert!(doc.as_str().ends_with("<title>Board</title><p>x</p>"));
}
