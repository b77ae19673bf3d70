//! Song metadata lookup (title, artist, key).
//!
//! Structural selectors first; the key falls back to a regex over the key
//! element's text. Nothing in here fails: absent fields keep their defaults.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::SongMetadata;

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1.t1, h2.t1, h3.t1, h4.t1, h5.t1, h6.t1").expect("title selector")
});
static ARTIST_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1.t3, h2.t3, h3.t3, h4.t3, h5.t3, h6.t3").expect("artist selector")
});
static KEY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#cifra_tom").expect("key selector"));
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("link selector"));
static KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-G][#b]?").expect("key regex"));

/// Read title, artist and key from a parsed page.
pub fn extract_metadata(doc: &Html) -> SongMetadata {
    let mut meta = SongMetadata::default();

    if let Some(title) = doc.select(&TITLE_SEL).next().and_then(non_empty_text) {
        meta.title = title;
    }
    if let Some(artist) = doc.select(&ARTIST_SEL).next().and_then(artist_text) {
        meta.artist = artist;
    }
    if let Some(key) = doc.select(&KEY_SEL).next().and_then(key_text) {
        meta.key = key;
    }

    tracing::debug!(
        title = %meta.title,
        artist = %meta.artist,
        key = %meta.key,
        "extract.metadata"
    );
    meta
}

/// Convenience wrapper for callers holding markup rather than a parsed document.
pub fn extract_metadata_from_markup(markup: &str) -> SongMetadata {
    extract_metadata(&Html::parse_document(markup))
}

fn artist_text(heading: ElementRef<'_>) -> Option<String> {
    match heading.select(&LINK_SEL).next() {
        Some(link) => non_empty_text(link),
        None => non_empty_text(heading),
    }
}

fn key_text(el: ElementRef<'_>) -> Option<String> {
    let from_link = el
        .select(&LINK_SEL)
        .next()
        .and_then(|link| find_key(&element_text(link)));
    from_link.or_else(|| find_key(&element_text(el)))
}

/// First `[A-G]` with an optional sharp/flat in `text`.
pub fn find_key(text: &str) -> Option<String> {
    KEY_RE.find(text).map(|m| m.as_str().to_string())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

// Header fields are single-line; collapse inner whitespace.
fn non_empty_text(el: ElementRef<'_>) -> Option<String> {
    let text = el
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() { None } else { Some(text) }
}
