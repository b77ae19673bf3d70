//! Multi-engine search for chord pages.
//!
//! Each [`SearchEngine`] returns raw hits for a `site:`-scoped query. The
//! [`SearchChain`] tries engines in order and keeps the first non-empty,
//! filtered, de-duplicated list.

pub mod bing;
pub mod duckduckgo;

use async_trait::async_trait;
use cifra_common::{CifraError, Result};
use std::collections::HashSet;
use std::time::Instant;
use url::Url;

/// Path segments marking a lyrics-only page.
const LYRICS_MARKERS: [&str; 2] = ["letra", "letras"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: Url,
}

#[async_trait]
pub trait SearchEngine: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>>;
}

/// Whether `url` is a chord page on `domain`: `/<artist>/<song>/`, not lyrics-only.
pub fn is_chord_page(url: &Url, domain: &str) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    let domain = domain.trim().trim_start_matches("www.").to_ascii_lowercase();
    if host != domain && !host.ends_with(&format!(".{domain}")) {
        return false;
    }
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    segments.len() >= 2
        && !segments
            .iter()
            .any(|seg| LYRICS_MARKERS.contains(&seg.to_ascii_lowercase().as_str()))
}

/// Identity of a page for de-duplication: host without `www.`, port, path
/// without trailing slash.
pub fn url_key(url: &Url) -> String {
    let host = url
        .host_str()
        .unwrap_or_default()
        .trim_start_matches("www.")
        .to_ascii_lowercase();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!("{host}{port}{}", url.path().trim_end_matches('/'))
}

fn without_query(mut url: Url) -> Url {
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Collapse whitespace in scraped link text.
pub(crate) fn clean_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct SearchChain {
    engines: Vec<Box<dyn SearchEngine>>,
    target_domain: String,
    max_results: usize,
}

impl SearchChain {
    pub fn new(target_domain: impl Into<String>, max_results: usize) -> Self {
        Self {
            engines: Vec::new(),
            target_domain: target_domain.into(),
            max_results,
        }
    }

    pub fn with_engine(mut self, engine: impl SearchEngine + 'static) -> Self {
        self.engines.push(Box::new(engine));
        self
    }

    pub fn push_engine(&mut self, engine: Box<dyn SearchEngine>) {
        self.engines.push(engine);
    }

    pub fn engine_names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    pub fn target_domain(&self) -> &str {
        &self.target_domain
    }

    /// The query actually sent to engines.
    pub fn scoped_query(&self, query: &str) -> String {
        format!("{} site:{}", query.trim(), self.target_domain)
    }

    /// Keep chord pages only, strip query strings, de-duplicate, cap the count.
    pub fn filter_hits(&self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        let mut seen = HashSet::new();
        hits.into_iter()
            .filter(|h| is_chord_page(&h.url, &self.target_domain))
            .map(|h| SearchHit {
                title: h.title,
                url: without_query(h.url),
            })
            .filter(|h| seen.insert(url_key(&h.url)))
            .take(self.max_results)
            .collect()
    }

    /// Ordered chord-page candidates for `query`.
    ///
    /// Failing and empty engines are skipped. Errors only when every engine
    /// failed; engines that answered without chord pages yield an empty list.
    pub async fn resolve_url(&self, query: &str) -> Result<Vec<SearchHit>> {
        if self.engines.is_empty() {
            return Err(CifraError::Config("no search engines configured".into()));
        }
        let scoped = self.scoped_query(query);
        let mut failures = Vec::new();

        for engine in &self.engines {
            let started = Instant::now();
            match engine.search(&scoped).await {
                Err(e) => {
                    tracing::warn!(
                        engine = engine.name(),
                        query = %scoped,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        error = %e,
                        "search.engine.error"
                    );
                    failures.push(format!("{}: {e}", engine.name()));
                }
                Ok(raw) => {
                    let raw_count = raw.len();
                    let hits = self.filter_hits(raw);
                    if hits.is_empty() {
                        tracing::info!(
                            engine = engine.name(),
                            query = %scoped,
                            raw_count,
                            "search.engine.empty"
                        );
                        continue;
                    }
                    tracing::info!(
                        engine = engine.name(),
                        query = %scoped,
                        raw_count,
                        hit_count = hits.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "search.resolved"
                    );
                    return Ok(hits);
                }
            }
        }

        if failures.len() == self.engines.len() {
            return Err(CifraError::SourceUnavailable(format!(
                "all search engines failed ({})",
                failures.join("; ")
            )));
        }
        Ok(Vec::new())
    }
}
