//! DuckDuckGo HTML endpoint scraper.

use super::{SearchEngine, SearchHit, clean_title};
use async_trait::async_trait;
use cifra_http::{HttpClient, HttpError, RequestOpts};
use scraper::{Html, Selector};
use std::borrow::Cow;
use std::sync::LazyLock;
use url::Url;

static RESULT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("ddg selector"));

static DDG_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://duckduckgo.com/").expect("ddg base"));

pub struct DuckDuckGoHtml {
    http: HttpClient,
}

impl DuckDuckGoHtml {
    /// `endpoint` is the HTML search page, e.g. `https://html.duckduckgo.com/html/`.
    pub fn new(endpoint: &str) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(endpoint)?,
        })
    }

    pub fn with_client(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl SearchEngine for DuckDuckGoHtml {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        let html = self
            .http
            .get_text(
                "",
                RequestOpts {
                    query: Some(vec![("q", Cow::Borrowed(query))]),
                    ..Default::default()
                },
            )
            .await?;
        Ok(parse_results(&html))
    }
}

/// Result links in page order, with `uddg` redirects unwrapped.
pub fn parse_results(html: &str) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    doc.select(&RESULT_LINK)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let url = resolve_href(href)?;
            Some(SearchHit {
                title: clean_title(&a.text().collect::<String>()),
                url,
            })
        })
        .collect()
}

fn resolve_href(href: &str) -> Option<Url> {
    let url = DDG_BASE.join(href).ok()?;
    let is_redirect = url
        .host_str()
        .is_some_and(|h| h.ends_with("duckduckgo.com"))
        && url.path().starts_with("/l/");
    if !is_redirect {
        return Some(url);
    }
    url.query_pairs()
        .find(|(k, _)| k == "uddg")
        .and_then(|(_, target)| Url::parse(&target).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="results">
  <div class="result results_links web-result">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.cifraclub.com.br%2Foasis%2Fwonderwall%2F&amp;rut=abc">Wonderwall - Oasis - <b>Cifra</b> Club</a>
    </h2>
  </div>
  <div class="result results_links web-result">
    <h2 class="result__title">
      <a class="result__a" href="https://www.cifraclub.com.br/oasis/">Oasis - Cifra Club</a>
    </h2>
  </div>
  <div class="result"><a class="result__snippet" href="https://ignored.example/">x</a></div>
</div>"#;

    #[test]
    fn unwraps_redirects_and_keeps_order() {
        let hits = parse_results(PAGE);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Wonderwall - Oasis - Cifra Club");
        assert_eq!(
            hits[0].url.as_str(),
            "https://www.cifraclub.com.br/oasis/wonderwall/"
        );
        assert_eq!(hits[1].url.as_str(), "https://www.cifraclub.com.br/oasis/");
    }

    #[test]
    fn redirect_without_target_is_dropped() {
        let html = r#"<a class="result__a" href="//duckduckgo.com/l/?rut=abc">x</a>"#;
        assert!(parse_results(html).is_empty());
    }
}
