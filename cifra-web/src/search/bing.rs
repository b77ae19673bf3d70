//! Bing HTML results scraper.

use super::{SearchEngine, SearchHit, clean_title};
use async_trait::async_trait;
use cifra_http::{HttpClient, HttpError, RequestOpts};
use scraper::{Html, Selector};
use std::borrow::Cow;
use std::sync::LazyLock;
use url::Url;

static RESULT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.b_algo h2 a").expect("bing selector"));

pub struct BingHtml {
    http: HttpClient,
}

impl BingHtml {
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
impl SearchEngine for BingHtml {
    fn name(&self) -> &'static str {
        "bing"
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        let html = self
            .http
            .get_text(
                "",
                RequestOpts {
                    query: Some(vec![
                        ("q", Cow::Borrowed(query)),
                        ("setlang", Cow::Borrowed("pt-BR")),
                    ]),
                    ..Default::default()
                },
            )
            .await?;
        Ok(parse_results(&html))
    }
}

pub fn parse_results(html: &str) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    doc.select(&RESULT_LINK)
        .filter_map(|a| {
            let url = Url::parse(a.value().attr("href")?).ok()?;
            Some(SearchHit {
                title: clean_title(&a.text().collect::<String>()),
                url,
            })
        })
        .collect()
}
