use super::types::{WebSearchApiResponse, WebSearchRequest};
use crate::search::{SearchEngine, SearchHit, clean_title};
use anyhow::{Context, Result};
use async_trait::async_trait;
use cifra_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::header::{HeaderName, HeaderValue};
use std::borrow::Cow;
use std::time::Instant;
use url::Url;

const BRAVE_MAX_COUNT: u32 = 20;

/// Minimal client for Brave Search API (web vertical).
#[derive(Clone)]
pub struct BraveApi {
    http: HttpClient,
    token: String,
}

impl BraveApi {
    /// `endpoint` is the full web search URL, e.g.
    /// `https://api.search.brave.com/res/v1/web/search`.
    pub fn new(endpoint: &str, subscription_token: impl Into<String>) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(endpoint)?,
            token: subscription_token.into(),
        })
    }

    pub async fn search_page(&self, req: &WebSearchRequest) -> Result<WebSearchApiResponse> {
        let mut params: Vec<(&str, Cow<'_, str>)> = Vec::with_capacity(5);
        params.push(("q", req.query.as_str().into()));
        if let Some(v) = req.count {
            params.push(("count", v.min(BRAVE_MAX_COUNT).to_string().into()));
        }
        if let Some(v) = req.country.as_deref().filter(|v| !v.is_empty()) {
            params.push(("country", v.into()));
        }
        if let Some(v) = req.search_lang.as_deref().filter(|v| !v.is_empty()) {
            params.push(("search_lang", v.into()));
        }
        if let Some(v) = req.result_filter.as_deref().filter(|v| !v.is_empty()) {
            params.push(("result_filter", v.into()));
        }

        let started = Instant::now();
        let resp: WebSearchApiResponse = self
            .http
            .get_json(
                "",
                RequestOpts {
                    auth: Some(Auth::Header {
                        name: HeaderName::from_static("x-subscription-token"),
                        value: HeaderValue::from_str(&self.token)
                            .map_err(|e| HttpError::Build(e.to_string()))?,
                    }),
                    query: Some(params),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .context("brave search request failed")?;
        tracing::debug!(
            target: "web.brave",
            query = %req.query,
            elapsed_ms = started.elapsed().as_millis() as u64,
            results = resp.web.as_ref().map(|w| w.results.len()).unwrap_or(0),
            "brave.search_page.success"
        );
        Ok(resp)
    }
}

/// Web results in ranking order; unparsable URLs are skipped.
pub fn collect_hits(resp: &WebSearchApiResponse) -> Vec<SearchHit> {
    resp.web
        .iter()
        .flat_map(|w| w.results.iter())
        .filter_map(|r| {
            Some(SearchHit {
                title: clean_title(&r.title),
                url: Url::parse(&r.url).ok()?,
            })
        })
        .collect()
}

#[async_trait]
impl SearchEngine for BraveApi {
    fn name(&self) -> &'static str {
        "brave"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let req = WebSearchRequest {
            query: query.to_string(),
            count: Some(BRAVE_MAX_COUNT),
            country: Some("BR".into()),
            search_lang: Some("pt-br".into()),
            result_filter: Some("web".into()),
        };
        let resp = self.search_page(&req).await?;
        Ok(collect_hits(&resp))
    }
}
