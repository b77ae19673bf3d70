//! Markup sources: interchangeable ways to obtain a chord page's markup.
//!
//! - [`DirectFetch`]: plain HTTP GET
//! - [`BrowserSession`]: a WebDriver-controlled browser the user may also drive
//! - [`SearchResolved`]: free-text query resolved through a [`SearchChain`],
//!   then delegated to an inner source

use async_trait::async_trait;
use cifra_common::{CifraError, Result};
use cifra_drivers::{CifraDriver, CifraPage, DriverOptions};
use cifra_extract::RawMarkup;
use cifra_http::{HttpClient, RequestOpts};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use crate::search::{SearchChain, SearchHit};

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongRequest {
    Url(Url),
    Query(String),
}

impl SongRequest {
    /// Treat input that looks like an address as a URL, anything else as a query.
    ///
    /// ```
    /// use cifra_web::SongRequest;
    ///
    /// assert!(matches!(SongRequest::parse("cifraclub.com.br/oasis/wonderwall"), SongRequest::Url(_)));
    /// assert!(matches!(SongRequest::parse("wonderwall oasis"), SongRequest::Query(_)));
    /// ```
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let looks_like_url = trimmed.starts_with("http://")
            || trimmed.starts_with("https://")
            || (!trimmed.contains(char::is_whitespace)
                && trimmed.split('/').next().is_some_and(looks_like_host));
        match looks_like_url.then(|| normalize_url(trimmed)) {
            Some(Ok(url)) => SongRequest::Url(url),
            _ => SongRequest::Query(trimmed.to_string()),
        }
    }
}

/// `label.label...tld` with no empty label and an alphabetic top-level label.
/// Band names such as `P.O.D.` or `t.A.T.u.` fail this and stay queries.
fn looks_like_host(host: &str) -> bool {
    let host = host.split(':').next().unwrap_or_default();
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return false;
    }
    let tld = labels[labels.len() - 1];
    let valid_labels = labels
        .iter()
        .all(|l| l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    valid_labels && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

impl fmt::Display for SongRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongRequest::Url(u) => write!(f, "{u}"),
            SongRequest::Query(q) => write!(f, "{q:?}"),
        }
    }
}

/// Markup as loaded, with the URL it finally came from.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub markup: RawMarkup,
}

#[async_trait]
pub trait MarkupSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn acquire(&self, request: &SongRequest) -> Result<FetchedPage>;
}

#[async_trait]
impl<T: MarkupSource + ?Sized> MarkupSource for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn acquire(&self, request: &SongRequest) -> Result<FetchedPage> {
        (**self).acquire(request).await
    }
}

#[async_trait]
impl<T: MarkupSource + ?Sized> MarkupSource for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn acquire(&self, request: &SongRequest) -> Result<FetchedPage> {
        (**self).acquire(request).await
    }
}

/// Trim and prepend `https://` when no scheme is given.
///
/// ```
/// use cifra_web::normalize_url;
///
/// let url = normalize_url(" www.cifraclub.com.br/oasis/wonderwall/ ").unwrap();
/// assert_eq!(url.as_str(), "https://www.cifraclub.com.br/oasis/wonderwall/");
/// ```
pub fn normalize_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CifraError::Unsupported("empty URL".into()));
    }
    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    Url::parse(&with_scheme)
        .map_err(|e| CifraError::Unsupported(format!("invalid URL {trimmed:?}: {e}")))
}

// ==============================
// Direct HTTP fetch
// ==============================

pub struct DirectFetch {
    http: HttpClient,
}

impl DirectFetch {
    pub fn new(timeout: Duration, retries: usize, user_agent: Option<&str>) -> Result<Self> {
        // Requests are always absolute; the base only anchors the client.
        let base = "https://localhost/";
        let http = match user_agent {
            Some(ua) => HttpClient::with_user_agent(base, ua),
            None => HttpClient::new(base),
        }
        .map_err(|e| CifraError::Config(e.to_string()))?
        .with_timeout(timeout)
        .with_retries(retries);
        Ok(Self { http })
    }
}

#[async_trait]
impl MarkupSource for DirectFetch {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn acquire(&self, request: &SongRequest) -> Result<FetchedPage> {
        let url = match request {
            SongRequest::Url(url) => url,
            SongRequest::Query(q) => {
                return Err(CifraError::Unsupported(format!(
                    "direct fetch needs a URL, got query {q:?}"
                )));
            }
        };
        let body = self
            .http
            .get_text(url.as_str(), RequestOpts::absolute())
            .await
            .map_err(|e| CifraError::SourceUnavailable(format!("{url}: {e}")))?;
        tracing::info!(source = "direct", %url, bytes = body.len(), "source.acquired");
        Ok(FetchedPage {
            url: url.to_string(),
            markup: RawMarkup::new(body),
        })
    }
}

// ==============================
// Browser session
// ==============================

/// A lazily started browser. The user may navigate it by hand; [`current_page`]
/// reads whatever it shows.
///
/// [`current_page`]: BrowserSession::current_page
pub struct BrowserSession {
    opts: DriverOptions,
    driver: Mutex<Option<CifraDriver>>,
}

impl BrowserSession {
    pub fn new(opts: DriverOptions) -> Self {
        Self {
            opts,
            driver: Mutex::new(None),
        }
    }

    async fn page(&self) -> Result<CifraPage> {
        let mut slot = self.driver.lock().await;
        if let Some(driver) = slot.as_ref() {
            return Ok(driver.page());
        }
        let driver = CifraDriver::new(self.opts.clone()).await?;
        let page = driver.page();
        *slot = Some(driver);
        Ok(page)
    }

    async fn snapshot(page: &CifraPage) -> Result<FetchedPage> {
        let url = page.get_url().await?;
        let markup = page.get_content().await?;
        tracing::info!(source = "browser", %url, bytes = markup.len(), "source.acquired");
        Ok(FetchedPage {
            url,
            markup: RawMarkup::new(markup),
        })
    }

    /// Markup of whatever page the browser currently shows.
    pub async fn current_page(&self) -> Result<FetchedPage> {
        let page = self.page().await?;
        Self::snapshot(&page).await
    }

    pub async fn back(&self) -> Result<()> {
        Ok(self.page().await?.back().await?)
    }

    pub async fn forward(&self) -> Result<()> {
        Ok(self.page().await?.forward().await?)
    }

    pub async fn reload(&self) -> Result<()> {
        Ok(self.page().await?.refresh().await?)
    }

    pub async fn is_open(&self) -> bool {
        self.driver.lock().await.is_some()
    }

    /// End the browser session; a later request starts a new one.
    pub async fn close(&self) -> Result<()> {
        if let Some(driver) = self.driver.lock().await.take() {
            driver.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MarkupSource for BrowserSession {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn acquire(&self, request: &SongRequest) -> Result<FetchedPage> {
        let SongRequest::Url(url) = request else {
            return Err(CifraError::Unsupported(format!(
                "browser session needs a URL, got query {request}"
            )));
        };
        let page = self.page().await?;
        page.goto(url.as_str()).await?;
        Self::snapshot(&page).await
    }
}

// ==============================
// Search-resolved
// ==============================

/// Resolves queries through a [`SearchChain`] and fetches the top candidate
/// with `inner`. URL requests go straight to `inner`.
pub struct SearchResolved<S> {
    chain: SearchChain,
    inner: S,
}

impl<S: MarkupSource> SearchResolved<S> {
    pub fn new(chain: SearchChain, inner: S) -> Self {
        Self { chain, inner }
    }

    pub fn chain(&self) -> &SearchChain {
        &self.chain
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub async fn candidates(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.chain.resolve_url(query).await
    }

    /// Fetch the `index`-th (zero-based) candidate for `query`.
    pub async fn acquire_nth(&self, query: &str, index: usize) -> Result<FetchedPage> {
        let hits = self.candidates(query).await?;
        let count = hits.len();
        let hit = hits.into_iter().nth(index).ok_or_else(|| {
            if count == 0 {
                CifraError::NoResults(query.to_string())
            } else {
                CifraError::Unsupported(format!(
                    "candidate {} requested but only {count} found",
                    index + 1
                ))
            }
        })?;
        tracing::info!(query, pick = index + 1, url = %hit.url, title = %hit.title, "source.search.pick");
        self.inner.acquire(&SongRequest::Url(hit.url)).await
    }
}

#[async_trait]
impl<S: MarkupSource> MarkupSource for SearchResolved<S> {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn acquire(&self, request: &SongRequest) -> Result<FetchedPage> {
        match request {
            SongRequest::Url(_) => self.inner.acquire(request).await,
            SongRequest::Query(q) => self.acquire_nth(q, 0).await,
        }
    }
}
