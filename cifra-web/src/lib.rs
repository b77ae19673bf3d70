//! Web discovery and acquisition utilities.
//!
//! - Markup sources (`source`): direct HTTP fetch, WebDriver browser session,
//!   and search-resolved lookups behind one [`MarkupSource`] trait
//! - Search engines (`search`): DuckDuckGo and Bing HTML scrapers plus the
//!   ordered fallback [`SearchChain`]
//! - Brave Search API client (`brave`)

pub mod brave;
pub mod search;
pub mod source;

pub use brave::BraveApi;
pub use search::{
    SearchChain, SearchEngine, SearchHit, bing::BingHtml, duckduckgo::DuckDuckGoHtml,
    is_chord_page, url_key,
};
pub use source::{
    BrowserSession, DirectFetch, FetchedPage, MarkupSource, SearchResolved, SongRequest,
    normalize_url,
};
