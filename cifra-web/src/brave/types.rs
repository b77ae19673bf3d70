use serde::{Deserialize, Serialize};

/// Request parameters for Brave Web Search API.
#[derive(Debug, Clone, Serialize)]
pub struct WebSearchRequest {
    /// Query string
    #[serde(rename = "q")]
    pub query: String,

    /// Results per page (Brave caps this at 20)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Country code (ISO 3166-1 alpha-2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Search language (ISO 639-1, e.g., "pt")
    #[serde(rename = "search_lang", skip_serializing_if = "Option::is_none")]
    pub search_lang: Option<String>,

    /// Restrict which verticals are returned ("web,news,...")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_filter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchApiResponse {
    /// Always "search"
    #[serde(rename = "type", default)]
    pub r#type: String,

    #[serde(default)]
    pub query: Option<Query>,

    #[serde(default)]
    pub web: Option<Search>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub original: String,
    #[serde(default)]
    pub altered: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}
