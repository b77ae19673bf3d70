use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";
pub const NO_KEY: &str = "N/A";

/// Raw page markup as handed over by a markup source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMarkup(String);

impl RawMarkup {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for RawMarkup {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RawMarkup {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Title, artist and key of a song. Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub title: String,
    pub artist: String,
    pub key: String,
}

impl Default for SongMetadata {
    fn default() -> Self {
        Self {
            title: UNKNOWN.to_string(),
            artist: UNKNOWN.to_string(),
            key: NO_KEY.to_string(),
        }
    }
}

/// A cleaned chord sheet ready to be displayed or handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordSheet {
    pub metadata: SongMetadata,
    pub source_url: String,
    pub content: String,
    pub extracted_at: DateTime<Utc>,
}

impl ChordSheet {
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn artist(&self) -> &str {
        &self.metadata.artist
    }

    pub fn key(&self) -> &str {
        &self.metadata.key
    }
}
