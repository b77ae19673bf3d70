//! Explicit per-user state: current URL, last extraction, cached markup, status.

use std::path::PathBuf;

use crate::clean::CleanOptions;
use crate::error::ExtractError;
use crate::pipeline::{Extraction, extract};
use crate::sink::Sink;
use crate::types::{ChordSheet, RawMarkup, SongMetadata};

const READY: &str = "Ready";

#[derive(Debug, Clone)]
pub struct Session {
    options: CleanOptions,
    current_url: Option<String>,
    markup: Option<RawMarkup>,
    last: Option<Extraction>,
    status: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CleanOptions::default())
    }
}

impl Session {
    pub fn new(options: CleanOptions) -> Self {
        Self {
            options,
            current_url: None,
            markup: None,
            last: None,
            status: READY.to_string(),
        }
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: CleanOptions) {
        self.options = options;
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last(&self) -> Option<&Extraction> {
        self.last.as_ref()
    }

    pub fn sheet(&self) -> Option<&ChordSheet> {
        self.last.as_ref().and_then(Extraction::sheet)
    }

    /// Metadata of the last extraction, defaults before the first one.
    pub fn metadata(&self) -> SongMetadata {
        self.last
            .as_ref()
            .map(|ex| ex.metadata.clone())
            .unwrap_or_default()
    }

    /// Run the pipeline on freshly fetched markup and keep it for re-extraction.
    pub fn ingest(&mut self, url: &str, markup: RawMarkup) -> &Extraction {
        let extraction = extract(&markup, url, &self.options);
        self.status = extraction.status_message();
        self.current_url = Some(url.to_string());
        self.markup = Some(markup);
        self.last.insert(extraction)
    }

    /// Re-run the pipeline on the cached markup, e.g. after changing options.
    pub fn reextract(&mut self) -> Option<&Extraction> {
        let markup = self.markup.as_ref()?;
        let url = self.current_url.as_deref().unwrap_or_default();
        let extraction = extract(markup, url, &self.options);
        self.status = extraction.status_message();
        Some(self.last.insert(extraction))
    }

    /// Record an acquisition failure; previous results stay untouched.
    pub fn fail(&mut self, err: &ExtractError) {
        self.status = err.user_message();
    }

    /// Persist the current sheet. On failure the sheet stays in the session.
    pub fn save(&mut self, sink: &dyn Sink) -> Result<PathBuf, ExtractError> {
        let result = match self.last.as_ref() {
            None => Err(ExtractError::NothingExtracted),
            Some(ex) => match (ex.sheet(), ex.error()) {
                (Some(sheet), _) => sink.persist(sheet).map_err(ExtractError::from),
                (None, Some(err)) => Err(err),
                (None, None) => Err(ExtractError::NothingExtracted),
            },
        };
        self.status = match &result {
            Ok(path) => format!("Saved {}", path.display()),
            Err(err) => err.user_message(),
        };
        result
    }

    pub fn clear(&mut self) {
        self.current_url = None;
        self.markup = None;
        self.last = None;
        self.status = READY.to_string();
    }
}
