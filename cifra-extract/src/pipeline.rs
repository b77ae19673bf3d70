use chrono::{DateTime, Utc};
use scraper::Html;

use crate::clean::{CleanOptions, clean_chord_text};
use crate::error::ExtractError;
use crate::locator::{LocateStrategy, locate_chord_block};
use crate::metadata::extract_metadata;
use crate::types::{ChordSheet, RawMarkup, SongMetadata};

/// What the chord container lookup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOutcome {
    Sheet(ChordSheet),
    NotFound,
    Empty { strategy: LocateStrategy },
}

/// Result of one pipeline run. Metadata is reported whatever the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub metadata: SongMetadata,
    pub source_url: String,
    pub outcome: ContentOutcome,
}

impl Extraction {
    pub fn sheet(&self) -> Option<&ChordSheet> {
        match &self.outcome {
            ContentOutcome::Sheet(sheet) => Some(sheet),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<ExtractError> {
        match self.outcome {
            ContentOutcome::Sheet(_) => None,
            ContentOutcome::NotFound => Some(ExtractError::ChordBlockNotFound),
            ContentOutcome::Empty { .. } => Some(ExtractError::EmptyContent),
        }
    }

    pub fn into_sheet(self) -> Result<ChordSheet, ExtractError> {
        match self.outcome {
            ContentOutcome::Sheet(sheet) => Ok(sheet),
            ContentOutcome::NotFound => Err(ExtractError::ChordBlockNotFound),
            ContentOutcome::Empty { .. } => Err(ExtractError::EmptyContent),
        }
    }

    /// One-line status suitable for a status bar.
    pub fn status_message(&self) -> String {
        match self.error() {
            None => format!(
                "Extracted \"{}\" by {}",
                self.metadata.title, self.metadata.artist
            ),
            Some(err) => err.user_message(),
        }
    }
}

/// Run the full pipeline on `markup` fetched from `source_url`.
pub fn extract(markup: &RawMarkup, source_url: &str, opts: &CleanOptions) -> Extraction {
    extract_at(markup, source_url, opts, Utc::now())
}

/// Same as [`extract`] with an explicit extraction timestamp.
pub fn extract_at(
    markup: &RawMarkup,
    source_url: &str,
    opts: &CleanOptions,
    now: DateTime<Utc>,
) -> Extraction {
    let doc = Html::parse_document(markup.as_str());
    let metadata = extract_metadata(&doc);

    let outcome = match locate_chord_block(&doc) {
        None => ContentOutcome::NotFound,
        Some(block) => {
            let content = clean_chord_text(&block.text, opts);
            if content.trim().is_empty() {
                ContentOutcome::Empty {
                    strategy: block.strategy,
                }
            } else {
                ContentOutcome::Sheet(ChordSheet {
                    metadata: metadata.clone(),
                    source_url: source_url.to_string(),
                    content,
                    extracted_at: now,
                })
            }
        }
    };

    match &outcome {
        ContentOutcome::Sheet(sheet) => tracing::info!(
            url = %source_url,
            title = %metadata.title,
            bytes = sheet.content.len(),
            "extract.done"
        ),
        ContentOutcome::NotFound => {
            tracing::warn!(url = %source_url, markup_len = markup.len(), "extract.not_found")
        }
        ContentOutcome::Empty { strategy } => {
            tracing::warn!(url = %source_url, %strategy, "extract.empty")
        }
    }

    Extraction {
        metadata,
        source_url: source_url.to_string(),
        outcome,
    }
}
