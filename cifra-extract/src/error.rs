use std::path::PathBuf;

/// Failures of a single extraction invocation.
///
/// `ChordBlockNotFound` and `EmptyContent` are ordinary outcomes of a page that
/// is not a chord sheet; they never invalidate the metadata that was read.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("chord block not found")]
    ChordBlockNotFound,

    #[error("chord block is empty")]
    EmptyContent,

    #[error("nothing has been extracted yet")]
    NothingExtracted,

    #[error("failed to persist chord sheet: {0}")]
    SinkWriteFailed(#[from] SinkError),
}

impl ExtractError {
    /// Message meant for the person running the tool.
    pub fn user_message(&self) -> String {
        match self {
            ExtractError::SourceUnavailable(reason) => {
                format!("Could not load the page: {reason}")
            }
            ExtractError::ChordBlockNotFound => {
                "No chord sheet was found on this page.".to_string()
            }
            ExtractError::EmptyContent => {
                "A chord sheet was found on this page, but it has no usable lines.".to_string()
            }
            ExtractError::NothingExtracted => {
                "Extract a chord sheet before saving.".to_string()
            }
            ExtractError::SinkWriteFailed(err) => format!("Could not save the chord sheet: {err}"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("write failed for {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("malformed chord file: {0}")]
    Parse(String),
}
