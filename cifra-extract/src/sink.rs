//! Persistence of chord sheets.
//!
//! The `.chords` text artifact is a header block followed by a separator and
//! the content body:
//!
//! ```text
//! Título: Wonderwall
//! Artista: Oasis
//! Tom: F#
//! URL: https://www.cifraclub.com.br/oasis/wonderwall/
//! Extraído em: 2026-10-18T12:00:00+00:00
//! ============================================================
//!
//! <content>
//! ```
//!
//! The JSON artifact carries the same fields as a flat record.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::types::{ChordSheet, SongMetadata};

const TITLE: &str = "Título:";
const ARTIST: &str = "Artista:";
const KEY: &str = "Tom:";
const URL: &str = "URL:";
const EXTRACTED: &str = "Extraído em:";
const SEPARATOR_WIDTH: usize = 60;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("filename regex"));

/// Anything able to store a finished chord sheet.
pub trait Sink {
    fn persist(&self, sheet: &ChordSheet) -> Result<PathBuf, SinkError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    #[default]
    Chords,
    Json,
}

impl SinkFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SinkFormat::Chords => "chords",
            SinkFormat::Json => "json",
        }
    }
}

impl FromStr for SinkFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chords" | "text" | "txt" => Ok(SinkFormat::Chords),
            "json" => Ok(SinkFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for SinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes one file per sheet into a directory.
#[derive(Debug, Clone)]
pub struct ChordFileSink {
    dir: PathBuf,
    format: SinkFormat,
}

impl ChordFileSink {
    pub fn new(dir: impl Into<PathBuf>, format: SinkFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> SinkFormat {
        self.format
    }

    /// Target path for `sheet`: `"<artist> - <title>.<ext>"`.
    pub fn path_for(&self, sheet: &ChordSheet) -> PathBuf {
        self.dir.join(format!(
            "{}.{}",
            file_stem(&sheet.metadata),
            self.format.extension()
        ))
    }
}

impl Sink for ChordFileSink {
    fn persist(&self, sheet: &ChordSheet) -> Result<PathBuf, SinkError> {
        let path = self.path_for(sheet);
        let body = match self.format {
            SinkFormat::Chords => render_chord_file(sheet),
            SinkFormat::Json => render_chord_json(sheet)?,
        };

        fs::create_dir_all(&self.dir).map_err(|source| SinkError::WriteFailed {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, body).map_err(|source| SinkError::WriteFailed {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), format = %self.format, "sink.persisted");
        Ok(path)
    }
}

/// File stem built from artist and title with unsafe characters removed.
pub fn file_stem(meta: &SongMetadata) -> String {
    let artist = sanitize(&meta.artist);
    let title = sanitize(&meta.title);
    match (artist.is_empty(), title.is_empty()) {
        (true, true) => "cifra".to_string(),
        (true, false) => title,
        (false, true) => artist,
        (false, false) => format!("{artist} - {title}"),
    }
}

fn sanitize(s: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(s, "").trim().to_string()
}

fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

/// Render the `.chords` text artifact.
pub fn render_chord_file(sheet: &ChordSheet) -> String {
    let m = &sheet.metadata;
    format!(
        "{TITLE} {}\n{ARTIST} {}\n{KEY} {}\n{URL} {}\n{EXTRACTED} {}\n{}\n\n{}",
        m.title,
        m.artist,
        m.key,
        sheet.source_url,
        sheet
            .extracted_at
            .to_rfc3339_opts(SecondsFormat::Secs, false),
        separator(),
        sheet.content
    )
}

/// Parse a `.chords` text artifact back into a sheet.
pub fn parse_chord_file(text: &str) -> Result<ChordSheet, SinkError> {
    let marker = format!("\n{}\n\n", separator());
    let split = text
        .find(&marker)
        .ok_or_else(|| SinkError::Parse("missing separator line".into()))?;
    let header = &text[..split];
    let content = &text[split + marker.len()..];

    let field = |name: &str| -> Result<String, SinkError> {
        header
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .map(|value| value.trim().to_string())
            .ok_or_else(|| SinkError::Parse(format!("missing header {name}")))
    };

    let stamp = field(EXTRACTED)?;
    let extracted_at = DateTime::parse_from_rfc3339(&stamp)
        .map_err(|e| SinkError::Parse(format!("bad timestamp {stamp:?}: {e}")))?
        .with_timezone(&Utc);

    Ok(ChordSheet {
        metadata: SongMetadata {
            title: field(TITLE)?,
            artist: field(ARTIST)?,
            key: field(KEY)?,
        },
        source_url: field(URL)?,
        content: content.to_string(),
        extracted_at,
    })
}

#[derive(Debug, Serialize, Deserialize)]
struct ChordRecord {
    title: String,
    artist: String,
    key: String,
    url: String,
    extracted_at: DateTime<Utc>,
    content: String,
}

/// Render the JSON artifact.
pub fn render_chord_json(sheet: &ChordSheet) -> Result<String, SinkError> {
    let record = ChordRecord {
        title: sheet.metadata.title.clone(),
        artist: sheet.metadata.artist.clone(),
        key: sheet.metadata.key.clone(),
        url: sheet.source_url.clone(),
        extracted_at: sheet.extracted_at,
        content: sheet.content.clone(),
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

/// Parse the JSON artifact.
pub fn parse_chord_json(text: &str) -> Result<ChordSheet, SinkError> {
    let r: ChordRecord = serde_json::from_str(text)?;
    Ok(ChordSheet {
        metadata: SongMetadata {
            title: r.title,
            artist: r.artist,
            key: r.key,
        },
        source_url: r.url,
        content: r.content,
        extracted_at: r.extracted_at,
    })
}
