//! Page-to-chord-sheet extraction pipeline.
//!
//! Given the raw markup of a chord page this crate:
//!
//! - reads the song metadata (`metadata`): title, artist and key
//! - locates the single container holding the chord text (`locator`)
//! - classifies each line, drops tablature and strips residual tags (`clean`)
//! - assembles a [`ChordSheet`] or a distinct "not found"/"empty" outcome (`pipeline`)
//!
//! Everything here is synchronous and deterministic. Acquisition of markup lives
//! in `cifra-web`; persistence goes through the [`sink::Sink`] trait.
//!
//! ```rust
//! use cifra_extract::{CleanOptions, RawMarkup, extract};
//!
//! let html = r#"
//!   <h1 class="t1">The Sound of Silence</h1>
//!   <h2 class="t3"><a href="/simon/">Simon &amp; Garfunkel</a></h2>
//!   <span id="cifra_tom">Tom: <a>Dm</a></span>
//!   <div class="cifra_cnt"><pre>Dm          C
//! Hello darkness</pre></div>"#;
//!
//! let extraction = extract(&RawMarkup::from(html), "https://example.com/s/", &CleanOptions::default());
//! assert_eq!(extraction.metadata.artist, "Simon & Garfunkel");
//! assert_eq!(extraction.metadata.key, "D");
//! assert_eq!(extraction.sheet().unwrap().content, "Dm          C\nHello darkness");
//! ```

pub mod clean;
pub mod error;
pub mod locator;
pub mod metadata;
pub mod pipeline;
pub mod session;
pub mod sink;
pub mod types;

pub use clean::{CleanOptions, LineKind, classify_line, clean_chord_text};
pub use error::{ExtractError, SinkError};
pub use locator::{ChordBlock, LocateStrategy, locate_chord_block};
pub use metadata::extract_metadata;
pub use pipeline::{ContentOutcome, Extraction, extract};
pub use session::Session;
pub use sink::{ChordFileSink, Sink, SinkFormat, parse_chord_file, parse_chord_json};
pub use types::{ChordSheet, RawMarkup, SongMetadata};
