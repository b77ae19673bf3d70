use std::fmt;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static CONTAINER_PRE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".cifra_cnt pre").expect("container selector"));
static ANY_PRE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("pre").expect("pre selector"));

/// Which lookup found the chord container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    /// `pre` nested in the `cifra_cnt` element.
    CifraContainer,
    /// First `pre` anywhere in the document.
    FirstPre,
}

impl fmt::Display for LocateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateStrategy::CifraContainer => f.write_str("cifra_cnt"),
            LocateStrategy::FirstPre => f.write_str("first_pre"),
        }
    }
}

/// Text of the chord container, layout preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordBlock {
    pub text: String,
    pub strategy: LocateStrategy,
}

/// Find the chord container, preferring the `cifra_cnt` marker.
///
/// `None` is a normal outcome for pages that carry no chord sheet.
pub fn locate_chord_block(doc: &Html) -> Option<ChordBlock> {
    let (el, strategy) = match doc.select(&CONTAINER_PRE_SEL).next() {
        Some(el) => (el, LocateStrategy::CifraContainer),
        None => (doc.select(&ANY_PRE_SEL).next()?, LocateStrategy::FirstPre),
    };
    let text = block_text(el);
    tracing::debug!(%strategy, chars = text.len(), "extract.locate");
    Some(ChordBlock { text, strategy })
}

// Descendant text with no separator; entities are already decoded by the parser.
fn block_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .replace("\r\n", "\n")
        .replace('\u{a0}', " ")
}
