//! Line classification and cleanup of chord container text.
//!
//! Lines are tagged [`LineKind::Blank`], [`LineKind::Tablature`] or
//! [`LineKind::Content`]. Tablature lines are dropped outright; content lines
//! lose inline tags and trailing whitespace but keep their leading whitespace,
//! which carries the chord-over-lyric column alignment.
//!
//! The tablature signature is a heuristic: a string label followed by a bar
//! (`e|`, `B|`, `G|`, `D|`, `A|`, `E|`), more than [`CleanOptions::max_hyphens`]
//! hyphens in total, or a run of [`CleanOptions::hyphen_run`] hyphens.
//!
//! Blank-line policy: with the default `max_blank_run` of 1, any run of two or
//! more blank lines (three or more consecutive newlines) becomes a single blank
//! line, so the output never holds two blank lines in a row. A single blank
//! line between stanzas is kept as is.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

const STRING_LABELS: [char; 6] = ['e', 'B', 'G', 'D', 'A', 'E'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Tablature,
    Content,
}

/// Tunable thresholds for the cleaner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// A line with more hyphens than this is tablature.
    pub max_hyphens: usize,
    /// A line containing this many consecutive hyphens is tablature.
    pub hyphen_run: usize,
    /// Longest allowed run of blank lines. Longer runs are cut down to this
    /// length, so `Some(1)` turns two or more blank lines into one. `None`
    /// keeps every blank line.
    pub max_blank_run: Option<usize>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            max_hyphens: 6,
            hyphen_run: 3,
            max_blank_run: Some(1),
        }
    }
}

/// Classify one line of container text.
pub fn classify_line(line: &str, opts: &CleanOptions) -> LineKind {
    let stripped = line.trim();
    if stripped.is_empty() {
        return LineKind::Blank;
    }
    if is_tablature(stripped, opts) || is_tablature(&strip_tags(stripped), opts) {
        return LineKind::Tablature;
    }
    LineKind::Content
}

/// Whether `line` carries the tablature signature.
pub fn is_tablature(line: &str, opts: &CleanOptions) -> bool {
    has_string_label(line) || hyphens_exceed(line, opts)
}

fn has_string_label(line: &str) -> bool {
    let mut prev: Option<char> = None;
    for ch in line.chars() {
        if ch == '|' && prev.is_some_and(|p| STRING_LABELS.contains(&p)) {
            return true;
        }
        prev = Some(ch);
    }
    false
}

fn hyphens_exceed(line: &str, opts: &CleanOptions) -> bool {
    let mut total = 0usize;
    let mut run = 0usize;
    let mut longest = 0usize;
    for ch in line.chars() {
        if ch == '-' {
            total += 1;
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    total > opts.max_hyphens || (opts.hyphen_run > 0 && longest >= opts.hyphen_run)
}

/// Remove `<...>` tags from a single line.
pub fn strip_tags(line: &str) -> String {
    TAG_RE.replace_all(line, "").into_owned()
}

/// Clean the raw text of a chord container.
///
/// Splits on `\n` (a trailing newline survives as a final empty line), drops
/// tablature, strips tags from content lines, then applies the blank-run limit.
pub fn clean_chord_text(text: &str, opts: &CleanOptions) -> String {
    let mut kept: Vec<String> = Vec::new();
    let mut dropped = 0usize;

    for line in text.split('\n') {
        match classify_line(line, opts) {
            LineKind::Blank => kept.push(String::new()),
            LineKind::Tablature => dropped += 1,
            LineKind::Content => kept.push(strip_tags(line).trim_end().to_string()),
        }
    }

    if let Some(limit) = opts.max_blank_run {
        kept = collapse_blank_runs(kept, limit);
    }

    tracing::debug!(lines = kept.len(), tablature_dropped = dropped, "extract.clean");
    kept.join("\n")
}

fn collapse_blank_runs(lines: Vec<String>, limit: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut run = 0usize;
    for line in lines {
        if line.is_empty() {
            run += 1;
            if run > limit {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> String {
        clean_chord_text(text, &CleanOptions::default())
    }

    #[test]
    fn drops_tab_line_and_keeps_alignment() {
        let input = "C       G\nHello darkness\ne|----0----\n";
        assert_eq!(clean(input), "C       G\nHello darkness\n");
    }

    #[test]
    fn classifies_string_labels() {
        let opts = CleanOptions::default();
        for line in ["e|-0-", "B|3", "  G|--", "D|", "A|x", "E|0"] {
            assert_eq!(classify_line(line, &opts), LineKind::Tablature, "{line}");
        }
        assert_eq!(classify_line("F|", &opts), LineKind::Content);
        assert_eq!(classify_line("   ", &opts), LineKind::Blank);
        assert_eq!(classify_line("Am  F  C", &opts), LineKind::Content);
    }

    #[test]
    fn hyphen_thresholds() {
        let opts = CleanOptions::default();
        // two hyphens, no run: content
        assert_eq!(classify_line("well-known half-time", &opts), LineKind::Content);
        // run of three
        assert_eq!(classify_line("Intro ---", &opts), LineKind::Tablature);
        // seven scattered hyphens
        assert_eq!(classify_line("a-b-c-d-e-f-g-h", &opts), LineKind::Tablature);
        // six scattered hyphens stay
        assert_eq!(classify_line("a-b-c-d-e-f-g", &opts), LineKind::Content);
    }

    #[test]
    fn custom_thresholds() {
        let opts = CleanOptions {
            max_hyphens: 20,
            hyphen_run: 0,
            max_blank_run: None,
        };
        assert_eq!(classify_line("Intro ---", &opts), LineKind::Content);
        assert_eq!(clean_chord_text("a\n\n\n\nb", &opts), "a\n\n\n\nb");
    }

    #[test]
    fn strips_tags_but_not_leading_space() {
        assert_eq!(clean("   <b>Am</b>    <b>G</b>   \nla"), "   Am    G\nla");
    }

    #[test]
    fn label_hidden_behind_tags_is_still_tablature() {
        assert_eq!(clean("<span>e</span>|<i>0</i>\nlyric"), "lyric");
    }

    #[test]
    fn collapses_blank_runs_to_one() {
        assert_eq!(clean("a\n\n\n\nb\n  \n\t\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn two_blank_lines_become_one_and_single_blank_stays() {
        assert_eq!(clean("a\n\n\nb"), "a\n\nb");
        assert_eq!(clean("a\n\nb"), "a\n\nb");
        let wider = CleanOptions {
            max_blank_run: Some(2),
            ..CleanOptions::default()
        };
        assert_eq!(clean_chord_text("a\n\n\nb", &wider), "a\n\n\nb");
        assert_eq!(clean_chord_text("a\n\n\n\n\nb", &wider), "a\n\n\nb");
    }

    #[test]
    fn tab_block_leaves_no_gap() {
        let input = "[Intro]\ne|---|\nB|---|\nG|---|\nC  G\n";
        assert_eq!(clean(input), "[Intro]\nC  G\n");
    }

    #[test]
    fn cleaning_is_a_fixed_point() {
        let inputs = [
            "C       G\nHello darkness\ne|----0----\n",
            "\n\n\n   Am\n<b>x</b>  \n\n\n\nend\n\n",
            "  <i>  </i>  \nfoo\r\nbar\r\n",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn crlf_lines_lose_carriage_return() {
        assert_eq!(clean("C\r\nla\r\n"), "C\nla\n");
    }
}
