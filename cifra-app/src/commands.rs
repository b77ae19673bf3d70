//! Subcommand implementations. Output goes to the given writer so the
//! commands can be exercised without a terminal.

use anyhow::{Context, Result, anyhow, bail};
use cifra_common::CifraError;
use cifra_config::CifraConfig;
use cifra_extract::sink::render_chord_file;
use cifra_extract::{
    ChordSheet, ExtractError, RawMarkup, Session, SinkFormat, parse_chord_file, parse_chord_json,
};
use cifra_web::{FetchedPage, MarkupSource, SongRequest};
use std::io::Write;
use std::path::Path;

use crate::wiring;

pub struct Ctx {
    pub cfg: CifraConfig,
    pub print_only: bool,
}

impl Ctx {
    pub fn session(&self) -> Session {
        Session::new(wiring::clean_options(&self.cfg))
    }
}

pub async fn search(ctx: &Ctx, query: &str, out: &mut impl Write) -> Result<()> {
    let chain = wiring::search_chain(&ctx.cfg)?;
    let hits = chain
        .resolve_url(query)
        .await
        .with_context(|| format!("search for {query:?}"))?;
    if hits.is_empty() {
        writeln!(out, "No chord pages found for {query:?}.")?;
        return Ok(());
    }
    for (i, hit) in hits.iter().enumerate() {
        writeln!(out, "{:>2}. {}\n    {}", i + 1, hit.title, hit.url)?;
    }
    Ok(())
}

pub async fn fetch(ctx: &Ctx, input: &str, out: &mut impl Write) -> Result<()> {
    let request = SongRequest::parse(input);
    let source = wiring::acquisition(&ctx.cfg)?;
    let mut session = ctx.session();
    let acquired = source.acquire(&request).await;
    let page = acquired_or_fail(&mut session, acquired, &request)?;
    ingest_and_finish(ctx, &mut session, page, out)
}

/// Search, then fetch the `pick`-th (1-based) candidate.
pub async fn find(ctx: &Ctx, query: &str, pick: usize, out: &mut impl Write) -> Result<()> {
    let source = wiring::acquisition(&ctx.cfg)?;
    let mut session = ctx.session();
    let acquired = source.acquire_nth(query, pick.saturating_sub(1)).await;
    let page = acquired_or_fail(&mut session, acquired, &SongRequest::Query(query.to_string()))?;
    ingest_and_finish(ctx, &mut session, page, out)
}

/// Run the pipeline on a saved HTML page.
pub fn extract_file(
    ctx: &Ctx,
    file: &Path,
    url: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let markup = std::fs::read_to_string(file)
        .with_context(|| format!("read {}", file.display()))?;
    let url = url
        .map(str::to_string)
        .unwrap_or_else(|| format!("file://{}", file.display()));
    let mut session = ctx.session();
    ingest_and_finish(
        ctx,
        &mut session,
        FetchedPage {
            url,
            markup: RawMarkup::new(markup),
        },
        out,
    )
}

/// Print a saved `.chords` or `.json` artifact.
pub fn show(file: &Path, out: &mut impl Write) -> Result<()> {
    let text =
        std::fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let is_json = file
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(SinkFormat::Json.extension()));
    let sheet = if is_json {
        parse_chord_json(&text)
    } else {
        parse_chord_file(&text)
    }
    .with_context(|| format!("parse {}", file.display()))?;
    print_sheet(&sheet, out)
}

pub fn config(ctx: &Ctx, out: &mut impl Write) -> Result<()> {
    write!(out, "{}", ctx.cfg.to_redacted_yaml()?)?;
    Ok(())
}

pub(crate) fn acquired_or_fail(
    session: &mut Session,
    acquired: Result<FetchedPage, CifraError>,
    request: &SongRequest,
) -> Result<FetchedPage> {
    match acquired {
        Ok(page) => Ok(page),
        Err(e) if e.is_source_unavailable() => {
            let err = ExtractError::SourceUnavailable(e.to_string());
            session.fail(&err);
            tracing::warn!(%request, error = %e, "source.unavailable");
            Err(anyhow!(err)).context(session.status().to_string())
        }
        Err(e) => Err(anyhow!(e)).with_context(|| format!("acquire {request}")),
    }
}

pub(crate) fn ingest_and_finish(
    ctx: &Ctx,
    session: &mut Session,
    page: FetchedPage,
    out: &mut impl Write,
) -> Result<()> {
    session.ingest(&page.url, page.markup);
    let Some(sheet) = session.sheet() else {
        let meta = session.metadata();
        tracing::warn!(url = %page.url, title = %meta.title, "extract.no_sheet");
        bail!(
            "{} (title: {}, artist: {})",
            session.status(),
            meta.title,
            meta.artist
        );
    };
    print_sheet(sheet, out)?;
    if ctx.print_only {
        return Ok(());
    }
    let sink = wiring::sink(&ctx.cfg)?;
    let path = session
        .save(&sink)
        .map_err(|e| anyhow!(e.user_message()))?;
    eprintln!("Saved {}", path.display());
    Ok(())
}

fn print_sheet(sheet: &ChordSheet, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", render_chord_file(sheet))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<h1 class="t1">Wonderwall</h1>
<h2 class="t3"><a href="/oasis/">Oasis</a></h2>
<span id="cifra_tom">Tom: <a>F#m</a></span>
<div class="cifra_cnt"><pre>Em7        G
Today is gonna be the day


E|-----------|
Dsus4      A7sus4
</pre></div></body></html>"#;

    fn ctx(dir: &Path, print_only: bool) -> Ctx {
        let mut cfg = CifraConfig::default();
        cfg.output.dir = dir.to_string_lossy().into_owned();
        Ctx { cfg, print_only }
    }

    #[test]
    fn extract_file_prints_and_saves() {
        let tmp = tempfile::tempdir().unwrap();
        let html = tmp.path().join("page.html");
        std::fs::write(&html, PAGE).unwrap();

        let mut out = Vec::new();
        extract_file(
            &ctx(tmp.path(), false),
            &html,
            Some("https://www.cifraclub.com.br/oasis/wonderwall/"),
            &mut out,
        )
        .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Título: Wonderwall\nArtista: Oasis\nTom: F#\n"));
        assert!(!printed.contains("E|"));

        let saved = tmp.path().join("Oasis - Wonderwall.chords");
        let sheet = parse_chord_file(&std::fs::read_to_string(&saved).unwrap()).unwrap();
        assert_eq!(
            sheet.content,
            "Em7        G\nToday is gonna be the day\n\nDsus4      A7sus4\n"
        );

        let mut shown = Vec::new();
        show(&saved, &mut shown).unwrap();
        assert_eq!(String::from_utf8(shown).unwrap(), printed);
    }

    #[test]
    fn print_only_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let html = tmp.path().join("page.html");
        std::fs::write(&html, PAGE).unwrap();
        let out_dir = tmp.path().join("out");

        let mut out = Vec::new();
        extract_file(&ctx(&out_dir, true), &html, None, &mut out).unwrap();
        assert!(!out_dir.exists());
        assert!(String::from_utf8(out).unwrap().contains("URL: file://"));
    }

    #[test]
    fn page_without_chords_fails_with_distinct_message() {
        let tmp = tempfile::tempdir().unwrap();
        let html = tmp.path().join("lyrics.html");
        std::fs::write(&html, r#"<h1 class="t1">Só Letra</h1><p>la la</p>"#).unwrap();

        let err = extract_file(&ctx(tmp.path(), false), &html, None, &mut Vec::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(&ExtractError::ChordBlockNotFound.user_message()));
        assert!(msg.contains("Só Letra"));
    }

    #[test]
    fn show_reads_json_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let html = tmp.path().join("page.html");
        std::fs::write(&html, PAGE).unwrap();
        let mut c = ctx(tmp.path(), false);
        c.cfg.output.format = "json".into();
        extract_file(&c, &html, None, &mut Vec::new()).unwrap();

        let mut shown = Vec::new();
        show(&tmp.path().join("Oasis - Wonderwall.json"), &mut shown).unwrap();
        assert!(String::from_utf8(shown).unwrap().contains("Today is gonna be the day"));
    }

    #[test]
    fn unavailable_source_updates_session_status() {
        let mut session = Session::default();
        let err = acquired_or_fail(
            &mut session,
            Err(CifraError::SourceUnavailable("refused".into())),
            &SongRequest::Query("x".into()),
        )
        .unwrap_err();
        assert_ne!(session.status(), "Ready");
        assert!(format!("{err:#}").contains("refused"));
    }

    #[test]
    fn config_dump_is_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        config(&ctx(tmp.path(), false), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("target_domain: cifraclub.com.br"));
    }
}
