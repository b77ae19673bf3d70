//! Interactive browser front end: the user drives a real browser and pulls
//! the chord sheet out of whatever page it shows.

use anyhow::Result;
use cifra_extract::{ExtractError, Session};
use cifra_web::{BrowserSession, MarkupSource, SongRequest, normalize_url};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{Ctx, acquired_or_fail};
use crate::wiring;

const HELP: &str = "commands: go <url> | back | forward | reload | extract | save | status | help | quit";

#[derive(Debug, PartialEq, Eq)]
pub enum BrowseCommand {
    Go(String),
    Back,
    Forward,
    Reload,
    Extract,
    Save,
    Status,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Option<BrowseCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    Some(match word.to_ascii_lowercase().as_str() {
        "go" | "open" if !rest.is_empty() => BrowseCommand::Go(rest.to_string()),
        "back" | "b" => BrowseCommand::Back,
        "forward" | "f" => BrowseCommand::Forward,
        "reload" | "r" => BrowseCommand::Reload,
        "extract" | "x" => BrowseCommand::Extract,
        "save" | "s" => BrowseCommand::Save,
        "status" => BrowseCommand::Status,
        "help" | "?" => BrowseCommand::Help,
        "quit" | "q" | "exit" => BrowseCommand::Quit,
        _ if rest.is_empty() && word.contains('.') => BrowseCommand::Go(word.to_string()),
        _ => BrowseCommand::Unknown(line.to_string()),
    })
}

pub async fn run(ctx: &Ctx, start: Option<&str>) -> Result<()> {
    let browser = BrowserSession::new(wiring::driver_options(&ctx.cfg));
    let sink = wiring::sink(&ctx.cfg)?;
    let mut session = ctx.session();
    let mut stdout = std::io::stdout();

    let home = start
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://www.{}", ctx.cfg.target_domain.as_str()));
    match go(&browser, &mut session, &home).await {
        Ok(loaded) => writeln!(stdout, "loaded {loaded}")?,
        Err(e) => writeln!(stdout, "{e:#}")?,
    }
    writeln!(stdout, "{HELP}")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(stdout, "cifra> ")?;
        stdout.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(cmd) = parse_command(&line) else {
            continue;
        };
        let outcome: Result<()> = match cmd {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                writeln!(stdout, "{HELP}")?;
                Ok(())
            }
            BrowseCommand::Unknown(text) => {
                writeln!(stdout, "unknown command: {text}")?;
                Ok(())
            }
            BrowseCommand::Go(url) => match go(&browser, &mut session, &url).await {
                Ok(loaded) => {
                    writeln!(stdout, "loaded {loaded}")?;
                    Ok(())
                }
                Err(e) => Err(e),
            },
            BrowseCommand::Back => browser.back().await.map_err(Into::into),
            BrowseCommand::Forward => browser.forward().await.map_err(Into::into),
            BrowseCommand::Reload => browser.reload().await.map_err(Into::into),
            BrowseCommand::Status => Ok(()),
            BrowseCommand::Extract => {
                let acquired = browser.current_page().await;
                let current = SongRequest::Query("current page".into());
                match acquired_or_fail(&mut session, acquired, &current) {
                    Ok(page) => {
                        session.ingest(&page.url, page.markup);
                        if let Some(sheet) = session.sheet() {
                            writeln!(stdout, "{}", cifra_extract::sink::render_chord_file(sheet))?;
                        }
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            BrowseCommand::Save => session
                .save(&sink)
                .map(|_| ())
                .map_err(|e: ExtractError| anyhow::anyhow!(e)),
        };
        if let Err(e) = outcome {
            tracing::warn!(error = %format!("{e:#}"), "browse.command.failed");
        }
        writeln!(stdout, "[{}]", session.status())?;
    }

    browser.close().await?;
    Ok(())
}

/// Navigate and return the URL the browser ended up on.
async fn go(browser: &BrowserSession, session: &mut Session, input: &str) -> Result<String> {
    let url = normalize_url(input)?;
    let acquired = browser.acquire(&SongRequest::Url(url.clone())).await;
    let page = acquired_or_fail(session, acquired, &SongRequest::Url(url))?;
    tracing::info!(url = %page.url, "browse.navigated");
    Ok(page.url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  "), None);
        assert_eq!(
            parse_command("go cifraclub.com.br/oasis/wonderwall"),
            Some(BrowseCommand::Go("cifraclub.com.br/oasis/wonderwall".into()))
        );
        assert_eq!(
            parse_command("www.cifraclub.com.br"),
            Some(BrowseCommand::Go("www.cifraclub.com.br".into()))
        );
        assert_eq!(parse_command("B"), Some(BrowseCommand::Back));
        assert_eq!(parse_command("x"), Some(BrowseCommand::Extract));
        assert_eq!(parse_command("quit"), Some(BrowseCommand::Quit));
        assert_eq!(
            parse_command("go"),
            Some(BrowseCommand::Unknown("go".into()))
        );
    }
}
