//! Builds the runtime pieces from a loaded [`CifraConfig`].

use anyhow::{Context, Result, anyhow};
use cifra_common::observability::{LogConfig, LogFormat};
use cifra_config::{CifraConfig, EngineKind, SourceKind};
use cifra_drivers::{DriverOptions, StealthProfile};
use cifra_extract::{ChordFileSink, CleanOptions, SinkFormat};
use cifra_web::{
    BingHtml, BraveApi, BrowserSession, DirectFetch, DuckDuckGoHtml, MarkupSource, SearchChain,
    SearchResolved,
};
use std::time::Duration;

pub type Acquisition = SearchResolved<Box<dyn MarkupSource>>;

pub fn log_config(cfg: &CifraConfig, verbose: bool) -> Result<LogConfig> {
    let format: LogFormat = cfg.logging.format.parse().map_err(|e: String| anyhow!(e))?;
    Ok(LogConfig {
        app_name: "cifra",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr || verbose,
        format,
        default_filter: if verbose {
            "debug".to_string()
        } else {
            cfg.logging.filter.clone()
        },
    })
}

pub fn clean_options(cfg: &CifraConfig) -> CleanOptions {
    CleanOptions {
        max_hyphens: cfg.cleaning.max_hyphens,
        hyphen_run: cfg.cleaning.hyphen_run,
        max_blank_run: cfg.cleaning.max_blank_run,
    }
}

pub fn sink(cfg: &CifraConfig) -> Result<ChordFileSink> {
    let format: SinkFormat = cfg
        .output
        .format
        .parse()
        .map_err(|e: String| anyhow!(e))
        .context("output.format")?;
    Ok(ChordFileSink::new(cfg.output.resolved_dir(), format))
}

pub fn driver_options(cfg: &CifraConfig) -> DriverOptions {
    DriverOptions {
        webdriver_url: cfg.browser.webdriver_url.clone(),
        headless: cfg.browser.headless,
        stealth: StealthProfile::from_enabled(cfg.browser.stealth),
        profile_dir: cfg.browser.profile_dir.clone(),
    }
}

fn http_timeout(cfg: &CifraConfig) -> Duration {
    Duration::from_secs(cfg.http.timeout_secs.max(1))
}

/// Engines in configured order; Brave is skipped without a token.
pub fn search_chain(cfg: &CifraConfig) -> Result<SearchChain> {
    let s = &cfg.search;
    let mut chain = SearchChain::new(cfg.target_domain.as_str(), s.max_results.max(1));
    for kind in &s.engines {
        match kind {
            EngineKind::Duckduckgo => {
                chain.push_engine(Box::new(DuckDuckGoHtml::new(&s.duckduckgo_endpoint)?));
            }
            EngineKind::Bing => {
                chain.push_engine(Box::new(BingHtml::new(&s.bing_endpoint)?));
            }
            EngineKind::Brave => match s.brave_token.as_deref().map(str::trim) {
                Some(token) if !token.is_empty() => {
                    chain.push_engine(Box::new(BraveApi::new(&s.brave_endpoint, token)?));
                }
                _ => tracing::debug!("search.engine.brave.skipped_without_token"),
            },
        }
    }
    Ok(chain)
}

pub fn direct_fetch(cfg: &CifraConfig) -> Result<DirectFetch> {
    Ok(DirectFetch::new(
        http_timeout(cfg),
        cfg.http.retries,
        cfg.http.user_agent.as_deref(),
    )?)
}

/// Search chain in front of the configured page source.
pub fn acquisition(cfg: &CifraConfig) -> Result<Acquisition> {
    let inner: Box<dyn MarkupSource> = match cfg.source {
        SourceKind::Direct => Box::new(direct_fetch(cfg)?),
        SourceKind::Browser => Box::new(BrowserSession::new(driver_options(cfg))),
    };
    Ok(SearchResolved::new(search_chain(cfg)?, inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brave_needs_a_token() {
        let mut cfg = CifraConfig::default();
        assert_eq!(
            search_chain(&cfg).unwrap().engine_names(),
            vec!["duckduckgo", "bing"]
        );

        cfg.search.brave_token = Some("tok".into());
        cfg.search.engines = vec![EngineKind::Brave, EngineKind::Bing];
        assert_eq!(
            search_chain(&cfg).unwrap().engine_names(),
            vec!["brave", "bing"]
        );
    }

    #[test]
    fn cleaning_thresholds_carry_over() {
        let mut cfg = CifraConfig::default();
        cfg.cleaning.max_blank_run = None;
        cfg.cleaning.max_hyphens = 10;
        let opts = clean_options(&cfg);
        assert_eq!(opts.max_blank_run, None);
        assert_eq!(opts.max_hyphens, 10);
        assert_eq!(opts.hyphen_run, 3);
    }

    #[test]
    fn unknown_output_format_is_rejected() {
        let mut cfg = CifraConfig::default();
        cfg.output.format = "pdf".into();
        assert!(sink(&cfg).is_err());
        cfg.output.format = "json".into();
        assert_eq!(sink(&cfg).unwrap().format(), SinkFormat::Json);
    }

    #[test]
    fn verbose_mirrors_logs_to_stderr() {
        let cfg = CifraConfig::default();
        let quiet = log_config(&cfg, false).unwrap();
        assert!(!quiet.emit_stderr);
        assert_eq!(quiet.default_filter, "info");
        let loud = log_config(&cfg, true).unwrap();
        assert!(loud.emit_stderr);
        assert_eq!(loud.default_filter, "debug");
    }

    #[test]
    fn browser_source_is_selected_from_config() {
        let mut cfg = CifraConfig::default();
        cfg.source = SourceKind::Browser;
        cfg.browser.stealth = false;
        assert_eq!(acquisition(&cfg).unwrap().inner().name(), "browser");
        assert_eq!(driver_options(&cfg).stealth, StealthProfile::Off);
    }
}
