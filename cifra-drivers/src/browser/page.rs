use crate::browser::{
    behavioral::BehavioralEngine,
    stealth::{StealthProfile, StealthScripts},
};
use anyhow::{Context, Result};
use fantoccini::Client;
use tracing::debug;

/// Handle on the browser's current tab.
///
/// Cloning is cheap; every clone drives the same tab.
#[derive(Clone)]
pub struct CifraPage {
    pub(crate) client: Client,
    pub(crate) stealth_profile: StealthProfile,
    pub(crate) behavioral_engine: BehavioralEngine,
}

impl CifraPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(
        client: Client,
        stealth_profile: StealthProfile,
        behavioral_engine: BehavioralEngine,
    ) -> Self {
        Self {
            client,
            stealth_profile,
            behavioral_engine,
        }
    }

    /// Navigate to `url` and apply stealth scripts.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.behavioral_engine.random_delay(300, 1200).await;
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigate to {url}"))?;
        debug!(%url, "browser.goto");
        self.apply_stealth().await
    }

    pub async fn back(&self) -> Result<()> {
        self.client.back().await.context("history back")?;
        debug!("browser.back");
        self.apply_stealth().await
    }

    pub async fn forward(&self) -> Result<()> {
        self.client.forward().await.context("history forward")?;
        debug!("browser.forward");
        self.apply_stealth().await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.client.refresh().await.context("reload")?;
        debug!("browser.refresh");
        self.apply_stealth().await
    }

    async fn apply_stealth(&self) -> Result<()> {
        for script in StealthScripts::for_profile(self.stealth_profile) {
            self.client
                .execute(script, vec![])
                .await
                .context("apply stealth script")?;
        }
        Ok(())
    }

    /// Return the full page HTML source.
    pub async fn get_content(&self) -> Result<String> {
        self.client.source().await.context("read page source")
    }

    /// Return the page title.
    pub async fn get_title(&self) -> Result<String> {
        self.client.title().await.context("read page title")
    }

    /// Return the current page URL.
    pub async fn get_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .context("read current url")
    }
}
