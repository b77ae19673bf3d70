use crate::browser::{
    behavioral::BehavioralEngine,
    page::CifraPage,
    stealth::{chrome_options, pick_profile, StealthProfile, UserAgentProfile},
};
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use std::path::PathBuf;
use webdriver::capabilities::Capabilities;

/// Launch settings for a browser session.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// WebDriver endpoint, e.g. chromedriver on `http://localhost:9515`.
    pub webdriver_url: String,
    pub headless: bool,
    pub stealth: StealthProfile,
    pub profile_dir: Option<PathBuf>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            stealth: StealthProfile::Balanced,
            profile_dir: None,
        }
    }
}

impl DriverOptions {
    /// WebDriver capabilities requesting Chrome with the configured flags.
    pub fn capabilities(&self, user_profile: &UserAgentProfile) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert("browserName".to_string(), "chrome".into());
        caps.insert(
            "goog:chromeOptions".to_string(),
            chrome_options(
                self.stealth,
                user_profile,
                self.headless,
                self.profile_dir.as_deref(),
            ),
        );
        caps
    }
}

/// Thin wrapper around a `fantoccini` WebDriver client with stealth and
/// behavioral helpers.
pub struct CifraDriver {
    client: Client,
    behavioral_engine: BehavioralEngine,
    user_agent: UserAgentProfile,
    stealth_profile: StealthProfile,
}

impl CifraDriver {
    /// Create a new driver connected to a running WebDriver service.
    pub async fn new(opts: DriverOptions) -> Result<Self> {
        let user_agent = pick_profile();
        let caps = opts.capabilities(&user_agent);

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&opts.webdriver_url)
            .await
            .with_context(|| format!("connect to webdriver at {}", opts.webdriver_url))?;

        tracing::info!(
            webdriver = %opts.webdriver_url,
            headless = opts.headless,
            stealth = ?opts.stealth,
            "browser.session.start"
        );

        Ok(Self {
            client,
            behavioral_engine: BehavioralEngine::new(),
            user_agent,
            stealth_profile: opts.stealth,
        })
    }

    pub fn user_agent(&self) -> &UserAgentProfile {
        &self.user_agent
    }

    /// Handle on the current tab without navigating.
    pub fn page(&self) -> CifraPage {
        CifraPage::new(
            self.client.clone(),
            self.stealth_profile,
            self.behavioral_engine.clone(),
        )
    }

    /// Navigate to `url` and return the page with stealth scripts applied.
    pub async fn goto(&self, url: &str) -> Result<CifraPage> {
        let page = self.page();
        page.goto(url).await?;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await.context("close browser session")?;
        tracing::info!("browser.session.closed");
        Ok(())
    }
}
