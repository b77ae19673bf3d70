use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Levels of stealth applied to the browser session.
pub enum StealthProfile {
    /// Plain browser, no evasions.
    Off,
    /// Automation flags hidden, `navigator.webdriver` masked.
    Lightweight,
    Balanced,
    Maximum,
}

impl StealthProfile {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            StealthProfile::Balanced
        } else {
            StealthProfile::Off
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Snapshot of user agent, viewport, and locale characteristics.
pub struct UserAgentProfile {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub platform: String,
    pub languages: Vec<String>,
}

/// Built-in desktop profiles. Chord sites are Brazilian, so locales lead with pt-BR.
pub fn desktop_profiles() -> Vec<UserAgentProfile> {
    let langs = || vec!["pt-BR".to_string(), "pt".to_string(), "en-US".to_string()];
    vec![
        UserAgentProfile {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            viewport: (1920, 1080),
            platform: "Win32".to_string(),
            languages: langs(),
        },
        UserAgentProfile {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            viewport: (1440, 900),
            platform: "MacIntel".to_string(),
            languages: langs(),
        },
    ]
}

/// Pick one profile for the whole session.
pub fn pick_profile() -> UserAgentProfile {
    let pool = desktop_profiles();
    pool.choose(&mut rand::thread_rng())
        .cloned()
        .expect("desktop profile pool is non-empty")
}

/// Construct Chrome command-line arguments for a given stealth profile
/// and fingerprint.
pub fn build_stealth_arguments(
    profile: StealthProfile,
    user_profile: &UserAgentProfile,
) -> Vec<String> {
    if profile == StealthProfile::Off {
        return Vec::new();
    }
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-extensions".to_string(),
        format!("--user-agent={}", user_profile.user_agent),
        format!(
            "--window-size={},{}",
            user_profile.viewport.0, user_profile.viewport.1
        ),
        format!("--lang={}", user_profile.languages.join(",")),
    ];
    if profile == StealthProfile::Maximum {
        args.push("--disable-plugins-discovery".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

/// Full `goog:chromeOptions` object for a session.
pub fn chrome_options(
    profile: StealthProfile,
    user_profile: &UserAgentProfile,
    headless: bool,
    profile_dir: Option<&Path>,
) -> Value {
    let mut args = build_stealth_arguments(profile, user_profile);
    if headless {
        args.push("--headless=new".to_string());
        if !args.iter().any(|a| a == "--disable-gpu") {
            args.push("--disable-gpu".to_string());
        }
    }
    if let Some(dir) = profile_dir {
        args.push(format!("--user-data-dir={}", dir.display()));
    }

    let mut opts = Map::new();
    opts.insert("args".to_string(), json!(args));
    if profile != StealthProfile::Off {
        opts.insert("excludeSwitches".to_string(), json!(["enable-automation"]));
        opts.insert("useAutomationExtension".to_string(), json!(false));
    }
    Value::Object(opts)
}

/// JavaScript evasions applied at page load to reduce automation signals.
pub struct StealthScripts;

impl StealthScripts {
    pub fn get_core_evasions() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
            if (!window.chrome) window.chrome = { runtime: {} };
        "#
    }
    pub fn get_locale_evasions() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'plugins', { get: () => [1,2,3] });
            Object.defineProperty(navigator, 'languages', {
                get: () => ['pt-BR', 'pt', 'en-US']
            });
        "#
    }
    pub fn get_webgl_evasions() -> &'static str {
        r#"
            const getParameter = WebGLRenderingContext.prototype.getParameter;
            WebGLRenderingContext.prototype.getParameter = function(parameter) {
                if (parameter === 37445) return 'Intel Inc.';
                if (parameter === 37446) return 'Intel Iris OpenGL Engine';
                return getParameter.call(this, parameter);
            };
        "#
    }

    /// Scripts to run after each load, in order.
    pub fn for_profile(profile: StealthProfile) -> Vec<&'static str> {
        match profile {
            StealthProfile::Off => vec![],
            StealthProfile::Lightweight => vec![Self::get_core_evasions()],
            StealthProfile::Balanced => {
                vec![Self::get_core_evasions(), Self::get_locale_evasions()]
            }
            StealthProfile::Maximum => vec![
                Self::get_core_evasions(),
                Self::get_locale_evasions(),
                Self::get_webgl_evasions(),
            ],
        }
    }
}
