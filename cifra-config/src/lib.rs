//! Loader for `cifra` configuration with YAML + environment overlays.
//!
//! Sources merge in this order, later ones winning:
//!
//! 1. built-in defaults (every section has them, an empty config is valid)
//! 2. files and inline YAML, in the order they were attached
//! 3. `CIFRA__SECTION__KEY` environment variables
//!
//! String values may reference environment variables as `${VAR}` or `$VAR`;
//! references are expanded recursively after merging.
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CIFRA";
const CONFIG_FILE_NAME: &str = "cifra.yaml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CifraConfig {
    pub source: SourceKind,
    pub target_domain: TargetDomain,
    pub http: HttpSettings,
    pub browser: BrowserSettings,
    pub search: SearchSettings,
    pub cleaning: CleaningSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

/// How page markup is acquired for URL requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Direct,
    Browser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TargetDomain(pub String);

impl Default for TargetDomain {
    fn default() -> Self {
        Self("cifraclub.com.br".into())
    }
}

impl TargetDomain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub retries: usize,
    /// Overrides the built-in desktop browser user agent.
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            retries: 2,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    /// Launch with automation-hiding arguments and scripts.
    pub stealth: bool,
    /// Persistent browser profile directory.
    pub profile_dir: Option<PathBuf>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            stealth: true,
            profile_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Duckduckgo,
    Bing,
    Brave,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Engines tried in order until one yields chord pages.
    pub engines: Vec<EngineKind>,
    /// Brave Search API token; Brave is skipped without one.
    pub brave_token: Option<String>,
    pub max_results: usize,
    #[serde(default = "default_duckduckgo_endpoint")]
    pub duckduckgo_endpoint: String,
    #[serde(default = "default_bing_endpoint")]
    pub bing_endpoint: String,
    #[serde(default = "default_brave_endpoint")]
    pub brave_endpoint: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            engines: vec![EngineKind::Duckduckgo, EngineKind::Bing, EngineKind::Brave],
            brave_token: None,
            max_results: 10,
            duckduckgo_endpoint: default_duckduckgo_endpoint(),
            bing_endpoint: default_bing_endpoint(),
            brave_endpoint: default_brave_endpoint(),
        }
    }
}

fn default_duckduckgo_endpoint() -> String {
    "https://html.duckduckgo.com/html/".into()
}
fn default_bing_endpoint() -> String {
    "https://www.bing.com/search".into()
}
fn default_brave_endpoint() -> String {
    "https://api.search.brave.com/res/v1/web/search".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CleaningSettings {
    pub max_hyphens: usize,
    pub hyphen_run: usize,
    /// `null` keeps every blank line.
    pub max_blank_run: Option<usize>,
}

impl Default for CleaningSettings {
    fn default() -> Self {
        Self {
            max_hyphens: 6,
            hyphen_run: 3,
            max_blank_run: Some(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory for saved sheets; `~` is expanded.
    pub dir: String,
    /// `chords` or `json`.
    pub format: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: ".".into(),
            format: "chords".into(),
        }
    }
}

impl OutputSettings {
    pub fn resolved_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.dir).into_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `text` or `json`.
    pub format: String,
    pub stderr: bool,
    pub dir: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: "text".into(),
            stderr: false,
            dir: None,
            filter: "info".into(),
        }
    }
}

impl CifraConfig {
    /// Effective configuration as YAML, with secrets masked.
    pub fn to_redacted_yaml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.search.brave_token.is_some() {
            shown.search.brave_token = Some("<redacted>".into());
        }
        serde_yaml::to_string(&shown).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

/// Candidate config files, most specific first: `./cifra.yaml`, then
/// `<config dir>/cifra/cifra.yaml`.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("cifra").join(CONFIG_FILE_NAME));
    }
    paths
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct CifraConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CifraConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CifraConfigLoader {
    /// Start from built-in defaults.
    ///
    /// ```
    /// use cifra_config::{CifraConfigLoader, SourceKind};
    ///
    /// let config = CifraConfigLoader::new()
    ///     .with_yaml_str("source: browser")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.source, SourceKind::Browser);
    /// assert_eq!(config.target_domain.as_str(), "cifraclub.com.br");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach every existing file from [`default_config_paths`], least specific first.
    pub fn with_default_files(self) -> Self {
        default_config_paths()
            .into_iter()
            .rev()
            .fold(self, |loader, p| loader.with_optional_file(p))
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use cifra_config::{CifraConfigLoader, EngineKind};
    ///
    /// let cfg = CifraConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// search:
    ///   engines: [bing, duckduckgo]
    ///   max_results: 3
    /// cleaning:
    ///   max_blank_run: null
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.search.engines, vec![EngineKind::Bing, EngineKind::Duckduckgo]);
    /// assert_eq!(cfg.search.max_results, 3);
    /// assert_eq!(cfg.cleaning.max_blank_run, None);
    /// assert_eq!(cfg.cleaning.max_hyphens, 6);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `CIFRA__`-prefixed environment variables are layered on top of the
    /// attached files, then `${VAR}` placeholders are expanded.
    ///
    /// ```
    /// use cifra_config::CifraConfigLoader;
    ///
    /// unsafe { std::env::set_var("BRAVE_DOC_TOKEN", "injected-from-env"); }
    ///
    /// let config = CifraConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// search:
    ///   brave_token: "${BRAVE_DOC_TOKEN}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.search.brave_token.as_deref(), Some("injected-from-env"));
    ///
    /// unsafe { std::env::remove_var("BRAVE_DOC_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<CifraConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("search.engines"),
            )
            .build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        // Recursively expand environment variables
        expand_env_in_value(&mut v);

        let typed: CifraConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
