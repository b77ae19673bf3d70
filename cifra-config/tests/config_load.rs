use cifra_config::{CifraConfigLoader, EngineKind, SourceKind};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
source: browser
target_domain: cifraclub.com.br
http:
  timeout_secs: 30
browser:
  webdriver_url: "http://localhost:4444"
  headless: false
search:
  engines: [brave, duckduckgo]
  brave_token: "${CIFRA_TEST_BRAVE_TOKEN}"
output:
  dir: "${CIFRA_TEST_OUT}/sheets"
  format: json
"#;

#[test]
#[serial]
fn loads_file_with_expansion() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "cifra.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("CIFRA_TEST_BRAVE_TOKEN", Some("tok-123")),
            ("CIFRA_TEST_OUT", Some("/data")),
        ],
        || {
            let config = CifraConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.source, SourceKind::Browser);
            assert_eq!(config.http.timeout_secs, 30);
            assert_eq!(config.http.retries, 2);
            assert!(!config.browser.headless);
            assert_eq!(
                config.search.engines,
                vec![EngineKind::Brave, EngineKind::Duckduckgo]
            );
            assert_eq!(config.search.brave_token.as_deref(), Some("tok-123"));
            assert_eq!(config.output.dir, "/data/sheets");
            assert_eq!(config.output.format, "json");
        },
    );
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "cifra.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("CIFRA__SOURCE", Some("direct")),
            ("CIFRA__HTTP__TIMEOUT_SECS", Some("5")),
            ("CIFRA__SEARCH__ENGINES", Some("bing,duckduckgo")),
        ],
        || {
            let config = CifraConfigLoader::new().with_file(&p).load().unwrap();
            assert_eq!(config.source, SourceKind::Direct);
            assert_eq!(config.http.timeout_secs, 5);
            assert_eq!(
                config.search.engines,
                vec![EngineKind::Bing, EngineKind::Duckduckgo]
            );
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = CifraConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .unwrap();
    assert_eq!(config, cifra_config::CifraConfig::default());
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(
        CifraConfigLoader::new()
            .with_file(tmp.path().join("absent.yaml"))
            .load()
            .is_err()
    );
}

#[test]
#[serial]
fn later_sources_win() {
    let config = CifraConfigLoader::new()
        .with_yaml_str("search:\n  max_results: 3\n")
        .with_yaml_str("search:\n  max_results: 7\n")
        .load()
        .unwrap();
    assert_eq!(config.search.max_results, 7);
}
