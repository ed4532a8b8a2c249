// src/config.rs
// =============================================================================
// Application settings.
//
// Settings are layered, later sources win:
// 1. built-in defaults
// 2. the YAML file given with --config (optional, may not exist)
// 3. environment variables: KEYSPY__SCANNER__TARGET_URL, KEYSPY__LOG__LEVEL...
//    (keywords as a comma separated list: KEYSPY__SCANNER__KEYWORDS=a,b)
// 4. command-line flags (--url, --keyword, --max-depth, --max-concurrent)
//
// The scanner section is turned into a validated CrawlConfig right before
// each crawl run.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::cli::ScanOverrides;
use crate::error::ConfigError;
use crate::model::CrawlConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub scanner: ScannerSettings,
    pub schedule: ScheduleSettings,
    pub output: OutputSettings,
    pub notifier: NotifierSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerSettings {
    /// Website to crawl; its host is the crawl scope
    pub target_url: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub max_depth: usize,
    pub request_timeout_ms: u64,
    pub request_interval_ms: u64,
    pub max_concurrent: usize,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSettings {
    /// Used by `keyspy schedule` when --every is not given
    pub interval_secs: u64,
    /// Run a crawl immediately instead of waiting for the first interval
    pub run_on_start: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub file_prefix: String,
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierSettings {
    pub enabled: bool,
    /// Chat webhook that receives a markdown summary
    pub webhook_url: Option<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default filter when RUST_LOG is not set, e.g. "info" or "keyspy=debug"
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl Settings {
    // Loads settings from defaults, `path`, the environment and CLI overrides
    pub fn load(path: &Path, overrides: &ScanOverrides) -> Result<Self, config::ConfigError> {
        let keywords = if overrides.keywords.is_empty() {
            None
        } else {
            Some(overrides.keywords.clone())
        };

        Config::builder()
            .set_default("scanner.target_url", "")?
            .set_default("scanner.max_depth", 3)?
            .set_default("scanner.request_timeout_ms", 10_000)?
            .set_default("scanner.request_interval_ms", 200)?
            .set_default("scanner.max_concurrent", 5)?
            .set_default(
                "scanner.user_agent",
                concat!("keyspy/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("schedule.interval_secs", 3600)?
            .set_default("schedule.run_on_start", true)?
            .set_default("output.dir", "reports")?
            .set_default("output.file_prefix", "keyspy_report")?
            .set_default("output.format", "text")?
            .set_default("notifier.enabled", false)?
            .set_default("notifier.timeout_ms", 5000)?
            .set_default("log.level", "info")?
            .set_default("log.format", "text")?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("KEYSPY")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("scanner.keywords")
                    .try_parsing(true),
            )
            .set_override_option("scanner.target_url", overrides.url.clone())?
            .set_override_option("scanner.keywords", keywords)?
            .set_override_option("scanner.max_depth", overrides.max_depth.map(|d| d as u64))?
            .set_override_option(
                "scanner.max_concurrent",
                overrides.max_concurrent.map(|c| c as u64),
            )?
            .build()?
            .try_deserialize()
    }
}

impl ScannerSettings {
    // Builds the immutable config for one crawl run
    //
    // Keywords are de-duplicated case-insensitively (first spelling wins),
    // since "Foo" and "foo" would count the same text twice.
    pub fn to_crawl_config(&self) -> Result<CrawlConfig, ConfigError> {
        let mut keywords: Vec<String> = Vec::with_capacity(self.keywords.len());
        for keyword in &self.keywords {
            let lower = keyword.to_lowercase();
            if !keywords.iter().any(|k| k.to_lowercase() == lower) {
                keywords.push(keyword.clone());
            }
        }

        let config = CrawlConfig {
            target_url: self.target_url.trim().to_string(),
            keywords,
            max_depth: self.max_depth,
            max_concurrent: self.max_concurrent,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            request_interval: Duration::from_millis(self.request_interval_ms),
            user_agent: self.user_agent.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let settings =
            Settings::load(Path::new("does/not/exist.yaml"), &ScanOverrides::default()).unwrap();

        assert_eq!(settings.scanner.max_depth, 3);
        assert_eq!(settings.scanner.max_concurrent, 5);
        assert_eq!(settings.scanner.request_timeout_ms, 10_000);
        assert!(settings.scanner.user_agent.starts_with("keyspy/"));
        assert_eq!(settings.output.format, ReportFormat::Text);
        assert_eq!(settings.log.format, LogFormat::Text);
        assert!(!settings.notifier.enabled);
        assert!(settings.notifier.webhook_url.is_none());
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_yaml(
            r#"
scanner:
  target_url: "https://example.com"
  keywords: ["rust", "tokio"]
  max_depth: 1
  max_concurrent: 2
output:
  dir: "/tmp/keyspy"
  format: json
notifier:
  enabled: true
  webhook_url: "https://hooks.example.com/abc"
log:
  level: debug
  format: json
"#,
        );

        let settings = Settings::load(file.path(), &ScanOverrides::default()).unwrap();

        assert_eq!(settings.scanner.target_url, "https://example.com");
        assert_eq!(settings.scanner.keywords, vec!["rust", "tokio"]);
        assert_eq!(settings.scanner.max_depth, 1);
        assert_eq!(settings.scanner.max_concurrent, 2);
        // untouched keys keep their defaults
        assert_eq!(settings.scanner.request_interval_ms, 200);
        assert_eq!(settings.output.format, ReportFormat::Json);
        assert_eq!(settings.output.dir, PathBuf::from("/tmp/keyspy"));
        assert_eq!(
            settings.notifier.webhook_url.as_deref(),
            Some("https://hooks.example.com/abc")
        );
        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.log.format, LogFormat::Json);
    }

    #[test]
    fn test_cli_overrides_win() {
        let file = write_yaml(
            r#"
scanner:
  target_url: "https://example.com"
  keywords: ["rust"]
  max_depth: 4
"#,
        );
        let overrides = ScanOverrides {
            url: Some("https://other.org".to_string()),
            keywords: vec!["alpha".to_string(), "beta".to_string()],
            max_depth: Some(0),
            max_concurrent: Some(9),
        };

        let settings = Settings::load(file.path(), &overrides).unwrap();

        assert_eq!(settings.scanner.target_url, "https://other.org");
        assert_eq!(settings.scanner.keywords, vec!["alpha", "beta"]);
        assert_eq!(settings.scanner.max_depth, 0);
        assert_eq!(settings.scanner.max_concurrent, 9);
    }

    #[test]
    fn test_to_crawl_config_dedupes_keywords() {
        let file = write_yaml(
            r#"
scanner:
  target_url: " https://example.com "
  keywords: ["Rust", "tokio", "rust", "RUST", "serde"]
  request_timeout_ms: 1500
  request_interval_ms: 0
"#,
        );
        let settings = Settings::load(file.path(), &ScanOverrides::default()).unwrap();

        let config = settings.scanner.to_crawl_config().unwrap();

        assert_eq!(config.target_url, "https://example.com");
        assert_eq!(config.keywords, vec!["Rust", "tokio", "serde"]);
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert!(config.request_interval.is_zero());
    }

    #[test]
    fn test_to_crawl_config_rejects_invalid() {
        let settings =
            Settings::load(Path::new("does/not/exist.yaml"), &ScanOverrides::default()).unwrap();
        assert_eq!(
            settings.scanner.to_crawl_config().unwrap_err(),
            ConfigError::EmptyTarget
        );

        let mut scanner = settings.scanner.clone();
        scanner.target_url = "https://example.com".to_string();
        assert_eq!(scanner.to_crawl_config().unwrap_err(), ConfigError::NoKeywords);

        scanner.keywords = vec!["foo".to_string()];
        scanner.max_concurrent = 0;
        assert_eq!(
            scanner.to_crawl_config().unwrap_err(),
            ConfigError::InvalidConcurrency(0)
        );
    }
}
