//! Runtime configuration.
//!
//! Loaded from a TOML file (default `bikeshare.toml`) and then overridden
//! from the environment, which may itself be populated from a `.env` file.
//! Every path either component touches comes from here.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "bikeshare.toml";

const MAX_WINDOW_DAYS: i64 = 36_500;

pub const DEFAULT_STATUS_URL: &str =
    "https://api.wstw.at/gateway/WL_WIENMOBIL_API/1/station_status.json";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Language for chart titles, axis labels and the HTML page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    En,
}

impl Language {
    pub fn parse(s: &str) -> Option<Language> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" | "german" | "deutsch" => Some(Language::De),
            "en" | "english" => Some(Language::En),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub status_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            status_url: DEFAULT_STATUS_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("bikeshare_monitor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub log_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("data/bikeshare.jsonl"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub window_days: i64,
    pub top_n: usize,
    pub language: Language,
    /// TrueType/OpenType font for chart text. Common system locations are
    /// searched when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("docs"),
            window_days: 7,
            top_n: 15,
            language: Language::De,
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClockViewConfig {
    /// IANA zone name, e.g. "Europe/Vienna".
    pub timezone: String,
    pub output_path: PathBuf,
}

impl Default for ClockViewConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Vienna".to_string(),
            output_path: PathBuf::from("data/total_bikes_over_time.png"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub storage: StorageConfig,
    pub report: ReportConfig,
    pub clock_view: ClockViewConfig,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Parse a config from TOML text and validate it. Missing keys keep
    /// their defaults.
    pub fn from_toml_str(text: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration for a run.
    ///
    /// An explicitly given path must exist. Without one, `bikeshare.toml` in
    /// the working directory is used if present, else the built-in defaults.
    /// Environment overrides (after reading `.env`) are applied last.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", p.display(), e)))?;
                Self::from_toml_str(&text)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    let text = std::fs::read_to_string(default_path)
                        .map_err(|e| ConfigError::Io(format!("{}: {}", DEFAULT_CONFIG_PATH, e)))?;
                    Self::from_toml_str(&text)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `BIKESHARE_*` overrides from `lookup` and re-validate.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BIKESHARE_STATUS_URL") {
            self.feed.status_url = url;
        }
        if let Some(path) = lookup("BIKESHARE_LOG_PATH") {
            self.storage.log_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("BIKESHARE_OUTPUT_DIR") {
            self.report.output_dir = PathBuf::from(dir);
        }
        if let Some(lang) = lookup("BIKESHARE_LANGUAGE") {
            self.report.language = Language::parse(&lang)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown language '{}'", lang)))?;
        }
        if let Some(font) = lookup("BIKESHARE_FONT_PATH") {
            self.report.font_path = Some(PathBuf::from(font));
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.status_url.trim().is_empty() {
            return Err(ConfigError::Invalid("feed.status_url must not be empty".into()));
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::Invalid("feed.timeout_secs must be at least 1".into()));
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.report.window_days) {
            return Err(ConfigError::Invalid(format!(
                "report.window_days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }
        if self.report.top_n == 0 {
            return Err(ConfigError::Invalid("report.top_n must be at least 1".into()));
        }
        self.display_timezone()?;
        Ok(())
    }

    /// The zone used by the 12-hour clock view.
    pub fn display_timezone(&self) -> Result<chrono_tz::Tz, ConfigError> {
        self.clock_view
            .timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| ConfigError::Invalid(format!("clock_view.timezone: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_deployment() {
        let config = Config::default();
        assert_eq!(config.feed.status_url, DEFAULT_STATUS_URL);
        assert_eq!(config.feed.timeout_secs, 30);
        assert_eq!(config.storage.log_path, PathBuf::from("data/bikeshare.jsonl"));
        assert_eq!(config.report.output_dir, PathBuf::from("docs"));
        assert_eq!(config.report.window_days, 7);
        assert_eq!(config.report.top_n, 15);
        assert_eq!(config.report.language, Language::De);
        assert_eq!(config.display_timezone().unwrap(), chrono_tz::Europe::Vienna);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [storage]
            log_path = "/tmp/bikes.jsonl"

            [report]
            language = "en"
            top_n = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.log_path, PathBuf::from("/tmp/bikes.jsonl"));
        assert_eq!(config.report.language, Language::En);
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.report.window_days, 7);
        assert_eq!(config.feed.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let result = Config::from_toml_str("[clock_view]\ntimezone = \"Mars/Olympus\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let result = Config::from_toml_str("[report]\ntop_n = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = Config::from_toml_str("[report\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("BIKESHARE_LOG_PATH", "/var/lib/bikes/log.jsonl"),
            ("BIKESHARE_OUTPUT_DIR", "/srv/www/bikes"),
            ("BIKESHARE_LANGUAGE", "english"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.storage.log_path, PathBuf::from("/var/lib/bikes/log.jsonl"));
        assert_eq!(config.report.output_dir, PathBuf::from("/srv/www/bikes"));
        assert_eq!(config.report.language, Language::En);
        assert_eq!(config.feed.status_url, DEFAULT_STATUS_URL);
    }

    #[test]
    fn test_unknown_language_override_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "BIKESHARE_LANGUAGE").then(|| "klingon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
