use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::aggregate::DEFAULT_SENTIMENT_THRESHOLD;
use crate::connector_sample::MAX_SAMPLE_ROWS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the comment dataset is read from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Remote,
    Sample,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,

    // csv
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    // remote
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub token_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // sample
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_start_date")]
    pub start_date: String,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.csv".to_string()]
}
fn default_delimiter() -> String {
    ",".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_rows() -> usize {
    80
}
fn default_seed() -> u64 {
    42
}
fn default_start_date() -> String {
    "2024-01-01".to_string()
}

impl SourceConfig {
    /// Label used in logs and `cdash sources`.
    pub fn describe(&self) -> String {
        match self.kind {
            SourceKind::Csv => format!(
                "csv:{}",
                self.path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ),
            SourceKind::Remote => format!(
                "remote:{}/{}",
                self.url.as_deref().unwrap_or_default().trim_end_matches('/'),
                self.collection.as_deref().unwrap_or_default()
            ),
            SourceKind::Sample => format!("sample:{}x{}", self.rows, self.seed),
        }
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }

    pub fn start_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d")
            .with_context(|| format!("source.start_date is not YYYY-MM-DD: {}", self.start_date))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_threshold")]
    pub sentiment_threshold: f64,
    #[serde(default)]
    pub trend_zero_fill: bool,
}

fn default_threshold() -> f64 {
    DEFAULT_SENTIMENT_THRESHOLD
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sentiment_threshold: DEFAULT_SENTIMENT_THRESHOLD,
            trend_zero_fill: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    /// A sample-backed configuration used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            source: SourceConfig {
                kind: SourceKind::Sample,
                path: None,
                include_globs: default_include_globs(),
                delimiter: default_delimiter(),
                url: None,
                collection: None,
                token_env: None,
                timeout_secs: default_timeout_secs(),
                rows: default_rows(),
                seed: default_seed(),
                start_date: default_start_date(),
            },
            analysis: AnalysisConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    let threshold = config.analysis.sentiment_threshold;
    if !threshold.is_finite() || !(0.0..1.0).contains(&threshold) {
        bail!("analysis.sentiment_threshold must be in [0.0, 1.0)");
    }

    let source = &config.source;
    match source.kind {
        SourceKind::Csv => {
            if source.path.is_none() {
                bail!("source.path must be set when kind is 'csv'");
            }
            if source.delimiter.len() != 1 || !source.delimiter.is_ascii() {
                bail!(
                    "source.delimiter must be a single ASCII character, got '{}'",
                    source.delimiter
                );
            }
        }
        SourceKind::Remote => {
            if source.url.as_deref().map_or(true, str::is_empty) {
                bail!("source.url must be set when kind is 'remote'");
            }
            if source.collection.as_deref().map_or(true, str::is_empty) {
                bail!("source.collection must be set when kind is 'remote'");
            }
            if source.timeout_secs == 0 {
                bail!("source.timeout_secs must be > 0");
            }
        }
        SourceKind::Sample => {
            if source.rows == 0 || source.rows > MAX_SAMPLE_ROWS {
                bail!("source.rows must be between 1 and {}", MAX_SAMPLE_ROWS);
            }
            source.start_date()?;
        }
    }

    Ok(())
}
