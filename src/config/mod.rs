use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_imdb_base_url")]
    pub imdb_base_url: String,

    #[serde(default = "default_rt_base_url")]
    pub rt_base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Where chart files land
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Abort the whole run on the first failing chart.
    #[serde(default = "default_true")]
    pub stop_on_error: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_imdb_base_url() -> String {
    "https://www.imdb.com".to_string()
}
fn default_rt_base_url() -> String {
    "https://www.rottentomatoes.com".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_accept_language() -> String {
    "en-US".to_string()
}
fn default_user_agent() -> String {
    "chart-scraper/0.1".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_true() -> bool {
    true
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            imdb_base_url: default_imdb_base_url(),
            rt_base_url: default_rt_base_url(),
            timeout_secs: default_timeout_secs(),
            accept_language: default_accept_language(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { stop_on_error: default_true() }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("CHARTS").separator("__"))
            .build()
            .context("Failed to read configuration")?;

        cfg.try_deserialize().context("Invalid configuration")
    }
}
