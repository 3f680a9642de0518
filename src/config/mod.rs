use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::cli::Cli;

/// Languages tried, in order, by the direct fetch
pub const DEFAULT_LANGUAGES: [&str; 4] = ["en", "en-US", "en-GB", "en-CA"];

const LOCAL_CONFIG_FILE: &str = "get-transcript.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP client settings
    pub http: HttpConfig,

    /// Transcript selection settings
    pub transcript: TranscriptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Root of the YouTube site, or of a mirror under a path prefix
    pub base_url: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Accept-Language header sent with every request
    pub accept_language: String,

    /// Optional proxy for all requests (http, https or socks URL)
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Preferred languages for the direct fetch
    pub languages: Vec<String>,

    /// Report the matched language code instead of "found"
    pub report_matched_language: bool,

    /// Keep basic formatting tags in transcript text
    pub preserve_formatting: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            user_agent: concat!("yt-transcript/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_language: "en-US".to_string(),
            proxy: None,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            report_matched_language: false,
            preserve_formatting: false,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, the usual locations, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover_path(),
        };

        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from {}", path.display());

        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        serde_yaml::from_str(&content).context("Failed to parse config file")
    }

    /// Fold command-line flags over the file settings
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(languages) = &cli.languages {
            let languages: Vec<String> = languages
                .iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
            if !languages.is_empty() {
                self.transcript.languages = languages;
            }
        }
        self.transcript.report_matched_language |= cli.exact_language;
        self.transcript.preserve_formatting |= cli.preserve_formatting;
    }

    /// Current directory first, then the per-user config directory
    fn discover_path() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("yt-transcript").join("config.yaml"))
            .filter(|path| path.exists())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.http.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.http.base_url))?;

        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("Base URL must use HTTP or HTTPS protocol");
        }

        if self.transcript.languages.is_empty() {
            anyhow::bail!("At least one preferred transcript language must be configured");
        }

        Ok(())
    }
}
