use anyhow::{Result, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use std::time::Duration;
use tracing::{info, debug, error};
use url::Url;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScraperConfig {
    pub target: TargetSettings,
    pub pagination: PaginationSettings,
    pub browser: BrowserSettings,
    pub output: OutputSettings,
}

/// Listing site and the selectors that locate cards on it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TargetSettings {
    pub base_url: String,
    pub card_selector: String,
    pub title_selector: String,
    pub views_selector: String,
}

/// How the number of listing pages is determined
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaginationStrategy {
    /// Use `fixed_pages` as is
    Fixed,
    /// Read the highest page number from the first page's pagination links
    Probed,
}

/// Pagination settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaginationSettings {
    pub strategy: PaginationStrategy,
    pub fixed_pages: u32,
    pub link_selector: String,
    pub wait_timeout_secs: u64,
    pub fail_on_timeout: bool,  // Raise instead of degrading to a single page
}

/// Which rendered-document provider to use
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    /// Local WebDriver endpoint driving headless Chrome
    Webdriver,
    /// HTTP rendering service
    Remote,
}

/// Rendering backend settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BrowserSettings {
    pub backend: RenderBackend,
    pub webdriver_url: String,
    pub headless: bool,
    pub page_load_timeout_secs: u64,
    pub settle_delay_ms: u64,  // Pause after navigation before extraction
    pub remote_url: String,
    pub remote_timeout_secs: u64,
}

/// Output table settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub prefix: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target: TargetSettings {
                base_url: "https://www.reelshort.com/movie-genres/all-movies".to_string(),
                card_selector: "div.flex.flex-col.justify-between.overflow-hidden".to_string(),
                title_selector: "a".to_string(),
                views_selector: "div.flex.items-center span".to_string(),
            },
            pagination: PaginationSettings {
                strategy: PaginationStrategy::Probed,
                fixed_pages: 1,
                link_selector: "a[href*='/movie-genres/all-movies/']".to_string(),
                wait_timeout_secs: 15,
                fail_on_timeout: false,
            },
            browser: BrowserSettings {
                backend: RenderBackend::Webdriver,
                webdriver_url: "http://localhost:4444".to_string(),
                headless: true,
                page_load_timeout_secs: 30,
                settle_delay_ms: 0,
                remote_url: "http://localhost:5000".to_string(),
                remote_timeout_secs: 120,
            },
            output: OutputSettings {
                directory: PathBuf::from("."),
                prefix: "reelshort".to_string(),
            },
        }
    }
}

impl PaginationSettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

impl BrowserSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl ScraperConfig {
    /// Get the path to the config directory
    fn config_dir() -> PathBuf {
        let mut path = if let Some(proj_dirs) = directories::ProjectDirs::from("com", "reelcount", "reelcount") {
            proj_dirs.config_dir().to_path_buf()
        } else {
            PathBuf::from("./config")
        };

        // Create the sites directory if it doesn't exist
        path.push("sites");
        if !path.exists() {
            if let Err(e) = fs::create_dir_all(&path) {
                error!("Failed to create config directory: {}", e);
            }
        }

        path.pop();
        path
    }

    /// Load the default configuration
    pub fn load_default() -> Result<Self> {
        let config_path = Self::config_dir().join("default.yaml");

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            info!("Default configuration not found. Creating...");
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }

    /// Load a configuration profile
    pub fn load_profile(profile: &str) -> Result<Self> {
        let profile_path = Self::profile_path(profile);

        if profile_path.exists() {
            Self::load_from_file(&profile_path)
        } else {
            anyhow::bail!("Profile '{}' not found", profile)
        }
    }

    fn profile_path(profile: &str) -> PathBuf {
        Self::config_dir().join("sites").join(format!("{}.yaml", profile))
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read configuration file: {}", path.display()))?;

        Self::from_yaml(&contents)
            .context(format!("Failed to parse configuration file: {}", path.display()))
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as a profile
    pub fn save_as_profile(&self, profile: &str) -> Result<()> {
        self.save_to_file(&Self::profile_path(profile))
    }

    /// Save the configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        debug!("Saving configuration to: {}", path.display());

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .context(format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let contents = serde_yaml::to_string(self)
            .context("Failed to serialize configuration")?;

        fs::write(path, contents)
            .context(format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// List all available profiles
    pub fn list_profiles() -> Result<Vec<String>> {
        let sites_dir = Self::config_dir().join("sites");

        if !sites_dir.exists() {
            return Ok(vec![]);
        }

        let mut profiles = Vec::new();

        for entry in fs::read_dir(sites_dir)? {
            let path = entry?.path();

            if path.is_file() && path.extension().map_or(false, |ext| ext == "yaml") {
                if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                    profiles.push(name.to_string());
                }
            }
        }

        profiles.sort();
        Ok(profiles)
    }

    /// Reject settings that cannot drive a crawl
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.target.base_url)
            .context(format!("Invalid base URL: {}", self.target.base_url))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("Base URL cannot take page suffixes: {}", self.target.base_url);
        }

        if self.pagination.strategy == PaginationStrategy::Fixed && self.pagination.fixed_pages == 0 {
            anyhow::bail!("Fixed pagination needs at least one page");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_yaml() {
        let config = ScraperConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();

        assert!(yaml.contains("strategy: probed"));
        assert!(yaml.contains("backend: webdriver"));
        assert_eq!(ScraperConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = ScraperConfig::default();
        config.target.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.target.base_url = "mailto:someone@example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_fixed_pages() {
        let mut config = ScraperConfig::default();
        config.pagination.strategy = PaginationStrategy::Fixed;
        config.pagination.fixed_pages = 0;
        assert!(config.validate().is_err());

        config.pagination.fixed_pages = 3;
        assert!(config.validate().is_ok());
    }
}
