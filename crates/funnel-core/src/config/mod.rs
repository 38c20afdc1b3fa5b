//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Environment variable holding the bearer token for the SharePoint site
pub const ACCESS_TOKEN_ENV: &str = "FUNNEL_ACCESS_TOKEN";

/// Funnel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web_part: WebPartConfig,
    pub search: SearchConfig,
}

/// Administrator-facing settings of the search box
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebPartConfig {
    pub title: String,
    pub placeholder: String,
    /// Site hosting the Sales Funnel lists. `None` means the host's current site.
    pub site_url: Option<String>,
    #[serde(skip)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// `$top` applied to each list query
    pub page_size: u32,
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub timeout_secs: u64,
}

impl Default for WebPartConfig {
    fn default() -> Self {
        Self {
            title: "Sales Funnel Search".to_string(),
            placeholder: "Search by project, owner, city, estimator...".to_string(),
            site_url: None,
            access_token: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            debounce_ms: 500,
            min_query_len: 2,
            timeout_secs: 30,
        }
    }
}

impl WebPartConfig {
    /// Pick the configured site, falling back to the one supplied by the host
    pub fn resolved_site_url(&self, host_default: Option<&str>) -> Result<String> {
        self.site_url
            .as_deref()
            .or(host_default)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or(Error::MissingSiteUrl)
    }

    pub fn resolved_access_token(&self) -> Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(env::var(ACCESS_TOKEN_ENV).ok().filter(|t| !t.is_empty()))
    }

    pub fn redacted_access_token(&self) -> Result<Option<String>> {
        Ok(self.resolved_access_token()?.map(|token| redact(&token)))
    }

    pub fn enforce_env_only(&self) -> Result<()> {
        if self.access_token.is_some() {
            return Err(Error::ConfigError(format!(
                "Access tokens must be provided via the {} environment variable, not stored in configuration",
                ACCESS_TOKEN_ENV
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("FUNNEL_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("funnel")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or return defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.web_part.enforce_env_only()?;

        if let Some(url) = &self.web_part.site_url {
            validate_site_url(url)?;
        }
        validate_page_size(self.search.page_size)?;
        validate_min_query_len(self.search.min_query_len)?;
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "web_part.title" => Ok(self.web_part.title.clone()),
            "web_part.placeholder" => Ok(self.web_part.placeholder.clone()),
            "web_part.site_url" => Ok(self
                .web_part
                .site_url
                .clone()
                .unwrap_or_else(|| "(not set - uses the host site)".to_string())),

            "search.page_size" => Ok(self.search.page_size.to_string()),
            "search.debounce_ms" => Ok(self.search.debounce_ms.to_string()),
            "search.min_query_len" => Ok(self.search.min_query_len.to_string()),
            "search.timeout_secs" => Ok(self.search.timeout_secs.to_string()),

            "web_part.access_token" | "access_token" => {
                match self.web_part.redacted_access_token()? {
                    Some(redacted) => Ok(redacted),
                    None => Ok(format!("(not set - use {} env var)", ACCESS_TOKEN_ENV)),
                }
            }

            _ => Err(unknown_key(key)),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "web_part.title" => {
                self.web_part.title = value.to_string();
            }
            "web_part.placeholder" => {
                self.web_part.placeholder = value.to_string();
            }
            "web_part.site_url" => {
                let value = value.trim();
                if value.is_empty() {
                    self.web_part.site_url = None;
                } else {
                    validate_site_url(value)?;
                    self.web_part.site_url = Some(value.trim_end_matches('/').to_string());
                }
            }

            "search.page_size" => {
                let size = parse_number(key, value)?;
                validate_page_size(size)?;
                self.search.page_size = size;
            }
            "search.debounce_ms" => {
                self.search.debounce_ms = parse_number(key, value)?;
            }
            "search.min_query_len" => {
                let len = parse_number(key, value)?;
                validate_min_query_len(len)?;
                self.search.min_query_len = len;
            }
            "search.timeout_secs" => {
                self.search.timeout_secs = parse_number(key, value)?;
            }

            "web_part.access_token" | "access_token" => {
                return Err(Error::ConfigError(format!(
                    "Access tokens cannot be stored in configuration for security. \
                     Set the {} environment variable instead.",
                    ACCESS_TOKEN_ENV
                )));
            }

            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let keys = [
            "web_part.title",
            "web_part.placeholder",
            "web_part.site_url",
            "web_part.access_token",
            "search.page_size",
            "search.debounce_ms",
            "search.min_query_len",
            "search.timeout_secs",
        ];

        keys.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn validate_site_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::ConfigError(format!(
            "Site URL must start with http:// or https://, got: {}",
            url
        )))
    }
}

fn validate_page_size(size: u32) -> Result<()> {
    if (1..=5000).contains(&size) {
        Ok(())
    } else {
        Err(Error::ConfigError(
            "search.page_size must be between 1 and 5000".to_string(),
        ))
    }
}

fn validate_min_query_len(len: usize) -> Result<()> {
    if len == 0 {
        return Err(Error::ConfigError(
            "search.min_query_len must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("Invalid {} value: {}", key, value)))
}

fn unknown_key(key: &str) -> Error {
    Error::ConfigError(format!(
        "Unknown configuration key: {}. Use `funnel config list` to see available keys.",
        key
    ))
}

/// Keep only the last four characters of a secret
fn redact(token: &str) -> String {
    let count = token.chars().count();
    if count <= 4 {
        "***".to_string()
    } else {
        let tail: String = token.chars().skip(count - 4).collect();
        format!("***{}", tail)
    }
}
