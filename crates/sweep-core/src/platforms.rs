//! File-based platform configuration.
//!
//! One JSON document describes which sources are enabled and their
//! credentials. A missing file is not an error: a default document is
//! written with forums enabled and all API-backed platforms disabled,
//! so a fresh checkout can collect without any credentials.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_reddit_user_agent")]
    pub user_agent: String,
}

fn default_reddit_user_agent() -> String {
    "sweep/0.1".to_string()
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: default_reddit_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bearer_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacebookConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Graph API page or user access token.
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_forum_urls")]
    pub urls: Vec<String>,
    /// Pause between requests to consecutive forum URLs.
    #[serde(default = "default_request_delay")]
    pub request_delay_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_forum_urls() -> Vec<String> {
    vec!["https://news.ycombinator.com".to_string()]
}

fn default_request_delay() -> u64 {
    2
}

impl Default for ForumsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            urls: default_forum_urls(),
            request_delay_secs: default_request_delay(),
        }
    }
}

/// The full platforms document: one block per source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformsConfig {
    #[serde(default)]
    pub reddit: RedditConfig,
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub facebook: FacebookConfig,
    #[serde(default)]
    pub forums: ForumsConfig,
}

impl PlatformsConfig {
    /// Names of platforms currently enabled, in a stable order.
    #[must_use]
    pub fn enabled_platforms(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.forums.enabled {
            names.push("forums");
        }
        if self.reddit.enabled {
            names.push("reddit");
        }
        if self.twitter.enabled {
            names.push("twitter");
        }
        if self.facebook.enabled {
            names.push("facebook");
        }
        names
    }
}

/// Load the platforms document, creating a default file if none exists.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if the default document cannot be written.
pub fn load_or_init_platforms(path: &Path) -> Result<PlatformsConfig, ConfigError> {
    if !path.exists() {
        let config = PlatformsConfig::default();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::PlatformsFileIo {
                path: path.display().to_string(),
                source: e,
            })?;
        }
        let body = serde_json::to_string_pretty(&config)?;
        std::fs::write(path, body).map_err(|e| ConfigError::PlatformsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PlatformsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let config: PlatformsConfig = serde_json::from_str(&content)?;
    validate_platforms(&config)?;
    Ok(config)
}

fn validate_platforms(config: &PlatformsConfig) -> Result<(), ConfigError> {
    if config.forums.enabled && config.forums.urls.is_empty() {
        return Err(ConfigError::Validation(
            "forums are enabled but no forum URLs are configured".to_string(),
        ));
    }
    if config.reddit.enabled
        && (config.reddit.client_id.is_empty() || config.reddit.client_secret.is_empty())
    {
        return Err(ConfigError::Validation(
            "reddit is enabled but client_id/client_secret are not set".to_string(),
        ));
    }
    if config.twitter.enabled && config.twitter.bearer_token.is_empty() {
        return Err(ConfigError::Validation(
            "twitter is enabled but bearer_token is not set".to_string(),
        ));
    }
    if config.facebook.enabled && config.facebook.access_token.is_empty() {
        return Err(ConfigError::Validation(
            "facebook is enabled but access_token is not set".to_string(),
        ));
    }
    Ok(())
}
