use crate::core::path::{config_file, ensure_dir};
use crate::core::{ZiprepoError, ZiprepoResult};
use crate::di::ConfigProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GitHub REST API base URL (GitHub Enterprise uses `https://<host>/api/v3`)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Outbound call quota applied to file writes
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// How to wait for a freshly created repository before the first write
    #[serde(default)]
    pub readiness: ReadinessPolicy,

    /// Largest single input accepted by `ziprepo upload`, in bytes
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,

    /// File extensions accepted as upload inputs (case-insensitive).
    /// An empty list accepts every file.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Title and body of the pull request opened for existing repositories
    #[serde(default)]
    pub pull_request: PullRequestTemplate,
}

/// Fixed-window quota: at most `max_requests` per `per_minutes` minutes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub per_minutes: u32,
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(u64::from(self.per_minutes) * 60)
    }

    pub fn validate(&self) -> ZiprepoResult<()> {
        if self.max_requests == 0 || self.per_minutes == 0 {
            return Err(ZiprepoError::Config(format!(
                "rate_limit values must be greater than zero (max_requests: {}, per_minutes: {})",
                self.max_requests, self.per_minutes
            )));
        }
        Ok(())
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 5000,
            per_minutes: 60,
        }
    }
}

/// Wait strategy before writing into a just-created repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ReadinessPolicy {
    /// Sleep a fixed interval
    Grace {
        #[serde(default = "default_grace_ms")]
        grace_ms: u64,
    },
    /// Poll get-repository until it succeeds or the timeout elapses
    Poll {
        #[serde(default = "default_poll_interval_ms")]
        interval_ms: u64,
        #[serde(default = "default_poll_timeout_ms")]
        timeout_ms: u64,
    },
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        ReadinessPolicy::Grace {
            grace_ms: default_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestTemplate {
    pub title: String,
    pub body: String,
}

impl Default for PullRequestTemplate {
    fn default() -> Self {
        Self {
            title: "Update repository content".to_string(),
            body: "Updated repository content via ziprepo".to_string(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_max_input_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["zip".to_string()]
}

fn default_grace_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_timeout_ms() -> u64 {
    30_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            rate_limit: RateLimitSettings::default(),
            readiness: ReadinessPolicy::default(),
            max_input_bytes: default_max_input_bytes(),
            allowed_extensions: default_allowed_extensions(),
            pull_request: PullRequestTemplate::default(),
        }
    }
}

impl Config {
    /// Load config from platform-specific config directory, creating default if it doesn't exist
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\ziprepo\config.yaml
    /// - Linux: ~/.config/ziprepo/config.yaml
    /// - macOS: ~/Library/Application Support/ziprepo/config.yaml
    pub fn load() -> ZiprepoResult<Self> {
        let config_path = config_file()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> ZiprepoResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ZiprepoError::Config(format!("Failed to parse config: {}", e)))?;
        config.rate_limit.validate()?;
        Ok(config)
    }

    /// Save config to platform-specific config directory
    pub fn save(&self) -> ZiprepoResult<()> {
        let config_path = config_file()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ZiprepoError::Path("Invalid config path".to_string()))?;

        ensure_dir(config_dir)?;

        let content = serde_yaml::to_string(self)
            .map_err(|e| ZiprepoError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Whether a file name passes the extension allow-list
    pub fn is_extension_allowed(&self, file_name: &str) -> bool {
        extension_allowed(&self.allowed_extensions, file_name)
    }
}

/// Case-insensitive extension check; an empty list accepts every name
pub fn extension_allowed(allowed: &[String], file_name: &str) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let lower = file_name.to_ascii_lowercase();
    allowed.iter().any(|ext| {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        lower.ends_with(&format!(".{}", ext))
    })
}

impl ConfigProvider for Config {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn rate_limit(&self) -> &RateLimitSettings {
        &self.rate_limit
    }

    fn readiness(&self) -> &ReadinessPolicy {
        &self.readiness
    }

    fn max_input_bytes(&self) -> u64 {
        self.max_input_bytes
    }

    fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    fn pull_request(&self) -> &PullRequestTemplate {
        &self.pull_request
    }
}
