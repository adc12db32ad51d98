use crate::core::path::{config_file, ensure_dir};
use crate::core::{AuditError, AuditResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GitHub REST base URL (GraphQL lives at `{github_api_url}/graphql`)
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Advisory feed fetched once per run
    #[serde(default = "default_advisory_feed_url")]
    pub advisory_feed_url: String,

    /// Ref used when a repository reports no default branch
    #[serde(default = "default_branch_fallback")]
    pub default_branch_fallback: String,

    /// File name collected from every repository tree, at any depth
    #[serde(default = "default_lockfile_name")]
    pub lockfile_name: String,

    /// Upper bound on repositories listed per organization
    #[serde(default = "default_repository_limit")]
    pub repository_limit: usize,

    /// Per-request timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries for transient HTTP failures (0 disables retrying)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Repositories fetched in parallel while collecting
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_advisory_feed_url() -> String {
    "https://socket.dev/api/blog/feed.atom".to_string()
}

fn default_branch_fallback() -> String {
    "main".to_string()
}

fn default_lockfile_name() -> String {
    "package-lock.json".to_string()
}

fn default_repository_limit() -> usize {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_concurrency() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_api_url: default_github_api_url(),
            advisory_feed_url: default_advisory_feed_url(),
            default_branch_fallback: default_branch_fallback(),
            lockfile_name: default_lockfile_name(),
            repository_limit: default_repository_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            concurrency: default_concurrency(),
        }
    }
}

impl Config {
    /// Load config from the platform-specific config directory, creating a
    /// default one if it doesn't exist
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\lockaudit\config.yaml
    /// - Linux: ~/.config/lockaudit/config.yaml
    /// - macOS: ~/Library/Application Support/lockaudit/config.yaml
    pub fn load() -> AuditResult<Self> {
        Self::load_from(&config_file()?)
    }

    /// Load config from an explicit path, writing defaults there if missing
    pub fn load_from(path: &Path) -> AuditResult<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> AuditResult<()> {
        if let Some(dir) = path.parent() {
            ensure_dir(dir)?;
        }

        let content = serde_yaml::to_string(self)?;

        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> AuditResult<()> {
        if self.concurrency == 0 {
            return Err(AuditError::Config("concurrency must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AuditError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.default_branch_fallback.trim().is_empty() {
            return Err(AuditError::Config(
                "default_branch_fallback cannot be empty".to_string(),
            ));
        }
        if self.lockfile_name.is_empty() {
            return Err(AuditError::Config("lockfile_name cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.default_branch_fallback, "main");
        assert_eq!(config.lockfile_name, "package-lock.json");
        assert_eq!(config.repository_limit, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_missing_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "default_branch_fallback: master\nconcurrency: 8\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_branch_fallback, "master");
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_invalid_yaml_is_yaml_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "concurrency: [unclosed\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, AuditError::Yaml(_)));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "concurrency: 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }

    #[test]
    fn test_blank_fallback_rejected() {
        let config = Config {
            default_branch_fallback: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
