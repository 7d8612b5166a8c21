//! Process-wide configuration, resolved once at startup.
//!
//! Sources, later wins: compiled defaults, `~/.changecast/config.toml`, then
//! the environment. Credentials fall back to fixed per-user files when the
//! environment does not provide them.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_DIR: &str = ".changecast";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_DAYS: u32 = 7;
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3040";
pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";

#[derive(Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub model: String,
    pub default_days: u32,
    pub server_url: String,
    pub github_api_url: String,
    pub anthropic_api_url: String,
    pub history_path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    model: Option<String>,
    default_days: Option<u32>,
    server_url: Option<String>,
    github_api_url: Option<String>,
    anthropic_api_url: Option<String>,
    history_path: Option<PathBuf>,
}

impl Config {
    /// Resolves configuration from the real environment and home directory.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("could not determine the home directory".to_string()))?;
        Self::from_sources(|key| std::env::var(key).ok(), &home)
    }

    pub fn from_sources<F>(env: F, home: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = home.join(CONFIG_DIR);
        let file = read_file_config(&dir.join("config.toml"))?;

        let github_token = non_empty(env("GITHUB_TOKEN"))
            .or_else(|| read_credential(&dir.join("github_token")));

        let anthropic_api_key = non_empty(env("ANTHROPIC_API_KEY"))
            .or_else(|| read_credential(&dir.join("anthropic_key")))
            .or_else(|| read_credential(&home.join(".anthropic").join("api_key")));

        let model = non_empty(env("CHANGECAST_MODEL"))
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let history_path = non_empty(env("CHANGECAST_HISTORY"))
            .map(PathBuf::from)
            .or(file.history_path)
            .unwrap_or_else(|| dir.join("history.json"));

        let default_days = file.default_days.unwrap_or(DEFAULT_DAYS);
        if default_days == 0 {
            return Err(Error::Config("default_days must be positive".to_string()));
        }

        Ok(Self {
            github_token,
            anthropic_api_key,
            model,
            default_days,
            server_url: file
                .server_url
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            github_api_url: file
                .github_api_url
                .unwrap_or_else(|| GITHUB_API_URL.to_string()),
            anthropic_api_url: file
                .anthropic_api_url
                .unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
            history_path,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            anthropic_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            default_days: DEFAULT_DAYS,
            server_url: DEFAULT_SERVER_URL.to_string(),
            github_api_url: GITHUB_API_URL.to_string(),
            anthropic_api_url: ANTHROPIC_API_URL.to_string(),
            history_path: PathBuf::from(CONFIG_DIR).join("history.json"),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("model", &self.model)
            .field("default_days", &self.default_days)
            .field("server_url", &self.server_url)
            .field("github_api_url", &self.github_api_url)
            .field("anthropic_api_url", &self.anthropic_api_url)
            .field("history_path", &self.history_path)
            .finish()
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

fn read_credential(path: &Path) -> Option<String> {
    let value = non_empty(std::fs::read_to_string(path).ok());
    if value.is_some() {
        debug!("Using credential from {:?}", path);
    }
    value
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_any_source() {
        let home = TempDir::new().unwrap();
        let config = Config::from_sources(env_from(&[]), home.path()).unwrap();

        assert!(config.github_token.is_none());
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.default_days, DEFAULT_DAYS);
        assert_eq!(
            config.history_path,
            home.path().join(CONFIG_DIR).join("history.json")
        );
    }

    #[test]
    fn test_environment_wins_over_files() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("github_token"), "file-token\n").unwrap();

        let config =
            Config::from_sources(env_from(&[("GITHUB_TOKEN", "env-token")]), home.path()).unwrap();
        assert_eq!(config.github_token.as_deref(), Some("env-token"));

        let config = Config::from_sources(env_from(&[]), home.path()).unwrap();
        assert_eq!(config.github_token.as_deref(), Some("file-token"));
    }

    #[test]
    fn test_anthropic_key_falls_back_to_second_file() {
        let home = TempDir::new().unwrap();
        let legacy = home.path().join(".anthropic");
        std::fs::create_dir_all(&legacy).unwrap();
        std::fs::write(legacy.join("api_key"), "sk-legacy").unwrap();

        let config = Config::from_sources(env_from(&[]), home.path()).unwrap();
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-legacy"));
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "model = \"claude-test\"\ndefault_days = 14\nserver_url = \"http://127.0.0.1:9000\"\n",
        )
        .unwrap();

        let config = Config::from_sources(env_from(&[]), home.path()).unwrap();
        assert_eq!(config.model, "claude-test");
        assert_eq!(config.default_days, 14);
        assert_eq!(config.server_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_zero_default_days_is_rejected() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "default_days = 0\n").unwrap();

        assert!(matches!(
            Config::from_sources(env_from(&[]), home.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = Config {
            anthropic_api_key: Some("sk-secret".to_string()),
            ..Config::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("[REDACTED]"));
    }
}
