//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/margins/config.toml)
//! 3. Environment variables (MARGINS_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_NAMESPACE;
use crate::sync::RefreshPolicy;

/// Environment variable prefix
const ENV_PREFIX: &str = "MARGINS";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the cache slot
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Where content lives: an http(s) URL or a local directory
    #[serde(default = "default_content_base")]
    pub content_base: String,

    /// Cache slot namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// When to trust the cache instead of refetching
    #[serde(default)]
    pub refresh_policy: RefreshPolicy,

    /// Public site URL, used by sitemap and RSS exports
    #[serde(default)]
    pub site_url: Option<String>,

    /// Site name used in feeds
    #[serde(default = "default_site_title")]
    pub site_title: String,

    /// Per-request timeout for remote content
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Log file path (default: stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            content_base: default_content_base(),
            namespace: default_namespace(),
            refresh_policy: RefreshPolicy::default(),
            site_url: None,
            site_title: default_site_title(),
            fetch_timeout_secs: default_fetch_timeout(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (MARGINS_DATA_DIR, MARGINS_CONTENT_BASE, ...)
    /// 2. Config file (~/.config/margins/config.toml or MARGINS_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_CONTENT_BASE", ENV_PREFIX)) {
            if !val.is_empty() {
                self.content_base = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_REFRESH_POLICY", ENV_PREFIX)) {
            match val.parse() {
                Ok(policy) => self.refresh_policy = policy,
                Err(e) => tracing::warn!("Ignoring {}_REFRESH_POLICY: {}", ENV_PREFIX, e),
            }
        }

        // Empty string clears it
        if let Ok(val) = std::env::var(format!("{}_SITE_URL", ENV_PREFIX)) {
            self.site_url = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Ensure data directory exists
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with MARGINS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("margins")
            .join("config.toml")
    }

    /// Get the path to the cache slot
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.namespace))
    }

    /// Base URL used by exports, without a trailing `index.html`
    pub fn export_base(&self) -> String {
        let base = self.site_url.as_deref().unwrap_or("");
        let base = base
            .strip_suffix("index.html")
            .or_else(|| base.strip_suffix("index.htm"))
            .unwrap_or(base);
        if base.is_empty() || base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        }
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("margins")
}

fn default_content_base() -> String {
    ".".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_site_title() -> String {
    "Mark's Margins".to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "MARGINS_DATA_DIR",
        "MARGINS_CONTENT_BASE",
        "MARGINS_REFRESH_POLICY",
        "MARGINS_SITE_URL",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.refresh_policy, RefreshPolicy::VersionChecked);
        assert_eq!(config.content_base, ".");
        assert_eq!(config.fetch_timeout_secs, 10);
        assert!(config.data_dir.ends_with("margins"));
    }

    #[test]
    fn test_cache_path() {
        let config = Config::default();
        assert!(config
            .cache_path()
            .ends_with(format!("{}.json", DEFAULT_NAMESPACE)));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("MARGINS_DATA_DIR", "/tmp/margins-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/margins-test"));
    }

    #[test]
    fn test_env_override_refresh_policy() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("MARGINS_REFRESH_POLICY", "cache-if-valid");
        config.apply_env_overrides();
        assert_eq!(config.refresh_policy, RefreshPolicy::CacheIfValid);

        // Invalid values keep the previous policy
        env::set_var("MARGINS_REFRESH_POLICY", "sometimes");
        config.apply_env_overrides();
        assert_eq!(config.refresh_policy, RefreshPolicy::CacheIfValid);
    }

    #[test]
    fn test_env_override_site_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("MARGINS_SITE_URL", "https://margins.example");
        config.apply_env_overrides();
        assert_eq!(config.site_url.as_deref(), Some("https://margins.example"));

        env::set_var("MARGINS_SITE_URL", "");
        config.apply_env_overrides();
        assert!(config.site_url.is_none());
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            content_base = "https://margins.example/"
            refresh_policy = "always-refresh-articles"
            site_url = "https://margins.example/index.html"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.content_base, "https://margins.example/");
        assert_eq!(config.refresh_policy, RefreshPolicy::AlwaysRefreshArticles);
        assert_eq!(config.export_base(), "https://margins.example/");
        assert_eq!(config.site_title, "Mark's Margins");
    }

    #[test]
    fn test_serialization_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/margins"),
            site_url: Some("https://example.com".to_string()),
            refresh_policy: RefreshPolicy::CacheIfValid,
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("refresh_policy = \"cache-if-valid\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.site_url, config.site_url);
        assert_eq!(parsed.refresh_policy, config.refresh_policy);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("MARGINS_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.refresh_policy, RefreshPolicy::VersionChecked);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_to_path() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            site_title: "Elsewhere".to_string(),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.site_title, "Elsewhere");
    }

    #[test]
    fn test_save_uses_config_env_path() {
        let _guard = EnvGuard::new(&["MARGINS_CONFIG", "MARGINS_SITE_URL"]);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        env::set_var("MARGINS_CONFIG", &path);

        let config = Config {
            site_url: Some("https://example.com".to_string()),
            ..Config::default()
        };
        config.save().unwrap();

        assert_eq!(Config::config_file_path(), path);
        let loaded = Config::load().unwrap();
        assert_eq!(loaded.site_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_export_base() {
        let mut config = Config::default();
        assert_eq!(config.export_base(), "");

        config.site_url = Some("https://x.dev".to_string());
        assert_eq!(config.export_base(), "https://x.dev/");

        config.site_url = Some("https://x.dev/blog/index.htm".to_string());
        assert_eq!(config.export_base(), "https://x.dev/blog/");
    }
}
