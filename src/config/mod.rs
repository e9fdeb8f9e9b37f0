//! Configuration management for shotlog

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::client::SortOrder;
use crate::client::models::CredentialSet;
use crate::error::{ConfigError, Result};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SHOTLOG_CONFIG";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// OAuth client credentials and refresh token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialSet>,

    /// Storage API host override for development and testing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Files requested per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Shots shown per `list` invocation
    #[serde(default = "default_num_results")]
    pub num_results: usize,

    /// Default listing order
    #[serde(default)]
    pub order: SortOrder,
}

fn default_page_size() -> usize {
    1000
}

fn default_num_results() -> usize {
    1000
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            num_results: default_num_results(),
            order: SortOrder::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".shotlog").join("config.yaml"))
    }

    /// Resolve the config path: explicit override first, then the default.
    ///
    /// The `--config` flag reads `SHOTLOG_CONFIG` through clap, so the
    /// override already reflects the environment.
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration, falling back to defaults when no file exists yet
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match Self::load_at(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to an optional override path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Credentials are secrets: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.preferences.page_size == 0 {
            return Err(ConfigError::Invalid("preferences.page_size must be at least 1".to_string()).into());
        }
        if self.preferences.num_results == 0 {
            return Err(
                ConfigError::Invalid("preferences.num_results must be at least 1".to_string()).into(),
            );
        }
        Ok(())
    }

    /// The stored credentials, or an error pointing at `shotlog auth set`
    pub fn require_credentials(&self) -> Result<&CredentialSet> {
        self.credentials
            .as_ref()
            .ok_or_else(|| ConfigError::MissingCredentials.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.credentials.is_none());
        assert!(config.api_host.is_none());
        assert_eq!(config.preferences.page_size, 1000);
        assert_eq!(config.preferences.num_results, 1000);
        assert_eq!(config.preferences.order, SortOrder::Desc);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = Config {
            credentials: Some(CredentialSet::new("id", "secret", "refresh")),
            ..Config::default()
        };

        config.save_to(path.clone()).unwrap();
        let loaded = Config::load_from(path.clone()).unwrap();

        assert_eq!(loaded, config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = Config::load_from(path.clone()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(ConfigError::NotFound)));

        let config = Config::load_or_default(path.to_str()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_preferences_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "preferences:\n  order: asc\n").unwrap();

        let config = Config::load_from(path).unwrap();

        assert_eq!(config.preferences.order, SortOrder::Asc);
        assert_eq!(config.preferences.page_size, 1000);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "preferences:\n  page_size: 0\n").unwrap();

        let err = Config::load_from(path).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "credentials: [unclosed").unwrap();

        let err = Config::load_from(path).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_require_credentials() {
        let err = Config::default().require_credentials().unwrap_err();
        assert!(err.to_string().contains("shotlog auth set"));
    }

    #[test]
    fn test_resolve_path_override() {
        let path = Config::resolve_path(Some("/tmp/custom.yaml")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.yaml"));
    }
}
