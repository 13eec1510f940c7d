use super::Result;
use crate::error::StorageError;
use dirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Namespace shown when a profile has not picked one yet
pub const DEFAULT_NAMESPACE: &str = "ops-system";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:80";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub default_profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Profile {
    pub server_url: String,
    pub namespace: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            namespace: None,
            timeout_seconds: None,
        }
    }
}

impl Config {
    pub fn default() -> Self {
        Self {
            default_profile: None,
            profiles: HashMap::new(),
        }
    }

    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: e.to_string(),
            })?;

        Ok(config)
    }

    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|_| StorageError::ConfigSaveFailed)?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(StorageError::ConfigDirNotFound)?;

        let app_config_dir = config_dir.join("opsdash");
        let config_file = app_config_dir.join("config.toml");

        Ok(config_file)
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Selected namespace for a profile, falling back to the conventional
    /// home namespace
    pub fn namespace_for(&self, profile: &str) -> &str {
        self.get_profile(profile)
            .and_then(|p| p.namespace.as_deref())
            .unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Persist a namespace selection; returns false when the profile is unknown
    pub fn set_namespace(&mut self, profile: &str, namespace: String) -> bool {
        match self.profiles.get_mut(profile) {
            Some(p) => {
                p.namespace = Some(namespace);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_profile, None);
        assert_eq!(config.profiles.len(), 0);
    }

    #[test]
    fn test_profile_management() {
        let mut config = Config::default();
        let profile = Profile {
            server_url: "http://example.test".to_string(),
            namespace: Some("team-a".to_string()),
            timeout_seconds: Some(30),
        };
        config.set_profile("test".to_string(), profile.clone());

        let retrieved = config.get_profile("test");
        assert!(retrieved.is_some());
        if let Some(retrieved) = retrieved {
            assert_eq!(retrieved.server_url, profile.server_url);
            assert_eq!(retrieved.namespace, profile.namespace);
            assert_eq!(retrieved.timeout_seconds, profile.timeout_seconds);
        }
        assert!(config.get_profile("nonexistent").is_none());
    }

    #[test]
    fn test_namespace_defaults_and_selection() {
        let mut config = Config::default();
        config.set_profile(
            "test".to_string(),
            Profile {
                server_url: "http://example.test".to_string(),
                namespace: None,
                timeout_seconds: None,
            },
        );

        // Unset and unknown profiles both fall back to the default
        assert_eq!(config.namespace_for("test"), DEFAULT_NAMESPACE);
        assert_eq!(config.namespace_for("missing"), DEFAULT_NAMESPACE);

        assert!(config.set_namespace("test", "team-b".to_string()));
        assert_eq!(config.namespace_for("test"), "team-b");

        assert!(!config.set_namespace("missing", "team-b".to_string()));
    }

    #[test]
    fn test_config_load_save() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.default_profile = Some("test".to_string());
        config.profiles.insert(
            "test".to_string(),
            Profile {
                server_url: "http://example.test".to_string(),
                namespace: Some("ops-system".to_string()),
                timeout_seconds: Some(30),
            },
        );

        config
            .save(Some(config_path.clone()))
            .expect("Failed to save config");

        let loaded_config = Config::load(Some(config_path)).expect("Failed to load config");

        assert_eq!(loaded_config.default_profile, config.default_profile);
        assert_eq!(loaded_config.profiles.len(), 1);
        assert_eq!(loaded_config.namespace_for("test"), "ops-system");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load(Some(temp_dir.path().join("absent.toml")));
        assert!(config.is_ok());

        let config = config.expect("Failed to load default config");
        assert_eq!(config.default_profile, None);
        assert_eq!(config.profiles.len(), 0);
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "profiles = \"not a table\"").expect("Failed to write file");

        let result = Config::load(Some(config_path));
        assert!(matches!(
            result,
            Err(StorageError::ConfigParseError { .. })
        ));
    }
}
