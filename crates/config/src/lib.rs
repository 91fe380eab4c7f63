use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Client credentials and tokens for the WHOOP developer API.
///
/// Persisted as JSON. `client_id`, `client_secret`, and `redirect_uri` come
/// from the WHOOP developer dashboard on a by-project basis; the token fields
/// start as `null` and are filled in by the authorization flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Config {
    /// Keys that must be present and non-empty before records can be fetched,
    /// in the order they are reported.
    pub const REQUIRED_KEYS: [&'static str; 5] = [
        "client_id",
        "client_secret",
        "redirect_uri",
        "access_token",
        "refresh_token",
    ];

    /// Required keys that are absent or empty. `null` and `""` both count as
    /// missing.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let values = [
            self.client_id.as_str(),
            self.client_secret.as_str(),
            self.redirect_uri.as_str(),
            self.access_token.as_deref().unwrap_or(""),
            self.refresh_token.as_deref().unwrap_or(""),
        ];
        Self::REQUIRED_KEYS
            .into_iter()
            .zip(values)
            .filter(|(_, value)| value.is_empty())
            .map(|(key, _)| key)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }
}

/// Path-addressed handle to the config file.
///
/// Every operation reloads from disk; there is no caching and no expectation
/// of concurrent writers.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `~/.wristband/config.json`, falling back to
    /// `./config.json` when no home directory can be resolved.
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".wristband/config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config file. A missing or unparseable file is logged and
    /// degrades to an empty config rather than failing the caller.
    pub fn load(&self) -> Config {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(path = %self.path.display(), %e, "failed to read config file");
                return Config::default();
            },
        };
        match serde_json::from_str(&raw) {
            Ok(config) => {
                tracing::debug!(path = %self.path.display(), "configuration loaded");
                config
            },
            Err(e) => {
                tracing::error!(path = %self.path.display(), %e, "invalid JSON in config file");
                Config::default()
            },
        }
    }

    /// Write the config as pretty-printed JSON, creating parent directories
    /// as needed.
    pub fn save(&self, config: &Config) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write config to {}", self.path.display()))?;
        Ok(())
    }

    /// Overwrite the two token fields, leaving the client credentials as they
    /// are on disk.
    pub fn update_tokens(&self, access_token: &str, refresh_token: &str) -> anyhow::Result<()> {
        let mut config = self.load();
        config.access_token = Some(access_token.to_string());
        config.refresh_token = Some(refresh_token.to_string());
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("config.json"))
    }

    #[test]
    fn test_missing_file_yields_empty_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = store_in(&tmp).load();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_json_yields_empty_config() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        std::fs::write(store.path(), "not json {").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn test_missing_keys_reports_exactly_the_gaps() {
        let config = Config {
            client_id: "abc".into(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8080".into(),
            access_token: None,
            refresh_token: Some(String::new()),
        };
        assert_eq!(
            config.missing_keys(),
            vec!["client_secret", "access_token", "refresh_token"]
        );
        assert!(!config.is_complete());
    }

    #[test]
    fn test_complete_config_has_no_missing_keys() {
        let config = Config {
            client_id: "id".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:8080".into(),
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
        };
        assert!(config.missing_keys().is_empty());
        assert!(config.is_complete());
    }

    #[test]
    fn test_save_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        let config = Config {
            client_id: "id".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:8080".into(),
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
        };
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }

    #[test]
    fn test_update_tokens_preserves_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        store
            .save(&Config {
                client_id: "id".into(),
                client_secret: "secret".into(),
                redirect_uri: "http://localhost:8080".into(),
                access_token: Some("old-access".into()),
                refresh_token: Some("old-refresh".into()),
            })
            .unwrap();

        store.update_tokens("new-access", "new-refresh").unwrap();

        let config = store.load();
        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "secret");
        assert_eq!(config.access_token.as_deref(), Some("new-access"));
        assert_eq!(config.refresh_token.as_deref(), Some("new-refresh"));
    }

    #[test]
    fn test_partial_file_still_loads() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        std::fs::write(store.path(), r#"{"client_id": "abc"}"#).unwrap();

        let config = store.load();
        assert_eq!(config.client_id, "abc");
        assert_eq!(
            config.missing_keys(),
            vec![
                "client_secret",
                "redirect_uri",
                "access_token",
                "refresh_token"
            ]
        );
    }
}
