//! Configuration loader - optional YAML page text + environment settings

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_DATA_FILE: &str = "3d_cross_table_updated.csv";

/// Page text, loaded from dashboard.yaml when present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub title: String,
    pub heading: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "3D Cross-Table Dashboard".to_string(),
            heading: "3D Cross-Table of Sensors, Signal Processing, and Track Parameters".to_string(),
        }
    }
}

impl PageConfig {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PageConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if it exists, built-in defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading page config from {:?}", path);
            Self::load(path)
        } else {
            tracing::debug!("Page config {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

/// Process settings from the environment (.env honoured)
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub data_file: PathBuf,
    /// Access log path; `None` disables the access log
    pub access_log: Option<PathBuf>,
    pub log_dir: String,
    pub page_config: PathBuf,
}

impl Settings {
    /// Load settings from .env file and process environment
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Settings {
            port: lookup("PORT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            data_file: lookup("DATA_FILE")
                .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
                .into(),
            access_log: lookup("ACCESS_LOG")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            page_config: lookup("DASHBOARD_CONFIG")
                .unwrap_or_else(|| "dashboard.yaml".to_string())
                .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]);
        assert_eq!(settings.port, 10000);
        assert_eq!(settings.data_file, PathBuf::from("3d_cross_table_updated.csv"));
        assert_eq!(settings.access_log, None);
        assert_eq!(settings.log_dir, "logs");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        assert_eq!(settings_from(&[("PORT", "not-a-port")]).port, DEFAULT_PORT);
        assert_eq!(settings_from(&[("PORT", "8050")]).port, 8050);
    }

    #[test]
    fn test_empty_access_log_disables() {
        assert_eq!(settings_from(&[("ACCESS_LOG", "")]).access_log, None);
        assert_eq!(
            settings_from(&[("ACCESS_LOG", "access_log.txt")]).access_log,
            Some(PathBuf::from("access_log.txt"))
        );
    }

    #[test]
    fn test_page_config_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.yaml");
        std::fs::write(&path, "title: Track Study\n").unwrap();

        let config = PageConfig::load_or_default(&path).unwrap();
        assert_eq!(config.title, "Track Study");
        assert_eq!(config.heading, PageConfig::default().heading);
    }

    #[test]
    fn test_page_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PageConfig::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, PageConfig::default());
    }

    #[test]
    fn test_page_config_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.yaml");
        std::fs::write(&path, "title: [unclosed\n").unwrap();
        assert!(PageConfig::load_or_default(&path).is_err());
    }
}
