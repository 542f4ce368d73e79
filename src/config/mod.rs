use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::accel::Platform;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory new machine definitions are saved to
    pub machines_path: PathBuf,
    /// Force the platform used to pick accelerator tabs (detected when unset)
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Log file used while the TUI owns the terminal
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| home.join(".local").join("share"))
            .join("vm-accel");

        Self {
            machines_path: data_dir.join("machines"),
            platform: None,
            log_file: data_dir.join("vm-accel.log"),
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Self::default())
        }
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("vm-accel")
            .join("config.toml")
    }

    /// Platform to build the page for
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::detect)
    }

    /// Default save location for a machine with the given name
    pub fn machine_file(&self, name: &str) -> PathBuf {
        self.machines_path.join(format!("{}.json", file_stem(name)))
    }
}

/// Lowercase, dash separated file name for a machine
fn file_stem(name: &str) -> String {
    let stem = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if stem.is_empty() {
        "machine".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_platform_override() {
        let config = Config::parse(
            r#"
            machines_path = "/srv/machines"
            platform = "freebsd"
            log_file = "/tmp/vm-accel.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.machines_path, PathBuf::from("/srv/machines"));
        assert_eq!(config.platform(), Platform::FreeBsd);
    }

    #[test]
    fn test_parse_without_platform_detects() {
        let config = Config::parse(
            r#"
            machines_path = "/srv/machines"
            log_file = "/tmp/vm-accel.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.platform, None);
        assert_eq!(config.platform(), Platform::detect());
    }

    #[test]
    fn test_parse_rejects_unknown_platform() {
        let result = Config::parse(
            r#"
            machines_path = "/srv/machines"
            platform = "plan9"
            log_file = "/tmp/vm-accel.log"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_machine_file() {
        let config = Config {
            machines_path: PathBuf::from("/srv/machines"),
            platform: None,
            log_file: PathBuf::from("/tmp/log"),
        };
        assert_eq!(
            config.machine_file("Windows 10 Pro"),
            PathBuf::from("/srv/machines/windows-10-pro.json")
        );
        assert_eq!(config.machine_file("  "), PathBuf::from("/srv/machines/machine.json"));
    }

    #[test]
    fn test_round_trip_toml() {
        let config = Config {
            machines_path: PathBuf::from("/srv/machines"),
            platform: Some(Platform::MacOs),
            log_file: PathBuf::from("/tmp/log"),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("platform = \"macos\""));
        let back = Config::parse(&text).unwrap();
        assert_eq!(back.platform, Some(Platform::MacOs));
    }
}
