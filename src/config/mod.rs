use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    /// Defaults applied to newly added directories
    #[serde(default)]
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Name of the session restored on start
    #[serde(default = "default_session")]
    pub session: String,
    /// Quiet period before a session edit is written to disk
    #[serde(default = "default_save_delay_ms")]
    pub save_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_true")]
    pub ignore_dot: bool,
    #[serde(default = "default_true")]
    pub sync_on_load: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            session: default_session(),
            save_delay_ms: default_save_delay_ms(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            ignore_dot: true,
            sync_on_load: true,
        }
    }
}

impl Config {
    /// Default config file location
    ///
    /// `$TREESOURCE_CONFIG_PATH` wins over `<config_dir>/treesource/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("TREESOURCE_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("treesource").join("config.toml"))
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Create default config if it doesn't exist
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Session debounce delay
    #[must_use]
    pub const fn save_delay(&self) -> Duration {
        Duration::from_millis(self.core.save_delay_ms)
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return None;
        }

        match (parts[0], parts[1]) {
            ("core", "session") => Some(self.core.session.clone()),
            ("core", "save_delay_ms") => Some(self.core.save_delay_ms.to_string()),
            ("tracking", "ignore_dot") => Some(self.tracking.ignore_dot.to_string()),
            ("tracking", "sync_on_load") => Some(self.tracking.sync_on_load.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key (e.g., empty session name)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return Err(anyhow::anyhow!("Invalid configuration key: {key}"));
        }

        match (parts[0], parts[1]) {
            ("core", "session") => {
                if value.is_empty() || value.contains(['/', '\\']) {
                    return Err(anyhow::anyhow!("Invalid session name: {value}"));
                }
                self.core.session = value.to_string();
            }
            ("core", "save_delay_ms") => {
                self.core.save_delay_ms = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
            }
            ("tracking", "ignore_dot") => {
                self.tracking.ignore_dot = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            ("tracking", "sync_on_load") => {
                self.tracking.sync_on_load = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }
}

// Default functions for serde
fn default_session() -> String {
    "default".to_string()
}

const fn default_save_delay_ms() -> u64 {
    500
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_file() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("treesource/config.toml");

        let config = Config::load(&path)?;
        assert!(path.exists());
        assert_eq!(config.core.session, "default");
        assert_eq!(config.save_delay(), Duration::from_millis(500));
        assert!(config.tracking.ignore_dot);
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[tracking]\nignore_dot = false\n")?;

        let config = Config::load(&path)?;
        assert!(!config.tracking.ignore_dot);
        assert!(config.tracking.sync_on_load);
        assert_eq!(config.core.save_delay_ms, 500);
        Ok(())
    }

    #[test]
    fn test_get_set() -> Result<()> {
        let mut config = Config::default();
        config.set("core.save_delay_ms", "25")?;
        config.set("tracking.sync_on_load", "false")?;
        assert_eq!(config.get("core.save_delay_ms").as_deref(), Some("25"));
        assert_eq!(config.get("tracking.sync_on_load").as_deref(), Some("false"));

        assert!(config.set("core.save_delay_ms", "soon").is_err());
        assert!(config.set("core.session", "a/b").is_err());
        assert!(config.set("nope", "1").is_err());
        assert!(config.set("core.nope", "1").is_err());
        assert_eq!(config.get("core.nope"), None);
        Ok(())
    }
}
