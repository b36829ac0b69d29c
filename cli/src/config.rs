//! TOML configuration for the CLI.
//!
//! The configuration file mirrors the layout consumed by the rest of the
//! system: `[SSHServer]`, `[Database]`, `[Time]`, and `[Setting]` tables.
//! A missing file is created with commented defaults; an existing file is
//! parsed into typed sections and validated before the store is touched.
//! Collaborators that only need raw values use [`AppConfig::get`].

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default configuration file name, created next to the binary.
pub const DEFAULT_CONFIG_PATH: &str = "Config.toml";

const DEFAULT_CONFIG: &str = r#"# SSH Alert configuration

[SSHServer]
# Advertised host name.
ServerName = "Debian Server"
# Listen port.
Port = 22

[Database]
# SQLite database path.
Path = "Database.db"

[Time]
# IANA timezone used for log timestamps.
TimeZone = "Asia/Shanghai"

[Setting]
# Check for updates automatically.
AutoUpdate = true
# Update servers, tried in order.
UpdateAddress = ["", ""]
# Update interval in hours.
Interval = 600
"#;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read or created.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML or misses required keys.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A configuration value violates an invariant.
    #[error("invalid config value for {key}: {reason}")]
    Invalid {
        /// Dotted `table.key` path of the offending value.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// `[SSHServer]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Advertised host name.
    #[serde(rename = "ServerName")]
    pub server_name: String,
    /// Listen port.
    #[serde(rename = "Port")]
    pub port: u16,
}

/// `[Database]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    /// Path of the SQLite database file.
    #[serde(rename = "Path")]
    pub path: String,
}

/// `[Time]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSection {
    /// IANA timezone name.
    #[serde(rename = "TimeZone")]
    pub timezone: String,
}

/// `[Setting]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingSection {
    /// Check for updates automatically.
    #[serde(rename = "AutoUpdate")]
    pub auto_update: bool,
    /// Update servers, tried in order.
    #[serde(rename = "UpdateAddress")]
    pub update_address: Vec<String>,
    /// Update interval in hours.
    #[serde(rename = "Interval")]
    pub interval_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Sections {
    #[serde(rename = "SSHServer")]
    server: ServerSection,
    #[serde(rename = "Database")]
    database: DatabaseSection,
    #[serde(rename = "Time")]
    time: TimeSection,
    #[serde(rename = "Setting")]
    setting: SettingSection,
}

/// Parsed and validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `[SSHServer]` values.
    pub server: ServerSection,
    /// `[Database]` values.
    pub database: DatabaseSection,
    /// `[Time]` values.
    pub time: TimeSection,
    /// `[Setting]` values.
    pub setting: SettingSection,
    raw: toml::Value,
}

impl AppConfig {
    /// Parses configuration from TOML text and validates it.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: toml::Value = toml::from_str(text)?;
        let sections: Sections = toml::from_str(text)?;
        let config = AppConfig {
            server: sections.server,
            database: sections.database,
            time: sections.time,
            setting: sections.setting,
            raw,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration file, creating it with defaults when
    /// absent.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            std::fs::write(path, DEFAULT_CONFIG)?;
            tracing::info!(path = %path.display(), "created default configuration file");
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Raw read-only access: the value at `[table] key`, if present.
    ///
    /// This is the accessor collaborators use when they only need a value
    /// and not the typed sections.
    pub fn get(&self, table: &str, key: &str) -> Option<&toml::Value> {
        self.raw.get(table)?.get(key)
    }

    fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "Database.Path".to_string(),
                reason: "database path must not be empty".to_string(),
            });
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                key: "SSHServer.Port".to_string(),
                reason: "port must be non-zero".to_string(),
            });
        }
        if self.time.timezone.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "Time.TimeZone".to_string(),
                reason: "timezone must not be empty".to_string(),
            });
        }
        if self.setting.interval_hours == 0 {
            return Err(ConfigError::Invalid {
                key: "Setting.Interval".to_string(),
                reason: "update interval must be at least one hour".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_and_validates() {
        let config = AppConfig::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.server_name, "Debian Server");
        assert_eq!(config.server.port, 22);
        assert_eq!(config.database.path, "Database.db");
        assert_eq!(config.time.timezone, "Asia/Shanghai");
        assert!(config.setting.auto_update);
        assert_eq!(config.setting.interval_hours, 600);
    }

    #[test]
    fn test_get_returns_raw_values() {
        let config = AppConfig::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(
            config.get("Database", "Path").and_then(|v| v.as_str()),
            Some("Database.db")
        );
        assert_eq!(
            config.get("SSHServer", "Port").and_then(|v| v.as_integer()),
            Some(22)
        );
        assert!(config.get("Database", "Missing").is_none());
        assert!(config.get("Missing", "Path").is_none());
    }

    #[test]
    fn test_empty_database_path_is_rejected() {
        let text = DEFAULT_CONFIG.replace("Path = \"Database.db\"", "Path = \"\"");
        let err = AppConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "Database.Path"));
    }

    #[test]
    fn test_zero_port_is_rejected() {
        let text = DEFAULT_CONFIG.replace("Port = 22", "Port = 0");
        let err = AppConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "SSHServer.Port"));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let text = DEFAULT_CONFIG.replace("Interval = 600", "Interval = 0");
        let err = AppConfig::parse(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "Setting.Interval"));
    }

    #[test]
    fn test_missing_section_is_a_parse_error() {
        let err = AppConfig::parse("[Database]\nPath = \"x.db\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_or_init_creates_default_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Config.toml");

        let config = AppConfig::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.database.path, "Database.db");

        // Loading again reads the file it just wrote.
        let again = AppConfig::load_or_init(&path).unwrap();
        assert_eq!(again.server.port, config.server.port);
    }
}
