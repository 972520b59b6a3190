use serde::Deserialize;
use std::path::PathBuf;

use centime_import::BankProfile;

/// Server configuration, read from `centime.toml` (or the path in
/// `CENTIME_CONFIG`). Every key is optional; a missing file means
/// all-defaults, which is enough for local use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Source-bank parsing profile; defaults to the Boursorama export.
    pub profile: BankProfile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8600".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("centime.db"),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os("CENTIME_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("centime.toml"));

        if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&text)?)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:8600");
        assert_eq!(config.storage.database, PathBuf::from("centime.db"));
        assert_eq!(config.profile.name, "boursorama");
    }

    #[test]
    fn partial_toml_keeps_defaults_elsewhere() {
        let config: Config = toml::from_str(
            r#"
            [server]
            bind = "0.0.0.0:9000"

            [profile]
            date_format = "%d/%m/%Y"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.profile.date_format, "%d/%m/%Y");
        assert_eq!(config.profile.delimiter, ";");
        assert_eq!(config.storage.database, PathBuf::from("centime.db"));
    }
}
