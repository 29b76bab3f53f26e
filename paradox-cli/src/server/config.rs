use std::env;

use serde::Deserialize;
use tracing::warn;

/// Top-level paradox.toml configuration
#[derive(Debug, Deserialize, Default)]
pub struct PdServerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Overrides the credential stored in the snapshot when present.
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_storage")]
    pub storage: StorageBackend,
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Sled,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "sled" => Ok(StorageBackend::Sled),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

// ── Default value functions ──────────────────────────

fn default_port() -> u16 {
    3001
}

fn default_hostname() -> String {
    "0.0.0.0".to_string()
}

fn default_storage() -> StorageBackend {
    StorageBackend::File
}

fn default_data_file() -> String {
    "data.json".to_string()
}

fn default_data_dir() -> String {
    "./data".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            hostname: default_hostname(),
            storage: default_storage(),
            data_file: default_data_file(),
            data_dir: default_data_dir(),
        }
    }
}

impl PdServerConfig {
    /// Load configuration from a TOML file, falling back to defaults if the file
    /// doesn't exist or cannot be parsed.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!("Failed to parse {}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // PARADOX_PORT
        if let Some(val) = lookup("PARADOX_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PARADOX_PORT value: {}", val),
            }
        }

        // PARADOX_HOSTNAME
        if let Some(val) = lookup("PARADOX_HOSTNAME") {
            self.server.hostname = val;
        }

        // PARADOX_STORAGE
        if let Some(val) = lookup("PARADOX_STORAGE") {
            match val.parse::<StorageBackend>() {
                Ok(storage) => self.server.storage = storage,
                Err(e) => warn!("Ignoring PARADOX_STORAGE: {}", e),
            }
        }

        // PARADOX_DATA_FILE / PARADOX_DATA_DIR
        if let Some(val) = lookup("PARADOX_DATA_FILE") {
            self.server.data_file = val;
        }
        if let Some(val) = lookup("PARADOX_DATA_DIR") {
            self.server.data_dir = val;
        }

        // PARADOX_ADMIN_USERNAME / PARADOX_ADMIN_PASSWORD, only as a pair
        // unless [admin] already supplies the other half
        match (
            lookup("PARADOX_ADMIN_USERNAME"),
            lookup("PARADOX_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => {
                self.admin = Some(AdminConfig { username, password });
            }
            (Some(username), None) => match self.admin.as_mut() {
                Some(admin) => admin.username = username,
                None => warn!("PARADOX_ADMIN_USERNAME is ignored without a password"),
            },
            (None, Some(password)) => match self.admin.as_mut() {
                Some(admin) => admin.password = password,
                None => warn!("PARADOX_ADMIN_PASSWORD is ignored without a username"),
            },
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = PdServerConfig::parse("").unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.hostname, "0.0.0.0");
        assert_eq!(config.server.storage, StorageBackend::File);
        assert_eq!(config.server.data_file, "data.json");
        assert!(config.admin.is_none());
    }

    #[test]
    fn parses_full_file() {
        let config = PdServerConfig::parse(
            r#"
[server]
port = 8080
storage = "sled"
data_dir = "/var/lib/paradox"

[admin]
username = "ops"
password = "hunter2"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.storage, StorageBackend::Sled);
        assert_eq!(config.server.data_dir, "/var/lib/paradox");
        assert_eq!(
            config.admin,
            Some(AdminConfig {
                username: "ops".to_string(),
                password: "hunter2".to_string()
            })
        );
    }

    #[test]
    fn unknown_storage_is_an_error() {
        assert!(PdServerConfig::parse("[server]\nstorage = \"s3\"").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = PdServerConfig::parse("[server]\nport = 8080").unwrap();
        config.apply_overrides(lookup(&[
            ("PARADOX_PORT", "9000"),
            ("PARADOX_STORAGE", "memory"),
            ("PARADOX_DATA_FILE", "/tmp/x.json"),
        ]));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.storage, StorageBackend::Memory);
        assert_eq!(config.server.data_file, "/tmp/x.json");
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut config = PdServerConfig::default();
        config.apply_overrides(lookup(&[("PARADOX_PORT", "abc"), ("PARADOX_STORAGE", "s3")]));
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.storage, StorageBackend::File);
    }

    #[test]
    fn admin_from_env_needs_both_halves() {
        let mut config = PdServerConfig::default();
        config.apply_overrides(lookup(&[("PARADOX_ADMIN_USERNAME", "ops")]));
        assert!(config.admin.is_none());

        config.apply_overrides(lookup(&[
            ("PARADOX_ADMIN_USERNAME", "ops"),
            ("PARADOX_ADMIN_PASSWORD", "pw"),
        ]));
        assert_eq!(config.admin.as_ref().map(|a| a.username.as_str()), Some("ops"));

        config.apply_overrides(lookup(&[("PARADOX_ADMIN_PASSWORD", "new")]));
        assert_eq!(config.admin.as_ref().map(|a| a.password.as_str()), Some("new"));
    }
}
