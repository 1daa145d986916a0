//! On-disk configuration at `~/.nexa/config.toml`, created with defaults on
//! first run.

use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    /// SQLite database file. Defaults to `~/.nexa/nexa.db`.
    pub database_path: PathBuf,

    pub default_model: String,
    pub default_temperature: f64,

    /// Gemini API key. Environment variables `GEMINI_API_KEY` and
    /// `GOOGLE_API_KEY` take precedence when set.
    pub api_key: Option<String>,

    pub gateway: GatewayConfig,

    /// Maximum messages loaded per transcript read.
    pub history_limit: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            database_path: PathBuf::new(),
            default_model: DEFAULT_MODEL.to_string(),
            default_temperature: 0.7,
            api_key: None,
            gateway: GatewayConfig::default(),
            history_limit: 100,
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        let nexa_dir = home.join(".nexa");
        let config_path = nexa_dir.join("config.toml");

        if !nexa_dir.exists() {
            fs::create_dir_all(&nexa_dir)?;
        }

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| ConfigError::Load(format!("failed to parse config file: {e}")))?;
            config.config_path.clone_from(&config_path);
            if config.database_path.as_os_str().is_empty() {
                config.database_path = nexa_dir.join("nexa.db");
            }
            config.validate()?;
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.clone(),
                database_path: nexa_dir.join("nexa.db"),
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("failed to serialize config: {e}")))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::Validation(format!(
                "default_temperature must be between 0.0 and 2.0, got {}",
                self.default_temperature
            )));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Validation(
                "history_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// API key resolution order: config file, then `GEMINI_API_KEY`, then
    /// `GOOGLE_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()))
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_MODEL};

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.history_limit, 100);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            default_temperature = 0.4

            [gateway]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert!((config.default_temperature - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_config_key_is_ignored() {
        let config = Config {
            api_key: Some(String::new()),
            ..Config::default()
        };
        // Falls through to env vars, which may or may not be set; the empty
        // string itself must never be used.
        assert_ne!(config.resolve_api_key(), Some(String::new()));
    }

    #[test]
    fn temperature_bounds_are_validated() {
        let config = Config {
            default_temperature: 3.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
