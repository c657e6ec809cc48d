//! Application configuration.
//!
//! Configuration is loaded from a TOML file. When the file does not exist a
//! default configuration is written to the given path so operators have a
//! template to edit.

pub mod duration_serde;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub web: WebConfig,
    pub source: SourceConfig,
    pub filter: FilterConfig,
    pub storage: StorageConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Upstream playlist URL to fetch on each refresh cycle.
    pub url: String,
    /// Request timeout for upstream fetches.
    #[serde(with = "duration_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Channel identifiers (tvg-id values) to keep. Matching is
    /// case-insensitive and exact.
    pub allowed_tvg_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
    pub output_filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Time between refresh cycles. The first cycle runs immediately at
    /// startup.
    #[serde(with = "duration_serde")]
    pub interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            source: SourceConfig {
                url: "https://raw.githubusercontent.com/LITUATUI/M3UPT/refs/heads/main/M3U/M3UPT.m3u".to_string(),
                timeout: Duration::from_secs(30),
            },
            filter: FilterConfig {
                allowed_tvg_ids: vec![
                    "RTP1.pt".to_string(),
                    "RTP2.pt".to_string(),
                    "SIC.pt".to_string(),
                    "TVI.pt".to_string(),
                    "SICNoticias.pt".to_string(),
                    "CNNPortugal.pt".to_string(),
                    "ARTV.pt".to_string(),
                    "SICAltaDefinicao.pt".to_string(),
                    "PortoCanal.pt".to_string(),
                ],
            },
            storage: StorageConfig {
                output_dir: PathBuf::from("./data"),
                output_filename: "filtered.m3u".to_string(),
            },
            refresh: RefreshConfig {
                interval: Duration::from_secs(3 * 60 * 60),
            },
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, writing the default configuration
    /// to that path first if it does not exist yet.
    pub fn load(path: &str) -> AppResult<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {path}, creating default");
            let default_config = Config::default();
            let toml_string = toml::to_string_pretty(&default_config).map_err(|e| {
                AppError::configuration(format!("Failed to serialize default config: {e}"))
            })?;
            if let Some(parent) = config_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(config_path, toml_string)?;
            return Ok(default_config);
        }

        let contents = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| AppError::configuration(format!("Failed to parse {path}: {e}")))?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a useful service.
    pub fn validate(&self) -> AppResult<()> {
        if self.filter.allowed_tvg_ids.is_empty() {
            return Err(AppError::configuration(
                "filter.allowed_tvg_ids must list at least one channel identifier",
            ));
        }
        if self.source.url.is_empty() {
            return Err(AppError::configuration("source.url must not be empty"));
        }
        if self.refresh.interval.is_zero() {
            return Err(AppError::configuration(
                "refresh.interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl StorageConfig {
    /// Full path of the published playlist file.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.refresh.interval, Duration::from_secs(10800));
        assert_eq!(config.filter.allowed_tvg_ids.len(), 9);
    }

    #[test]
    fn empty_allow_list_is_rejected() {
        let mut config = Config::default();
        config.filter.allowed_tvg_ids.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("allowed_tvg_ids"));
    }

    #[test]
    fn empty_source_url_is_rejected() {
        let mut config = Config::default();
        config.source.url.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let mut config = Config::default();
        config.refresh.interval = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refresh.interval"));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.source.url, config.source.url);
        assert_eq!(parsed.refresh.interval, config.refresh.interval);
        assert_eq!(parsed.filter.allowed_tvg_ids, config.filter.allowed_tvg_ids);
        assert_eq!(parsed.storage.output_path(), config.storage.output_path());
    }

    #[test]
    fn durations_accept_seconds_and_humantime_strings() {
        let toml_str = r#"
            [web]
            host = "127.0.0.1"
            port = 9000

            [source]
            url = "http://example.invalid/list.m3u"
            timeout = 15

            [filter]
            allowed_tvg_ids = ["A.tv"]

            [storage]
            output_dir = "/tmp/out"
            output_filename = "out.m3u"

            [refresh]
            interval = "3h"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.timeout, Duration::from_secs(15));
        assert_eq!(config.refresh.interval, Duration::from_secs(3 * 60 * 60));
    }

    #[test]
    fn load_writes_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_str().unwrap();

        let config = Config::load(path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.web.port, Config::default().web.port);

        // Second load reads the file that was just written.
        let reloaded = Config::load(path_str).unwrap();
        assert_eq!(reloaded.source.url, config.source.url);
    }
}
