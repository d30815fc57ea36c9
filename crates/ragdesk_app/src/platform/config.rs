use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use ragdesk_engine::{ChannelSettings, EngineConfig, RemoteSettings};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const CONFIG_ENV: &str = "RAGDESK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "./ragdesk.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    /// Derived from `server_url` when absent.
    pub websocket_url: Option<String>,
    pub tick_interval_secs: u64,
    pub max_wait_secs: Option<u64>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            websocket_url: None,
            tick_interval_secs: 5,
            max_wait_secs: Some(30 * 60),
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn websocket_url(&self) -> String {
        self.websocket_url
            .clone()
            .unwrap_or_else(|| derive_websocket_url(&self.server_url))
    }

    pub fn log_level(&self) -> LevelFilter {
        desk_logging::parse_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            remote: RemoteSettings {
                base_url: self.server_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            },
            channel: ChannelSettings {
                ws_base_url: self.websocket_url(),
                tick_interval: Duration::from_secs(self.tick_interval_secs),
                max_wait: self.max_wait_secs.map(Duration::from_secs),
            },
        }
    }
}

/// First CLI argument, then `RAGDESK_CONFIG`, then `./ragdesk.ron`.
pub fn resolve_config_path(cli_arg: Option<String>, env_value: Option<String>) -> PathBuf {
    cli_arg
        .or(env_value)
        .filter(|raw| !raw.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn derive_websocket_url(server_url: &str) -> String {
    let trimmed = server_url.trim();
    if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.ron");
        let ron = r#"(
            server_url: "https://rag.example.com",
            max_wait_secs: None,
            log_destination: Both,
        )"#;
        fs::write(&path, ron).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server_url, "https://rag.example.com");
        assert_eq!(config.max_wait_secs, None);
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.tick_interval_secs, 5);
        assert_eq!(config.websocket_url(), "wss://rag.example.com");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.ron");
        fs::write(&path, "(server_url: 42").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn explicit_websocket_url_wins() {
        let config = AppConfig {
            websocket_url: Some("ws://push.local:9000".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.websocket_url(), "ws://push.local:9000");
        assert_eq!(AppConfig::default().websocket_url(), "ws://127.0.0.1:8000");
    }

    #[test]
    fn engine_config_carries_durations() {
        let config = AppConfig {
            tick_interval_secs: 2,
            max_wait_secs: Some(90),
            ..AppConfig::default()
        };
        let engine = config.engine_config();
        assert_eq!(engine.channel.tick_interval, Duration::from_secs(2));
        assert_eq!(engine.channel.max_wait, Some(Duration::from_secs(90)));
        assert_eq!(engine.remote.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn config_path_precedence() {
        assert_eq!(
            resolve_config_path(Some("a.ron".into()), Some("b.ron".into())),
            PathBuf::from("a.ron")
        );
        assert_eq!(
            resolve_config_path(None, Some("b.ron".into())),
            PathBuf::from("b.ron")
        );
        assert_eq!(
            resolve_config_path(None, None),
            PathBuf::from(DEFAULT_CONFIG_FILE)
        );
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = AppConfig {
            log_level: "chatty".into(),
            ..AppConfig::default()
        };
        assert_eq!(config.log_level(), LevelFilter::Info);
    }
}
