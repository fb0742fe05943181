use crate::application::refresh_service::RefreshMode;
use crate::domain::measurement::ChangeDetection;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat, FileSourceFile};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the configuration file location.
pub const CONFIG_PATH_VAR: &str = "WEBPERF3_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config/webperf3";

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub render: RenderSettings,
    pub reconnect: ReconnectSettings,
    pub viewer: ViewerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub http_port: u16,
    pub table_path: String,
    pub notify_port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub dir: PathBuf,
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderSettings {
    pub mode: RefreshMode,
    pub change_detection: ChangeDetection,
    pub refresh_on_start: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReconnectSettings {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub decay: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewerSettings {
    pub listen: SocketAddr,
    pub auto_reload_secs: u64,
}

impl ServerSettings {
    pub fn table_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.http_port, self.table_path)
    }

    pub fn notify_url(&self) -> String {
        format!("ws://{}:{}", self.host, self.notify_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load configuration from defaults, then `config/webperf3.*` (or the file
/// named by `WEBPERF3_CONFIG`), then `WEBPERF3__SECTION__KEY` variables.
pub fn load_client_config() -> anyhow::Result<ClientConfig> {
    let file = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => File::from(Path::new(&path)),
        Err(_) => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    build_client_config(file)
}

fn build_client_config(file: File<FileSourceFile, FileFormat>) -> anyhow::Result<ClientConfig> {
    let settings = with_defaults(config::Config::builder())?
        .add_source(file)
        .add_source(
            Environment::with_prefix("WEBPERF3")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("server.host", "localhost")?
        .set_default("server.http_port", 80)?
        .set_default("server.table_path", "/table")?
        .set_default("server.notify_port", 8765)?
        .set_default("server.request_timeout_secs", 30)?
        .set_default("storage.dir", ".webperf3")?
        .set_default("storage.key", "iperf3-data")?
        .set_default("render.mode", "json")?
        .set_default("render.change_detection", "readings")?
        .set_default("render.refresh_on_start", true)?
        .set_default("reconnect.initial_delay_ms", 1000)?
        .set_default("reconnect.max_delay_ms", 30000)?
        .set_default("reconnect.decay", 1.5)?
        .set_default("viewer.listen", "127.0.0.1:8080")?
        .set_default("viewer.auto_reload_secs", 2)
}
