use anyhow::{Result, anyhow};
use config::{Config, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub store: Store,
    pub counter: Counter,
    pub bus: Bus,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    /// TLS is on when both paths are set.
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    Memory,
    Mysql,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: StoreBackendKind,
    pub mysql_dsn: Option<String>,
    #[serde(default = "default_invite_purge_interval_secs")]
    pub invite_purge_interval_secs: u64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterBackendKind {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize)]
pub struct Counter {
    pub backend: CounterBackendKind,
    pub redis_dsn: Option<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_dedupe_ttl_secs")]
    pub dedupe_ttl_secs: u64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusBackendKind {
    Memory,
    Kafka,
}

#[derive(Debug, Deserialize)]
pub struct Bus {
    pub backend: BusBackendKind,
    pub bootstrap_servers: Option<String>,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Prepended to every topic name, e.g. `prod.` gives `prod.relation.friend.requested`.
    #[serde(default)]
    pub topic_prefix: String,
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_invite_purge_interval_secs() -> u64 {
    300
}

fn default_key_prefix() -> String {
    "relation".to_string()
}

fn default_dedupe_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_client_id() -> String {
    "relation-service".to_string()
}

fn default_consumer_group() -> String {
    "relation-counter-projector".to_string()
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

pub fn parse_settings_toml(text: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(text, FileFormat::Toml))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
