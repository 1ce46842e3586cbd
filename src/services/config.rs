use crate::domain::constants::*;
use crate::services::storage::config_dir;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub icons: IconConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub official_url: String,
    pub aur_url: String,
    pub timeout_ms: u64,
    pub online_limit: usize,
    pub offline_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            official_url: OFFICIAL_SEARCH_URL.to_string(),
            aur_url: AUR_RPC_URL.to_string(),
            timeout_ms: ONLINE_TIMEOUT_MS,
            online_limit: ONLINE_LIMIT,
            offline_limit: OFFLINE_LIMIT,
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IconConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
    pub workers: usize,
    pub min_bytes: usize,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            endpoint: ICON_ENDPOINT.to_string(),
            timeout_ms: ICON_TIMEOUT_MS,
            workers: ICON_WORKERS,
            min_bytes: ICON_MIN_BYTES,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct IndexConfig {
    pub path: Option<PathBuf>,
    pub wiki_dir: Option<PathBuf>,
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_config() -> anyhow::Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(&path)?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}
