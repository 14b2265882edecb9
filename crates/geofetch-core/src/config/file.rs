//! Optional `config.toml` under the XDG config dir.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::Lookup;
use crate::retry::policy::{
    ENV_BACKOFF_BASE, ENV_BACKOFF_LIMIT, ENV_MAX_RETRIES, ENV_TIMEOUT,
};

/// A single tunable as written in TOML: either `"5s"` or `5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Setting {
    Integer(i64),
    Text(String),
}

impl Setting {
    fn to_raw(&self) -> String {
        match self {
            Setting::Integer(n) => n.to_string(),
            Setting::Text(s) => s.clone(),
        }
    }
}

/// `[http]` table: same semantics as the `GEOIP_HTTP_*` environment keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Setting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<Setting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_base: Option<Setting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_limit: Option<Setting>,
}

/// Configuration loaded from `~/.config/geofetch/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub http: HttpSection,
}

impl Lookup for FileConfig {
    fn get(&self, key: &str) -> Option<String> {
        let setting = match key {
            ENV_TIMEOUT => self.http.timeout.as_ref(),
            ENV_MAX_RETRIES => self.http.max_retries.as_ref(),
            ENV_BACKOFF_BASE => self.http.backoff_base.as_ref(),
            ENV_BACKOFF_LIMIT => self.http.backoff_limit.as_ref(),
            _ => None,
        };
        setting.map(Setting::to_raw)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("geofetch")?;
    Ok(xdg_dirs.get_config_home().join("geofetch").join("config.toml"))
}

/// Load configuration from the default path. A missing file is not an error.
pub fn load() -> Result<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        tracing::debug!("no config file at {}, using defaults", path.display());
        return Ok(FileConfig::default());
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<FileConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: FileConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    tracing::debug!("loaded config from {}: {:?}", path.display(), cfg);
    Ok(cfg)
}
