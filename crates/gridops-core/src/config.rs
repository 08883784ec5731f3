use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Trusted CA directory used by grid sites.
pub const DEFAULT_CA_DIR: &str = "/etc/grid-security/certificates";

/// Locality query parameters (`[locality]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalityConfig {
    /// Directory of trusted CA certificates (OpenSSL hashed layout).
    pub ca_dir: PathBuf,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Path appended to each origin for the archive-info POST.
    pub endpoint: String,
}

impl Default for LocalityConfig {
    fn default() -> Self {
        Self {
            ca_dir: PathBuf::from(DEFAULT_CA_DIR),
            timeout_secs: 180,
            endpoint: "/api/v1/archiveinfo".to_string(),
        }
    }
}

/// RSE registry server (`[registry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the registry REST API.
    pub host: String,
    /// Base URL of the authentication server; usually the same as `host`.
    #[serde(default)]
    pub auth_host: Option<String>,
    /// Account the X.509 identity is mapped to. `RUCIO_ACCOUNT` overrides it.
    pub account: String,
    /// CA directory for the registry server; falls back to `locality.ca_dir`.
    #[serde(default)]
    pub ca_dir: Option<PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: "https://cms-rucio.cern.ch".to_string(),
            auth_host: Some("https://cms-rucio-auth.cern.ch".to_string()),
            account: "root".to_string(),
            ca_dir: None,
        }
    }
}

impl RegistryConfig {
    pub fn auth_host(&self) -> &str {
        self.auth_host.as_deref().unwrap_or(&self.host)
    }
}

/// Global configuration loaded from `~/.config/gridops/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridopsConfig {
    /// Proxy file used when `X509_USER_PROXY` is unset.
    #[serde(default)]
    pub x509_proxy: Option<PathBuf>,
    #[serde(default)]
    pub locality: LocalityConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl GridopsConfig {
    /// Applies environment overrides (currently only `RUCIO_ACCOUNT`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(account) = std::env::var("RUCIO_ACCOUNT") {
            if !account.trim().is_empty() {
                self.registry.account = account.trim().to_string();
            }
        }
        self
    }

    /// CA directory for registry calls.
    pub fn registry_ca_dir(&self) -> &Path {
        self.registry
            .ca_dir
            .as_deref()
            .unwrap_or(&self.locality.ca_dir)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gridops")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GridopsConfig> {
    let path = config_path()?;
    let cfg = load_or_init_at(&path)?;
    Ok(cfg.with_env_overrides())
}

/// Like [`load_or_init`] but for an explicit path; no env overrides applied.
pub fn load_or_init_at(path: &Path) -> Result<GridopsConfig> {
    if !path.exists() {
        let default_cfg = GridopsConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: GridopsConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
