//! X.509 proxy resolution and TLS settings for libcurl handles.
//!
//! Grid proxies bundle certificate and private key in one PEM file, so the
//! same path is handed to curl as both `SSLCERT` and `SSLKEY`.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the proxy file.
pub const PROXY_ENV: &str = "X509_USER_PROXY";

/// Client certificate/key pair presented during the TLS handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl ClientIdentity {
    /// Identity backed by a combined proxy file.
    pub fn from_proxy(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            cert: path.clone(),
            key: path,
        }
    }

    /// Resolves the proxy: `X509_USER_PROXY`, then `configured`, then
    /// `/tmp/x509up_u<uid>`. Fails if the chosen file does not exist.
    pub fn resolve(configured: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(PROXY_ENV).map(PathBuf::from);
        let Some(path) = pick_proxy_path(from_env, configured, default_proxy_path()) else {
            bail!("no X.509 proxy: set {PROXY_ENV} or x509_proxy in config");
        };
        if !path.is_file() {
            bail!("X.509 proxy {} does not exist", path.display());
        }
        tracing::debug!(proxy = %path.display(), "using X.509 proxy");
        Ok(Self::from_proxy(path))
    }
}

fn pick_proxy_path(
    from_env: Option<PathBuf>,
    configured: Option<&Path>,
    fallback: Option<PathBuf>,
) -> Option<PathBuf> {
    from_env
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| configured.map(Path::to_path_buf))
        .or(fallback)
}

#[cfg(unix)]
fn default_proxy_path() -> Option<PathBuf> {
    // SAFETY: getuid has no preconditions and always succeeds.
    let uid = unsafe { libc::getuid() };
    Some(PathBuf::from(format!("/tmp/x509up_u{uid}")))
}

#[cfg(not(unix))]
fn default_proxy_path() -> Option<PathBuf> {
    None
}

/// TLS options applied to every curl handle we create.
#[derive(Debug, Clone, Default)]
pub struct TlsSettings {
    /// Client identity; `None` sends no certificate (plain HTTP in tests).
    pub identity: Option<ClientIdentity>,
    /// Directory of trusted CAs; `None` keeps libcurl's default bundle.
    pub ca_dir: Option<PathBuf>,
}

impl TlsSettings {
    pub fn new(identity: ClientIdentity, ca_dir: impl Into<PathBuf>) -> Self {
        Self {
            identity: Some(identity),
            ca_dir: Some(ca_dir.into()),
        }
    }

    pub fn apply(&self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        if let Some(id) = &self.identity {
            easy.ssl_cert(&id.cert)?;
            easy.ssl_key(&id.key)?;
        }
        if let Some(dir) = &self.ca_dir {
            easy.capath(dir)?;
        }
        Ok(())
    }
}
