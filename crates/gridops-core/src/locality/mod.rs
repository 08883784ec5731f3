//! Locality (archive residency) queries.
//!
//! One authenticated POST per origin to `<origin>/api/v1/archiveinfo`, body
//! `{"paths": [...]}`, using libcurl with the grid proxy as client identity.
//! Response bodies are passed through unparsed. No retries: the first
//! transport failure ends the run.

mod request;

use anyhow::{Context, Result};
use crate::config::LocalityConfig;
use crate::identity::{ClientIdentity, TlsSettings};
use crate::locator::HostGroups;
use std::io::Write;
use std::time::Duration;

/// Raw answer from one storage endpoint.
#[derive(Debug, Clone)]
pub struct LocalityResponse {
    pub origin: String,
    /// HTTP status code.
    pub status: u32,
    /// Response body, lossily decoded as UTF-8.
    pub body: String,
}

impl LocalityResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking archive-info client.
#[derive(Debug, Clone)]
pub struct LocalityClient {
    tls: TlsSettings,
    timeout: Duration,
    endpoint: String,
}

impl LocalityClient {
    pub fn new(tls: TlsSettings, timeout: Duration, endpoint: impl Into<String>) -> Self {
        Self {
            tls,
            timeout,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(cfg: &LocalityConfig, identity: ClientIdentity) -> Self {
        Self::new(
            TlsSettings::new(identity, &cfg.ca_dir),
            Duration::from_secs(cfg.timeout_secs),
            cfg.endpoint.clone(),
        )
    }

    /// POSTs `paths` to `origin`'s archive-info endpoint.
    ///
    /// Non-2xx statuses are returned, not raised; only transport and TLS
    /// failures are errors.
    pub fn query_host(&self, origin: &str, paths: &[String]) -> Result<LocalityResponse> {
        let url = request::endpoint_url(origin, &self.endpoint);
        let body = request::request_body(paths)?;
        let mut response: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&url)
            .with_context(|| format!("invalid locality URL {url}"))?;
        easy.post(true)?;
        easy.post_fields_copy(&body)?;
        easy.timeout(self.timeout)?;
        self.tls.apply(&mut easy)?;

        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        easy.http_headers(list)?;

        tracing::debug!(%url, paths = paths.len(), "posting archive-info query");
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer
                .perform()
                .with_context(|| format!("locality request to {url} failed"))?;
        }

        let status = easy.response_code().context("no response code")?;
        if !(200..300).contains(&status) {
            tracing::warn!(%url, status, "archive-info query returned non-success status");
        }

        Ok(LocalityResponse {
            origin: origin.to_string(),
            status,
            body: String::from_utf8_lossy(&response).into_owned(),
        })
    }

    /// Queries every group in order and writes each raw body to `out`.
    /// Stops at the first transport error. Returns the responses seen.
    pub fn report_locality<W: Write>(
        &self,
        groups: &HostGroups,
        out: &mut W,
    ) -> Result<Vec<LocalityResponse>> {
        let mut responses = Vec::with_capacity(groups.len());
        for group in groups {
            let response = self.query_host(&group.origin, &group.paths)?;
            writeln!(out, "{}", response.body)?;
            tracing::info!(
                origin = %group.origin,
                status = response.status,
                paths = group.paths.len(),
                "locality query done"
            );
            responses.push(response);
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn from_config_uses_ca_dir_and_timeout() {
        let cfg = LocalityConfig::default();
        let client = LocalityClient::from_config(&cfg, ClientIdentity::from_proxy("/tmp/p"));
        assert_eq!(client.timeout, Duration::from_secs(180));
        assert_eq!(client.endpoint, "/api/v1/archiveinfo");
        assert_eq!(
            client.tls.ca_dir.as_deref(),
            Some(PathBuf::from("/etc/grid-security/certificates").as_path())
        );
        assert_eq!(client.tls.identity.unwrap().key, PathBuf::from("/tmp/p"));
    }

    #[test]
    fn success_range() {
        let mut r = LocalityResponse {
            origin: "https://a".into(),
            status: 200,
            body: String::new(),
        };
        assert!(r.is_success());
        r.status = 403;
        assert!(!r.is_success());
    }
}
