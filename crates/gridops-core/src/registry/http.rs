//! Rucio-compatible REST registry client over libcurl.
//!
//! Authenticates once with the X.509 proxy (`/auth/x509_proxy`) and sends the
//! returned token on every call. Registry calls have no overall timeout;
//! only connection setup is bounded.

use super::parse::{error_detail, header_value, parse_distances, parse_rse_stream};
use super::{DistanceRecord, RegistryError, RseRegistry};
use crate::config::GridopsConfig;
use crate::identity::{ClientIdentity, TlsSettings};
use serde::Serialize;
use std::str;
use std::time::Duration;
use url::Url;

const TOKEN_HEADER: &str = "X-Rucio-Auth-Token";
const ACCOUNT_HEADER: &str = "X-Rucio-Account";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
}

#[derive(Debug, Serialize)]
struct DistanceBody {
    distance: i64,
}

struct RawResponse {
    status: u32,
    headers: Vec<String>,
    body: String,
}

impl RawResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking registry client.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    host: String,
    auth_host: String,
    account: String,
    tls: TlsSettings,
    token: Option<String>,
}

impl HttpRegistry {
    pub fn new(
        host: impl Into<String>,
        auth_host: impl Into<String>,
        account: impl Into<String>,
        tls: TlsSettings,
    ) -> Self {
        Self {
            host: host.into(),
            auth_host: auth_host.into(),
            account: account.into(),
            tls,
            token: None,
        }
    }

    pub fn from_config(cfg: &GridopsConfig, identity: ClientIdentity) -> Self {
        Self::new(
            cfg.registry.host.clone(),
            cfg.registry.auth_host(),
            cfg.registry.account.clone(),
            TlsSettings::new(identity, cfg.registry_ca_dir()),
        )
    }

    /// Uses a pre-issued token instead of authenticating.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn token(&mut self) -> Result<String, RegistryError> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        let token = self.authenticate()?;
        self.token = Some(token.clone());
        Ok(token)
    }

    fn authenticate(&self) -> Result<String, RegistryError> {
        let url = join(&self.auth_host, &["auth", "x509_proxy"])?;
        let resp = self.perform(
            Method::Get,
            &url,
            &[format!("{ACCOUNT_HEADER}: {}", self.account)],
            None,
        )?;
        if !resp.is_success() {
            return Err(RegistryError::Auth(format!(
                "HTTP {} from {url}: {}",
                resp.status,
                error_detail(&resp.headers, &resp.body)
            )));
        }
        let token = header_value(&resp.headers, TOKEN_HEADER)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RegistryError::Auth(format!("no {TOKEN_HEADER} in response")))?;
        tracing::debug!(account = %self.account, "obtained registry token");
        Ok(token.to_string())
    }

    fn call(
        &mut self,
        method: Method,
        url: &Url,
        body: Option<&[u8]>,
    ) -> Result<RawResponse, RegistryError> {
        let token = self.token()?;
        let mut headers = vec![
            format!("{TOKEN_HEADER}: {token}"),
            format!("{ACCOUNT_HEADER}: {}", self.account),
        ];
        if body.is_some() {
            headers.push("Content-Type: application/json".to_string());
        }
        self.perform(method, url, &headers, body)
    }

    fn perform(
        &self,
        method: Method,
        url: &Url,
        headers: &[String],
        body: Option<&[u8]>,
    ) -> Result<RawResponse, RegistryError> {
        let mut header_lines: Vec<String> = Vec::new();
        let mut response: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.connect_timeout(Duration::from_secs(30))?;
        self.tls.apply(&mut easy)?;
        match method {
            Method::Get => easy.get(true)?,
            Method::Post => easy.post(true)?,
            Method::Put => {
                easy.post(true)?;
                easy.custom_request("PUT")?;
            }
        }
        if let Some(body) = body {
            easy.post_fields_copy(body)?;
        }

        let mut list = curl::easy::List::new();
        for h in headers {
            list.append(h)?;
        }
        easy.http_headers(list)?;

        tracing::trace!(?method, %url, "registry request");
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        Ok(RawResponse {
            status: easy.response_code()?,
            headers: header_lines,
            body: String::from_utf8_lossy(&response).into_owned(),
        })
    }

    fn distance_url(&self, src: &str, dst: &str) -> Result<Url, RegistryError> {
        join(&self.host, &["rses", src, "distances", dst])
    }

    fn write_distance(
        &mut self,
        method: Method,
        src: &str,
        dst: &str,
        distance: i64,
    ) -> Result<(), RegistryError> {
        let url = self.distance_url(src, dst)?;
        let body = serde_json::to_vec(&DistanceBody { distance })?;
        let resp = self.call(method, &url, Some(&body))?;
        if resp.is_success() {
            return Ok(());
        }
        let duplicate = resp.status == 409
            || header_value(&resp.headers, "ExceptionClass") == Some("Duplicate");
        if duplicate && method == Method::Post {
            return Err(RegistryError::Duplicate {
                src: src.to_string(),
                dst: dst.to_string(),
            });
        }
        Err(http_error(&url, &resp))
    }
}

fn http_error(url: &Url, resp: &RawResponse) -> RegistryError {
    RegistryError::Http {
        url: url.to_string(),
        status: resp.status,
        detail: error_detail(&resp.headers, &resp.body),
    }
}

/// Appends percent-encoded `segments` to `base`.
fn join(base: &str, segments: &[&str]) -> Result<Url, RegistryError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| RegistryError::Other(format!("registry URL cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl RseRegistry for HttpRegistry {
    fn list_rses(&mut self) -> Result<Vec<String>, RegistryError> {
        let url = join(&self.host, &["rses", ""])?;
        let resp = self.call(Method::Get, &url, None)?;
        if !resp.is_success() {
            return Err(http_error(&url, &resp));
        }
        parse_rse_stream(&resp.body)
    }

    fn get_distance(
        &mut self,
        src: &str,
        dst: &str,
    ) -> Result<Option<DistanceRecord>, RegistryError> {
        let url = self.distance_url(src, dst)?;
        let resp = self.call(Method::Get, &url, None)?;
        if !resp.is_success() {
            return Err(http_error(&url, &resp));
        }
        parse_distances(&resp.body)
    }

    fn add_distance(&mut self, src: &str, dst: &str, distance: i64) -> Result<(), RegistryError> {
        self.write_distance(Method::Post, src, dst, distance)
    }

    fn update_distance(
        &mut self,
        src: &str,
        dst: &str,
        distance: i64,
    ) -> Result<(), RegistryError> {
        self.write_distance(Method::Put, src, dst, distance)
    }
}
