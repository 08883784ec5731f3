//! Archive-info request construction.

use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ArchiveInfoRequest<'a> {
    paths: &'a [String],
}

/// JSON body `{"paths": [...]}`.
pub(crate) fn request_body(paths: &[String]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&ArchiveInfoRequest { paths })?)
}

/// Joins origin and endpoint with exactly one `/` between them.
pub(crate) fn endpoint_url(origin: &str, endpoint: &str) -> String {
    let origin = origin.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{origin}{endpoint}")
    } else {
        format!("{origin}/{endpoint}")
    }
}
