//! Decode registry response bodies and headers.

use super::{DistanceRecord, RegistryError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RseListing {
    rse: String,
}

/// `GET /rses/` answers with one JSON object per line.
pub(crate) fn parse_rse_stream(body: &str) -> Result<Vec<String>, RegistryError> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| -> Result<String, RegistryError> {
            Ok(serde_json::from_str::<RseListing>(l)?.rse)
        })
        .collect()
}

/// `GET /rses/{src}/distances/{dst}` answers with a JSON array of zero or one records.
pub(crate) fn parse_distances(body: &str) -> Result<Option<DistanceRecord>, RegistryError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }
    let records: Vec<DistanceRecord> = serde_json::from_str(body)?;
    Ok(records.into_iter().next())
}

/// Value of header `name` (case-insensitive) among raw header lines.
pub(crate) fn header_value<'a>(lines: &'a [String], name: &str) -> Option<&'a str> {
    lines.iter().find_map(|line| {
        let (n, v) = line.split_once(':')?;
        n.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

/// Human-readable error detail from `ExceptionClass` / `ExceptionMessage`,
/// falling back to the start of the body.
pub(crate) fn error_detail(headers: &[String], body: &str) -> String {
    match (
        header_value(headers, "ExceptionClass"),
        header_value(headers, "ExceptionMessage"),
    ) {
        (Some(class), Some(msg)) => format!("{class}: {msg}"),
        (Some(class), None) => class.to_string(),
        (None, Some(msg)) => msg.to_string(),
        (None, None) => body.trim().chars().take(200).collect(),
    }
}
