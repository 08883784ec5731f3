//! Check that a target RSE mirrors the reference RSE's distances.

use anyhow::{Context, Result};
use crate::registry::{RegistryError, RseRegistry};
use std::fmt;
use std::io::Write;

/// One problem found while verifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyIssue {
    /// `src -> dst` differs from the reference's value.
    Mismatch {
        src: String,
        dst: String,
        expected: Option<i64>,
        found: Option<i64>,
    },
    /// A lookup for `rse` failed; its pairs were not compared.
    Lookup { rse: String, error: String },
}

fn show(d: Option<i64>) -> String {
    d.map_or_else(|| "none".to_string(), |d| d.to_string())
}

impl fmt::Display for VerifyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyIssue::Mismatch {
                src,
                dst,
                expected,
                found,
            } => write!(
                f,
                "distance from {src} to {dst} is {}, expected {}",
                show(*found),
                show(*expected)
            ),
            VerifyIssue::Lookup { rse, error } => {
                write!(f, "failed to verify distances for {rse}: {error}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// RSEs whose four distances were all fetched.
    pub checked: usize,
    pub issues: Vec<VerifyIssue>,
}

impl VerifyReport {
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}

struct Pairs {
    to_target: Option<i64>,
    from_target: Option<i64>,
    to_reference: Option<i64>,
    from_reference: Option<i64>,
}

fn fetch_pairs<R: RseRegistry + ?Sized>(
    registry: &mut R,
    rse: &str,
    reference: &str,
    target: &str,
) -> Result<Pairs, RegistryError> {
    let mut get = |src: &str, dst: &str| -> Result<Option<i64>, RegistryError> {
        Ok(registry.get_distance(src, dst)?.map(|r| r.distance))
    };
    Ok(Pairs {
        to_target: get(rse, target)?,
        from_target: get(target, rse)?,
        to_reference: get(rse, reference)?,
        from_reference: get(reference, rse)?,
    })
}

/// Compares, for every other RSE `x`, `x <-> target` against `x <-> reference`.
///
/// Both sides absent counts as consistent. Lookup failures are reported per
/// RSE and the scan continues.
pub fn verify_links<R: RseRegistry + ?Sized, W: Write>(
    registry: &mut R,
    reference: &str,
    target: &str,
    out: &mut W,
) -> Result<VerifyReport> {
    let rses = registry.list_rses().context("list RSEs")?;
    let mut report = VerifyReport::default();

    for rse in rses.iter().filter(|r| *r != reference && *r != target) {
        let pairs = match fetch_pairs(registry, rse, reference, target) {
            Ok(p) => p,
            Err(e) => {
                let issue = VerifyIssue::Lookup {
                    rse: rse.clone(),
                    error: e.to_string(),
                };
                writeln!(out, "{issue}")?;
                tracing::warn!(rse = %rse, error = %e, "verify lookup failed");
                report.issues.push(issue);
                continue;
            }
        };
        report.checked += 1;

        let directions = [
            (rse.as_str(), target, pairs.to_reference, pairs.to_target),
            (target, rse.as_str(), pairs.from_reference, pairs.from_target),
        ];
        for (src, dst, expected, found) in directions {
            if expected != found {
                let issue = VerifyIssue::Mismatch {
                    src: src.to_string(),
                    dst: dst.to_string(),
                    expected,
                    found,
                };
                writeln!(out, "{issue}")?;
                report.issues.push(issue);
            }
        }
    }

    tracing::info!(
        checked = report.checked,
        issues = report.issues.len(),
        "verification finished"
    );
    Ok(report)
}
