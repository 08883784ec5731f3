//! Copy RSE distances from a reference RSE onto a new one.
//!
//! Every other RSE gets the same inbound and outbound distance to the target
//! that it has to the reference. Each RSE and each direction fails on its
//! own: errors are printed and logged, and the scan continues. Only a failed
//! RSE listing aborts the run.

mod verify;

pub use verify::{verify_links, VerifyIssue, VerifyReport};

use anyhow::{Context, Result};
use crate::registry::{RegistryError, RseRegistry};
use std::io::Write;

/// What happened to a single directed distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Created,
    /// Create hit a duplicate and the existing value was overwritten.
    Updated,
    /// Dry run; nothing sent.
    Planned,
}

/// Counters for one mimic or seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MimicReport {
    pub created: usize,
    pub updated: usize,
    pub planned: usize,
    /// Directions where the reference has no distance to copy.
    pub skipped: usize,
    pub failed: usize,
}

impl MimicReport {
    fn record(&mut self, action: LinkAction) {
        match action {
            LinkAction::Created => self.created += 1,
            LinkAction::Updated => self.updated += 1,
            LinkAction::Planned => self.planned += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Creates `src -> dst`; on duplicate, updates it once with the same value.
pub fn upsert_distance<R: RseRegistry + ?Sized>(
    registry: &mut R,
    src: &str,
    dst: &str,
    distance: i64,
) -> Result<LinkAction, RegistryError> {
    match registry.add_distance(src, dst, distance) {
        Ok(()) => Ok(LinkAction::Created),
        Err(RegistryError::Duplicate { .. }) => {
            tracing::debug!(src, dst, distance, "distance exists, updating");
            registry.update_distance(src, dst, distance)?;
            Ok(LinkAction::Updated)
        }
        Err(e) => Err(e),
    }
}

/// Prints and applies one directed link, recording the outcome in `report`.
fn set_link<R: RseRegistry + ?Sized, W: Write>(
    registry: &mut R,
    src: &str,
    dst: &str,
    distance: i64,
    dry_run: bool,
    out: &mut W,
    report: &mut MimicReport,
) -> Result<()> {
    if dry_run {
        writeln!(out, "[dry-run] Would set distance from {src} to {dst} to {distance}")?;
        report.record(LinkAction::Planned);
        return Ok(());
    }

    writeln!(out, "Setting distance from {src} to {dst} to {distance}")?;
    match upsert_distance(registry, src, dst, distance) {
        Ok(action) => {
            if action == LinkAction::Updated {
                writeln!(out, "Distance from {src} to {dst} already existed; updated")?;
            }
            tracing::info!(src, dst, distance, ?action, "distance set");
            report.record(action);
        }
        Err(e) => {
            writeln!(out, "Failed to set distance from {src} to {dst}: {e}")?;
            tracing::warn!(src, dst, distance, error = %e, "set distance failed");
            report.failed += 1;
        }
    }
    Ok(())
}

/// Copies `src -> dst` of the reference onto `link_src -> link_dst`.
fn copy_direction<R: RseRegistry + ?Sized, W: Write>(
    registry: &mut R,
    (src, dst): (&str, &str),
    (link_src, link_dst): (&str, &str),
    dry_run: bool,
    out: &mut W,
    report: &mut MimicReport,
) -> Result<()> {
    match registry.get_distance(src, dst) {
        Ok(Some(record)) => set_link(
            registry,
            link_src,
            link_dst,
            record.distance,
            dry_run,
            out,
            report,
        ),
        Ok(None) => {
            tracing::debug!(src, dst, "reference has no distance; nothing to copy");
            report.skipped += 1;
            Ok(())
        }
        Err(e) => {
            writeln!(out, "Failed to get distance from {src} to {dst}: {e}")?;
            tracing::warn!(src, dst, error = %e, "get distance failed");
            report.failed += 1;
            Ok(())
        }
    }
}

/// Gives `target` the same distances to every other RSE that `reference` has.
///
/// For each RSE `x` (other than `reference` and `target`):
/// `x -> reference = d` yields `x -> target = d`, and
/// `reference -> x = d` yields `target -> x = d`.
pub fn mimic_links<R: RseRegistry + ?Sized, W: Write>(
    registry: &mut R,
    reference: &str,
    target: &str,
    dry_run: bool,
    out: &mut W,
) -> Result<MimicReport> {
    let rses = registry.list_rses().context("list RSEs")?;
    tracing::info!(reference, target, dry_run, rses = rses.len(), "mimicking RSE links");

    let mut report = MimicReport::default();
    for rse in rses.iter().filter(|r| *r != reference && *r != target) {
        let rse = rse.as_str();
        copy_direction(
            registry,
            (rse, reference),
            (rse, target),
            dry_run,
            out,
            &mut report,
        )?;
        copy_direction(
            registry,
            (reference, rse),
            (target, rse),
            dry_run,
            out,
            &mut report,
        )?;
    }

    tracing::info!(?report, "mimic finished");
    Ok(report)
}

/// Links `reference` and `target` directly with `distance` in both directions.
pub fn seed_direct_link<R: RseRegistry + ?Sized, W: Write>(
    registry: &mut R,
    reference: &str,
    target: &str,
    distance: i64,
    dry_run: bool,
    out: &mut W,
) -> Result<MimicReport> {
    let mut report = MimicReport::default();
    set_link(registry, reference, target, distance, dry_run, out, &mut report)?;
    set_link(registry, target, reference, distance, dry_run, out, &mut report)?;
    Ok(report)
}
