//! `gridops mimic-links`, `verify-links`, `seed-link` – RSE distance maintenance.

use anyhow::Result;
use gridops_core::config::GridopsConfig;
use gridops_core::identity::ClientIdentity;
use gridops_core::mimic::{self, MimicReport};
use gridops_core::registry::HttpRegistry;

fn open_registry(cfg: &GridopsConfig) -> Result<HttpRegistry> {
    let identity = ClientIdentity::resolve(cfg.x509_proxy.as_deref())?;
    tracing::info!(
        host = %cfg.registry.host,
        account = %cfg.registry.account,
        "using registry"
    );
    Ok(HttpRegistry::from_config(cfg, identity))
}

fn summarize(label: &str, report: &MimicReport) {
    println!(
        "{label}: {} created, {} updated, {} planned, {} without reference distance, {} failed",
        report.created, report.updated, report.planned, report.skipped, report.failed
    );
}

pub fn run_mimic_links(
    cfg: &GridopsConfig,
    rse_to_mimic: &str,
    rse_to_set: &str,
    dry_run: bool,
    seed_link: bool,
    verify: bool,
) -> Result<()> {
    let mut registry = open_registry(cfg)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let report = mimic::mimic_links(&mut registry, rse_to_mimic, rse_to_set, dry_run, &mut out)?;
    summarize("mimic", &report);

    if seed_link {
        let report =
            mimic::seed_direct_link(&mut registry, rse_to_mimic, rse_to_set, 1, dry_run, &mut out)?;
        summarize("direct link", &report);
    }

    if verify {
        print_verify(&mimic::verify_links(
            &mut registry,
            rse_to_mimic,
            rse_to_set,
            &mut out,
        )?);
    }
    Ok(())
}

pub fn run_verify_links(cfg: &GridopsConfig, rse_to_mimic: &str, rse_to_set: &str) -> Result<()> {
    let mut registry = open_registry(cfg)?;
    let stdout = std::io::stdout();
    let report = mimic::verify_links(&mut registry, rse_to_mimic, rse_to_set, &mut stdout.lock())?;
    print_verify(&report);
    Ok(())
}

pub fn run_seed_link(
    cfg: &GridopsConfig,
    rse_to_mimic: &str,
    rse_to_set: &str,
    distance: i64,
    dry_run: bool,
) -> Result<()> {
    let mut registry = open_registry(cfg)?;
    let stdout = std::io::stdout();
    let report = mimic::seed_direct_link(
        &mut registry,
        rse_to_mimic,
        rse_to_set,
        distance,
        dry_run,
        &mut stdout.lock(),
    )?;
    summarize("direct link", &report);
    Ok(())
}

fn print_verify(report: &mimic::VerifyReport) {
    if report.is_consistent() {
        println!("verify: {} RSEs checked, all distances match", report.checked);
    } else {
        println!(
            "verify: {} RSEs checked, {} issues",
            report.checked,
            report.issues.len()
        );
    }
}
