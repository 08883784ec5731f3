//! `gridops locality [LOCATOR...]` – print archive-info answers per host.

use anyhow::Result;
use gridops_core::config::GridopsConfig;
use gridops_core::identity::ClientIdentity;
use gridops_core::locality::LocalityClient;
use gridops_core::locator;
use std::path::Path;

/// Sample used when no locators are given: one EOS disk file and its tape copy at CNAF.
pub(crate) const SAMPLE_LOCATORS: &[&str] = &[
    "davs://eoscms.cern.ch:443/eos/cms/store/express/Run2023C/StreamALCAPPSExpress/ALCARECO/PPSCalMaxTracks-Express-v4/000/367/880/00000/0d829297-280c-403e-ac5b-edfade7446b7.root",
    "davs://xfer-cms.cr.cnaf.infn.it:8443/cmstape/store/test/rucio/store/express/Run2023C/StreamALCAPPSExpress/ALCARECO/PPSCalMaxTracks-Express-v4/000/367/880/00000/0d829297-280c-403e-ac5b-edfade7446b7.root",
];

/// Collects locators from arguments and `--file`, falling back to the sample.
pub(crate) fn collect_locators(args: Vec<String>, file: Option<&Path>) -> Result<Vec<String>> {
    let mut locators = args;
    if let Some(path) = file {
        locators.extend(locator::read_locator_file(path)?);
    }
    if locators.is_empty() {
        locators = SAMPLE_LOCATORS.iter().map(|s| s.to_string()).collect();
    }
    Ok(locators)
}

pub fn run_locality(cfg: &GridopsConfig, args: Vec<String>, file: Option<&Path>) -> Result<()> {
    let locators = collect_locators(args, file)?;
    let groups = locator::group_by_host(&locators);
    tracing::info!(
        locators = locators.len(),
        hosts = groups.len(),
        "querying locality"
    );

    let identity = ClientIdentity::resolve(cfg.x509_proxy.as_deref())?;
    let client = LocalityClient::from_config(&cfg.locality, identity);
    let stdout = std::io::stdout();
    client.report_locality(&groups, &mut stdout.lock())?;
    Ok(())
}
