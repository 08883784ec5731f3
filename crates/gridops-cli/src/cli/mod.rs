//! CLI for the gridops helpers.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gridops_core::config;
use std::path::PathBuf;

use commands::{run_locality, run_mimic_links, run_seed_link, run_verify_links};

/// Top-level CLI for the gridops helpers.
#[derive(Debug, Parser)]
#[command(name = "gridops")]
#[command(about = "gridops: file locality queries and RSE distance maintenance", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Ask storage endpoints where files live (disk/tape), one query per host.
    Locality {
        /// File locators (e.g. davs://host:port/path). Uses a built-in sample when empty.
        locators: Vec<String>,
        /// Read locators from a file, one per line.
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Copy distances of an existing RSE onto a new RSE.
    MimicLinks {
        /// RSE whose distances are copied.
        rse_to_mimic: String,
        /// RSE that receives the distances.
        rse_to_set: String,
        /// Print intended changes without writing to the registry.
        #[arg(long)]
        dry_run: bool,
        /// Also link the two RSEs directly (distance 1 both ways).
        #[arg(long)]
        seed_link: bool,
        /// Re-read all distances afterwards and report differences.
        #[arg(long)]
        verify: bool,
    },

    /// Check that an RSE's distances match those of the RSE it mimics.
    VerifyLinks {
        rse_to_mimic: String,
        rse_to_set: String,
    },

    /// Set the direct distance between two RSEs in both directions.
    SeedLink {
        rse_to_mimic: String,
        rse_to_set: String,
        #[arg(long)]
        dry_run: bool,
        #[arg(long, default_value = "1", value_name = "N")]
        distance: i64,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Locality { locators, file } => {
                run_locality(&cfg, locators, file.as_deref())?
            }
            CliCommand::MimicLinks {
                rse_to_mimic,
                rse_to_set,
                dry_run,
                seed_link,
                verify,
            } => run_mimic_links(&cfg, &rse_to_mimic, &rse_to_set, dry_run, seed_link, verify)?,
            CliCommand::VerifyLinks {
                rse_to_mimic,
                rse_to_set,
            } => run_verify_links(&cfg, &rse_to_mimic, &rse_to_set)?,
            CliCommand::SeedLink {
                rse_to_mimic,
                rse_to_set,
                dry_run,
                distance,
            } => run_seed_link(&cfg, &rse_to_mimic, &rse_to_set, distance, dry_run)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
