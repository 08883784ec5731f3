//! CLI command handlers, one file per command.

mod links;
pub(super) mod locality;

pub use links::{run_mimic_links, run_seed_link, run_verify_links};
pub use locality::run_locality;
