pub mod config;
pub mod logging;

pub mod identity;
pub mod locality;
pub mod locator;
pub mod mimic;
pub mod registry;
