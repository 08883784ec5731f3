//! Locator grouping.
//!
//! Locators (`davs://host:port/path`, ...) are grouped by origin so that each
//! storage endpoint receives a single batched locality query. Hosts and paths
//! keep first-seen order.

mod origin;

pub use origin::{split_locator, SplitLocator};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Paths requested from one origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostGroup {
    pub origin: String,
    pub paths: Vec<String>,
}

/// Ordered mapping origin -> paths; one entry per distinct origin.
#[derive(Debug, Clone, Default)]
pub struct HostGroups {
    groups: Vec<HostGroup>,
    index: HashMap<String, usize>,
}

impl HostGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `path` to the group for `origin`, creating the group on first sight.
    pub fn push(&mut self, origin: String, path: String) {
        match self.index.get(&origin) {
            Some(&i) => self.groups[i].paths.push(path),
            None => {
                self.index.insert(origin.clone(), self.groups.len());
                self.groups.push(HostGroup {
                    origin,
                    paths: vec![path],
                });
            }
        }
    }

    pub fn get(&self, origin: &str) -> Option<&[String]> {
        self.index
            .get(origin)
            .map(|&i| self.groups[i].paths.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HostGroup> {
        self.groups.iter()
    }

    /// Total number of paths across all groups.
    pub fn path_count(&self) -> usize {
        self.groups.iter().map(|g| g.paths.len()).sum()
    }
}

impl<'a> IntoIterator for &'a HostGroups {
    type Item = &'a HostGroup;
    type IntoIter = std::slice::Iter<'a, HostGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl PartialEq for HostGroups {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}

impl Eq for HostGroups {}

/// Groups locators by HTTPS origin. Never fails; paths are kept as written
/// (see [`split_locator`]).
pub fn group_by_host<I, S>(locators: I) -> HostGroups
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups = HostGroups::new();
    for locator in locators {
        let split = split_locator(locator.as_ref());
        groups.push(split.origin, split.path);
    }
    groups
}

/// Reads locators from a file: one per line, blank lines and `#` comments skipped.
pub fn read_locator_file(path: &Path) -> Result<Vec<String>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read locator file {}", path.display()))?;
    Ok(parse_locator_lines(&data))
}

fn parse_locator_lines(data: &str) -> Vec<String> {
    data.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
