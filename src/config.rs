//! Symlink mapping configuration.
//!
//! The mapping lives in a `bundle.map.json` file next to the project
//! directory (`<cwd>/../bundle.map.json`) or in a sibling `bundles`
//! directory (`<cwd>/../bundles/bundle.map.json`). The first file found wins.
//!
//! ```json
//! { "acme/widget": "/home/dev/widget-src" }
//! ```

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::runtime::{Runtime, normalize_path};

pub const BUNDLE_MAP_FILE: &str = "bundle.map.json";

/// Package names mapped to the local directories they are linked from.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct SymlinkMap(BTreeMap<String, PathBuf>);

impl SymlinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.0.insert(name.into(), path.into());
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.0.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Candidate mapping files for a working directory, in lookup order.
    pub fn candidates(working_dir: &Path) -> [PathBuf; 2] {
        [
            normalize_path(&working_dir.join("..").join(BUNDLE_MAP_FILE)),
            normalize_path(&working_dir.join("../bundles").join(BUNDLE_MAP_FILE)),
        ]
    }

    /// Load the first mapping file found for `working_dir`.
    ///
    /// Returns an empty map when there is none.
    #[tracing::instrument(skip(runtime))]
    pub fn discover<R: Runtime>(runtime: &R, working_dir: &Path) -> Result<Self> {
        for candidate in Self::candidates(working_dir) {
            if runtime.exists(&candidate) {
                debug!("Loading symlink map from {:?}", candidate);
                return Self::load(runtime, &candidate);
            }
            debug!("No symlink map at {:?}", candidate);
        }
        Ok(Self::default())
    }

    /// Parse a mapping file. Relative paths are resolved against the file's directory.
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        let map: SymlinkMap = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse symlink map {:?}", path))?;

        let base = path.parent().unwrap_or(Path::new(""));
        Ok(map
            .0
            .into_iter()
            .map(|(name, target)| {
                let target = if target.is_relative() {
                    normalize_path(&base.join(target))
                } else {
                    target
                };
                (name, target)
            })
            .collect())
    }
}

impl FromIterator<(String, PathBuf)> for SymlinkMap {
    fn from_iter<T: IntoIterator<Item = (String, PathBuf)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
