//! Registry of installed packages.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

use super::Package;

/// The host's record of which packages are considered installed.
pub trait InstalledRepository {
    fn has_package(&self, package: &Package) -> bool;
    fn add_package(&mut self, package: Package);
    fn remove_package(&mut self, package: &Package);
    fn packages(&self) -> &[Package];
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct InstalledFile {
    packages: Vec<Package>,
}

/// Installed packages kept in memory and persisted to `installed.json`.
#[derive(Debug, Default)]
pub struct InstalledPackages {
    path: Option<PathBuf>,
    packages: Vec<Package>,
}

impl InstalledPackages {
    /// A registry that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the registry from `path`. A missing file yields an empty registry.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let packages = if runtime.exists(path) {
            let content = runtime.read_to_string(path)?;
            let file: InstalledFile = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse installed packages from {:?}", path))?;
            file.packages
        } else {
            debug!("No installed packages file at {:?}", path);
            Vec::new()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            packages,
        })
    }

    /// Write the registry back to the file it was loaded from.
    pub fn save<R: Runtime>(&self, runtime: &R) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !runtime.exists(parent)
        {
            runtime.create_dir_all(parent)?;
        }

        let file = InstalledFile {
            packages: self.packages.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        runtime
            .write(path, content.as_bytes())
            .with_context(|| format!("Failed to save installed packages to {:?}", path))
    }

    /// Find an installed package by name.
    pub fn find(&self, name: &str) -> Option<&Package> {
        self.packages
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

impl InstalledRepository for InstalledPackages {
    fn has_package(&self, package: &Package) -> bool {
        self.packages.iter().any(|p| p.is_same(package))
    }

    fn add_package(&mut self, package: Package) {
        debug!("Registering {}", package);
        self.packages.push(package);
    }

    fn remove_package(&mut self, package: &Package) {
        debug!("Unregistering {}", package);
        self.packages.retain(|p| !p.is_same(package));
    }

    fn packages(&self) -> &[Package] {
        &self.packages
    }
}
