//! Installation manager dispatching to per-type installers.

use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use super::{Installer, InstallerProvider};
use crate::package::{InstalledRepository, Package};

/// Table of installers, consulted by package type.
///
/// Installers added later take precedence over earlier ones, so a more
/// specific installer can shadow a generic one.
#[derive(Default)]
pub struct InstallationManager {
    installers: Vec<Arc<dyn Installer>>,
}

impl InstallationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an installer ahead of the existing ones.
    pub fn add_installer(&mut self, installer: Arc<dyn Installer>) {
        self.installers.insert(0, installer);
    }

    pub fn len(&self) -> usize {
        self.installers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installers.is_empty()
    }

    /// Return the first installer supporting `kind`.
    pub fn installer(&self, kind: &str) -> Result<Arc<dyn Installer>> {
        self.installers
            .iter()
            .find(|installer| installer.supports(kind))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown installer type: {}", kind))
    }

    pub fn is_installed(&self, repo: &dyn InstalledRepository, package: &Package) -> Result<bool> {
        self.installer(&package.kind)?.is_installed(repo, package)
    }

    pub fn install(&self, repo: &mut dyn InstalledRepository, package: &Package) -> Result<()> {
        self.installer(&package.kind)?.install(repo, package)
    }

    /// Update `initial` to `target`.
    ///
    /// When the package type changes, the initial package is uninstalled by
    /// its own installer and the target installed by the target's installer.
    pub fn update(
        &self,
        repo: &mut dyn InstalledRepository,
        initial: &Package,
        target: &Package,
    ) -> Result<()> {
        if initial.kind == target.kind {
            return self.installer(&target.kind)?.update(repo, initial, target);
        }

        debug!(
            "Package type changed from {} to {}, reinstalling {}",
            initial.kind, target.kind, target.name
        );
        self.installer(&initial.kind)?.uninstall(repo, initial)?;
        self.installer(&target.kind)?.install(repo, target)
    }

    pub fn uninstall(&self, repo: &mut dyn InstalledRepository, package: &Package) -> Result<()> {
        self.installer(&package.kind)?.uninstall(repo, package)
    }

    pub fn install_path(&self, package: &Package) -> Result<PathBuf> {
        self.installer(&package.kind)?.install_path(package)
    }

    /// Restore binaries when the responsible installer supports it.
    pub fn ensure_binaries_presence(&self, package: &Package) -> Result<()> {
        let installer = self.installer(&package.kind)?;
        match installer.binary_presence() {
            Some(presence) => presence.ensure_binaries_presence(package),
            None => Ok(()),
        }
    }
}

impl InstallerProvider for InstallationManager {
    fn installer(&self, kind: &str) -> Result<Arc<dyn Installer>> {
        InstallationManager::installer(self, kind)
    }
}
