//! Installer that links mapped packages to local source trees.
//!
//! Packages named in the [`SymlinkMap`] are placed on disk as a symbolic link
//! at the install path the default installer would use. Every other package,
//! and every path computation, is handed to the default installer for the
//! package's type.
//!
//! The symlink steps (vendor directory, parent directory, link, binaries,
//! registry) run in order and are not rolled back when a later step fails.
//! Creating a link where one already exists fails; so does removing a link
//! that is not there.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{BinaryPresence, BinaryService, Installer, InstallerProvider};
use crate::config::SymlinkMap;
use crate::package::{InstalledRepository, Package};
use crate::runtime::Runtime;

const PARENT_DIR_MODE: u32 = 0o755;

pub struct SymlinkInstaller<R: Runtime> {
    runtime: R,
    vendor_dir: PathBuf,
    binaries: Arc<dyn BinaryService>,
    defaults: Option<Arc<dyn InstallerProvider>>,
    symlinks: Option<SymlinkMap>,
}

impl<R: Runtime> SymlinkInstaller<R> {
    /// Create an installer. The default installers and the symlink map must be
    /// set before any package operation.
    pub fn new(runtime: R, vendor_dir: PathBuf, binaries: Arc<dyn BinaryService>) -> Self {
        Self {
            runtime,
            vendor_dir,
            binaries,
            defaults: None,
            symlinks: None,
        }
    }

    /// Installers used for unmapped packages and for install paths.
    pub fn set_default_installers(&mut self, defaults: Arc<dyn InstallerProvider>) -> &mut Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn set_symlink_map(&mut self, symlinks: SymlinkMap) -> &mut Self {
        self.symlinks = Some(symlinks);
        self
    }

    /// Whether `package` is installed as a link.
    pub fn is_symlink_target(&self, package: &Package) -> Result<bool> {
        Ok(self.symlink_map()?.contains(&package.name))
    }

    fn symlink_map(&self) -> Result<&SymlinkMap> {
        self.symlinks
            .as_ref()
            .context("symlink installer used before its symlink map was configured")
    }

    fn delegate(&self, kind: &str) -> Result<Arc<dyn Installer>> {
        self.defaults
            .as_deref()
            .context("symlink installer used before its default installers were configured")?
            .installer(kind)
    }

    fn link_source(&self, package: &Package) -> Result<Option<PathBuf>> {
        Ok(self.symlink_map()?.get(&package.name).map(Path::to_path_buf))
    }

    /// Create the vendor directory if needed and return its canonical form.
    fn prepare_vendor_dir(&self) -> Result<PathBuf> {
        if !self.runtime.exists(&self.vendor_dir) {
            self.runtime.create_dir_all(&self.vendor_dir)?;
        }
        let vendor_dir = self.runtime.canonicalize(&self.vendor_dir)?;
        debug!("Vendor directory is {:?}", vendor_dir);
        Ok(vendor_dir)
    }

    fn prepare_parent_dir(&self, install_path: &Path) -> Result<()> {
        if let Some(parent) = install_path.parent()
            && !self.runtime.exists(parent)
        {
            self.runtime
                .create_dir_all_with_mode(parent, PARENT_DIR_MODE)?;
        }
        Ok(())
    }

    /// Remove whatever occupies `install_path`.
    fn clear_install_path(&self, install_path: &Path) -> Result<()> {
        if self.runtime.is_symlink(install_path) {
            self.runtime.remove_symlink(install_path)
        } else if self.runtime.is_dir(install_path) {
            self.runtime.remove_dir_all(install_path)
        } else if self.runtime.exists(install_path) {
            self.runtime.remove_file(install_path)
        } else {
            debug!("Nothing to replace at {:?}", install_path);
            Ok(())
        }
    }

    fn link(
        &self,
        repo: &mut dyn InstalledRepository,
        package: &Package,
        source: &Path,
        install_path: &Path,
    ) -> Result<()> {
        info!("Linking {} to {:?}", package, source);
        self.runtime.symlink(source, install_path)?;
        self.binaries.install_binaries(package, install_path)?;
        if !repo.has_package(package) {
            repo.add_package(package.clone());
        }
        Ok(())
    }
}

impl<R: Runtime> Installer for SymlinkInstaller<R> {
    /// Every type is accepted; routing happens per package.
    fn supports(&self, _kind: &str) -> bool {
        true
    }

    fn is_installed(&self, repo: &dyn InstalledRepository, package: &Package) -> Result<bool> {
        if !repo.has_package(package) {
            return Ok(false);
        }
        self.delegate(&package.kind)?.is_installed(repo, package)
    }

    fn install(&self, repo: &mut dyn InstalledRepository, package: &Package) -> Result<()> {
        let Some(source) = self.link_source(package)? else {
            return self.delegate(&package.kind)?.install(repo, package);
        };

        self.prepare_vendor_dir()?;
        let install_path = self.install_path(package)?;
        self.prepare_parent_dir(&install_path)?;
        self.link(repo, package, &source, &install_path)
    }

    /// Routed by `target` alone. Artifacts of the strategy used for `initial`
    /// are not cleaned up when the strategy changes.
    fn update(
        &self,
        repo: &mut dyn InstalledRepository,
        initial: &Package,
        target: &Package,
    ) -> Result<()> {
        let Some(source) = self.link_source(target)? else {
            return self
                .delegate(&target.kind)?
                .update(repo, initial, target);
        };

        self.prepare_vendor_dir()?;
        let install_path = self.install_path(target)?;
        self.prepare_parent_dir(&install_path)?;
        self.clear_install_path(&install_path)?;
        self.link(repo, target, &source, &install_path)
    }

    fn uninstall(&self, repo: &mut dyn InstalledRepository, package: &Package) -> Result<()> {
        if !self.is_symlink_target(package)? {
            return self.delegate(&package.kind)?.uninstall(repo, package);
        }

        let install_path = self.install_path(package)?;
        info!("Unlinking {} from {:?}", package, install_path);
        self.runtime.remove_symlink(&install_path)?;
        self.binaries.remove_binaries(package)?;
        repo.remove_package(package);
        Ok(())
    }

    fn install_path(&self, package: &Package) -> Result<PathBuf> {
        self.delegate(&package.kind)?.install_path(package)
    }

    fn binary_presence(&self) -> Option<&dyn BinaryPresence> {
        Some(self)
    }
}

impl<R: Runtime> BinaryPresence for SymlinkInstaller<R> {
    fn ensure_binaries_presence(&self, package: &Package) -> Result<()> {
        let delegate = self.delegate(&package.kind)?;
        match delegate.binary_presence() {
            Some(presence) => presence.ensure_binaries_presence(package),
            None => Ok(()),
        }
    }
}
