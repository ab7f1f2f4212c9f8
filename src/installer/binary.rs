//! Binary stubs: links in the bin directory to the binaries a package declares.

use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::BinaryService;
use crate::package::Package;
use crate::runtime::{Runtime, normalize_path, relative_symlink_path};

const BINARY_MODE: u32 = 0o755;

pub struct BinaryInstaller<R: Runtime> {
    runtime: R,
    bin_dir: PathBuf,
}

impl<R: Runtime> BinaryInstaller<R> {
    pub fn new(runtime: R, bin_dir: PathBuf) -> Self {
        Self { runtime, bin_dir }
    }

    fn link_path(&self, bin: &str) -> Option<PathBuf> {
        Path::new(bin)
            .file_name()
            .map(|name| self.bin_dir.join(name))
    }

    /// Whether the link at `link` points into `package`'s own copy of `bin`.
    fn owns_link(&self, package: &Package, bin: &str, link: &Path) -> bool {
        let Ok(target) = self.runtime.read_link(link) else {
            return false;
        };
        let resolved = normalize_path(&self.bin_dir.join(target));
        resolved.ends_with(normalize_path(&Path::new(&package.name).join(bin)))
    }

    fn install_binary(&self, package: &Package, bin: &str, install_path: &Path) -> Result<()> {
        let binary = install_path.join(bin);
        if !self.runtime.exists(&binary) {
            warn!(
                "Skipped installation of bin {} for package {}: file not found in package",
                bin, package.name
            );
            return Ok(());
        }

        let Some(link) = self.link_path(bin) else {
            warn!("Skipped bin {} for package {}: no file name", bin, package.name);
            return Ok(());
        };
        let target = relative_symlink_path(&link, &binary).unwrap_or_else(|| binary.clone());

        if self.runtime.is_symlink(&link) || self.runtime.exists(&link) {
            if self.runtime.is_symlink(&link)
                && self
                    .runtime
                    .read_link(&link)
                    .is_ok_and(|existing| existing == target)
            {
                debug!("Binary {:?} already installed", link);
            } else {
                warn!(
                    "Skipped installation of bin {} for package {}: name conflicts with an existing file",
                    bin, package.name
                );
            }
            return Ok(());
        }

        if !self.runtime.exists(&self.bin_dir) {
            self.runtime.create_dir_all(&self.bin_dir)?;
        }
        self.runtime.set_permissions(&binary, BINARY_MODE)?;
        debug!("Linking binary {:?} -> {:?}", link, target);
        self.runtime.symlink(&target, &link)
    }
}

impl<R: Runtime> BinaryService for BinaryInstaller<R> {
    fn install_binaries(&self, package: &Package, install_path: &Path) -> Result<()> {
        for bin in &package.bin {
            self.install_binary(package, bin, install_path)?;
        }
        Ok(())
    }

    fn remove_binaries(&self, package: &Package) -> Result<()> {
        if package.bin.is_empty() {
            return Ok(());
        }

        for bin in &package.bin {
            let Some(link) = self.link_path(bin) else {
                continue;
            };
            if !self.runtime.is_symlink(&link) {
                continue;
            }
            if self.owns_link(package, bin, &link) {
                debug!("Removing binary {:?}", link);
                self.runtime.remove_symlink(&link)?;
            } else {
                debug!("Keeping binary {:?}: it belongs to another package", link);
            }
        }

        // Leave no empty bin directory behind
        if self.runtime.is_dir(&self.bin_dir)
            && self
                .runtime
                .read_dir(&self.bin_dir)
                .is_ok_and(|entries| entries.is_empty())
        {
            self.runtime.remove_dir(&self.bin_dir)?;
        }
        Ok(())
    }
}
