//! Installer abstraction.
//!
//! An installer places one package on disk and keeps the installed-package
//! registry in sync. The host selects an installer by the package's type tag
//! through an [`InstallerProvider`].
//!
//! # Structure
//!
//! - `manager` - [`InstallationManager`], the host's per-type installer table
//! - `library` - [`LibraryInstaller`], the default installer for `library` packages
//! - `binary` - [`BinaryInstaller`], binary stubs in the bin directory
//! - `symlink` - [`SymlinkInstaller`], links mapped packages to local source trees

mod binary;
mod library;
mod manager;
mod symlink;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::package::{InstalledRepository, Package};

pub use binary::BinaryInstaller;
pub use library::LibraryInstaller;
pub use manager::InstallationManager;
pub use symlink::SymlinkInstaller;

/// Places packages of the types it supports on disk.
pub trait Installer: Send + Sync {
    /// Whether this installer handles packages of the given type.
    fn supports(&self, kind: &str) -> bool;

    fn is_installed(&self, repo: &dyn InstalledRepository, package: &Package) -> Result<bool>;

    fn install(&self, repo: &mut dyn InstalledRepository, package: &Package) -> Result<()>;

    fn update(
        &self,
        repo: &mut dyn InstalledRepository,
        initial: &Package,
        target: &Package,
    ) -> Result<()>;

    fn uninstall(&self, repo: &mut dyn InstalledRepository, package: &Package) -> Result<()>;

    /// The directory the package is (or would be) installed into.
    fn install_path(&self, package: &Package) -> Result<PathBuf>;

    /// Optional capability to re-create a package's binaries.
    fn binary_presence(&self) -> Option<&dyn BinaryPresence> {
        None
    }
}

/// Installers that can restore missing binary stubs of an installed package.
pub trait BinaryPresence {
    fn ensure_binaries_presence(&self, package: &Package) -> Result<()>;
}

/// Resolves the installer responsible for a package type.
pub trait InstallerProvider: Send + Sync {
    fn installer(&self, kind: &str) -> Result<Arc<dyn Installer>>;
}

/// Installs and removes the binary stubs declared by a package.
#[cfg_attr(test, mockall::automock)]
pub trait BinaryService: Send + Sync {
    fn install_binaries(&self, package: &Package, install_path: &Path) -> Result<()>;
    fn remove_binaries(&self, package: &Package) -> Result<()>;
}
