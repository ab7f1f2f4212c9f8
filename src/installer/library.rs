//! Default installer for `library` packages.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{BinaryPresence, BinaryService, Installer};
use crate::package::{DEFAULT_PACKAGE_TYPE, InstalledRepository, Package};
use crate::runtime::Runtime;

/// Copies a package's local `dist` directory to `<vendor_dir>/<name>`.
pub struct LibraryInstaller<R: Runtime> {
    runtime: R,
    vendor_dir: PathBuf,
    binaries: Arc<dyn BinaryService>,
}

impl<R: Runtime> LibraryInstaller<R> {
    pub fn new(runtime: R, vendor_dir: PathBuf, binaries: Arc<dyn BinaryService>) -> Self {
        Self {
            runtime,
            vendor_dir,
            binaries,
        }
    }

    fn install_code(&self, package: &Package, install_path: &Path) -> Result<()> {
        let dist = package
            .dist
            .as_deref()
            .with_context(|| format!("Package {} has no dist directory to install from", package))?;
        if !self.runtime.is_dir(dist) {
            bail!("Dist directory {:?} of package {} does not exist", dist, package);
        }
        // Copying through a leftover link would overwrite the linked checkout
        if self.runtime.is_symlink(install_path) {
            bail!(
                "Install path {:?} of package {} is a symlink; uninstall or update it first",
                install_path,
                package
            );
        }

        info!("Installing {} into {:?}", package, install_path);
        self.runtime.create_dir_all(install_path)?;
        self.copy_tree(dist, install_path)
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()> {
        for entry in self.runtime.read_dir(from)? {
            let Some(name) = entry.file_name() else {
                continue;
            };
            let dest = to.join(name);
            if self.runtime.is_dir(&entry) {
                self.runtime.create_dir_all(&dest)?;
                self.copy_tree(&entry, &dest)?;
            } else {
                self.runtime
                    .copy(&entry, &dest)
                    .with_context(|| format!("Failed to copy {:?} to {:?}", entry, dest))?;
            }
        }
        Ok(())
    }

    fn remove_code(&self, install_path: &Path) -> Result<()> {
        if self.runtime.is_symlink(install_path) {
            self.runtime.remove_symlink(install_path)?;
        } else if self.runtime.is_dir(install_path) {
            self.runtime.remove_dir_all(install_path)?;
        } else {
            debug!("Nothing to remove at {:?}", install_path);
            return Ok(());
        }

        // Drop the vendor namespace directory once its last package is gone
        if let Some(parent) = install_path.parent()
            && parent != self.vendor_dir
            && parent.starts_with(&self.vendor_dir)
            && let Ok(entries) = self.runtime.read_dir(parent)
            && entries.is_empty()
        {
            debug!("Removing empty directory {:?}", parent);
            self.runtime.remove_dir(parent)?;
        }
        Ok(())
    }
}

impl<R: Runtime> Installer for LibraryInstaller<R> {
    fn supports(&self, kind: &str) -> bool {
        kind == DEFAULT_PACKAGE_TYPE
    }

    fn is_installed(&self, repo: &dyn InstalledRepository, package: &Package) -> Result<bool> {
        if !repo.has_package(package) {
            return Ok(false);
        }
        let install_path = self.install_path(package)?;
        Ok(self.runtime.exists(&install_path) || self.runtime.is_symlink(&install_path))
    }

    fn install(&self, repo: &mut dyn InstalledRepository, package: &Package) -> Result<()> {
        let install_path = self.install_path(package)?;
        self.install_code(package, &install_path)?;
        self.binaries.install_binaries(package, &install_path)?;
        if !repo.has_package(package) {
            repo.add_package(package.clone());
        }
        Ok(())
    }

    fn update(
        &self,
        repo: &mut dyn InstalledRepository,
        initial: &Package,
        target: &Package,
    ) -> Result<()> {
        if !repo.has_package(initial) {
            bail!("Package is not installed: {}", initial);
        }

        self.binaries.remove_binaries(initial)?;
        self.remove_code(&self.install_path(initial)?)?;

        let install_path = self.install_path(target)?;
        self.install_code(target, &install_path)?;
        self.binaries.install_binaries(target, &install_path)?;

        repo.remove_package(initial);
        if !repo.has_package(target) {
            repo.add_package(target.clone());
        }
        Ok(())
    }

    fn uninstall(&self, repo: &mut dyn InstalledRepository, package: &Package) -> Result<()> {
        if !repo.has_package(package) {
            bail!("Package is not installed: {}", package);
        }

        info!("Removing {}", package);
        self.binaries.remove_binaries(package)?;
        self.remove_code(&self.install_path(package)?)?;
        repo.remove_package(package);
        Ok(())
    }

    fn install_path(&self, package: &Package) -> Result<PathBuf> {
        Ok(self.vendor_dir.join(&package.name))
    }

    fn binary_presence(&self) -> Option<&dyn BinaryPresence> {
        Some(self)
    }
}

impl<R: Runtime> BinaryPresence for LibraryInstaller<R> {
    fn ensure_binaries_presence(&self, package: &Package) -> Result<()> {
        let install_path = self.install_path(package)?;
        if !self.runtime.exists(&install_path) {
            debug!("{} is not on disk, no binaries to restore", package);
            return Ok(());
        }
        self.binaries.install_binaries(package, &install_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::MockBinaryService;
    use crate::package::InstalledPackages;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use tempfile::tempdir;

    fn quiet_binaries() -> Arc<dyn BinaryService> {
        let mut binaries = MockBinaryService::new();
        binaries.expect_install_binaries().returning(|_, _| Ok(()));
        binaries.expect_remove_binaries().returning(|_| Ok(()));
        Arc::new(binaries)
    }

    #[test]
    fn test_supports_only_library() {
        let installer =
            LibraryInstaller::new(MockRuntime::new(), PathBuf::from("/vendor"), quiet_binaries());
        assert!(installer.supports("library"));
        assert!(!installer.supports("composer-plugin"));
    }

    #[test]
    fn test_install_path_under_vendor_dir() {
        let installer = LibraryInstaller::new(
            MockRuntime::new(),
            PathBuf::from("/project/vendor"),
            quiet_binaries(),
        );
        let package = Package::new("acme/widget", "library");
        assert_eq!(
            installer.install_path(&package).unwrap(),
            PathBuf::from("/project/vendor/acme/widget")
        );
    }

    #[test]
    fn test_install_without_dist_fails() {
        let installer = LibraryInstaller::new(
            MockRuntime::new(),
            PathBuf::from("/project/vendor"),
            quiet_binaries(),
        );
        let mut repo = InstalledPackages::in_memory();
        let err = installer
            .install(&mut repo, &Package::new("acme/widget", "library"))
            .unwrap_err();
        assert!(err.to_string().contains("no dist directory"));
        assert!(repo.packages().is_empty());
    }

    #[test]
    fn test_is_installed_requires_registry_entry() {
        // No runtime expectations: the registry check short-circuits
        let installer = LibraryInstaller::new(
            MockRuntime::new(),
            PathBuf::from("/project/vendor"),
            quiet_binaries(),
        );
        let repo = InstalledPackages::in_memory();
        assert!(
            !installer
                .is_installed(&repo, &Package::new("acme/widget", "library"))
                .unwrap()
        );
    }

    #[test]
    fn test_is_installed_checks_install_path() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/project/vendor/acme/widget")))
            .returning(|_| true);
        let installer =
            LibraryInstaller::new(runtime, PathBuf::from("/project/vendor"), quiet_binaries());

        let package = Package::new("acme/widget", "library");
        let mut repo = InstalledPackages::in_memory();
        repo.add_package(package.clone());
        assert!(installer.is_installed(&repo, &package).unwrap());
    }

    #[test]
    fn test_install_copies_dist_and_registers() {
        let dir = tempdir().unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir_all(dist.join("src")).unwrap();
        std::fs::write(dist.join("composer.json"), "{}").unwrap();
        std::fs::write(dist.join("src/Widget.php"), "<?php").unwrap();

        let vendor = dir.path().join("vendor");
        let package = Package::new("acme/widget", "library").with_dist(&dist);

        let mut binaries = MockBinaryService::new();
        binaries
            .expect_install_binaries()
            .with(eq(package.clone()), eq(vendor.join("acme/widget")))
            .times(1)
            .returning(|_, _| Ok(()));

        let installer = LibraryInstaller::new(RealRuntime, vendor.clone(), Arc::new(binaries));
        let mut repo = InstalledPackages::in_memory();
        installer.install(&mut repo, &package).unwrap();

        assert!(vendor.join("acme/widget/composer.json").is_file());
        assert!(vendor.join("acme/widget/src/Widget.php").is_file());
        assert!(repo.has_package(&package));
        assert!(installer.is_installed(&repo, &package).unwrap());
    }

    #[test]
    fn test_uninstall_removes_code_and_empty_namespace() {
        let dir = tempdir().unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("README"), "widget").unwrap();

        let vendor = dir.path().join("vendor");
        let package = Package::new("acme/widget", "library").with_dist(&dist);
        let installer = LibraryInstaller::new(RealRuntime, vendor.clone(), quiet_binaries());
        let mut repo = InstalledPackages::in_memory();

        installer.install(&mut repo, &package).unwrap();
        installer.uninstall(&mut repo, &package).unwrap();

        assert!(!vendor.join("acme/widget").exists());
        assert!(!vendor.join("acme").exists());
        assert!(vendor.exists());
        assert!(!repo.has_package(&package));
    }

    #[test]
    fn test_uninstall_not_installed_fails() {
        let installer = LibraryInstaller::new(
            MockRuntime::new(),
            PathBuf::from("/project/vendor"),
            quiet_binaries(),
        );
        let mut repo = InstalledPackages::in_memory();
        let err = installer
            .uninstall(&mut repo, &Package::new("acme/widget", "library"))
            .unwrap_err();
        assert!(err.to_string().contains("not installed"));
    }

    #[test]
    fn test_update_replaces_content() {
        let dir = tempdir().unwrap();
        let v1 = dir.path().join("v1");
        let v2 = dir.path().join("v2");
        std::fs::create_dir_all(&v1).unwrap();
        std::fs::create_dir_all(&v2).unwrap();
        std::fs::write(v1.join("OLD"), "1").unwrap();
        std::fs::write(v2.join("NEW"), "2").unwrap();

        let vendor = dir.path().join("vendor");
        let initial = Package::new("acme/widget", "library")
            .with_version("1.0.0")
            .with_dist(&v1);
        let target = Package::new("acme/widget", "library")
            .with_version("2.0.0")
            .with_dist(&v2);

        let installer = LibraryInstaller::new(RealRuntime, vendor.clone(), quiet_binaries());
        let mut repo = InstalledPackages::in_memory();
        installer.install(&mut repo, &initial).unwrap();
        installer.update(&mut repo, &initial, &target).unwrap();

        assert!(!vendor.join("acme/widget/OLD").exists());
        assert!(vendor.join("acme/widget/NEW").is_file());
        assert_eq!(repo.packages(), &[target]);
    }

    #[test]
    #[cfg(unix)]
    fn test_install_refuses_to_copy_through_leftover_link() {
        let dir = tempdir().unwrap();
        let checkout = dir.path().join("widget-src");
        std::fs::create_dir_all(&checkout).unwrap();
        std::fs::write(checkout.join("README"), "my local edits").unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("README"), "published").unwrap();

        let vendor = dir.path().join("vendor");
        std::fs::create_dir_all(vendor.join("acme")).unwrap();
        std::os::unix::fs::symlink(&checkout, vendor.join("acme/widget")).unwrap();

        // Binary service without expectations panics if called
        let installer =
            LibraryInstaller::new(RealRuntime, vendor.clone(), Arc::new(MockBinaryService::new()));
        let package = Package::new("acme/widget", "library").with_dist(&dist);
        let mut repo = InstalledPackages::in_memory();

        let err = installer.install(&mut repo, &package).unwrap_err();
        assert!(err.to_string().contains("is a symlink"));
        assert_eq!(
            std::fs::read_to_string(checkout.join("README")).unwrap(),
            "my local edits"
        );
        assert!(!repo.has_package(&package));
    }

    #[test]
    #[cfg(unix)]
    fn test_update_replaces_leftover_link_with_copy() {
        let dir = tempdir().unwrap();
        let checkout = dir.path().join("widget-src");
        std::fs::create_dir_all(&checkout).unwrap();
        std::fs::write(checkout.join("README"), "my local edits").unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("README"), "published").unwrap();

        let vendor = dir.path().join("vendor");
        std::fs::create_dir_all(vendor.join("acme")).unwrap();
        let install_path = vendor.join("acme/widget");
        std::os::unix::fs::symlink(&checkout, &install_path).unwrap();

        let installer = LibraryInstaller::new(RealRuntime, vendor.clone(), quiet_binaries());
        let package = Package::new("acme/widget", "library").with_dist(&dist);
        let mut repo = InstalledPackages::in_memory();
        repo.add_package(package.clone());

        installer.update(&mut repo, &package, &package).unwrap();

        assert!(!RealRuntime.is_symlink(&install_path));
        assert_eq!(
            std::fs::read_to_string(install_path.join("README")).unwrap(),
            "published"
        );
        assert_eq!(
            std::fs::read_to_string(checkout.join("README")).unwrap(),
            "my local edits"
        );
    }

    #[test]
    fn test_ensure_binaries_presence_skips_missing_package() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        // Binary service without expectations panics if called
        let installer = LibraryInstaller::new(
            runtime,
            PathBuf::from("/project/vendor"),
            Arc::new(MockBinaryService::new()),
        );
        installer
            .ensure_binaries_presence(&Package::new("acme/widget", "library"))
            .unwrap();
    }
}
