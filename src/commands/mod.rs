use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::{
    host::{Host, HostConfig},
    package::{InstalledPackages, Package},
    plugin::SymlinkPlugin,
    runtime::Runtime,
};

mod status;

pub use status::{show_map, status};

/// Directories given on the command line.
#[derive(Debug, Clone)]
pub struct Dirs {
    pub vendor_dir: PathBuf,
    pub bin_dir: Option<PathBuf>,
}

impl Dirs {
    pub fn new(vendor_dir: impl AsRef<Path>, bin_dir: Option<PathBuf>) -> Self {
        Self {
            vendor_dir: vendor_dir.as_ref().to_path_buf(),
            bin_dir,
        }
    }
}

/// An initialized host together with its installed-package registry.
pub struct Project<R: Runtime + Clone + 'static> {
    pub host: Host<R>,
    pub repo: InstalledPackages,
}

impl<R: Runtime + Clone + 'static> Project<R> {
    /// Build the host for the current directory and fire its init hook.
    pub fn open(runtime: R, dirs: &Dirs) -> Result<Self> {
        let working_dir = runtime.current_dir()?;
        let config = HostConfig::new(working_dir, &dirs.vendor_dir, dirs.bin_dir.as_deref());
        debug!("Host configuration: {:?}", config);

        let repo = InstalledPackages::load(&runtime, &config.installed_file())?;
        let mut host = Host::with_default_installers(config, runtime);
        host.add_plugin(Box::new(SymlinkPlugin::new()));
        host.init()?;

        Ok(Self { host, repo })
    }

    fn save(&self) -> Result<()> {
        self.repo.save(self.host.runtime())
    }

    fn installed(&self, name: &str) -> Result<Package> {
        self.repo
            .find(name)
            .cloned()
            .with_context(|| format!("Package {} is not installed", name))
    }
}

#[tracing::instrument(skip(runtime, dirs))]
pub fn install<R: Runtime + Clone + 'static>(
    runtime: R,
    dirs: &Dirs,
    package: Package,
) -> Result<()> {
    let mut project = Project::open(runtime, dirs)?;
    let manager = project.host.installation_manager();
    manager.install(&mut project.repo, &package)?;
    project.save()?;
    println!("Installed {}", package);
    Ok(())
}

/// Update an installed package to `target`. A package missing from the
/// registry is treated as its own initial state.
#[tracing::instrument(skip(runtime, dirs))]
pub fn update<R: Runtime + Clone + 'static>(
    runtime: R,
    dirs: &Dirs,
    target: Package,
) -> Result<()> {
    let mut project = Project::open(runtime, dirs)?;
    let initial = project
        .repo
        .find(&target.name)
        .cloned()
        .unwrap_or_else(|| target.clone());

    let manager = project.host.installation_manager();
    manager.update(&mut project.repo, &initial, &target)?;
    project.save()?;
    println!("Updated {}", target);
    Ok(())
}

#[tracing::instrument(skip(runtime, dirs))]
pub fn uninstall<R: Runtime + Clone + 'static>(runtime: R, dirs: &Dirs, name: &str) -> Result<()> {
    let mut project = Project::open(runtime, dirs)?;
    let package = project.installed(name)?;

    let manager = project.host.installation_manager();
    manager.uninstall(&mut project.repo, &package)?;
    project.save()?;
    println!("Removed {}", package);
    Ok(())
}

/// Re-create missing binary stubs of an installed package.
#[tracing::instrument(skip(runtime, dirs))]
pub fn binaries<R: Runtime + Clone + 'static>(runtime: R, dirs: &Dirs, name: &str) -> Result<()> {
    let project = Project::open(runtime, dirs)?;
    let package = project.installed(name)?;

    project
        .host
        .installation_manager()
        .ensure_binaries_presence(&package)?;
    println!("Binaries of {} are in place", package);
    Ok(())
}
