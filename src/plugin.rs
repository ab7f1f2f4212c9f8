//! Plugin routing mapped packages through the [`SymlinkInstaller`].

use anyhow::Result;
use log::{debug, info};
use std::sync::Arc;

use crate::config::SymlinkMap;
use crate::host::{Host, Plugin};
use crate::installer::{BinaryInstaller, InstallationManager, InstallerProvider, SymlinkInstaller};
use crate::runtime::Runtime;

/// On init, loads the symlink map and, when it is not empty, replaces the
/// host's installation manager with one that only knows the
/// [`SymlinkInstaller`]. The previous manager becomes its default installers.
#[derive(Debug, Default)]
pub struct SymlinkPlugin;

impl SymlinkPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl<R: Runtime + Clone + 'static> Plugin<R> for SymlinkPlugin {
    fn name(&self) -> &str {
        "symlink"
    }

    fn on_init(&self, host: &mut Host<R>) -> Result<()> {
        let symlinks = SymlinkMap::discover(host.runtime(), &host.config().working_dir)?;
        if symlinks.is_empty() {
            debug!("No symlinked packages configured");
            return Ok(());
        }

        info!("{} package(s) will be installed as symlinks", symlinks.len());
        for (name, path) in symlinks.iter() {
            debug!("{} -> {:?}", name, path);
        }

        let config = host.config().clone();
        let binaries = Arc::new(BinaryInstaller::new(host.runtime().clone(), config.bin_dir));
        let defaults: Arc<dyn InstallerProvider> = host.installation_manager();

        let mut installer = SymlinkInstaller::new(host.runtime().clone(), config.vendor_dir, binaries);
        installer
            .set_default_installers(defaults)
            .set_symlink_map(symlinks);

        let mut manager = InstallationManager::new();
        manager.add_installer(Arc::new(installer));
        host.set_installation_manager(Arc::new(manager));
        Ok(())
    }
}
