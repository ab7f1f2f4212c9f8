//! Host package manager: configuration, active installation manager and plugins.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::installer::{BinaryInstaller, BinaryService, InstallationManager, LibraryInstaller};
use crate::runtime::Runtime;

/// Directories the host installs into.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Project directory the host runs in
    pub working_dir: PathBuf,
    /// Root directory of installed packages
    pub vendor_dir: PathBuf,
    /// Directory receiving binary stubs
    pub bin_dir: PathBuf,
}

impl HostConfig {
    /// Resolve `vendor_dir` and `bin_dir` against `working_dir`.
    ///
    /// `bin_dir` defaults to `<vendor_dir>/bin`.
    pub fn new(working_dir: PathBuf, vendor_dir: &Path, bin_dir: Option<&Path>) -> Self {
        let vendor_dir = working_dir.join(vendor_dir);
        let bin_dir = match bin_dir {
            Some(dir) => working_dir.join(dir),
            None => vendor_dir.join("bin"),
        };
        Self {
            working_dir,
            vendor_dir,
            bin_dir,
        }
    }

    /// Path of the installed-package registry file.
    pub fn installed_file(&self) -> PathBuf {
        self.vendor_dir.join("installed.json")
    }
}

/// Lifecycle hook fired once when the host initializes.
pub trait Plugin<R: Runtime + Clone + 'static> {
    fn name(&self) -> &str;
    fn on_init(&self, host: &mut Host<R>) -> Result<()>;
}

pub struct Host<R: Runtime + Clone + 'static> {
    config: HostConfig,
    runtime: R,
    manager: Arc<InstallationManager>,
    plugins: Vec<Box<dyn Plugin<R>>>,
}

impl<R: Runtime + Clone + 'static> Host<R> {
    /// A host with no installers.
    pub fn new(config: HostConfig, runtime: R) -> Self {
        Self {
            config,
            runtime,
            manager: Arc::new(InstallationManager::new()),
            plugins: Vec::new(),
        }
    }

    /// A host with the default `library` installer.
    pub fn with_default_installers(config: HostConfig, runtime: R) -> Self {
        let binaries: Arc<dyn BinaryService> = Arc::new(BinaryInstaller::new(
            runtime.clone(),
            config.bin_dir.clone(),
        ));
        let mut manager = InstallationManager::new();
        manager.add_installer(Arc::new(LibraryInstaller::new(
            runtime.clone(),
            config.vendor_dir.clone(),
            binaries,
        )));

        let mut host = Self::new(config, runtime);
        host.manager = Arc::new(manager);
        host
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn installation_manager(&self) -> Arc<InstallationManager> {
        Arc::clone(&self.manager)
    }

    /// Replace the installation manager used for all later package operations.
    pub fn set_installation_manager(&mut self, manager: Arc<InstallationManager>) {
        debug!("Installation manager replaced");
        self.manager = manager;
    }

    pub fn add_plugin(&mut self, plugin: Box<dyn Plugin<R>>) {
        self.plugins.push(plugin);
    }

    /// Fire `on_init` for every plugin, in registration order.
    pub fn init(&mut self) -> Result<()> {
        let plugins = std::mem::take(&mut self.plugins);
        let mut result = Ok(());
        for plugin in &plugins {
            debug!("Initializing plugin {}", plugin.name());
            result = plugin.on_init(self);
            if result.is_err() {
                break;
            }
        }
        self.plugins = plugins;
        result
    }
}
