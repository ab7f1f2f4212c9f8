use anyhow::Result;
use std::path::Path;

use super::{Dirs, Project};
use crate::{
    config::SymlinkMap,
    package::{DEFAULT_PACKAGE_TYPE, Package},
    runtime::Runtime,
};

/// Print where a package lives and how it is installed.
#[tracing::instrument(skip(runtime, dirs))]
pub fn status<R: Runtime + Clone + 'static>(runtime: R, dirs: &Dirs, name: &str) -> Result<()> {
    let project = Project::open(runtime, dirs)?;
    let package = project
        .repo
        .find(name)
        .cloned()
        .unwrap_or_else(|| Package::new(name, DEFAULT_PACKAGE_TYPE));

    let manager = project.host.installation_manager();
    let install_path = manager.install_path(&package)?;
    let installed = manager.is_installed(&project.repo, &package)?;

    println!("{}", package);
    println!("  Type: {}", package.kind);
    println!("  Path: {}", install_path.display());
    println!("  Installed: {}", if installed { "yes" } else { "no" });

    let runtime = project.host.runtime();
    if runtime.is_symlink(&install_path) {
        match runtime.read_link(&install_path) {
            Ok(target) => println!("  Symlink: {}", target.display()),
            Err(_) => println!("  Symlink: (unreadable)"),
        }
    }
    Ok(())
}

/// Print the symlink map that applies to `working_dir`.
#[tracing::instrument(skip(runtime))]
pub fn show_map<R: Runtime>(runtime: &R, working_dir: &Path) -> Result<()> {
    let symlinks = SymlinkMap::discover(runtime, working_dir)?;
    if symlinks.is_empty() {
        println!("No symlinked packages configured.");
        println!("Looked for:");
        for candidate in SymlinkMap::candidates(working_dir) {
            println!("  {}", candidate.display());
        }
        return Ok(());
    }

    for (name, path) in symlinks.iter() {
        println!("{} -> {}", name, path.display());
    }
    Ok(())
}
