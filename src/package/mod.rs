//! Package model
//!
//! This module provides the package value handed to installers and the
//! registry of installed packages.

mod repository;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub use repository::{InstalledPackages, InstalledRepository};

/// Type tag used when a package does not declare one.
pub const DEFAULT_PACKAGE_TYPE: &str = "library";

fn default_kind() -> String {
    DEFAULT_PACKAGE_TYPE.to_string()
}

/// A package as tracked by the host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Package {
    /// Display name (e.g., "acme/widget"), also the symlink map key
    pub name: String,
    /// Type tag selecting the installer (e.g., "library")
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Local directory the default installer copies the package from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<PathBuf>,
    /// Binaries declared by the package, relative to its install path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bin: Vec<String>,
}

impl Package {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            version: None,
            dist: None,
            bin: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_dist(mut self, dist: impl Into<PathBuf>) -> Self {
        self.dist = Some(dist.into());
        self
    }

    pub fn with_bin(mut self, bin: impl Into<String>) -> Self {
        self.bin.push(bin.into());
        self
    }

    /// Whether both values denote the same installed package.
    ///
    /// Package names are case-insensitive.
    pub fn is_same(&self, other: &Package) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} ({})", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}
