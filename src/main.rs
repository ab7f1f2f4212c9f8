use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use symlink_deps::commands::{self, Dirs};
use symlink_deps::package::{DEFAULT_PACKAGE_TYPE, Package};
use symlink_deps::runtime::{RealRuntime, Runtime};

/// symlink-deps - install selected dependencies as symlinks to local checkouts
///
/// Packages listed in `../bundle.map.json` (or `../bundles/bundle.map.json`)
/// relative to the current directory are linked into the vendor directory
/// instead of being copied.
///
/// Examples:
///   symlink-deps install acme/widget --dist ./dist/widget
///   symlink-deps map
#[derive(Parser, Debug)]
#[command(author, version = env!("SYMLINK_DEPS_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vendor directory packages are installed into
    #[arg(
        long = "vendor-dir",
        env = "SYMLINK_DEPS_VENDOR_DIR",
        value_name = "PATH",
        default_value = "vendor",
        global = true
    )]
    pub vendor_dir: PathBuf,

    /// Directory for binary stubs (defaults to <vendor-dir>/bin)
    #[arg(
        long = "bin-dir",
        env = "SYMLINK_DEPS_BIN_DIR",
        value_name = "PATH",
        global = true
    )]
    pub bin_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install a package
    Install(PackageArgs),

    /// Update an installed package
    Update(PackageArgs),

    /// Remove an installed package
    Uninstall(NameArgs),

    /// Show install path and state of a package
    Status(NameArgs),

    /// Re-create missing binary stubs of an installed package
    Binaries(NameArgs),

    /// Show the symlink map for the current directory
    Map,
}

#[derive(clap::Args, Debug)]
pub struct PackageArgs {
    /// Package name, e.g. "acme/widget"
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Package type
    #[arg(long = "type", value_name = "TYPE", default_value = DEFAULT_PACKAGE_TYPE)]
    pub kind: String,

    /// Package version
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Local directory holding the package files
    #[arg(long, value_name = "DIR")]
    pub dist: Option<PathBuf>,

    /// Binary declared by the package, relative to its root (repeatable)
    #[arg(long = "bin", value_name = "PATH")]
    pub bin: Vec<String>,
}

impl PackageArgs {
    fn into_package(self) -> Package {
        let mut package = Package::new(self.name, self.kind);
        package.version = self.version;
        package.dist = self.dist;
        package.bin = self.bin;
        package
    }
}

#[derive(clap::Args, Debug)]
pub struct NameArgs {
    /// Package name, e.g. "acme/widget"
    #[arg(value_name = "NAME")]
    pub name: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;
    let dirs = Dirs::new(&cli.vendor_dir, cli.bin_dir);

    match cli.command {
        Commands::Install(args) => commands::install(runtime, &dirs, args.into_package())?,
        Commands::Update(args) => commands::update(runtime, &dirs, args.into_package())?,
        Commands::Uninstall(args) => commands::uninstall(runtime, &dirs, &args.name)?,
        Commands::Status(args) => commands::status(runtime, &dirs, &args.name)?,
        Commands::Binaries(args) => commands::binaries(runtime, &dirs, &args.name)?,
        Commands::Map => commands::show_map(&runtime, &runtime.current_dir()?)?,
    }
    Ok(())
}
