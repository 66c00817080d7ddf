//! Arguments.
//!
//! This module contains the definition for the available command-line parameter.

use clap::{Parser, Subcommand};

/// Version information including git and compiler details.
pub(crate) const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (git/",
    env!("VERGEN_GIT_DESCRIBE"),
    ") (rustc/",
    env!("VERGEN_RUSTC_SEMVER"),
    ")"
);

#[derive(Debug, Parser)]
#[clap(author, about, version, long_version = LONG_VERSION)]
pub(crate) struct Args {
    /// Sets a custom config file
    #[clap(short, long, value_name = "file")]
    pub(crate) config: Option<String>,
    /// Suppress unnecessary information
    #[clap(short = 'q', long, action)]
    pub(crate) quiet: bool,
    /// Change level of verbosity (apply multiple times to increase level)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,
    /// The command to execute
    #[clap(subcommand)]
    pub(crate) command: Command,
}

/// The available commands.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Creates a new installation
    Create(InstallationArgs),
    /// Changes the version of an installation (resets a custom runtime)
    Edit(InstallationArgs),
    /// Removes an installation including its saves
    Remove(NameArgs),
    /// Launches an installation
    Launch(LaunchArgs),
    /// Lists all installations
    List,
    /// Lists all installed runtimes
    Runtimes,
}

/// Arguments for commands that bind an installation to a version.
#[derive(Debug, clap::Args)]
pub(crate) struct InstallationArgs {
    /// The name of the installation
    #[clap(short, long)]
    pub(crate) name: String,
    /// The version of the game
    #[clap(short = 'v', long = "version")]
    pub(crate) version: String,
}

/// Arguments for commands that only need the name of an installation.
#[derive(Debug, clap::Args)]
pub(crate) struct NameArgs {
    /// The name of the installation
    #[clap(short, long)]
    pub(crate) name: String,
}

/// Arguments for the launch command.
#[derive(Debug, clap::Args)]
pub(crate) struct LaunchArgs {
    /// The name of the installation
    #[clap(short, long)]
    pub(crate) name: String,
    /// Only print the command that would be executed
    #[clap(long, action)]
    pub(crate) dry_run: bool,
}
