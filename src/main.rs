mod args;
mod colors;
mod commands;
mod config;
mod error;
mod installation;
mod launch;
mod manifest;
mod net;
mod provision;
mod resolver;
mod runtime;
mod util;

use crate::args::{Args, LONG_VERSION};
use crate::colors::*;
use crate::commands::Launcher;
use crate::config::*;
use crate::error::{EXIT_GENERIC, LauncherError};
use clap::Parser;
use std::path::{self, PathBuf};
use tracing::{level_filters::*, *};
use tracing_subscriber::EnvFilter;

// Exit code used in case there were no errors.
#[doc(hidden)]
const EXIT_OK: i32 = 0;

/// Main entry point for the application.
fn main() {
    // enable ansi support to use colorised/styled output
    #[cfg(windows)]
    let _ = nu_ansi_term::enable_ansi_support();

    // delegate
    if let Err(err) = internal_main() {
        let launcher_err = err.downcast_ref::<LauncherError>();
        if launcher_err.is_some_and(LauncherError::is_not_found) {
            // missing installations/runtimes are reported without the error chain
            eprintln!("{}", ATTENTION_COLOR.paint(err.to_string()));
        } else {
            let err_str = ATTENTION_COLOR.paint(format!("err = {err:#}"));
            eprintln!("Failed!\r\n\t{err_str}");
        }
        std::process::exit(launcher_err.map_or(EXIT_GENERIC, LauncherError::exit_code));
    } else {
        std::process::exit(EXIT_OK);
    }
}

// Internal main entry point for the application.
#[doc(hidden)]
fn internal_main() -> anyhow::Result<()> {
    // parse arguments
    let args = Args::parse();

    // print some information
    if !args.quiet {
        print_info();
    }

    // init tracing
    init_tracing(&args);

    // print parsed arguments
    trace!("arguments: {args:#?}");

    // load config, only an explicitly given file has to exist
    let config_path = PathBuf::from(args.config.as_deref().unwrap_or(CONFIG_FILENAME));
    let config_path = path::absolute(&config_path).unwrap_or(config_path);
    let config = if args.config.is_some() {
        Config::load_from_file(&config_path)?
    } else {
        Config::load_or_default(&config_path)?
    };
    debug!(?config);

    // derive base directory from config file.
    let Some(basedir) = config_path.parent() else {
        let message = "Failed to determine base directory!";
        println!("{}", ATTENTION_COLOR.paint(message));
        return Ok(());
    };
    debug!(basedir = %basedir.display());

    let launcher = Launcher::new(basedir, config);
    launcher.bootstrap()?;
    launcher.execute(&args.command)?;

    Ok(())
}

// Prints some information (version, path of executable, etc.).
#[doc(hidden)]
fn print_info() {
    let name = env!("CARGO_PKG_NAME");
    if let Ok(exe) = std::env::current_exe() {
        let exe = PATH_COLOR.paint(exe.to_string_lossy());
        println!("{name} {LONG_VERSION} [{exe}]");
    } else {
        println!("{name} {LONG_VERSION}");
    }
}

// Initialises the tracing framework based on given command line arguments.
#[doc(hidden)]
fn init_tracing(args: &Args) {
    let level_filter = match args.verbose {
        0 => LevelFilter::ERROR.into(),
        1 => LevelFilter::WARN.into(),
        2 => LevelFilter::INFO.into(),
        3 => LevelFilter::DEBUG.into(),
        _ => LevelFilter::TRACE.into(),
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level_filter);
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();
}
