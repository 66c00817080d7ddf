//! Launch planning.
//!
//! This module contains the code to turn an installation into a ready-to-execute command.

use crate::error::{LauncherError, Result, io_at};
use crate::installation::{Installation, RuntimeOverride};
use crate::resolver::VersionResolver;
use crate::runtime::RuntimeCatalog;
use std::ffi::OsString;
use std::fmt;
use std::path::{self, Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, instrument};

/// A command to launch the game.
#[derive(Debug, PartialEq)]
pub(crate) struct LaunchPlan {
    /// The java executable.
    pub(crate) executable: PathBuf,
    /// The arguments passed to the java executable.
    pub(crate) args: Vec<OsString>,
}

impl LaunchPlan {
    /// Plans the launch of the given installation.
    ///
    /// Without a runtime override the installation is launched with the runtime of the given default major version
    /// from the catalog, otherwise the override is used verbatim. The artifact is downloaded if necessary.
    #[instrument(level = "trace", skip(catalog, resolver))]
    pub(crate) fn plan(installation: &Installation, catalog: &RuntimeCatalog, resolver: &VersionResolver, default_major: u32) -> Result<Self> {
        let executable = match &installation.runtime {
            RuntimeOverride::Default => {
                let Some(runtime) = catalog.find(default_major) else {
                    return Err(LauncherError::RuntimeNotFound(default_major));
                };
                runtime.java_exe()
            }
            RuntimeOverride::Explicit(path) => path.clone(),
        };
        debug!(executable = %executable.display());

        let artifact = absolute(&resolver.resolve(&installation.version_id)?)?;
        let game_dir = absolute(&installation.game_dir())?;
        let args = vec![
            OsString::from("-jar"),
            artifact.into_os_string(),
            OsString::from("--savedir"),
            game_dir.into_os_string(),
        ];

        Ok(Self { executable, args })
    }

    /// Returns the command described by this plan, inheriting the standard streams.
    pub(crate) fn command(&self) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .stdout(Stdio::inherit());

        command
    }

    /// Executes the command described by this plan and waits for it to finish.
    #[instrument(level = "trace")]
    pub(crate) fn execute(&self) -> Result<ExitStatus> {
        self.command().status().map_err(io_at(&self.executable))
    }
}

/// Display this LaunchPlan as a shell-like command line.
impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }

        Ok(())
    }
}

// Makes the given path absolute without touching the file system.
#[doc(hidden)]
fn absolute(path: &Path) -> Result<PathBuf> {
    path::absolute(path).map_err(io_at(path))
}
