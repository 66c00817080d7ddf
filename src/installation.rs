//! Installations.
//!
//! This module contains the installation records persisted below the installation directory.
//!
//! Each installation lives in its own directory, named after the installation, which holds the record file and the save
//! directory handed to the game.

use crate::error::{LauncherError, Result, io_at};
use crate::util::validate_name;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, instrument, trace};

/// Name of the record file within the installation directory.
pub(crate) const RECORD_FILE: &str = "info";

/// Name of the save directory within the installation directory.
pub(crate) const GAME_DIR: &str = "game";

// Serialized form of [RuntimeOverride::Default].
#[doc(hidden)]
const DEFAULT_RUNTIME: &str = "-";

/// The runtime an installation is launched with.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum RuntimeOverride {
    /// Use the default runtime from the catalog.
    #[default]
    Default,
    /// Use the given java executable.
    Explicit(PathBuf),
}

impl fmt::Display for RuntimeOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str(DEFAULT_RUNTIME),
            Self::Explicit(path) => write!(f, "{}", path.display()),
        }
    }
}

impl FromStr for RuntimeOverride {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err("empty runtime"),
            DEFAULT_RUNTIME => Ok(Self::Default),
            path => Ok(Self::Explicit(PathBuf::from(path))),
        }
    }
}

/// A named game configuration.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Installation {
    /// The name of the installation (also the name of its directory).
    pub(crate) name: String,
    /// The version of the game to launch.
    pub(crate) version_id: String,
    /// Number of launches (reserved, currently always 0).
    pub(crate) launch_count: u32,
    /// The runtime to launch the game with.
    pub(crate) runtime: RuntimeOverride,
    /// The directory of the installation.
    pub(crate) path: PathBuf,
}

impl Installation {
    /// Returns the save directory of this installation.
    pub(crate) fn game_dir(&self) -> PathBuf {
        self.path.join(GAME_DIR)
    }

    // Parses the record read from the given file.
    fn parse(name: &str, path: PathBuf, record_file: &Path, record: &str) -> Result<Self> {
        let lines: Vec<&str> = record.lines().collect();
        let [version_id, launch_count, runtime] = lines.as_slice() else {
            return Err(LauncherError::parse(record_file, format!("expected 3 lines, got {}", lines.len())));
        };
        if version_id.is_empty() {
            return Err(LauncherError::parse(record_file, "empty version"));
        }
        let launch_count = launch_count
            .parse::<u32>()
            .map_err(|err| LauncherError::parse(record_file, format!("invalid launch count '{launch_count}': {err}")))?;
        let runtime = runtime
            .parse::<RuntimeOverride>()
            .map_err(|err| LauncherError::parse(record_file, format!("invalid runtime '{runtime}': {err}")))?;

        Ok(Self {
            name: name.to_string(),
            version_id: version_id.to_string(),
            launch_count,
            runtime,
            path,
        })
    }

    // Returns the serialized record.
    fn record(&self) -> String {
        format!("{}\n{}\n{}", self.version_id, self.launch_count, self.runtime)
    }
}

/// The store for all installations below a directory.
#[derive(Debug)]
pub(crate) struct InstallationStore {
    root: PathBuf,
}

impl InstallationStore {
    /// Creates a new `InstallationStore` for the given directory.
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a new installation including its empty save directory.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn create(&self, name: &str, version_id: &str) -> Result<Installation> {
        let path = self.path(name)?;
        validate_name(version_id)?;

        // create_dir fails if the directory exists, so an existing record is never touched
        if let Err(err) = fs::create_dir(&path) {
            return Err(match err.kind() {
                ErrorKind::AlreadyExists => LauncherError::AlreadyExists(name.to_string()),
                _ => LauncherError::Io { path, source: err },
            });
        }
        let installation = Self::fresh(name, version_id, path);
        let game_dir = installation.game_dir();
        fs::create_dir(&game_dir).map_err(io_at(&game_dir))?;
        self.write(&installation)?;
        debug!(name, version_id, "installation created");

        Ok(installation)
    }

    /// Replaces version and runtime of an existing installation, the save directory is kept.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn edit(&self, name: &str, version_id: &str) -> Result<Installation> {
        let path = self.existing(name)?;
        validate_name(version_id)?;

        let installation = Self::fresh(name, version_id, path);
        self.write(&installation)?;
        debug!(name, version_id, "installation updated");

        Ok(installation)
    }

    /// Removes an installation including its save directory.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn remove(&self, name: &str) -> Result<()> {
        let path = self.existing(name)?;
        fs::remove_dir_all(&path).map_err(io_at(&path))?;
        debug!(name, "installation removed");

        Ok(())
    }

    /// Reads an installation.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn read(&self, name: &str) -> Result<Installation> {
        let path = self.existing(name)?;
        let record_file = path.join(RECORD_FILE);
        let record = fs::read_to_string(&record_file).map_err(io_at(&record_file))?;
        trace!(?record);

        Installation::parse(name, path, &record_file, &record)
    }

    /// Reads all installations ordered by name.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn list(&self) -> Result<Vec<Installation>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_at(&self.root))? {
            let entry = entry.map_err(io_at(&self.root))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();

        names.iter().map(|name| self.read(name)).collect()
    }

    // Returns the directory of the installation with the given name.
    fn path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_name(name)?))
    }

    // Returns the directory of the installation with the given name if it exists.
    fn existing(&self, name: &str) -> Result<PathBuf> {
        let path = self.path(name)?;
        if !path.is_dir() {
            return Err(LauncherError::InstallationNotFound(name.to_string()));
        }

        Ok(path)
    }

    // Returns an installation with reset launch count and runtime.
    fn fresh(name: &str, version_id: &str, path: PathBuf) -> Installation {
        Installation {
            name: name.to_string(),
            version_id: version_id.to_string(),
            launch_count: 0,
            runtime: RuntimeOverride::Default,
            path,
        }
    }

    // Writes the record of the given installation.
    fn write(&self, installation: &Installation) -> Result<()> {
        let record_file = installation.path.join(RECORD_FILE);
        fs::write(&record_file, installation.record()).map_err(io_at(&record_file))
    }
}
