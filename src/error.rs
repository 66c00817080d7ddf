//! Errors.
//!
//! This module contains the error type shared by the installation store, the runtime catalog and the launch machinery.

use std::io;
use std::path::{Path, PathBuf};

/// Exit code used for errors without a more specific code.
pub(crate) const EXIT_GENERIC: i32 = 1;

/// The error type for all launcher operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum LauncherError {
    /// There is no installation with the given name.
    #[error("installation '{0}' not found")]
    InstallationNotFound(String),
    /// There is no runtime with the given major version.
    #[error("no runtime with major version {0} found")]
    RuntimeNotFound(u32),
    /// An installation with the given name already exists.
    #[error("installation '{0}' already exists")]
    AlreadyExists(String),
    /// The given name can't be used as a file name.
    #[error("invalid name '{0}'")]
    InvalidName(String),
    /// A file has not the expected structure.
    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
    /// The manifest has no entry for the given version.
    #[error("version '{0}' not found in manifest")]
    VersionNotFound(String),
    /// The HTTP client could not be set up.
    #[error("failed to create http client")]
    Client(#[source] reqwest::Error),
    /// A download failed.
    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// An archive could not be unpacked.
    #[error("failed to extract {}: {reason}", .path.display())]
    Extract { path: PathBuf, reason: String },
    /// Any other I/O failure.
    #[error("i/o error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LauncherError {
    /// Creates a [`LauncherError::Parse`].
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`LauncherError::Extract`].
    pub(crate) fn extract(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Extract {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error denotes a missing installation or runtime.
    pub(crate) fn is_not_found(&self) -> bool {
        matches!(self, Self::InstallationNotFound(_) | Self::RuntimeNotFound(_))
    }

    /// Returns the process exit code for this error.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::InstallationNotFound(_) | Self::RuntimeNotFound(_) => 2,
            Self::AlreadyExists(_) => 3,
            Self::Parse { .. } => 4,
            Self::VersionNotFound(_) => 5,
            Self::Client(_) | Self::Fetch { .. } => 6,
            Self::Extract { .. } => 7,
            Self::InvalidName(_) => 8,
            Self::Io { .. } => EXIT_GENERIC,
        }
    }
}

/// Returns a closure that wraps an [`io::Error`] into a [`LauncherError::Io`] for the given path.
pub(crate) fn io_at(path: &Path) -> impl FnOnce(io::Error) -> LauncherError + '_ {
    move |source| LauncherError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Result type used throughout the launcher.
pub(crate) type Result<T, E = LauncherError> = std::result::Result<T, E>;
