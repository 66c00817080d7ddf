//! Version resolver.
//!
//! This module contains the code to provide the game artifact for a version, downloading it if it is not cached yet.

use crate::error::{Result, io_at};
use crate::manifest::Manifest;
use crate::net::Fetch;
use crate::util::validate_name;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace, warn};

// Extension of the cached game artifacts.
#[doc(hidden)]
const ARTIFACT_EXT: &str = "jar";

// Extension of an artifact that is still being downloaded.
#[doc(hidden)]
const PARTIAL_EXT: &str = "part";

/// Resolves versions to game artifacts within the versions directory.
pub(crate) struct VersionResolver<'a> {
    fetch: &'a dyn Fetch,
    manifest: PathBuf,
    root: PathBuf,
}

impl<'a> VersionResolver<'a> {
    /// Creates a new `VersionResolver` for the given versions directory and manifest file name.
    pub(crate) fn new(root: impl Into<PathBuf>, manifest: &str, fetch: &'a dyn Fetch) -> Self {
        let root = root.into();
        Self {
            fetch,
            manifest: root.join(manifest),
            root,
        }
    }

    /// Returns the path of the cached artifact for the given version.
    pub(crate) fn artifact_path(&self, version_id: &str) -> Result<PathBuf> {
        let version_id = validate_name(version_id)?;

        Ok(self.root.join(format!("{version_id}.{ARTIFACT_EXT}")))
    }

    /// Returns the path to the artifact for the given version and downloads it first if necessary.
    ///
    /// An artifact already present is trusted as-is, it is neither refreshed nor verified.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn resolve(&self, version_id: &str) -> Result<PathBuf> {
        let artifact = self.artifact_path(version_id)?;

        // check if already downloaded
        if artifact.exists() {
            trace!(artifact = %artifact.display(), "no download necessary");
            return Ok(artifact);
        }

        let manifest = Manifest::load(&self.manifest)?;
        let version = manifest.find(version_id)?;
        let url = &version.client.url;

        println!("Downloading version {version_id}");
        debug!(%url, artifact = %artifact.display(), "downloading artifact");
        let partial = partial_path(&artifact);
        if let Err(err) = self.fetch.fetch(url, &partial) {
            remove_partial(&partial);
            return Err(err);
        }
        fs::rename(&partial, &artifact).map_err(io_at(&artifact))?;

        Ok(artifact)
    }
}

// Returns the path the given artifact is downloaded to before it is moved in place.
#[doc(hidden)]
fn partial_path(artifact: &Path) -> PathBuf {
    let mut partial = artifact.as_os_str().to_owned();
    partial.push(".");
    partial.push(PARTIAL_EXT);
    PathBuf::from(partial)
}

// Removes an incomplete download, if there is one.
#[doc(hidden)]
fn remove_partial(partial: &Path) {
    if partial.exists() {
        if let Err(err) = fs::remove_file(partial) {
            warn!(?err, partial = %partial.display(), "failed to delete incomplete download");
        }
    }
}
