//! Version manifest.
//!
//! This module contains the model of the version manifest that maps version ids to the download URL of the game artifact.

use crate::error::{LauncherError, Result, io_at};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::instrument;

/// The version manifest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Manifest {
    /// A bare list of versions.
    Versions(Vec<ManifestVersion>),
    /// An object with a list of versions (the upstream format).
    Wrapped { versions: Vec<ManifestVersion> },
}

/// An entry of the version manifest.
#[derive(Debug, Deserialize)]
pub(crate) struct ManifestVersion {
    pub(crate) id: String,
    pub(crate) client: ManifestDownload,
}

/// A download referenced by the version manifest.
#[derive(Debug, Deserialize)]
pub(crate) struct ManifestDownload {
    pub(crate) url: String,
}

impl Manifest {
    /// Loads the `Manifest` from the given filename.
    #[instrument(err(level = "trace"), level = "trace")]
    pub(crate) fn load(filename: &Path) -> Result<Self> {
        let manifest = fs::read(filename).map_err(io_at(filename))?;
        serde_json::from_slice(&manifest).map_err(|err| LauncherError::parse(filename, err.to_string()))
    }

    /// Returns all versions.
    pub(crate) fn versions(&self) -> &[ManifestVersion] {
        match self {
            Self::Versions(versions) | Self::Wrapped { versions } => versions,
        }
    }

    /// Returns the entry with the given id.
    pub(crate) fn find(&self, id: &str) -> Result<&ManifestVersion> {
        self.versions()
            .iter()
            .find(|version| version.id == id)
            .ok_or_else(|| LauncherError::VersionNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use tempfile::tempdir;
    use test_log::test;

    #[test]
    fn bare_list() {
        let json = r#"[{"id": "1.20.1", "client": {"url": "https://example/x.jar"}}]"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!("https://example/x.jar", manifest.find("1.20.1").unwrap().client.url);
    }

    #[test]
    fn wrapped_list_with_unknown_fields() {
        let json = r#"{
            "latest": {"release": "1.20.1"},
            "versions": [
                {"id": "1.19.4", "type": "release", "client": {"sha1": "abc", "url": "https://example/a.jar"}},
                {"id": "1.20.1", "type": "release", "client": {"url": "https://example/b.jar"}}
            ]
        }"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(2, manifest.versions().len());
        assert_eq!("https://example/a.jar", manifest.find("1.19.4").unwrap().client.url);
    }

    #[test]
    fn missing_version() {
        let manifest: Manifest = serde_json::from_str("[]").unwrap();
        let err = manifest.find("1.20.1").unwrap_err();
        assert!(matches!(err, LauncherError::VersionNotFound(_)), "{err:?}");
    }

    #[test]
    fn load_malformed() {
        let tempdir = tempdir().unwrap();
        let file = tempdir.path().join("version_manifest.json");
        fs::write(&file, r#"{"versions": "nope"}"#).unwrap();

        let err = Manifest::load(&file).unwrap_err();
        assert!(matches!(err, LauncherError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn load_missing() {
        let tempdir = tempdir().unwrap();

        let err = Manifest::load(&tempdir.path().join("version_manifest.json")).unwrap_err();
        assert!(matches!(err, LauncherError::Io { .. }), "{err:?}");
    }
}
