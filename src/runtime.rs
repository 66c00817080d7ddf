//! Runtime catalog.
//!
//! This module contains the discovery of java runtimes installed below the runtime directory.

use crate::error::{LauncherError, Result, io_at};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace, warn};

/// Name of the file within a runtime that holds the release metadata.
pub(crate) const RELEASE_FILE: &str = "release";

// Key of the version entry within the release metadata.
#[doc(hidden)]
const JAVA_VERSION_KEY: &str = "JAVA_VERSION";

// Prefix of java versions before java 9.
#[doc(hidden)]
const LEGACY_PREFIX: &str = "1.";

// Name of the java executable.
#[cfg(not(windows))]
#[doc(hidden)]
const JAVA_EXE: &str = "java";

// Name of the java executable.
#[cfg(windows)]
#[doc(hidden)]
const JAVA_EXE: &str = "java.exe";

/// A java runtime discovered on disc.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Runtime {
    /// The home directory of the runtime.
    pub(crate) path: PathBuf,
    /// The major version extracted from the release metadata.
    pub(crate) major_version: u32,
}

impl Runtime {
    /// Returns the path to the java executable of this runtime.
    pub(crate) fn java_exe(&self) -> PathBuf {
        self.path.join("bin").join(JAVA_EXE)
    }

    // Reads the runtime whose home is the given directory.
    fn load(path: PathBuf) -> Result<Self> {
        let release = path.join(RELEASE_FILE);
        let content = fs::read_to_string(&release).map_err(io_at(&release))?;
        let Some(version) = java_version(&content) else {
            return Err(LauncherError::parse(&release, format!("no {JAVA_VERSION_KEY} entry")));
        };
        let Some(major_version) = parse_major_version(version) else {
            return Err(LauncherError::parse(&release, format!("unrecognised version '{version}'")));
        };

        Ok(Self { path, major_version })
    }
}

/// The runtimes found below the runtime directory, ordered by path.
#[derive(Debug, Default)]
pub(crate) struct RuntimeCatalog {
    runtimes: Vec<Runtime>,
}

impl RuntimeCatalog {
    /// Scans every immediate subdirectory of the given directory for a runtime.
    #[instrument(level = "trace")]
    pub(crate) fn scan(root: &Path) -> Result<Self> {
        let mut runtimes = Vec::new();
        for entry in fs::read_dir(root).map_err(io_at(root))? {
            let entry = entry.map_err(io_at(root))?;

            let path = entry.path();
            let Some(name) = path.file_name() else {
                continue;
            };

            // skip scratch data (e.g. left-overs from provisioning)
            if name.to_string_lossy().starts_with('.') || !path.is_dir() {
                trace!(path = %path.display(), "skipping");
                continue;
            }

            // directories without release metadata are no runtimes
            let home = runtime_home(path);
            if !home.join(RELEASE_FILE).is_file() {
                warn!(path = %home.display(), "skipping directory without {RELEASE_FILE} file");
                continue;
            }

            let runtime = Runtime::load(home)?;
            debug!(path = %runtime.path.display(), major = runtime.major_version, "found runtime");
            runtimes.push(runtime);
        }
        runtimes.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(Self { runtimes })
    }

    /// Returns all runtimes.
    pub(crate) fn list(&self) -> &[Runtime] {
        &self.runtimes
    }

    /// Whether there is no runtime at all.
    pub(crate) fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }

    /// Returns the first runtime (in path order) with the given major version.
    pub(crate) fn find(&self, major_version: u32) -> Option<&Runtime> {
        let mut candidates = self.runtimes.iter().filter(|runtime| runtime.major_version == major_version);
        let found = candidates.next()?;
        let ignored: Vec<_> = candidates.map(|runtime| runtime.path.display().to_string()).collect();
        if !ignored.is_empty() {
            warn!(chosen = %found.path.display(), ?ignored, major_version, "multiple runtimes with the same major version");
        }

        Some(found)
    }
}

// Returns the runtime home within the given directory (bundles on macOS keep it in `Contents/Home`).
#[doc(hidden)]
fn runtime_home(path: PathBuf) -> PathBuf {
    if path.join(RELEASE_FILE).exists() {
        return path;
    }

    let bundle_home = path.join("Contents").join("Home");
    if bundle_home.join(RELEASE_FILE).exists() { bundle_home } else { path }
}

// Returns the (unquoted) value of the version entry within the given release metadata.
#[doc(hidden)]
fn java_version(release: &str) -> Option<&str> {
    release.lines().find_map(|line| {
        let value = line.trim().strip_prefix(JAVA_VERSION_KEY)?.strip_prefix('=')?;
        let value = value.trim().strip_prefix('"')?.strip_suffix('"')?;
        (!value.is_empty()).then_some(value)
    })
}

/// Extracts the major version from a java version string (`1.8.0_292` is 8, `17.0.2` is 17).
pub(crate) fn parse_major_version(version: &str) -> Option<u32> {
    let major = match version.strip_prefix(LEGACY_PREFIX) {
        Some(rest) => rest.split('.').next()?,
        None => version.split('.').next()?,
    };

    major.parse().ok()
}

#[cfg(test)]
pub(crate) mod tests {

    use super::*;
    use tempfile::tempdir;
    use test_log::test;

    /// Creates a fake runtime with the given version below the given directory.
    pub(crate) fn fake_runtime(root: &Path, name: &str, version: &str) -> PathBuf {
        let home = root.join(name);
        fs::create_dir_all(home.join("bin")).unwrap();
        let release = format!("IMPLEMENTOR=\"Eclipse Adoptium\"\nJAVA_VERSION=\"{version}\"\nOS_NAME=\"Linux\"\n");
        fs::write(home.join(RELEASE_FILE), release).unwrap();
        home
    }

    #[test]
    fn major_version_legacy() {
        assert_eq!(Some(8), parse_major_version("1.8.0_292"));
        assert_eq!(Some(7), parse_major_version("1.7.0"));
    }

    #[test]
    fn major_version_modern() {
        assert_eq!(Some(17), parse_major_version("17.0.2"));
        assert_eq!(Some(21), parse_major_version("21.0.5"));
    }

    #[test]
    fn major_version_without_dots() {
        assert_eq!(Some(11), parse_major_version("11"));
        assert_eq!(Some(8), parse_major_version("1.8"));
    }

    #[test]
    fn major_version_garbage() {
        assert_eq!(None, parse_major_version(""));
        assert_eq!(None, parse_major_version("abc"));
        assert_eq!(None, parse_major_version("1."));
    }

    #[test]
    fn java_version_entry() {
        let release = "IMPLEMENTOR=\"Azul\"\nJAVA_VERSION=\"1.8.0_292\"\nJAVA_VERSION_DATE=\"2021-04-20\"\n";
        assert_eq!(Some("1.8.0_292"), java_version(release));
        assert_eq!(None, java_version("JAVA_VERSION_DATE=\"2021-04-20\"\n"));
        assert_eq!(None, java_version("JAVA_VERSION=17\n"));
    }

    #[test]
    fn scan_empty() {
        let tempdir = tempdir().unwrap();
        let catalog = RuntimeCatalog::scan(tempdir.path()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(None, catalog.find(8));
    }

    #[test]
    fn scan_and_find() {
        let tempdir = tempdir().unwrap();
        let root = tempdir.path();
        let jdk8 = fake_runtime(root, "jdk8u292-b10", "1.8.0_292");
        fake_runtime(root, "jdk-17.0.2+8", "17.0.2");
        fs::write(root.join("notes.txt"), "not a runtime").unwrap();
        fs::create_dir_all(root.join(".provision").join("extract")).unwrap();

        let catalog = RuntimeCatalog::scan(root).unwrap();
        assert_eq!(2, catalog.list().len());
        let runtime = catalog.find(8).unwrap();
        assert_eq!(jdk8, runtime.path);
        assert_eq!(jdk8.join("bin").join(JAVA_EXE), runtime.java_exe());
        assert_eq!(17, catalog.find(17).unwrap().major_version);
        assert_eq!(None, catalog.find(11));
    }

    #[test]
    fn find_is_deterministic_on_ambiguity() {
        let tempdir = tempdir().unwrap();
        let root = tempdir.path();
        fake_runtime(root, "zulu8", "1.8.0_402");
        let first = fake_runtime(root, "jdk8u292", "1.8.0_292");

        let catalog = RuntimeCatalog::scan(root).unwrap();
        assert_eq!(first, catalog.find(8).unwrap().path);
    }

    #[test]
    fn scan_bundle_layout() {
        let tempdir = tempdir().unwrap();
        let root = tempdir.path();
        let home = fake_runtime(&root.join("jdk8u292-b10").join("Contents"), "Home", "1.8.0_292");

        let catalog = RuntimeCatalog::scan(root).unwrap();
        assert_eq!(home, catalog.find(8).unwrap().path);
    }

    #[test]
    fn scan_without_version_entry() {
        let tempdir = tempdir().unwrap();
        let root = tempdir.path();
        let home = root.join("broken");
        fs::create_dir_all(&home).unwrap();
        fs::write(home.join(RELEASE_FILE), "IMPLEMENTOR=\"nobody\"\n").unwrap();

        let err = RuntimeCatalog::scan(root).unwrap_err();
        assert!(matches!(err, LauncherError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn scan_skips_directory_without_release_file() {
        let tempdir = tempdir().unwrap();
        let root = tempdir.path();
        fs::create_dir_all(root.join("empty")).unwrap();
        let jdk8 = fake_runtime(root, "jdk8u292-b10", "1.8.0_292");

        let catalog = RuntimeCatalog::scan(root).unwrap();
        assert_eq!(1, catalog.list().len());
        assert_eq!(jdk8, catalog.find(8).unwrap().path);
    }
}
