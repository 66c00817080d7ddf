//! Runtime provisioning.
//!
//! This module contains the code to download and unpack the default java runtime in case no runtime is installed.

// https://api.adoptium.net/q/swagger-ui/

use crate::config::RuntimeConfig;
use crate::error::{LauncherError, Result, io_at};
use crate::net::Fetch;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace, warn};

/// Name of the scratch directory within the runtime directory.
pub(crate) const SCRATCH_DIR: &str = ".provision";

// Name of the extraction directory within the scratch directory.
#[doc(hidden)]
const EXTRACT_DIR: &str = "extract";

// Archive type to be used on OSes other than Windows.
#[cfg(not(windows))]
#[doc(hidden)]
const ARCHIVE_TYPE: &str = "tar.gz";

// Archive type to be used on Windows.
#[cfg(windows)]
#[doc(hidden)]
const ARCHIVE_TYPE: &str = "zip";

/// The request for a runtime package at the binary endpoint.
#[derive(Debug)]
pub(crate) struct RuntimeRequest {
    pub(crate) arch: String,
    pub(crate) base_url: String,
    pub(crate) image_type: String,
    pub(crate) major: u32,
    pub(crate) os: String,
}

impl RuntimeRequest {
    /// Creates a new `RuntimeRequest` out of the given [RuntimeConfig].
    pub(crate) fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            arch: config.architecture.clone(),
            base_url: config.url.clone(),
            image_type: config.image_type.clone(),
            major: config.major,
            os: config.os.clone(),
        }
    }

    /// Builds the URL to download the latest GA package.
    pub(crate) fn url(&self) -> String {
        let base_url = self.base_url.trim_end_matches('/');
        let major = self.major;
        let os = self.os();
        let arch = self.arch();
        let image_type = self.image_type();
        format!("{base_url}/{major}/ga/{os}/{arch}/{image_type}/hotspot/normal/eclipse?project=jdk")
    }

    // Returns the requested architecture in the vocabulary of the endpoint.
    fn arch(&self) -> String {
        let arch = self.arch.trim().to_lowercase();
        match arch.as_str() {
            "x86_64" | "amd64" => "x64".to_string(),
            "i686" | "i386" => "x86".to_string(),
            _ => arch,
        }
    }

    // Returns the requested operating system in the vocabulary of the endpoint.
    fn os(&self) -> String {
        let os = self.os.trim().to_lowercase();
        match os.as_str() {
            "macos" => "mac".to_string(),
            _ => os,
        }
    }

    // Returns the requested type for the package.
    fn image_type(&self) -> String {
        let image_type = self.image_type.trim().to_lowercase();
        match image_type.as_str() {
            "jdk" | "jre" => image_type,
            _ => "jdk".to_string(), // default to JDK
        }
    }
}

/// Downloads and unpacks a runtime into the runtime directory.
#[derive(Debug)]
pub(crate) struct RuntimeProvisioner {
    request: RuntimeRequest,
    root: PathBuf,
}

impl RuntimeProvisioner {
    /// Creates a new `RuntimeProvisioner` for the given runtime directory.
    pub(crate) fn new(root: impl Into<PathBuf>, request: RuntimeRequest) -> Self {
        Self { request, root: root.into() }
    }

    /// Provides the requested runtime and returns the path it was moved to.
    ///
    /// Must only be called if there is no runtime at all.
    #[instrument(level = "trace", skip(self, fetch))]
    pub(crate) fn ensure_default(&self, fetch: &dyn Fetch) -> Result<PathBuf> {
        let scratch = self.root.join(SCRATCH_DIR);

        // remove left-overs from last run, if there are any
        if scratch.exists() {
            fs::remove_dir_all(&scratch).map_err(io_at(&scratch))?;
        }
        fs::create_dir_all(&scratch).map_err(io_at(&scratch))?;

        let provided = self.provide(&scratch, fetch);

        // cleanup scratch directory
        if let Err(err) = fs::remove_dir_all(&scratch) {
            warn!(?err, "failed to delete scratch directory");
        }

        provided
    }

    // Downloads, unpacks and moves the runtime.
    fn provide(&self, scratch: &Path, fetch: &dyn Fetch) -> Result<PathBuf> {
        let url = self.request.url();
        let archive = scratch.join(format!("runtime.{ARCHIVE_TYPE}"));
        debug!(%url, archive = %archive.display(), "downloading runtime");
        fetch.fetch(&url, &archive)?;

        let extract = scratch.join(EXTRACT_DIR);
        fs::create_dir_all(&extract).map_err(io_at(&extract))?;
        unpack(&archive, &extract)?;

        // the archive must contain exactly one top-level directory
        let mut entries = Vec::new();
        for entry in fs::read_dir(&extract).map_err(io_at(&extract))? {
            let entry = entry.map_err(io_at(&extract))?;
            entries.push(entry.path());
        }
        let from = match entries.as_slice() {
            [single] if single.is_dir() => single,
            _ => return Err(LauncherError::extract(&archive, format!("expected a single top-level directory, found {} entries", entries.len()))),
        };
        let Some(name) = from.file_name() else {
            return Err(LauncherError::extract(&archive, "top-level directory without name"));
        };

        // move runtime, keep its name
        let to = self.root.join(name);
        if to.exists() {
            return Err(LauncherError::extract(&archive, format!("{} already exists", to.display())));
        }
        trace!(from = %from.display(), to = %to.display(), "moving runtime");
        fs::rename(from, &to).map_err(io_at(&to))?;

        Ok(to)
    }
}

// Unpacks the given archive into the given directory.
#[cfg(not(windows))]
#[instrument(level = "trace")]
fn unpack(archive: &Path, dest: &Path) -> Result<()> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let extract_err = |err: std::io::Error| LauncherError::extract(archive, err);

    let archive_file = File::open(archive).map_err(io_at(archive))?;
    let mut tar = Archive::new(GzDecoder::new(archive_file));
    for entry in tar.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;

        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        trace!("unpacking {name:?}");

        // entries escaping the destination are skipped
        if !entry.unpack_in(dest).map_err(extract_err)? {
            warn!(name = %name, "skipping dangerous name");
        }
    }

    Ok(())
}

// Unpacks the given archive into the given directory.
#[cfg(windows)]
#[instrument(level = "trace")]
fn unpack(archive: &Path, dest: &Path) -> Result<()> {
    let archive_file = File::open(archive).map_err(io_at(archive))?;
    let mut zip = zip::ZipArchive::new(archive_file).map_err(|err| LauncherError::extract(archive, err))?;
    for i in 0..zip.len() {
        let mut file = zip.by_index(i).map_err(|err| LauncherError::extract(archive, err))?;
        let Some(name) = file.enclosed_name() else {
            warn!(name = file.name(), "skipping dangerous name");
            continue;
        };

        let name = dest.join(name);
        trace!("unpacking {name:?}");

        if file.is_dir() {
            fs::create_dir_all(&name).map_err(io_at(&name))?;
        } else {
            if let Some(p) = name.parent() {
                fs::create_dir_all(p).map_err(io_at(p))?;
            }
            let mut outfile = File::create(&name).map_err(io_at(&name))?;
            std::io::copy(&mut file, &mut outfile).map_err(|err| LauncherError::extract(archive, err))?;
        }
    }

    Ok(())
}
