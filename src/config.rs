//! Configuration.
//!
//! This module contains the configuration read from an optional YAML file.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::env;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{instrument, trace};

/// Name of the default configuration file.
pub(crate) const CONFIG_FILENAME: &str = "launcher.yml";

/// Major version of the runtime used when an installation has no runtime override.
pub(crate) const DEFAULT_RUNTIME_MAJOR: u32 = 8;

/// The struct that holds the configuration loaded from a YAML file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// The directory holding one subdirectory per java runtime.
    #[serde(default = "runtimes_default")]
    pub(crate) runtimes: String,
    /// The directory holding one subdirectory per installation.
    #[serde(default = "installations_default")]
    pub(crate) installations: String,
    /// The directory holding the version manifest and the cached game artifacts.
    #[serde(default = "versions_default")]
    pub(crate) versions: String,
    /// The file name of the version manifest within the versions directory.
    #[serde(default = "manifest_default")]
    pub(crate) manifest: String,
    /// The default runtime.
    #[serde(default)]
    pub(crate) runtime: RuntimeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtimes: runtimes_default(),
            installations: installations_default(),
            versions: versions_default(),
            manifest: manifest_default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from the given filename.
    #[instrument(err, level = "trace")]
    pub(crate) fn load_from_file<P>(filename: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let config = fs::read_to_string(filename)?;

        // an empty file is a valid (default) configuration
        if config.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(&config)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_value(value)?;

        Ok(config)
    }

    /// Loads the configuration from the given filename or falls back to the defaults if the file does not exist.
    pub(crate) fn load_or_default<P>(filename: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        if !filename.as_ref().exists() {
            trace!(?filename, "no configuration file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_file(filename)
    }

    /// Returns the runtime directory relative to the given base directory.
    pub(crate) fn runtimes_dir(&self, basedir: &Path) -> PathBuf {
        basedir.join(expand(&self.runtimes))
    }

    /// Returns the installation directory relative to the given base directory.
    pub(crate) fn installations_dir(&self, basedir: &Path) -> PathBuf {
        basedir.join(expand(&self.installations))
    }

    /// Returns the versions directory relative to the given base directory.
    pub(crate) fn versions_dir(&self, basedir: &Path) -> PathBuf {
        basedir.join(expand(&self.versions))
    }
}

/// The configuration for the default runtime that is provisioned when no runtime exists.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuntimeConfig {
    /// The architecture of the runtime (defaults to the current architecture).
    #[serde(default = "runtime_architecture_default")]
    pub(crate) architecture: String,
    /// The package type of the runtime (JDK or JRE).
    #[serde(default = "runtime_image_type_default", rename = "image-type")]
    pub(crate) image_type: String,
    /// The major version of the runtime.
    #[serde(default = "runtime_major_default", deserialize_with = "runtime_major_deser")]
    pub(crate) major: u32,
    /// The operating system of the runtime (defaults to the current operating system).
    #[serde(default = "runtime_os_default")]
    pub(crate) os: String,
    /// Base URL of the binary endpoint.
    #[serde(default = "runtime_url_default")]
    pub(crate) url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            architecture: runtime_architecture_default(),
            image_type: runtime_image_type_default(),
            major: runtime_major_default(),
            os: runtime_os_default(),
            url: runtime_url_default(),
        }
    }
}

// Expands `~` and environment variables, keeps the value as-is if expansion fails.
#[doc(hidden)]
fn expand(value: &str) -> PathBuf {
    match shellexpand::full(value) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(err) => {
            trace!(?err, value, "failed to expand");
            PathBuf::from(value)
        }
    }
}

#[doc(hidden)]
fn runtimes_default() -> String {
    "jre".to_string()
}

#[doc(hidden)]
fn installations_default() -> String {
    "installations".to_string()
}

#[doc(hidden)]
fn versions_default() -> String {
    "versions".to_string()
}

#[doc(hidden)]
fn manifest_default() -> String {
    "version_manifest.json".to_string()
}

// Returns the default value for [RuntimeConfig::architecture].
#[doc(hidden)]
#[inline]
fn runtime_architecture_default() -> String {
    env::consts::ARCH.to_string()
}

#[doc(hidden)]
#[inline]
fn runtime_image_type_default() -> String {
    "jdk".to_string()
}

#[doc(hidden)]
#[inline]
fn runtime_major_default() -> u32 {
    DEFAULT_RUNTIME_MAJOR
}

// Returns the default value for [RuntimeConfig::os].
#[doc(hidden)]
#[inline]
fn runtime_os_default() -> String {
    env::consts::OS.to_string()
}

#[doc(hidden)]
#[inline]
fn runtime_url_default() -> String {
    "https://api.adoptium.net/v3/binary/latest/".to_string()
}

// Deserializes the field [RuntimeConfig::major] from either unsigned integer or string.
// see https://serde.rs/string-or-struct.html
#[doc(hidden)]
fn runtime_major_deser<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct UintOrString(PhantomData<fn() -> u32>);

    impl Visitor<'_> for UintOrString {
        type Value = u32;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("unsigned integer or string")
        }

        fn visit_str<E>(self, value: &str) -> Result<u32, E>
        where
            E: de::Error,
        {
            value.trim().parse().map_err(E::custom)
        }

        fn visit_u64<E>(self, value: u64) -> Result<u32, E>
        where
            E: de::Error,
        {
            u32::try_from(value).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(UintOrString(PhantomData))
}

#[cfg(test)]
mod tests {

    use super::*;
    use tempfile::tempdir;
    use test_log::test;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!("jre", config.runtimes);
        assert_eq!("installations", config.installations);
        assert_eq!("versions", config.versions);
        assert_eq!("version_manifest.json", config.manifest);
        assert_eq!(8, config.runtime.major);
        assert_eq!("jdk", config.runtime.image_type);
    }

    #[test]
    fn runtime_major_as_uint() {
        let config = r"
          major: 17
        ";
        let config: RuntimeConfig = serde_yaml::from_str(config).unwrap();
        assert_eq!(17, config.major);
    }

    #[test]
    fn runtime_major_as_string() {
        let config = r#"
          major: "11"
        "#;
        let config: RuntimeConfig = serde_yaml::from_str(config).unwrap();
        assert_eq!(11, config.major);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let config = r"
          runtimes: java
          whatever: 1
        ";
        assert!(serde_yaml::from_str::<Config>(config).is_err());
    }

    #[test]
    fn partial_config() {
        let config = r"
          versions: cache/versions
          runtime:
            image-type: jre
        ";
        let config: Config = serde_yaml::from_str(config).unwrap();
        assert_eq!("jre", config.runtimes);
        assert_eq!("cache/versions", config.versions);
        assert_eq!("jre", config.runtime.image_type);
        assert_eq!(8, config.runtime.major);
    }

    #[test]
    fn dirs_are_relative_to_basedir() {
        let config = Config::default();
        let basedir = Path::new("base");
        assert_eq!(basedir.join("jre"), config.runtimes_dir(basedir));
        assert_eq!(basedir.join("installations"), config.installations_dir(basedir));
        assert_eq!(basedir.join("versions"), config.versions_dir(basedir));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let tempdir = tempdir().unwrap();
        let config = Config::load_or_default(tempdir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!("jre", config.runtimes);
    }

    #[test]
    fn empty_file_is_default() {
        let tempdir = tempdir().unwrap();
        let file = tempdir.path().join(CONFIG_FILENAME);
        std::fs::write(&file, "").unwrap();
        let config = Config::load_from_file(&file).unwrap();
        assert_eq!("installations", config.installations);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tempdir = tempdir().unwrap();
        assert!(Config::load_from_file(tempdir.path().join("nope.yml")).is_err());
    }
}
