//! Commands.
//!
//! This module contains the execution of the commands available on the command-line.

use crate::args::{Command, InstallationArgs, LaunchArgs, NameArgs};
use crate::colors::*;
use crate::config::Config;
use crate::error::{Result, io_at};
use crate::installation::{InstallationStore, RuntimeOverride};
use crate::launch::LaunchPlan;
use crate::net::HttpFetch;
use crate::provision::{RuntimeProvisioner, RuntimeRequest};
use crate::resolver::VersionResolver;
use crate::runtime::RuntimeCatalog;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

/// The directories and settings every command operates on.
#[derive(Debug)]
pub(crate) struct Launcher {
    config: Config,
    installations: PathBuf,
    runtimes: PathBuf,
    versions: PathBuf,
}

impl Launcher {
    /// Creates a new `Launcher` with all directories relative to the given base directory.
    pub(crate) fn new(basedir: &Path, config: Config) -> Self {
        Self {
            installations: config.installations_dir(basedir),
            runtimes: config.runtimes_dir(basedir),
            versions: config.versions_dir(basedir),
            config,
        }
    }

    /// Creates the runtime, installation and versions directory, if missing.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn bootstrap(&self) -> Result<()> {
        for dir in [&self.runtimes, &self.installations, &self.versions] {
            fs::create_dir_all(dir).map_err(io_at(dir))?;
        }

        Ok(())
    }

    /// Executes the given command.
    pub(crate) fn execute(&self, command: &Command) -> Result<()> {
        match command {
            Command::Create(args) => self.create(args),
            Command::Edit(args) => self.edit(args),
            Command::Remove(args) => self.remove(args),
            Command::Launch(args) => self.launch(args),
            Command::List => self.list(),
            Command::Runtimes => self.runtimes(),
        }
    }

    fn store(&self) -> InstallationStore {
        InstallationStore::new(&self.installations)
    }

    fn create(&self, args: &InstallationArgs) -> Result<()> {
        let installation = self.store().create(&args.name, &args.version)?;
        let name = NAME_COLOR.paint(&installation.name);
        let version = INFO_COLOR.paint(&installation.version_id);
        println!("Installation {name} [{version}] created!");

        Ok(())
    }

    fn edit(&self, args: &InstallationArgs) -> Result<()> {
        let installation = self.store().edit(&args.name, &args.version)?;
        let name = NAME_COLOR.paint(&installation.name);
        let version = INFO_COLOR.paint(&installation.version_id);
        println!("Installation {name} [{version}] updated!");

        Ok(())
    }

    fn remove(&self, args: &NameArgs) -> Result<()> {
        self.store().remove(&args.name)?;
        let name = NAME_COLOR.paint(&args.name);
        println!("Installation {name} removed!");

        Ok(())
    }

    fn list(&self) -> Result<()> {
        let installations = self.store().list()?;
        if installations.is_empty() {
            println!("No installations.");
        }
        for installation in installations {
            let name = NAME_COLOR.paint(&installation.name);
            let version = INFO_COLOR.paint(&installation.version_id);
            let runtime = INFO_COLOR.paint(installation.runtime.to_string());
            println!("{name} [{version}] [runtime: {runtime}]");
        }

        Ok(())
    }

    fn runtimes(&self) -> Result<()> {
        let catalog = RuntimeCatalog::scan(&self.runtimes)?;
        if catalog.is_empty() {
            println!("No runtimes.");
        }
        for runtime in catalog.list() {
            let path = PATH_COLOR.paint(runtime.path.to_string_lossy());
            let major = INFO_COLOR.paint(runtime.major_version.to_string());
            println!("{path} [{major}]");
        }

        Ok(())
    }

    fn launch(&self, args: &LaunchArgs) -> Result<()> {
        let installation = self.store().read(&args.name)?;
        let fetch = HttpFetch::new()?;

        // an explicit runtime bypasses the catalog, otherwise make sure there is at least one runtime
        let uses_catalog = installation.runtime == RuntimeOverride::Default;
        let mut catalog = if uses_catalog { RuntimeCatalog::scan(&self.runtimes)? } else { RuntimeCatalog::default() };
        if uses_catalog && catalog.is_empty() {
            let major = INFO_COLOR.paint(self.config.runtime.major.to_string());
            println!("Downloading runtime [{major}]");
            let request = RuntimeRequest::from_config(&self.config.runtime);
            let path = RuntimeProvisioner::new(&self.runtimes, request).ensure_default(&fetch)?;
            let path = PATH_COLOR.paint(path.to_string_lossy());
            println!("Provided runtime at {path}");
            catalog = RuntimeCatalog::scan(&self.runtimes)?;
        }

        let resolver = VersionResolver::new(&self.versions, &self.config.manifest, &fetch);
        let plan = LaunchPlan::plan(&installation, &catalog, &resolver, self.config.runtime.major)?;
        debug!(?plan);

        let name = NAME_COLOR.paint(&installation.name);
        if args.dry_run {
            let not = ATTENTION_COLOR.paint("NOT");
            println!("dry-run: {not} launching installation {name}");
            println!("{plan}");
            return Ok(());
        }

        let version = INFO_COLOR.paint(&installation.version_id);
        println!("Launching installation {name} [{version}]");
        let start = Instant::now();
        let status = plan.execute()?;
        if !status.success() {
            warn!(?status, "game exited unsuccessfully");
            let status = ATTENTION_COLOR.paint(status.to_string());
            println!("Game exited with {status}");
        }

        // print some statistics
        println!("Session time: {}", format_elapsed(start.elapsed()));
        if let Ok(now) = OffsetDateTime::now_local() {
            println!("Finished at: {}", format_now(now));
        }

        Ok(())
    }
}

// Formats the given duration with a resolution of seconds.
#[doc(hidden)]
fn format_elapsed(elapsed: Duration) -> String {
    // null out everything below seconds
    let elapsed = Duration::from_secs(elapsed.as_secs());

    // format the remaining duration
    humantime::format_duration(elapsed).to_string()
}

// Formats the given date/time with its offset.
#[doc(hidden)]
fn format_now(now: OffsetDateTime) -> String {
    use time::format_description::FormatItem;
    use time::macros::format_description;

    // define format
    const FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]");

    now.format(&FORMAT).unwrap_or(now.to_string())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::installation::RECORD_FILE;
    use tempfile::tempdir;
    use test_log::test;
    use time::macros::datetime;

    fn launcher(basedir: &Path) -> Launcher {
        let launcher = Launcher::new(basedir, Config::default());
        launcher.bootstrap().unwrap();
        launcher
    }

    #[test]
    fn bootstrap_creates_directories() {
        let tempdir = tempdir().unwrap();
        launcher(tempdir.path());
        for dir in ["jre", "installations", "versions"] {
            assert!(tempdir.path().join(dir).is_dir(), "{dir}");
        }
    }

    #[test]
    fn create_edit_remove() {
        let tempdir = tempdir().unwrap();
        let launcher = launcher(tempdir.path());
        let survival = tempdir.path().join("installations").join("survival");

        let create = InstallationArgs {
            name: "survival".to_string(),
            version: "1.20.1".to_string(),
        };
        launcher.execute(&Command::Create(create)).unwrap();
        assert!(survival.join("game").is_dir());
        assert_eq!("1.20.1\n0\n-", fs::read_to_string(survival.join(RECORD_FILE)).unwrap());

        let edit = InstallationArgs {
            name: "survival".to_string(),
            version: "1.19.4".to_string(),
        };
        launcher.execute(&Command::Edit(edit)).unwrap();
        assert_eq!("1.19.4\n0\n-", fs::read_to_string(survival.join(RECORD_FILE)).unwrap());

        launcher.execute(&Command::List).unwrap();

        let remove = NameArgs { name: "survival".to_string() };
        launcher.execute(&Command::Remove(remove)).unwrap();
        assert!(!survival.exists());
    }

    #[test]
    fn launch_missing_installation() {
        let tempdir = tempdir().unwrap();
        let launcher = launcher(tempdir.path());

        let launch = LaunchArgs {
            name: "survival".to_string(),
            dry_run: true,
        };
        let err = launcher.execute(&Command::Launch(launch)).unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
        assert!(fs::read_dir(tempdir.path().join("jre")).unwrap().next().is_none());
    }

    #[test]
    fn launch_explicit_runtime_ignores_catalog() {
        let tempdir = tempdir().unwrap();
        let launcher = launcher(tempdir.path());
        let store = InstallationStore::new(tempdir.path().join("installations"));
        store.create("survival", "1.20.1").unwrap();
        let record_file = tempdir.path().join("installations").join("survival").join(RECORD_FILE);
        fs::write(&record_file, "1.20.1\n0\n/opt/java/bin/java").unwrap();
        fs::write(tempdir.path().join("versions").join("1.20.1.jar"), "PK").unwrap();

        // garbled runtime metadata would fail any scan
        let broken = tempdir.path().join("jre").join("broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("release"), "IMPLEMENTOR=\"nobody\"\n").unwrap();

        let launch = LaunchArgs {
            name: "survival".to_string(),
            dry_run: true,
        };
        launcher.execute(&Command::Launch(launch)).unwrap();
    }

    #[test]
    fn elapsed_without_fraction() {
        assert_eq!("1h 2m 3s", format_elapsed(Duration::from_millis(3_723_456)));
    }

    #[test]
    fn now_with_offset() {
        assert_eq!("2024-05-06 07:08:09+0200", format_now(datetime!(2024-05-06 07:08:09 +02:00)));
    }
}
