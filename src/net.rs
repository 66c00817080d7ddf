//! Network.
//!
//! This module contains the blocking download of remote resources to local files.

use crate::error::{LauncherError, Result, io_at};
use std::fs::{self, File};
use std::path::Path;
use tracing::{instrument, trace};

/// User agent sent with every request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Trait for things that copy a remote resource into a local file.
pub(crate) trait Fetch {
    /// Downloads the resource at the given URL to the given destination and returns the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// [`Fetch`] implementation based on a blocking HTTP client.
#[derive(Debug)]
pub(crate) struct HttpFetch {
    client: reqwest::blocking::Client,
}

impl HttpFetch {
    /// Creates a new `HttpFetch`.
    pub(crate) fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT) //
            .build()
            .map_err(LauncherError::Client)?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetch {
    #[instrument(level = "trace", skip(self))]
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        let fetch_err = |source: reqwest::Error| LauncherError::Fetch {
            url: url.to_string(),
            source,
        };

        // make request
        let mut response = self
            .client
            .get(url) //
            .header(reqwest::header::ACCEPT, "*/*") //
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(fetch_err)?;

        // download file
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(io_at(parent))?;
        }
        let mut dest_file = File::create(dest).map_err(io_at(dest))?;
        let bytes_written = response.copy_to(&mut dest_file).map_err(fetch_err)?;
        trace!(bytes_written);

        Ok(bytes_written)
    }
}

#[cfg(test)]
pub(crate) mod tests {

    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::tempdir;
    use test_log::test;

    /// [`Fetch`] implementation serving canned responses and recording every request.
    #[derive(Debug, Default)]
    pub(crate) struct FakeFetch {
        responses: HashMap<String, Vec<u8>>,
        pub(crate) requests: RefCell<Vec<String>>,
    }

    impl FakeFetch {
        /// Registers the body returned for the given URL.
        pub(crate) fn respond(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.responses.insert(url.to_string(), body.into());
            self
        }

        /// Returns the number of requests made so far.
        pub(crate) fn count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl Fetch for FakeFetch {
        fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
            self.requests.borrow_mut().push(url.to_string());
            let Some(body) = self.responses.get(url) else {
                return Err(LauncherError::Io {
                    path: dest.to_path_buf(),
                    source: std::io::Error::other(format!("no response for {url}")),
                });
            };
            fs::write(dest, body).map_err(io_at(dest))?;

            Ok(body.len() as u64)
        }
    }

    #[test]
    fn fake_fetch_records_requests() {
        let tempdir = tempdir().unwrap();
        let dest = tempdir.path().join("x.jar");
        let fetch = FakeFetch::default().respond("https://example/x.jar", "jar");

        assert_eq!(3, fetch.fetch("https://example/x.jar", &dest).unwrap());
        assert!(fetch.fetch("https://example/y.jar", &dest).is_err());
        assert_eq!(2, fetch.count());
        assert_eq!("jar", fs::read_to_string(&dest).unwrap());
    }

    #[test]
    fn http_fetch_invalid_url() {
        let tempdir = tempdir().unwrap();
        let dest = tempdir.path().join("x.jar");
        let fetch = HttpFetch::new().unwrap();

        let err = fetch.fetch("not a url", &dest).unwrap_err();
        assert!(matches!(err, LauncherError::Fetch { .. }), "{err:?}");
        assert!(!dest.exists());
    }
}
