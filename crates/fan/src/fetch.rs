//! Download a target into a temporary file

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Prefix of downloaded temp files
const TEMP_PREFIX: &str = "fan-";

/// Errors while fetching a target
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Transport failure (DNS, TLS, connection, body read)
    #[error("Failed to fetch {url}: {source}")]
    #[diagnostic(
        code(fan::fetch::http),
        help("Check the URL and your network connection")
    )]
    Http {
        /// Requested URL
        url: String,
        /// The underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("Failed to fetch {url}: HTTP {status}")]
    #[diagnostic(code(fan::fetch::status))]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// The download could not be written
    #[error("Failed to {operation} downloaded file{}", path.as_ref().map_or(String::new(), |p| format!(" {}", p.display())))]
    #[diagnostic(code(fan::fetch::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: io::Error,
        /// File involved, if known
        path: Option<PathBuf>,
        /// Operation that failed
        operation: &'static str,
    },
}

/// Result type for fetch operations
pub type Result<T> = std::result::Result<T, Error>;

fn http_client(url: &str) -> Result<reqwest::blocking::Client> {
    // reqwest is built without a bundled crypto provider; a second install is a no-op.
    let _ = rustls::crypto::ring::default_provider().install_default();

    reqwest::blocking::Client::builder()
        .user_agent(concat!("fan/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Fetch `url` into a new executable file in the system temp directory.
///
/// The caller owns the returned file. Nothing is left on disk when the fetch
/// fails.
#[instrument(name = "fetch")]
pub fn fetch_to_temp_file(url: &str) -> Result<PathBuf> {
    let client = http_client(url)?;

    let mut response = client.get(url).send().map_err(|source| Error::Http {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    // Removed on drop until kept, so every early return cleans up.
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile()
        .map_err(|source| Error::Io {
            source,
            path: None,
            operation: "create",
        })?;

    let bytes = response
        .copy_to(file.as_file_mut())
        .map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })?;

    mark_executable(file.path()).map_err(|source| Error::Io {
        source,
        path: Some(file.path().to_path_buf()),
        operation: "set permissions on",
    })?;

    let (_, path) = file.keep().map_err(|e| Error::Io {
        source: e.error,
        path: None,
        operation: "keep",
    })?;

    debug!(?path, bytes, "Fetched target");
    Ok(path)
}
