//! Error Types
//!
//! One error enum per stage of the update run, aggregated into [`Error`].

use std::path::PathBuf;

/// Invalid or missing run configuration. Raised before any I/O happens.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid repository identifier '{0}' (expected owner/repo)")]
    InvalidRepo(String),

    #[error("invalid URL template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
}

/// Problems reading, validating or writing the manifest file.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode JSON from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate trinket id '{0}' in manifest")]
    DuplicateId(String),

    #[error("failed to write manifest {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Transport failures while downloading the source archive.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("error downloading {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("error downloading {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to store downloaded archive: {0}")]
    Sink(#[from] std::io::Error),
}

/// The downloaded payload could not be unpacked or has an unexpected shape.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("corrupt zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("corrupt tar archive: {0}")]
    Tar(#[source] std::io::Error),

    #[error("archive has no top-level directory")]
    MissingRoot,

    #[error("I/O error while scanning archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Any fatal condition of an update run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
