//! Trinket manifest maintenance.
//!
//! Keeps `trinkets.json` in step with a content repository: the repository
//! archive is downloaded once, hashed, unpacked, and its top-level folders
//! reconciled against the manifest entries.

pub mod archive;
pub mod config;
pub mod entry;
pub mod error;
pub mod fetch;
pub mod hash;
pub mod manifest;
pub mod reconcile;
pub mod update;

pub use archive::{ExclusionSet, DEFAULT_EXCLUSIONS};
pub use config::{ArchiveFormat, ArchiveSource, UpdaterConfig, REF_VAR, REPO_VAR};
pub use entry::TrinketEntry;
pub use error::{ArchiveError, ConfigError, Error, FetchError, ManifestError, Result};
pub use fetch::{ArchiveFetcher, ArchiveSink, HttpFetcher};
pub use manifest::Manifest;
pub use reconcile::{ReconcileReport, Reconciler};
pub use update::{run_update, UpdateOutcome, UpdateSummary};
