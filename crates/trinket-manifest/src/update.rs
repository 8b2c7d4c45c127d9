//! Update Pipeline
//!
//! One run: load manifest, download and hash the archive, scan it, reconcile,
//! write back if anything changed.

use tracing::info;

use crate::archive::{scan_archive, ExclusionSet, Workspace};
use crate::config::UpdaterConfig;
use crate::error::{ArchiveError, FetchError, Result};
use crate::fetch::{ArchiveFetcher, ArchiveSink};
use crate::manifest::Manifest;
use crate::reconcile::{ReconcileReport, Reconciler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The manifest changed and was written back.
    Written,
    /// The manifest changed but `dry_run` was set.
    DryRun,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct UpdateSummary {
    pub digest: String,
    pub archive_size: u64,
    pub packages: Vec<String>,
    pub report: ReconcileReport,
    pub outcome: UpdateOutcome,
}

pub async fn run_update(
    config: &UpdaterConfig,
    fetcher: &dyn ArchiveFetcher,
) -> Result<UpdateSummary> {
    // Fail on a bad manifest before any network traffic.
    let mut manifest = Manifest::load(&config.manifest_path)?;
    let exclusions = ExclusionSet::with_extra(config.extra_exclusions.iter().cloned());

    let (archive, packages) = {
        let workspace = Workspace::new().map_err(ArchiveError::Io)?;
        let mut sink = ArchiveSink::create(&workspace.archive_path()).map_err(FetchError::Sink)?;
        fetcher.fetch(&config.source, &mut sink).await?;
        let archive = sink.finish().map_err(FetchError::Sink)?;
        info!("Hash calculation complete: {} ({} bytes)", archive.digest, archive.size);

        let packages = scan_archive(
            &archive.path,
            config.source.format,
            &workspace.extract_dir(),
            &exclusions,
        )?;
        (archive, packages)
    };

    let reconciler = Reconciler {
        repo: &config.source.repo,
        reference: &config.source.reference,
        hosting_base: &config.hosting_base,
        digest: &archive.digest,
    };
    let report = reconciler.apply(&mut manifest, &packages);

    let outcome = if !report.is_dirty() {
        info!("No changes needed for {:?}.", manifest.path());
        UpdateOutcome::Unchanged
    } else if config.dry_run {
        info!("Dry run: {:?} would be updated.", manifest.path());
        UpdateOutcome::DryRun
    } else {
        manifest.save()?;
        info!("{:?} updated successfully.", manifest.path());
        UpdateOutcome::Written
    };

    Ok(UpdateSummary {
        digest: archive.digest,
        archive_size: archive.size,
        packages,
        report,
        outcome,
    })
}
