//! Manifest Reconciler
//!
//! Brings the manifest in line with a freshly scanned archive: appends entries
//! for new content folders and moves entries from the source repository onto
//! the new digest and ref.

use std::collections::HashSet;

use tracing::info;

use crate::entry::TrinketEntry;
use crate::manifest::Manifest;

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub up_to_date: Vec<String>,
}

impl ReconcileReport {
    /// True when the manifest needs to be written back.
    pub fn is_dirty(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty()
    }
}

/// Everything a reconciliation needs to know about the current upstream state.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    pub repo: &'a str,
    pub reference: &'a str,
    pub hosting_base: &'a str,
    pub digest: &'a str,
}

impl Reconciler<'_> {
    pub fn apply(&self, manifest: &mut Manifest, packages: &[String]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut known = manifest.ids();

        for id in packages {
            if !known.insert(id.clone()) {
                continue;
            }
            let entry =
                TrinketEntry::discovered(id, self.hosting_base, self.digest, self.reference);
            info!("Adding new trinket: {} (ID: {})", entry.label(), entry.id());
            manifest.push(entry);
            report.added.push(id.clone());
        }

        let added: HashSet<&str> = report.added.iter().map(String::as_str).collect();

        for entry in manifest.entries_mut() {
            if added.contains(entry.id()) || !entry.is_sourced_from(self.repo) {
                continue;
            }

            let same_hash = entry.hash() == Some(self.digest);
            let same_ref = entry.reference() == Some(self.reference);

            if same_hash && same_ref {
                info!("Hash for {} is already up-to-date: {}", entry.label(), self.digest);
                report.up_to_date.push(entry.id().to_string());
                continue;
            }

            info!(
                "Hash updated for {}: {} -> {} (ref {})",
                entry.label(),
                entry.hash().unwrap_or("none"),
                self.digest,
                self.reference
            );
            entry.set_source(self.digest, self.reference);
            report.updated.push(entry.id().to_string());
        }

        report
    }
}
