//! Manifest File
//!
//! Loads `trinkets.json`, validates it, and writes it back in place.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::entry::TrinketEntry;
use crate::error::ManifestError;

/// The manifest: an ordered list of entries tied to the file it came from.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    entries: Vec<TrinketEntry>,
}

impl Manifest {
    /// Read and validate the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ManifestError::NotFound(path.to_path_buf()),
            _ => ManifestError::Read {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let entries: Vec<TrinketEntry> =
            serde_json::from_str(&content).map_err(|e| ManifestError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;

        let manifest = Self::from_entries(path, entries)?;
        info!("Loaded {} trinkets from {:?}", manifest.entries.len(), path);
        Ok(manifest)
    }

    pub fn from_entries(
        path: impl Into<PathBuf>,
        entries: Vec<TrinketEntry>,
    ) -> Result<Self, ManifestError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id()) {
                return Err(ManifestError::DuplicateId(entry.id().to_string()));
            }
        }

        Ok(Self {
            path: path.into(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[TrinketEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [TrinketEntry] {
        &mut self.entries
    }

    pub fn ids(&self) -> HashSet<String> {
        self.entries.iter().map(|e| e.id().to_string()).collect()
    }

    /// Append an entry. Callers are responsible for checking the id is new.
    pub fn push(&mut self, entry: TrinketEntry) {
        debug_assert!(self.entries.iter().all(|e| e.id() != entry.id()));
        self.entries.push(entry);
    }

    /// Serialized form: JSON array with 2-space indentation.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Overwrite the manifest file with the current entries, truncating
    /// whatever was there before.
    pub fn save(&self) -> Result<(), ManifestError> {
        let json = self.to_json()?;
        let write_err = |source| ManifestError::Write {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(write_err)?;
        file.write_all(json.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        debug!("Wrote {} bytes to {:?}", json.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"[
  {
    "id": "clock",
    "name": "Clock",
    "appUrl": "https://raw.githubusercontent.com/acme/trinkets/main/clock/",
    "iconUrl": "https://raw.githubusercontent.com/acme/trinkets/main/clock/icon.png",
    "entryFile": "https://raw.githubusercontent.com/acme/trinkets/main/clock/index.html",
    "hash": "00",
    "ref": "main"
  }
]"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_sample() {
        let file = write_temp(SAMPLE);
        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.entries().len(), 1);
        assert_eq!(manifest.entries()[0].id(), "clock");
        assert!(manifest.ids().contains("clock"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("trinkets.json")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_temp("[{\"id\": ");
        let err = Manifest::load(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_object_instead_of_array_is_rejected() {
        let file = write_temp("{\"id\": \"clock\"}");
        let err = Manifest::load(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let file = write_temp(r#"[{"id": "clock"}, {"id": "clock"}]"#);
        let err = Manifest::load(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateId(id) if id == "clock"));
    }

    #[test]
    fn test_null_display_fields_load() {
        let file = write_temp(r#"[{"id": "x", "name": null, "appUrl": "https://example.com/x/"}]"#);
        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.entries()[0].name(), None);
        assert_eq!(manifest.entries()[0].app_url(), Some("https://example.com/x/"));
    }

    #[test]
    fn test_entry_without_id_rejected() {
        let file = write_temp(r#"[{"name": "Clock"}]"#);
        let err = Manifest::load(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_save_keeps_hand_written_key_order() {
        let hand_written = r#"[
  {
    "ref": "main",
    "id": "clock",
    "notes": {
      "z": 1,
      "a": 2
    },
    "hash": null
  }
]"#;
        let file = write_temp(hand_written);
        let manifest = Manifest::load(file.path()).unwrap();
        manifest.save().unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), hand_written);
    }

    #[test]
    fn test_save_round_trips_canonical_file() {
        let file = write_temp(SAMPLE);
        let manifest = Manifest::load(file.path()).unwrap();
        manifest.save().unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), SAMPLE);
    }

    #[test]
    fn test_save_truncates_longer_content() {
        let padded = format!("{}\n\n\n                              ", SAMPLE);
        let file = write_temp(&padded);
        let manifest = Manifest::load(file.path()).unwrap();
        manifest.save().unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), SAMPLE);
    }
}
