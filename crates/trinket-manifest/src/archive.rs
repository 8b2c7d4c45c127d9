//! Archive Scanner
//!
//! Unpacks a downloaded repository archive into a scratch directory and lists
//! the content folders under its root.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tempfile::TempDir;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::config::ArchiveFormat;
use crate::error::ArchiveError;

/// Folder names that are repository plumbing rather than trinkets.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    ".git",
    ".github",
    ".gitlab",
    ".circleci",
    ".vscode",
    ".idea",
    "__MACOSX",
    ".DS_Store",
];

#[derive(Debug, Clone)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    /// Default exclusions plus `extra`.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        set.names.extend(extra.into_iter().map(Into::into));
        set
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Scratch area holding the downloaded archive and its extracted tree.
///
/// Everything is removed when the workspace is dropped, on success or error.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("trinket-").tempdir()?;
        debug!("Created workspace {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.path().join("archive")
    }

    pub fn extract_dir(&self) -> PathBuf {
        self.dir.path().join("extracted")
    }
}

/// Unpack `archive` into `dest`, creating `dest` if needed.
pub fn extract(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(dest)?;
    let file = File::open(archive)?;

    match format {
        ArchiveFormat::Zipball => {
            let mut zip = ZipArchive::new(file)?;
            debug!("Extracting {} zip entries", zip.len());
            zip.extract(dest)?;
        }
        ArchiveFormat::Tarball => {
            let mut tar = tar::Archive::new(GzDecoder::new(file));
            tar.unpack(dest).map_err(ArchiveError::Tar)?;
        }
    }

    Ok(())
}

/// The directory the archive wraps its content in.
///
/// Its name (`owner-repo-<sha>` for GitHub) is not known in advance, so the
/// first directory in name order is taken. Excluded names such as `__MACOSX`
/// are never picked.
pub fn find_root(extract_dir: &Path, exclusions: &ExclusionSet) -> Result<PathBuf, ArchiveError> {
    let mut top_level = fs::read_dir(extract_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    top_level.retain(|path| {
        let excluded = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| exclusions.contains(name));
        if excluded {
            debug!("Ignoring excluded top-level entry {:?}", path.file_name());
        }
        !excluded
    });
    top_level.sort();

    if top_level.len() > 1 {
        warn!(
            "Archive has {} top-level entries, expected a single root directory",
            top_level.len()
        );
    }

    top_level
        .into_iter()
        .find(|path| path.is_dir())
        .ok_or(ArchiveError::MissingRoot)
}

/// Immediate subdirectories of `root`, minus exclusions, sorted by name.
pub fn list_packages(
    root: &Path,
    exclusions: &ExclusionSet,
) -> Result<Vec<String>, ArchiveError> {
    let mut packages = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping folder with non UTF-8 name: {:?}", entry.file_name());
            continue;
        };

        if exclusions.contains(&name) {
            debug!("Skipping excluded folder {}", name);
            continue;
        }
        packages.push(name);
    }

    packages.sort();
    Ok(packages)
}

/// Extract `archive` into `dest` and return the content package ids it holds.
pub fn scan_archive(
    archive: &Path,
    format: ArchiveFormat,
    dest: &Path,
    exclusions: &ExclusionSet,
) -> Result<Vec<String>, ArchiveError> {
    extract(archive, format, dest)?;
    let root = find_root(dest, exclusions)?;
    let packages = list_packages(&root, exclusions)?;

    info!(
        "Found {} content folders in {:?}",
        packages.len(),
        root.file_name().unwrap_or_default()
    );
    Ok(packages)
}


#[cfg(test)]
mod tests {
    use super::testutil::{write_tar_gz, write_zip};
    use super::*;

    const GITHUB_LAYOUT: &[&str] = &[
        "acme-trinkets-1a2b3c/",
        "acme-trinkets-1a2b3c/README.md",
        "acme-trinkets-1a2b3c/.github/",
        "acme-trinkets-1a2b3c/.github/workflows/update.yml",
        "acme-trinkets-1a2b3c/clock/",
        "acme-trinkets-1a2b3c/clock/index.html",
        "acme-trinkets-1a2b3c/pixel-pet/",
        "acme-trinkets-1a2b3c/pixel-pet/index.html",
        "acme-trinkets-1a2b3c/.vscode/settings.json",
    ];

    #[test]
    fn test_scan_zipball() {
        let workspace = Workspace::new().unwrap();
        write_zip(&workspace.archive_path(), GITHUB_LAYOUT);

        let packages = scan_archive(
            &workspace.archive_path(),
            ArchiveFormat::Zipball,
            &workspace.extract_dir(),
            &ExclusionSet::default(),
        )
        .unwrap();
        assert_eq!(packages, vec!["clock", "pixel-pet"]);
    }

    #[test]
    fn test_scan_tarball() {
        let workspace = Workspace::new().unwrap();
        write_tar_gz(&workspace.archive_path(), GITHUB_LAYOUT);

        let packages = scan_archive(
            &workspace.archive_path(),
            ArchiveFormat::Tarball,
            &workspace.extract_dir(),
            &ExclusionSet::default(),
        )
        .unwrap();
        assert_eq!(packages, vec!["clock", "pixel-pet"]);
    }

    #[test]
    fn test_extra_exclusions() {
        let workspace = Workspace::new().unwrap();
        write_zip(&workspace.archive_path(), GITHUB_LAYOUT);

        let packages = scan_archive(
            &workspace.archive_path(),
            ArchiveFormat::Zipball,
            &workspace.extract_dir(),
            &ExclusionSet::with_extra(["pixel-pet"]),
        )
        .unwrap();
        assert_eq!(packages, vec!["clock"]);
    }

    #[test]
    fn test_not_an_archive() {
        let workspace = Workspace::new().unwrap();
        fs::write(workspace.archive_path(), b"<html>rate limited</html>").unwrap();

        let archive = workspace.archive_path();
        let dest = workspace.extract_dir();

        let err = extract(&archive, ArchiveFormat::Zipball, &dest).unwrap_err();
        assert!(matches!(err, ArchiveError::Zip(_)));

        let err = extract(&archive, ArchiveFormat::Tarball, &dest).unwrap_err();
        assert!(matches!(err, ArchiveError::Tar(_)));
    }

    #[test]
    fn test_missing_root() {
        let workspace = Workspace::new().unwrap();
        write_zip(&workspace.archive_path(), &["README.md", "LICENSE"]);

        let err = scan_archive(
            &workspace.archive_path(),
            ArchiveFormat::Zipball,
            &workspace.extract_dir(),
            &ExclusionSet::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ArchiveError::MissingRoot));
    }

    #[test]
    fn test_root_is_first_directory_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("aaa.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();

        let root = find_root(dir.path(), &ExclusionSet::default()).unwrap();
        assert_eq!(root, dir.path().join("beta"));
    }

    #[test]
    fn test_macos_resource_folder_is_not_the_root() {
        let workspace = Workspace::new().unwrap();
        write_zip(
            &workspace.archive_path(),
            &[
                "__MACOSX/",
                "__MACOSX/acme-trinkets-1a2b3c/",
                "__MACOSX/acme-trinkets-1a2b3c/._clock/",
                "acme-trinkets-1a2b3c/",
                "acme-trinkets-1a2b3c/clock/",
                "acme-trinkets-1a2b3c/clock/index.html",
            ],
        );

        let packages = scan_archive(
            &workspace.archive_path(),
            ArchiveFormat::Zipball,
            &workspace.extract_dir(),
            &ExclusionSet::default(),
        )
        .unwrap();
        assert_eq!(packages, vec!["clock"]);
    }

    #[test]
    fn test_only_excluded_top_level_is_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("__MACOSX")).unwrap();

        let err = find_root(dir.path(), &ExclusionSet::default()).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingRoot));
    }

    #[test]
    fn test_workspace_removed_on_drop() {
        let workspace = Workspace::new().unwrap();
        let archive = workspace.archive_path();
        fs::write(&archive, b"x").unwrap();
        drop(workspace);
        assert!(!archive.exists());
    }
}
