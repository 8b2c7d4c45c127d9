use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use trinket_manifest::config::{DEFAULT_API_BASE, DEFAULT_HOSTING_BASE, DEFAULT_MANIFEST};
use trinket_manifest::{ArchiveFormat, ConfigError, UpdaterConfig};

/// Sync trinkets.json with the content repository.
#[derive(Parser, Debug)]
#[command(name = "trinket-updater", version)]
pub struct Args {
    /// Content repository as owner/repo
    #[arg(long, env = "TRINKET_CONTENT_REPO")]
    pub repo: Option<String>,

    /// Branch, tag or commit to hash
    #[arg(long = "ref", env = "TRINKET_CONTENT_REF")]
    pub reference: Option<String>,

    #[arg(long, env = "TRINKET_MANIFEST", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Token sent as a bearer credential, raises the API rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL for new entries; {repo} and {ref} are substituted
    #[arg(long, env = "TRINKET_HOSTING_BASE", default_value = DEFAULT_HOSTING_BASE)]
    pub hosting_base: String,

    /// zipball or tarball
    #[arg(long, default_value = "zipball")]
    pub format: ArchiveFormat,

    /// Extra folder name to ignore (repeatable)
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Give up on the whole download after this many seconds (no limit by default)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Report changes without writing the manifest
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    pub fn into_config(self) -> Result<UpdaterConfig, ConfigError> {
        let config = UpdaterConfig::new(self.repo, self.reference)?
            .with_manifest_path(self.manifest)
            .with_api_base(self.api_base)
            .with_format(self.format)
            .with_exclusions(self.exclude)
            .with_token(self.token)
            .with_timeout(self.timeout_secs.map(Duration::from_secs))
            .with_dry_run(self.dry_run)
            .with_hosting_base(&self.hosting_base)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_reach_config() {
        let args = Args::try_parse_from([
            "trinket-updater",
            "--repo",
            "acme/trinkets",
            "--ref",
            "v2",
            "--manifest",
            "public/trinkets.json",
            "--format",
            "tarball",
            "--exclude",
            "drafts",
            "--exclude",
            "templates",
            "--hosting-base",
            "https://cdn.example.com/{repo}@{ref}",
            "--dry-run",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.source.repo, "acme/trinkets");
        assert_eq!(config.source.reference, "v2");
        assert_eq!(config.source.format, ArchiveFormat::Tarball);
        assert_eq!(config.manifest_path, PathBuf::from("public/trinkets.json"));
        assert_eq!(config.extra_exclusions, vec!["drafts", "templates"]);
        assert_eq!(config.hosting_base, "https://cdn.example.com/acme/trinkets@v2");
        assert!(config.dry_run);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_timeout_is_opt_in() {
        let args = Args::try_parse_from([
            "trinket-updater",
            "--repo",
            "acme/trinkets",
            "--ref",
            "main",
            "--timeout-secs",
            "900",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = Args::try_parse_from(["trinket-updater", "--format", "rar"]);
        assert!(result.is_err());
    }
}
