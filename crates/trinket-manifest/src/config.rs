//! Run Configuration
//!
//! Validated settings for one update run. Everything here is checked before
//! the manifest is opened or the network is touched.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const REPO_VAR: &str = "TRINKET_CONTENT_REPO";
pub const REF_VAR: &str = "TRINKET_CONTENT_REF";

pub const DEFAULT_MANIFEST: &str = "trinkets.json";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_HOSTING_BASE: &str = "https://raw.githubusercontent.com/{repo}/{ref}";

/// Archive flavour requested from the upstream API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchiveFormat {
    #[default]
    Zipball,
    Tarball,
}

impl ArchiveFormat {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ArchiveFormat::Zipball => "zipball",
            ArchiveFormat::Tarball => "tarball",
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zip" | "zipball" => Ok(ArchiveFormat::Zipball),
            "tar" | "tarball" | "tar.gz" => Ok(ArchiveFormat::Tarball),
            other => Err(format!(
                "unknown archive format '{}' (expected zipball or tarball)",
                other
            )),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Where the content archive comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    pub api_base: String,
    pub repo: String,
    pub reference: String,
    pub format: ArchiveFormat,
}

impl ArchiveSource {
    /// Archive download URL, e.g. `https://api.github.com/repos/owner/repo/zipball/main`
    pub fn url(&self) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.repo,
            self.format.endpoint(),
            self.reference
        )
    }
}

#[derive(Clone)]
pub struct UpdaterConfig {
    pub source: ArchiveSource,
    pub manifest_path: PathBuf,
    /// Hosting base URL with `{repo}` and `{ref}` already substituted
    pub hosting_base: String,
    pub extra_exclusions: Vec<String>,
    pub token: Option<String>,
    /// Overall request deadline, download included. `None` leaves only the
    /// connect timeout in place.
    pub timeout: Option<Duration>,
    pub dry_run: bool,
}

impl UpdaterConfig {
    /// Build a config from the two required values.
    ///
    /// Empty strings count as missing, matching how the variables are usually
    /// left blank in CI rather than unset.
    pub fn new(repo: Option<String>, reference: Option<String>) -> Result<Self, ConfigError> {
        let repo = non_empty(repo).ok_or(ConfigError::MissingVar(REPO_VAR))?;
        let reference = non_empty(reference).ok_or(ConfigError::MissingVar(REF_VAR))?;
        validate_repo(&repo)?;

        let hosting_base = render_hosting_base(DEFAULT_HOSTING_BASE, &repo, &reference)?;

        Ok(Self {
            source: ArchiveSource {
                api_base: DEFAULT_API_BASE.to_string(),
                repo,
                reference,
                format: ArchiveFormat::default(),
            },
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            hosting_base,
            extra_exclusions: Vec::new(),
            token: None,
            timeout: None,
            dry_run: false,
        })
    }

    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.source.api_base = api_base.into();
        self
    }

    pub fn with_format(mut self, format: ArchiveFormat) -> Self {
        self.source.format = format;
        self
    }

    pub fn with_hosting_base(mut self, template: &str) -> Result<Self, ConfigError> {
        self.hosting_base =
            render_hosting_base(template, &self.source.repo, &self.source.reference)?;
        Ok(self)
    }

    pub fn with_exclusions(mut self, names: Vec<String>) -> Self {
        self.extra_exclusions = names;
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = non_empty(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl fmt::Debug for UpdaterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdaterConfig")
            .field("source", &self.source)
            .field("manifest_path", &self.manifest_path)
            .field("hosting_base", &self.hosting_base)
            .field("extra_exclusions", &self.extra_exclusions)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_repo(repo: &str) -> Result<(), ConfigError> {
    let valid = match repo.split_once('/') {
        Some((owner, name)) => {
            !owner.is_empty()
                && !name.is_empty()
                && !name.contains('/')
                && !repo.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidRepo(repo.to_string()))
    }
}

/// Substitute `{repo}` and `{ref}` into a hosting base template.
///
/// The rendered URL has to name the repository, otherwise the entries it
/// produces would never be recognised as coming from it on later runs.
pub fn render_hosting_base(
    template: &str,
    repo: &str,
    reference: &str,
) -> Result<String, ConfigError> {
    let rendered = template.replace("{repo}", repo).replace("{ref}", reference);

    if rendered.contains('{') || rendered.contains('}') {
        return Err(ConfigError::InvalidTemplate {
            template: template.to_string(),
            reason: "only {repo} and {ref} placeholders are supported".to_string(),
        });
    }
    if rendered.is_empty() {
        return Err(ConfigError::InvalidTemplate {
            template: template.to_string(),
            reason: "template renders to an empty URL".to_string(),
        });
    }
    if !rendered.contains(repo) {
        return Err(ConfigError::InvalidTemplate {
            template: template.to_string(),
            reason: format!("rendered URL does not contain the repository {}", repo),
        });
    }

    Ok(rendered.trim_end_matches('/').to_string())
}
