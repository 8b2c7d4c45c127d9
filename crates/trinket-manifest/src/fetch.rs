//! Archive Fetcher
//!
//! Downloads the content repository archive. The body is streamed chunk by
//! chunk into an [`ArchiveSink`], which hashes it and spools it to disk in one
//! pass, so the archive is transferred once and never held in memory.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{ArchiveSource, UpdaterConfig};
use crate::error::FetchError;
use crate::hash::ArchiveHasher;

/// The upstream API rejects requests without a user agent.
pub const USER_AGENT: &str = "GitHubActions-TrinketManifestUpdater";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A fully downloaded archive on disk together with its digest.
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    pub path: PathBuf,
    pub digest: String,
    pub size: u64,
}

/// Destination for archive bytes: a file plus a running digest.
pub struct ArchiveSink {
    path: PathBuf,
    writer: BufWriter<File>,
    hasher: ArchiveHasher,
}

impl ArchiveSink {
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            hasher: ArchiveHasher::new(),
        })
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.writer.write_all(chunk)?;
        self.hasher.update(chunk);
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<DownloadedArchive> {
        self.writer.flush()?;
        if self.hasher.is_empty() {
            warn!("Downloaded archive is empty");
        }
        let size = self.hasher.len();
        Ok(DownloadedArchive {
            path: self.path,
            digest: self.hasher.finish(),
            size,
        })
    }
}

#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Stream the archive for `source` into `sink`.
    async fn fetch(
        &self,
        source: &ArchiveSource,
        sink: &mut ArchiveSink,
    ) -> Result<(), FetchError>;
}

/// Fetcher backed by the GitHub REST archive endpoints.
pub struct HttpFetcher {
    client: Client,
    token: Option<String>,
}

impl HttpFetcher {
    pub fn new(config: &UpdaterConfig) -> Result<Self, FetchError> {
        // An overall timeout also bounds the body download; only set on request.
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self {
            client,
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    async fn fetch(
        &self,
        source: &ArchiveSource,
        sink: &mut ArchiveSink,
    ) -> Result<(), FetchError> {
        let url = source.url();

        info!("Downloading {} to calculate hash...", url);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let mut response = request.send().await.map_err(|e| FetchError::Request {
            url: url.clone(),
            source: e,
        })?;

        let status = response.status();
        debug!("Response status: {}", status);
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        while let Some(chunk) = response.chunk().await.map_err(|e| FetchError::Request {
            url: url.clone(),
            source: e,
        })? {
            sink.write_chunk(&chunk)?;
        }

        Ok(())
    }
}
