//! Archive Digest
//!
//! Incremental SHA-256 over archive bytes, rendered as lowercase hex.

use sha2::{Digest, Sha256};

/// Streaming hasher. Feed it chunks in order, then call [`finish`](Self::finish).
#[derive(Debug, Clone, Default)]
pub struct ArchiveHasher {
    inner: Sha256,
    len: u64,
}

impl ArchiveHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
        self.len += chunk.len() as u64;
    }

    /// Number of bytes hashed so far
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn finish(self) -> String {
        hex::encode(self.inner.finalize())
    }
}

#[cfg(test)]
pub(crate) fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = ArchiveHasher::new();
    hasher.update(bytes);
    hasher.finish()
}
