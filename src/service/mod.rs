//! File Service Module
//!
//! This module sits between the HTTP transport and the store engine. It turns an
//! uploaded file into a storage key and a download URL, and forwards downloads
//! to the engine.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handler
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  FileService    │  (this module)
//! │                 │
//! │  - Key gen      │
//! │  - URL build    │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  StoreEngine    │  (storage module)
//! └─────────────────┘
//! ```

pub mod keygen;

pub use keygen::KeyGenerator;

use crate::storage::{StoreEngine, StoreResult, StoreStats};
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Bytes escaped when a key is placed in a URL path segment (RFC 3986 unreserved are kept).
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Uploads files into the store and downloads them back.
#[derive(Debug, Clone)]
pub struct FileService {
    /// The store engine (shared with the rest of the process)
    store: Arc<StoreEngine>,
    /// Key generator (shared between clones)
    keys: Arc<KeyGenerator>,
    /// Prefix joined with the storage key to form download URLs
    base_url: String,
    /// Service start time, reported by the health endpoint
    start_time: Instant,
}

impl FileService {
    /// Creates a new file service over the given store engine.
    pub fn new(store: Arc<StoreEngine>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            keys: Arc::new(KeyGenerator::new()),
            base_url: base_url.into(),
            start_time: Instant::now(),
        }
    }

    /// Stores `content` under a key generated from `filename`.
    ///
    /// # Returns
    ///
    /// The URL the file can be downloaded from until `ttl` elapses.
    pub async fn upload(&self, filename: &str, content: Bytes, ttl: Duration) -> StoreResult<String> {
        let key = self.keys.generate(filename);
        let size = content.len();

        self.store.write(key.clone(), content, ttl).await?;

        debug!(key = %key, bytes = size, ttl_secs = ttl.as_secs(), "File uploaded");
        Ok(self.url_for(&key))
    }

    /// Returns the content stored under `key`.
    pub async fn download(&self, key: &str) -> StoreResult<Bytes> {
        self.store.read(key).await
    }

    /// Builds the download URL for a storage key.
    ///
    /// Keys keep the characters of the uploaded filename, so the key is
    /// percent-encoded to stay a single path segment.
    pub fn url_for(&self, key: &str) -> String {
        format!("{}{}", self.base_url, utf8_percent_encode(key, KEY_SEGMENT))
    }

    /// Returns the store statistics.
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Returns how long this service has been up.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
