//! Content-addressed store interface.
//!
//! The publish core never talks to a network; it sees storage through
//! [`ContentStore`], two methods over opaque addresses. Equal content yields
//! an equal address, addresses are only propagated and compared, never
//! interpreted. [`MemoryStore`] is the in-process implementation used by
//! tests and local runs.

use std::sync::RwLock;

use rustc_hash::FxHashMap;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no content stored for address {0}")]
    NotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Narrow interface to a content-addressed blob store.
pub trait ContentStore {
    fn get(&self, address: &str) -> Result<Vec<u8>, StoreError>;

    fn put(&self, bytes: &[u8]) -> Result<String, StoreError>;
}

/// In-memory content store addressing blobs by their sha256 digest.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<FxHashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for seeding fixtures.
    pub fn put_str(&self, text: &str) -> Result<String, StoreError> {
        self.put(text.as_bytes())
    }

    fn address_of(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }
}

impl ContentStore for MemoryStore {
    fn get(&self, address: &str) -> Result<Vec<u8>, StoreError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        blobs
            .get(address)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(address.to_string()))
    }

    fn put(&self, bytes: &[u8]) -> Result<String, StoreError> {
        let address = Self::address_of(bytes);
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        blobs.insert(address.clone(), bytes.to_vec());
        Ok(address)
    }
}
