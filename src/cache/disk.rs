/// Disk-backed transaction cache, one JSON file per address

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use super::TransactionCache;
use crate::core::Transaction;

pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl TransactionCache for DiskCache {
    fn get(&self, key: &str, ttl: Duration) -> Option<Vec<Transaction>> {
        let path = self.path_for(key);

        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let age = modified.elapsed().ok()?;
        if age > ttl {
            debug!("💾 Cache for {} expired ({}s old)", key, age.as_secs());
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(transactions) => {
                debug!("💾 Cache hit for {}", key);
                Some(transactions)
            }
            Err(e) => {
                // Treated as a miss; TTL expiry will overwrite it
                debug!("💾 Malformed cache file for {}: {}", key, e);
                None
            }
        }
    }

    fn put(&self, key: &str, transactions: &[Transaction]) {
        let path = self.path_for(key);
        match serde_json::to_string(transactions) {
            Ok(content) => {
                if let Err(e) = fs::write(&path, content) {
                    warn!("⚠️ Failed to write cache for {}: {}", key, e);
                }
            }
            Err(e) => warn!("⚠️ Failed to serialize cache for {}: {}", key, e),
        }
    }
}
