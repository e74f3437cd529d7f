/// TTL-based transaction cache keyed by address
///
/// Single-writer-wins: concurrent writers race benignly and the staleness
/// is bounded by the TTL.

pub mod disk;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::core::Transaction;

pub use disk::DiskCache;

pub trait TransactionCache: Send + Sync {
    /// Return the cached list when the entry is younger than `ttl`.
    /// A malformed or expired entry is a miss, never an error.
    fn get(&self, key: &str, ttl: Duration) -> Option<Vec<Transaction>>;

    /// Overwrite the entry for `key`. Best-effort: failures are logged,
    /// not raised.
    fn put(&self, key: &str, transactions: &[Transaction]);
}

/// In-process cache used by tests and short-lived runs
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Instant, Vec<Transaction>)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionCache for MemoryCache {
    fn get(&self, key: &str, ttl: Duration) -> Option<Vec<Transaction>> {
        let entries = self.entries.lock().unwrap();
        let (written, transactions) = entries.get(key)?;
        if written.elapsed() <= ttl {
            Some(transactions.clone())
        } else {
            None
        }
    }

    fn put(&self, key: &str, transactions: &[Transaction]) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (Instant::now(), transactions.to_vec()));
    }
}
