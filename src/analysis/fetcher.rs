/// Windowed transaction fetch with backward pagination and cache consult

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::TransactionCache;
use crate::client::TransactionSource;
use crate::config::FetchSettings;
use crate::core::Transaction;

pub struct TransactionFetcher<S, C> {
    source: S,
    cache: C,
    settings: FetchSettings,
}

impl<S: TransactionSource, C: TransactionCache> TransactionFetcher<S, C> {
    pub fn new(source: S, cache: C, settings: FetchSettings) -> Self {
        Self {
            source,
            cache,
            settings,
        }
    }

    /// Return the transactions for `address` inside `[now - minutes, now]`,
    /// sorted ascending by timestamp.
    ///
    /// A failed page ends pagination early and the accumulated prefix is
    /// still returned: partial, never corrupt.
    pub async fn fetch_window(&self, address: &str, minutes: u64) -> Vec<Transaction> {
        let now = Utc::now().timestamp();
        let cutoff = now - (minutes as i64 * 60);

        let ttl = Duration::from_secs(self.settings.cache_ttl_secs);
        if let Some(mut cached) = self.cache.get(address, ttl) {
            for tx in &mut cached {
                tx.normalize_timestamp();
            }
            let fresh = Self::filter_window(cached, cutoff);
            if !fresh.is_empty() {
                info!("💾 Serving {} cached transactions for {}", fresh.len(), address);
                return fresh;
            }
            debug!("💾 Cache for {} has nothing inside the window, refetching", address);
        }

        let mut all: Vec<Transaction> = Vec::new();
        let mut before: Option<String> = None;

        for page in 0..self.settings.max_pages {
            let mut batch = match self
                .source
                .fetch_page(address, before.as_deref(), self.settings.page_size)
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(
                        "⚠️ Page {} failed for {}: {} - returning partial results",
                        page + 1,
                        address,
                        e
                    );
                    break;
                }
            };

            if batch.is_empty() {
                break;
            }

            for tx in &mut batch {
                tx.normalize_timestamp();
            }

            let oldest = batch.iter().map(|tx| tx.timestamp).min().unwrap_or(i64::MAX);
            before = batch.last().map(|tx| tx.signature.clone());
            debug!("📥 Page {}: {} transactions for {}", page + 1, batch.len(), address);
            all.extend(batch);

            if oldest < cutoff {
                break;
            }

            if page + 1 < self.settings.max_pages {
                tokio::time::sleep(Duration::from_millis(self.settings.page_delay_ms)).await;
            }
        }

        if !all.is_empty() {
            // Full unfiltered set so a tighter window can reuse it
            self.cache.put(address, &all);
        }

        Self::filter_window(all, cutoff)
    }

    fn filter_window(mut transactions: Vec<Transaction>, cutoff: i64) -> Vec<Transaction> {
        transactions.retain(|tx| tx.timestamp >= cutoff);
        transactions.sort_by_key(|tx| tx.timestamp);
        transactions
    }
}
