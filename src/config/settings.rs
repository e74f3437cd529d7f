/// Analyzer configuration structures
///
/// Every heuristic threshold used by the pipeline lives here so tests can
/// override them without touching logic. Defaults match the tuned values
/// for a SOL-priced chain.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub buckets: BucketThresholds,
    #[serde(default)]
    pub patterns: PatternSettings,
    #[serde(default)]
    pub categorizer: CategorizerSettings,
}

/// Pagination and cache behavior for the transaction fetcher
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchSettings {
    /// Transactions per page requested from the history endpoint
    pub page_size: usize,
    /// Hard cap on backward pagination
    pub max_pages: usize,
    /// Fixed delay between pages to respect rate limits
    pub page_delay_ms: u64,
    /// Cache freshness window
    pub cache_ttl_secs: u64,
    /// Directory holding one cache file per address
    pub cache_dir: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 20,
            page_delay_ms: 100,
            cache_ttl_secs: 60,
            cache_dir: "data/tx_cache".to_string(),
        }
    }
}

/// Volume bucket boundaries, ascending: very_small/small/medium/large maxima.
/// Amounts at or above the last boundary land in very_large.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BucketThresholds {
    /// Boundaries for SOL-denominated values
    pub native: [f64; 4],
    /// Boundaries for target-token-denominated values
    pub token: [f64; 4],
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            native: [0.1, 1.0, 10.0, 100.0],
            token: [100.0, 1_000.0, 10_000.0, 100_000.0],
        }
    }
}

/// Constants for the per-transaction pattern detectors
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PatternSettings {
    /// Net token in/out within this of zero flags a flash-loan round-trip
    pub flash_loan_tolerance: f64,
    /// Relative implied-price change above this flags high slippage
    pub slippage_threshold: f64,
    /// Same-wallet swap gap under this counts as a rapid swap
    pub rapid_interval_secs: i64,
    /// Same-wallet swap gap under this counts as a bot trade
    pub bot_interval_secs: i64,
    /// Amounts above this count as large transfers
    pub large_transfer_floor: f64,
    /// Two large swaps inside this window form a sandwich shape
    pub sandwich_window_secs: i64,
    /// Minimum trades for the wash-trade shape
    pub wash_trade_min_trades: usize,
    /// Window the wash-trade trades must fall inside
    pub wash_trade_window_secs: i64,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            flash_loan_tolerance: 0.01,
            slippage_threshold: 0.05,
            rapid_interval_secs: 60,
            bot_interval_secs: 3,
            large_transfer_floor: 1_000.0,
            sandwich_window_secs: 60,
            wash_trade_min_trades: 3,
            wash_trade_window_secs: 300,
        }
    }
}

/// Thresholds for assigning wallets to trader categories
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategorizerSettings {
    /// Trade count a market maker must exceed
    pub market_maker_min_trades: usize,
    /// Mean inter-trade gap a market maker must stay under
    pub market_maker_max_gap_secs: f64,
    /// Rapid-trade fraction separating bots from large market makers
    pub market_maker_rapid_fraction: f64,
    /// High-slippage fraction a sniper must exceed
    pub sniper_slippage_fraction: f64,
    /// Total volume in SOL a whale must exceed
    pub whale_min_volume: f64,
    /// Single-trade size in SOL counting as a large trade
    pub whale_large_trade: f64,
    /// Fraction of large trades a whale must exceed
    pub whale_large_trade_fraction: f64,
}

impl Default for CategorizerSettings {
    fn default() -> Self {
        Self {
            market_maker_min_trades: 50,
            market_maker_max_gap_secs: 60.0,
            market_maker_rapid_fraction: 0.8,
            sniper_slippage_fraction: 0.3,
            whale_min_volume: 100.0,
            whale_large_trade: 10.0,
            whale_large_trade_fraction: 0.5,
        }
    }
}

impl AnalyzerConfig {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the given path, or fall back to defaults when the file
    /// is absent.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
